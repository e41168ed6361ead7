//! Baseline-vs-prepaid schedule comparison and the savings summary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LoanSimError;
use crate::plan::PrepaymentPlan;
use crate::simulation::simulate;
use crate::types::{
    with_metadata, AmortizationResult, ComputationOutput, LoanTerms, Money, PrepaymentMode,
    MONEY_DP,
};
use crate::LoanSimResult;

/// Savings of a prepaid schedule against its baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_paid_baseline: Money,
    pub total_paid_prepaid: Money,
    pub interest_baseline: Money,
    pub interest_prepaid: Money,
    pub interest_saved: Money,
    pub months_baseline: u32,
    pub months_prepaid: u32,
    /// Negative only when rounding stretches a reduce-installment run past
    /// the baseline by a month.
    pub months_saved: i64,
}

/// Both schedules plus their summary, as produced by
/// [`analyze_prepayment_impact`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonOutput {
    pub baseline: AmortizationResult,
    pub prepaid: AmortizationResult,
    pub summary: SummaryStats,
}

/// Derive summary statistics from two completed runs. Total paid is the sum
/// of installments and lump sums; interest is total paid less the original
/// principal.
pub fn compare(
    baseline: &AmortizationResult,
    prepaid: &AmortizationResult,
    original_principal: Money,
) -> LoanSimResult<SummaryStats> {
    if original_principal <= Decimal::ZERO {
        return Err(LoanSimError::InvalidInput {
            field: "original_principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if baseline.periods.is_empty() || prepaid.periods.is_empty() {
        return Err(LoanSimError::InsufficientData(
            "Comparison requires two non-empty schedules".into(),
        ));
    }

    let total_paid_baseline = baseline.total_installments() + baseline.total_prepayments();
    let total_paid_prepaid = prepaid.total_installments() + prepaid.total_prepayments();
    let interest_baseline = total_paid_baseline - original_principal;
    let interest_prepaid = total_paid_prepaid - original_principal;

    Ok(SummaryStats {
        total_paid_baseline: total_paid_baseline.round_dp(MONEY_DP),
        total_paid_prepaid: total_paid_prepaid.round_dp(MONEY_DP),
        interest_baseline: interest_baseline.round_dp(MONEY_DP),
        interest_prepaid: interest_prepaid.round_dp(MONEY_DP),
        interest_saved: (interest_baseline - interest_prepaid).round_dp(MONEY_DP),
        months_baseline: baseline.months(),
        months_prepaid: prepaid.months(),
        months_saved: i64::from(baseline.months()) - i64::from(prepaid.months()),
    })
}

/// Run the baseline and prepaid simulations for one loan and compare them.
pub fn analyze_prepayment_impact(
    terms: &LoanTerms,
    plan: &PrepaymentPlan,
    mode: PrepaymentMode,
) -> LoanSimResult<ComputationOutput<ComparisonOutput>> {
    let start = Instant::now();
    terms.validate()?;
    plan.validate()?;

    let mut warnings: Vec<String> = Vec::new();
    if plan.is_empty() {
        warnings.push("Prepayment plan is empty; both schedules are identical".into());
    }
    for (&year, _) in plan.iter() {
        if year > terms.tenure_years {
            warnings.push(format!(
                "Prepayment in year {year} falls beyond the nominal tenure and never applies",
            ));
        }
    }

    let baseline = simulate(terms, None, PrepaymentMode::ShortenTenure)?;
    let prepaid = simulate(terms, Some(plan), mode)?;
    let summary = compare(&baseline, &prepaid, terms.principal)?;

    let methodology = match mode {
        PrepaymentMode::ShortenTenure => {
            "Level-pay amortization vs. tenure-shortening lump-sum prepayment"
        }
        PrepaymentMode::ReduceInstallment => {
            "Level-pay amortization vs. installment-reducing lump-sum prepayment"
        }
    };

    let assumptions = serde_json::json!({
        "terms": terms,
        "mode": mode,
        "plan": plan,
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology,
        &assumptions,
        warnings,
        elapsed,
        ComparisonOutput {
            baseline,
            prepaid,
            summary,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn standard_terms() -> LoanTerms {
        LoanTerms::new(dec!(500_000), dec!(8.5), 20)
    }

    fn two_year_plan() -> PrepaymentPlan {
        PrepaymentPlan::from_entries([(1, dec!(50_000)), (2, dec!(50_000))])
    }

    #[test]
    fn test_prepayment_saves_interest_and_months() {
        let out =
            analyze_prepayment_impact(&standard_terms(), &two_year_plan(), PrepaymentMode::ShortenTenure)
                .unwrap();
        let s = &out.result.summary;
        assert_eq!(s.months_baseline, 240);
        assert!(s.months_prepaid < 240);
        assert!(s.months_saved > 0);
        assert!(s.interest_saved > Decimal::ZERO);
    }

    #[test]
    fn test_reduce_installment_saves_interest() {
        let out = analyze_prepayment_impact(
            &standard_terms(),
            &two_year_plan(),
            PrepaymentMode::ReduceInstallment,
        )
        .unwrap();
        let s = &out.result.summary;
        assert!(s.interest_saved > Decimal::ZERO);
        // Shortening the tenure saves more interest than reducing the payment.
        let shorten = analyze_prepayment_impact(
            &standard_terms(),
            &two_year_plan(),
            PrepaymentMode::ShortenTenure,
        )
        .unwrap();
        assert!(shorten.result.summary.interest_saved > s.interest_saved);
    }

    #[test]
    fn test_empty_plan_identical_runs_and_warning() {
        let out = analyze_prepayment_impact(
            &standard_terms(),
            &PrepaymentPlan::new(),
            PrepaymentMode::ShortenTenure,
        )
        .unwrap();
        let s = &out.result.summary;
        assert_eq!(s.months_saved, 0);
        assert_eq!(s.interest_saved, Decimal::ZERO);
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_warning_for_plan_year_beyond_tenure() {
        let plan = PrepaymentPlan::from_entries([(25, dec!(50_000))]);
        let out =
            analyze_prepayment_impact(&standard_terms(), &plan, PrepaymentMode::ShortenTenure)
                .unwrap();
        assert!(out
            .warnings
            .iter()
            .any(|w| w.contains("beyond the nominal tenure")));
        assert_eq!(out.result.summary.interest_saved, Decimal::ZERO);
    }

    #[test]
    fn test_total_paid_reconciles_with_schedules() {
        let out =
            analyze_prepayment_impact(&standard_terms(), &two_year_plan(), PrepaymentMode::ShortenTenure)
                .unwrap();
        let r = &out.result;
        assert_eq!(
            r.summary.total_paid_prepaid,
            (r.prepaid.total_installments() + r.prepaid.total_prepayments()).round_dp(2)
        );
        assert_eq!(
            r.summary.total_paid_baseline,
            r.baseline.total_installments().round_dp(2)
        );
    }

    #[test]
    fn test_compare_rejects_empty_sequences() {
        let empty = AmortizationResult { periods: vec![] };
        let err = compare(&empty, &empty, dec!(1000)).unwrap_err();
        assert!(matches!(err, LoanSimError::InsufficientData(_)));
    }

    #[test]
    fn test_compare_rejects_nonpositive_principal() {
        let baseline =
            simulate(&standard_terms(), None, PrepaymentMode::ShortenTenure).unwrap();
        assert!(compare(&baseline, &baseline, dec!(0)).is_err());
    }

    #[test]
    fn test_metadata_populated() {
        let out =
            analyze_prepayment_impact(&standard_terms(), &two_year_plan(), PrepaymentMode::ShortenTenure)
                .unwrap();
        assert!(out.methodology.contains("amortization"));
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }
}
