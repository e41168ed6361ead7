//! Month-by-month amortization recursion with optional year-end lump-sum
//! prepayments.

use rust_decimal::Decimal;

use crate::error::LoanSimError;
use crate::installment::compute_installment;
use crate::plan::PrepaymentPlan;
use crate::types::{AmortizationResult, LoanTerms, PeriodRecord, PrepaymentMode, MONEY_DP};
use crate::LoanSimResult;

/// Run the amortization recursion to payoff.
///
/// Each month accrues interest on the outstanding balance, pays the
/// installment, and, at the 12th month of a year with a plan entry, applies
/// the lump sum (clamped to the balance). In `ReduceInstallment` mode a
/// lump sum triggers recomputation of the installment over the months left
/// of the original term; in `ShortenTenure` mode the installment is fixed
/// and the schedule simply ends earlier.
///
/// Configurations whose installment cannot cover the first month's interest
/// are rejected as unpayable rather than looping forever, and the recursion
/// is hard-capped at twice the nominal term.
pub fn simulate(
    terms: &LoanTerms,
    plan: Option<&PrepaymentPlan>,
    mode: PrepaymentMode,
) -> LoanSimResult<AmortizationResult> {
    terms.validate()?;
    if let Some(plan) = plan {
        plan.validate()?;
    }

    let monthly_rate = terms.monthly_rate();
    let term_months = terms.tenure_months();
    let mut outstanding = terms.principal;
    let mut installment = compute_installment(outstanding, monthly_rate, term_months)?;

    if installment <= outstanding * monthly_rate {
        return Err(LoanSimError::UnpayableConfiguration(format!(
            "installment {} does not exceed first-month interest {}; the balance would never decrease",
            installment,
            (outstanding * monthly_rate).round_dp(MONEY_DP),
        )));
    }

    let max_periods = term_months.saturating_mul(2);
    let mut periods = Vec::with_capacity(term_months as usize);
    let mut year: u32 = 0;
    let mut month: u32 = 0;

    loop {
        if periods.len() as u32 >= max_periods {
            return Err(LoanSimError::UnpayableConfiguration(format!(
                "schedule did not amortise within {max_periods} months",
            )));
        }

        let interest = outstanding * monthly_rate;
        let principal_portion = (installment - interest).min(outstanding);
        outstanding -= principal_portion;

        let mut lumpsum = Decimal::ZERO;
        if month == 11 {
            if let Some(amount) = plan.and_then(|p| p.amount_for_year(year + 1)) {
                lumpsum = amount.min(outstanding);
                outstanding -= lumpsum;

                if mode == PrepaymentMode::ReduceInstallment {
                    let elapsed = year * 12 + month + 1;
                    let remaining = term_months.saturating_sub(elapsed);
                    if outstanding > Decimal::ZERO && remaining > 0 {
                        let recomputed =
                            compute_installment(outstanding, monthly_rate, remaining)?;
                        // A 2 dp installment can round below the interest on a
                        // tiny residual balance; keep the old installment then.
                        if recomputed > outstanding * monthly_rate {
                            installment = recomputed;
                        }
                    }
                }
            }
        }

        periods.push(PeriodRecord {
            principal: terms.principal.round_dp(MONEY_DP),
            annual_rate_pct: terms.annual_rate_pct.round_dp(MONEY_DP),
            year,
            month,
            installment: installment.round_dp(MONEY_DP),
            prepayment: lumpsum.round_dp(MONEY_DP),
            outstanding: outstanding.round_dp(MONEY_DP),
        });

        if outstanding <= Decimal::ZERO {
            break;
        }

        month += 1;
        if month == 12 {
            month = 0;
            year += 1;
        }
    }

    Ok(AmortizationResult { periods })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn standard_terms() -> LoanTerms {
        LoanTerms::new(dec!(500_000), dec!(8.5), 20)
    }

    #[test]
    fn test_baseline_runs_full_tenure() {
        let result = simulate(&standard_terms(), None, PrepaymentMode::ShortenTenure).unwrap();
        assert_eq!(result.months(), 240);
        assert_eq!(result.final_outstanding(), Decimal::ZERO);
    }

    #[test]
    fn test_baseline_records_are_chronological() {
        let result = simulate(&standard_terms(), None, PrepaymentMode::ShortenTenure).unwrap();
        for (i, p) in result.periods.iter().enumerate() {
            assert_eq!(p.year, i as u32 / 12);
            assert_eq!(p.month, i as u32 % 12);
            assert_eq!(p.prepayment, Decimal::ZERO);
        }
    }

    #[test]
    fn test_outstanding_monotonically_non_increasing() {
        let plan = PrepaymentPlan::from_entries([(1, dec!(50_000)), (3, dec!(80_000))]);
        let result =
            simulate(&standard_terms(), Some(&plan), PrepaymentMode::ShortenTenure).unwrap();
        for w in result.periods.windows(2) {
            assert!(
                w[1].outstanding <= w[0].outstanding,
                "balance increased: {} -> {}",
                w[0].outstanding,
                w[1].outstanding
            );
        }
    }

    #[test]
    fn test_shorten_tenure_ends_earlier_with_fixed_installment() {
        let plan = PrepaymentPlan::from_entries([(1, dec!(50_000)), (2, dec!(50_000))]);
        let result =
            simulate(&standard_terms(), Some(&plan), PrepaymentMode::ShortenTenure).unwrap();
        assert!(result.months() < 240);

        let first = result.periods[0].installment;
        for p in &result.periods {
            assert_eq!(p.installment, first);
        }
        // Lump sums land on the 12th month of years 1 and 2.
        assert_eq!(result.periods[11].prepayment, dec!(50000.00));
        assert_eq!(result.periods[23].prepayment, dec!(50000.00));
        assert_eq!(result.periods[12].prepayment, Decimal::ZERO);
    }

    #[test]
    fn test_reduce_installment_drops_payment_and_keeps_term() {
        let plan = PrepaymentPlan::from_entries([(1, dec!(50_000))]);
        let result = simulate(
            &standard_terms(),
            Some(&plan),
            PrepaymentMode::ReduceInstallment,
        )
        .unwrap();

        // The month-11 record already carries the recomputed installment.
        assert!(result.periods[11].installment < result.periods[10].installment);
        // Payoff still tracks the original term, within rounding slack.
        assert!(result.months() >= 239 && result.months() <= 241);
        assert_eq!(result.final_outstanding(), Decimal::ZERO);
    }

    #[test]
    fn test_prepayment_clamped_to_balance() {
        // A lump sum far above the balance clears the loan at month 12.
        let plan = PrepaymentPlan::from_entries([(1, dec!(10_000_000))]);
        let result =
            simulate(&standard_terms(), Some(&plan), PrepaymentMode::ShortenTenure).unwrap();
        assert_eq!(result.months(), 12);
        assert_eq!(result.final_outstanding(), Decimal::ZERO);
        let last = result.periods.last().unwrap();
        assert!(last.prepayment < dec!(10_000_000));
    }

    #[test]
    fn test_plan_years_beyond_payoff_ignored() {
        let plan = PrepaymentPlan::from_entries([(50, dec!(50_000))]);
        let result =
            simulate(&standard_terms(), Some(&plan), PrepaymentMode::ShortenTenure).unwrap();
        assert_eq!(result.months(), 240);
        assert_eq!(result.total_prepayments(), Decimal::ZERO);
    }

    #[test]
    fn test_zero_rate_loan_amortises_evenly() {
        let terms = LoanTerms::new(dec!(120_000), dec!(0), 1);
        let result = simulate(&terms, None, PrepaymentMode::ShortenTenure).unwrap();
        assert_eq!(result.months(), 12);
        for p in &result.periods {
            assert_eq!(p.installment, dec!(10000.00));
        }
        assert_eq!(result.final_outstanding(), Decimal::ZERO);
    }

    #[test]
    fn test_unpayable_configuration_rejected() {
        // 60% annual over 50 years: the 2 dp installment collapses onto the
        // interest-only payment.
        let terms = LoanTerms::new(dec!(1_000_000), dec!(60), 50);
        let err = simulate(&terms, None, PrepaymentMode::ShortenTenure).unwrap_err();
        assert!(matches!(err, LoanSimError::UnpayableConfiguration(_)));
    }

    #[test]
    fn test_invalid_terms_rejected() {
        let terms = LoanTerms::new(dec!(-1), dec!(8.5), 20);
        assert!(simulate(&terms, None, PrepaymentMode::ShortenTenure).is_err());
    }

    #[test]
    fn test_record_constants_carry_original_terms() {
        let result = simulate(&standard_terms(), None, PrepaymentMode::ShortenTenure).unwrap();
        for p in &result.periods {
            assert_eq!(p.principal, dec!(500000.00));
            assert_eq!(p.annual_rate_pct, dec!(8.5));
        }
    }
}
