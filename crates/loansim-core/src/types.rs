use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanSimError;
use crate::LoanSimResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Interest rates. Loan terms carry the annual rate as a percentage
/// (8.5 = 8.5%); everything downstream works on the monthly decimal rate.
pub type Rate = Decimal;

/// Decimal places kept on every monetary output.
pub const MONEY_DP: u32 = 2;

/// The contracted terms of a fixed-installment loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub annual_rate_pct: Rate,
    pub tenure_years: u32,
}

impl LoanTerms {
    pub fn new(principal: Money, annual_rate_pct: Rate, tenure_years: u32) -> Self {
        Self {
            principal,
            annual_rate_pct,
            tenure_years,
        }
    }

    pub fn validate(&self) -> LoanSimResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(LoanSimError::InvalidInput {
                field: "principal".into(),
                reason: "Principal must be positive".into(),
            });
        }
        if self.annual_rate_pct < Decimal::ZERO {
            return Err(LoanSimError::InvalidInput {
                field: "annual_rate_pct".into(),
                reason: "Annual rate cannot be negative".into(),
            });
        }
        if self.tenure_years == 0 {
            return Err(LoanSimError::InvalidInput {
                field: "tenure_years".into(),
                reason: "Tenure must be at least one year".into(),
            });
        }
        Ok(())
    }

    /// Monthly decimal rate: annual percentage / 12 / 100.
    pub fn monthly_rate(&self) -> Rate {
        self.annual_rate_pct / dec!(12) / dec!(100)
    }

    pub fn tenure_months(&self) -> u32 {
        self.tenure_years * 12
    }
}

/// How a lump-sum prepayment reshapes the rest of the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepaymentMode {
    /// Installment stays fixed; the loan simply pays off earlier.
    ShortenTenure,
    /// Installment is recomputed over the remaining original term.
    ReduceInstallment,
}

/// One simulated month of the schedule. Monetary fields are rounded to
/// 2 decimal places; `outstanding` is the balance after this month's
/// principal and any lump-sum reduction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodRecord {
    /// Original loan principal, constant across the run.
    pub principal: Money,
    /// Annual rate percentage, constant across the run.
    pub annual_rate_pct: Rate,
    /// 0-based loan year.
    pub year: u32,
    /// 0-based month within the year (0-11).
    pub month: u32,
    pub installment: Money,
    /// Lump sum applied this month, zero for all but year-end months.
    pub prepayment: Money,
    pub outstanding: Money,
}

/// An ordered amortization schedule, one record per month until payoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationResult {
    pub periods: Vec<PeriodRecord>,
}

impl AmortizationResult {
    /// Number of months until payoff.
    pub fn months(&self) -> u32 {
        self.periods.len() as u32
    }

    pub fn total_installments(&self) -> Money {
        self.periods.iter().map(|p| p.installment).sum()
    }

    pub fn total_prepayments(&self) -> Money {
        self.periods.iter().map(|p| p.prepayment).sum()
    }

    pub fn final_outstanding(&self) -> Money {
        self.periods
            .last()
            .map(|p| p.outstanding)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_rate() {
        let terms = LoanTerms::new(dec!(500_000), dec!(12), 20);
        // 12% annual is exactly 1% monthly
        assert_eq!(terms.monthly_rate(), dec!(0.01));
        assert_eq!(terms.tenure_months(), 240);
    }

    #[test]
    fn test_validate_rejects_bad_terms() {
        assert!(LoanTerms::new(dec!(0), dec!(8.5), 20).validate().is_err());
        assert!(LoanTerms::new(dec!(1000), dec!(-1), 20).validate().is_err());
        assert!(LoanTerms::new(dec!(1000), dec!(8.5), 0).validate().is_err());
        assert!(LoanTerms::new(dec!(1000), dec!(0), 1).validate().is_ok());
    }
}
