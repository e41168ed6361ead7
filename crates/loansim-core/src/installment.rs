//! Fixed-installment (EMI) computation for level-pay amortising loans.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::error::LoanSimError;
use crate::types::{Money, Rate, MONEY_DP};
use crate::LoanSimResult;

/// Fixed monthly installment covering interest and principal over
/// `term_months` at `monthly_rate`.
///
/// Standard annuity formula: `P * r * (1+r)^n / ((1+r)^n - 1)`, rounded to
/// 2 decimal places. A zero rate degrades to equal division of the
/// principal over the term.
pub fn compute_installment(
    principal: Money,
    monthly_rate: Rate,
    term_months: u32,
) -> LoanSimResult<Money> {
    if principal <= Decimal::ZERO {
        return Err(LoanSimError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if term_months == 0 {
        return Err(LoanSimError::InvalidInput {
            field: "term_months".into(),
            reason: "Term must be at least one month".into(),
        });
    }
    if monthly_rate < Decimal::ZERO {
        return Err(LoanSimError::InvalidInput {
            field: "monthly_rate".into(),
            reason: "Monthly rate cannot be negative".into(),
        });
    }

    if monthly_rate.is_zero() {
        return Ok((principal / Decimal::from(term_months)).round_dp(MONEY_DP));
    }

    let factor = (Decimal::ONE + monthly_rate).powd(Decimal::from(term_months));
    let denom = factor - Decimal::ONE;
    if denom <= Decimal::ZERO {
        return Err(LoanSimError::DivisionByZero {
            context: "EMI annuity factor".into(),
        });
    }

    Ok((principal * monthly_rate * factor / denom).round_dp(MONEY_DP))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "{}: expected ~{}, got {} (diff = {})",
            msg,
            expected,
            actual,
            diff
        );
    }

    #[test]
    fn test_emi_standard_loan() {
        // 500k at 8.5% annual over 240 months
        let rate = dec!(8.5) / dec!(12) / dec!(100);
        let emi = compute_installment(dec!(500_000), rate, 240).unwrap();
        assert_close(emi, dec!(4339.12), dec!(0.01), "EMI 500k/8.5%/20y");
    }

    #[test]
    fn test_emi_zero_rate_equal_division() {
        let emi = compute_installment(dec!(120_000), Decimal::ZERO, 12).unwrap();
        assert_eq!(emi, dec!(10000.00));
    }

    #[test]
    fn test_emi_single_month() {
        // One-month loan pays back principal plus one month of interest.
        let emi = compute_installment(dec!(1000), dec!(0.01), 1).unwrap();
        assert_eq!(emi, dec!(1010.00));
    }

    #[test]
    fn test_emi_exceeds_interest_only_payment() {
        let rate = dec!(8.5) / dec!(12) / dec!(100);
        let emi = compute_installment(dec!(500_000), rate, 240).unwrap();
        assert!(emi > dec!(500_000) * rate);
    }

    #[test]
    fn test_emi_rejects_invalid_inputs() {
        assert!(compute_installment(dec!(0), dec!(0.01), 12).is_err());
        assert!(compute_installment(dec!(-100), dec!(0.01), 12).is_err());
        assert!(compute_installment(dec!(1000), dec!(0.01), 0).is_err());
        assert!(compute_installment(dec!(1000), dec!(-0.01), 12).is_err());
    }

    #[test]
    fn test_emi_shorter_term_larger_payment() {
        let rate = dec!(0.0075);
        let emi_10y = compute_installment(dec!(250_000), rate, 120).unwrap();
        let emi_20y = compute_installment(dec!(250_000), rate, 240).unwrap();
        assert!(emi_10y > emi_20y);
    }
}
