//! Prepayment plans: the year-keyed lump-sum mapping, the step-up schedule
//! generator, the closed set of plan-construction strategies, and a strict
//! parser for `year: amount` text.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanSimError;
use crate::types::{Money, MONEY_DP};
use crate::LoanSimResult;

/// Scheduled lump-sum prepayments, keyed by 1-based loan year. Each amount
/// is applied at the end of that year's 12th month. Keys need not be
/// contiguous; a missing year means no prepayment that year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrepaymentPlan(BTreeMap<u32, Money>);

impl PrepaymentPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an amount for a year. Last write wins.
    pub fn insert(&mut self, year: u32, amount: Money) {
        self.0.insert(year, amount);
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (u32, Money)>) -> Self {
        Self(entries.into_iter().collect())
    }

    pub fn amount_for_year(&self, year: u32) -> Option<Money> {
        self.0.get(&year).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&u32, &Money)> {
        self.0.iter()
    }

    /// Reject zero years and negative amounts.
    pub fn validate(&self) -> LoanSimResult<()> {
        for (&year, &amount) in &self.0 {
            if year == 0 {
                return Err(LoanSimError::InvalidInput {
                    field: "plan".into(),
                    reason: "Prepayment years are 1-based; year 0 is invalid".into(),
                });
            }
            if amount < Decimal::ZERO {
                return Err(LoanSimError::InvalidInput {
                    field: "plan".into(),
                    reason: format!("Prepayment for year {year} is negative"),
                });
            }
        }
        Ok(())
    }
}

/// Build a step-up prepayment plan: one entry per occurrence, starting at
/// `start_year` and repeating every `frequency` years, with the amount
/// compounding by `step_up_pct` percent each occurrence.
///
/// `total_years == 0` yields an empty plan.
pub fn generate_step_up_schedule(
    start_year: u32,
    base_amount: Money,
    total_years: u32,
    step_up_pct: Decimal,
    frequency: u32,
) -> LoanSimResult<PrepaymentPlan> {
    if start_year == 0 {
        return Err(LoanSimError::InvalidInput {
            field: "start_year".into(),
            reason: "Start year is 1-based and must be at least 1".into(),
        });
    }
    if frequency == 0 {
        return Err(LoanSimError::InvalidInput {
            field: "frequency".into(),
            reason: "Frequency must be at least 1 year".into(),
        });
    }
    if base_amount < Decimal::ZERO {
        return Err(LoanSimError::InvalidInput {
            field: "base_amount".into(),
            reason: "Base amount cannot be negative".into(),
        });
    }
    if step_up_pct <= dec!(-100) {
        return Err(LoanSimError::InvalidInput {
            field: "step_up_pct".into(),
            reason: "Step-up must be greater than -100%".into(),
        });
    }

    let growth = Decimal::ONE + step_up_pct / dec!(100);
    let mut plan = PrepaymentPlan::new();
    for i in 0..total_years {
        let year = start_year + i * frequency;
        let amount = (base_amount * iterative_pow(growth, i)).round_dp(MONEY_DP);
        plan.insert(year, amount);
    }
    Ok(plan)
}

/// The closed set of plan-construction strategies a caller can pick from.
/// Each variant produces a [`PrepaymentPlan`]; nothing downstream branches
/// on presentation tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum PlanSpec {
    /// The same amount every year for a number of consecutive years.
    FixedRecurring {
        start_year: u32,
        amount: Money,
        years: u32,
    },
    /// Explicit amounts mapped to consecutive years from `start_year`.
    AmountList { start_year: u32, amounts: Vec<Money> },
    /// An already-structured year-to-amount mapping.
    Mapping { entries: PrepaymentPlan },
    /// A generated step-up schedule.
    StepUp {
        start_year: u32,
        base_amount: Money,
        years: u32,
        step_up_pct: Decimal,
        frequency: u32,
    },
}

impl PlanSpec {
    pub fn build(&self) -> LoanSimResult<PrepaymentPlan> {
        match self {
            PlanSpec::FixedRecurring {
                start_year,
                amount,
                years,
            } => {
                let plan = generate_step_up_schedule(*start_year, *amount, *years, dec!(0), 1)?;
                Ok(plan)
            }
            PlanSpec::AmountList {
                start_year,
                amounts,
            } => {
                if *start_year == 0 {
                    return Err(LoanSimError::InvalidInput {
                        field: "start_year".into(),
                        reason: "Start year is 1-based and must be at least 1".into(),
                    });
                }
                let plan = PrepaymentPlan::from_entries(
                    amounts
                        .iter()
                        .enumerate()
                        .map(|(i, &a)| (start_year + i as u32, a.round_dp(MONEY_DP))),
                );
                plan.validate()?;
                Ok(plan)
            }
            PlanSpec::Mapping { entries } => {
                entries.validate()?;
                Ok(entries.clone())
            }
            PlanSpec::StepUp {
                start_year,
                base_amount,
                years,
                step_up_pct,
                frequency,
            } => generate_step_up_schedule(
                *start_year,
                *base_amount,
                *years,
                *step_up_pct,
                *frequency,
            ),
        }
    }
}

/// Parse a `year: amount, year: amount` mapping. A single pair of
/// surrounding braces is accepted for compatibility with dict-style input.
/// The grammar is bounded; input is never evaluated as code. Duplicate
/// years take the last value.
pub fn parse_plan_text(text: &str) -> LoanSimResult<PrepaymentPlan> {
    let trimmed = text.trim();
    let inner = match (trimmed.strip_prefix('{'), trimmed.strip_suffix('}')) {
        (Some(_), Some(_)) => &trimmed[1..trimmed.len() - 1],
        (None, None) => trimmed,
        _ => {
            return Err(LoanSimError::PlanParse {
                fragment: trimmed.to_string(),
                reason: "Unbalanced braces".into(),
            })
        }
    };

    let mut plan = PrepaymentPlan::new();
    for entry in inner.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (year_str, amount_str) = entry.split_once(':').ok_or_else(|| {
            LoanSimError::PlanParse {
                fragment: entry.to_string(),
                reason: "Expected 'year: amount'".into(),
            }
        })?;

        let year: u32 = year_str.trim().parse().map_err(|_| LoanSimError::PlanParse {
            fragment: entry.to_string(),
            reason: "Year must be a positive integer".into(),
        })?;
        if year == 0 {
            return Err(LoanSimError::PlanParse {
                fragment: entry.to_string(),
                reason: "Prepayment years are 1-based".into(),
            });
        }

        let amount: Decimal =
            amount_str
                .trim()
                .parse()
                .map_err(|_| LoanSimError::PlanParse {
                    fragment: entry.to_string(),
                    reason: "Amount must be a decimal number".into(),
                })?;
        if amount < Decimal::ZERO {
            return Err(LoanSimError::PlanParse {
                fragment: entry.to_string(),
                reason: "Amount cannot be negative".into(),
            });
        }

        plan.insert(year, amount.round_dp(MONEY_DP));
    }
    Ok(plan)
}

/// Compute base^n for a positive integer exponent via iterative multiplication.
fn iterative_pow(base: Decimal, n: u32) -> Decimal {
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result *= base;
    }
    result
}
