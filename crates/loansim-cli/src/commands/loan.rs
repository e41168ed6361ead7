use clap::{Args, ValueEnum};
use colored::Colorize;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use loansim_core::comparison;
use loansim_core::installment;
use loansim_core::plan::{parse_plan_text, PlanSpec, PrepaymentPlan};
use loansim_core::simulation;
use loansim_core::{LoanTerms, PrepaymentMode};

use crate::input;

/// Prepayment handling mode
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Keep the installment fixed; the loan pays off earlier
    ShortenTenure,
    /// Recompute the installment over the remaining original term
    ReduceInstallment,
}

impl From<ModeArg> for PrepaymentMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::ShortenTenure => PrepaymentMode::ShortenTenure,
            ModeArg::ReduceInstallment => PrepaymentMode::ReduceInstallment,
        }
    }
}

/// Loan terms shared by the schedule commands
#[derive(Args)]
pub struct TermsOpts {
    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 8.5)
    #[arg(long)]
    pub annual_rate: Option<Decimal>,

    /// Loan tenure in years
    #[arg(long)]
    pub tenure_years: Option<u32>,
}

impl TermsOpts {
    fn to_terms(&self) -> Result<LoanTerms, Box<dyn std::error::Error>> {
        Ok(LoanTerms::new(
            self.principal
                .ok_or("--principal is required (or provide --input)")?,
            self.annual_rate
                .ok_or("--annual-rate is required (or provide --input)")?,
            self.tenure_years
                .ok_or("--tenure-years is required (or provide --input)")?,
        ))
    }
}

/// Prepayment strategy flags. At most one of --prepay-amount, --prepay-list,
/// --prepay-map and --step-up-base may be given.
#[derive(Args)]
pub struct PrepayOpts {
    /// Prepayment handling mode
    #[arg(long, value_enum, default_value = "shorten-tenure")]
    pub mode: ModeArg,

    /// Fixed recurring prepayment amount per year
    #[arg(long)]
    pub prepay_amount: Option<Decimal>,

    /// Comma-separated prepayment amounts for consecutive years
    #[arg(long)]
    pub prepay_list: Option<String>,

    /// Year-to-amount mapping, e.g. "2: 50000, 5: 80000"
    #[arg(long)]
    pub prepay_map: Option<String>,

    /// Base amount for a step-up prepayment schedule
    #[arg(long)]
    pub step_up_base: Option<Decimal>,

    /// Step-up percentage per occurrence
    #[arg(long, default_value = "0")]
    pub step_up_pct: Decimal,

    /// First loan year a prepayment applies (1 = end of the first year)
    #[arg(long, default_value = "1")]
    pub prepay_start: u32,

    /// Number of prepayment occurrences
    #[arg(long, default_value = "5")]
    pub prepay_years: u32,

    /// Apply a prepayment every N years
    #[arg(long, default_value = "1")]
    pub prepay_frequency: u32,
}

impl PrepayOpts {
    pub(crate) fn to_spec(&self) -> Result<Option<PlanSpec>, Box<dyn std::error::Error>> {
        let chosen = [
            self.prepay_amount.is_some(),
            self.prepay_list.is_some(),
            self.prepay_map.is_some(),
            self.step_up_base.is_some(),
        ]
        .iter()
        .filter(|&&c| c)
        .count();
        if chosen > 1 {
            return Err("choose one prepayment strategy: --prepay-amount, --prepay-list, \
                        --prepay-map or --step-up-base"
                .into());
        }

        if let Some(amount) = self.prepay_amount {
            return Ok(Some(PlanSpec::FixedRecurring {
                start_year: self.prepay_start,
                amount,
                years: self.prepay_years,
            }));
        }
        if let Some(ref list) = self.prepay_list {
            let amounts = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<Decimal>()
                        .map_err(|_| format!("invalid amount '{s}' in --prepay-list"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Some(PlanSpec::AmountList {
                start_year: self.prepay_start,
                amounts,
            }));
        }
        if let Some(ref text) = self.prepay_map {
            // A malformed mapping degrades to no prepayments, with a warning.
            return match parse_plan_text(text) {
                Ok(entries) => Ok(Some(PlanSpec::Mapping { entries })),
                Err(e) => {
                    eprintln!(
                        "{}: ignoring unparseable prepayment map ({}); \
                         continuing with no prepayments",
                        "warning".yellow().bold(),
                        e
                    );
                    Ok(None)
                }
            };
        }
        if let Some(base_amount) = self.step_up_base {
            return Ok(Some(PlanSpec::StepUp {
                start_year: self.prepay_start,
                base_amount,
                years: self.prepay_years,
                step_up_pct: self.step_up_pct,
                frequency: self.prepay_frequency,
            }));
        }
        Ok(None)
    }

    pub(crate) fn build_plan(&self) -> Result<PrepaymentPlan, Box<dyn std::error::Error>> {
        match self.to_spec()? {
            Some(spec) => Ok(spec.build()?),
            None => Ok(PrepaymentPlan::new()),
        }
    }
}

/// A full scenario as accepted via --input or piped stdin.
#[derive(Deserialize)]
struct ScenarioInput {
    terms: LoanTerms,
    #[serde(default)]
    plan: Option<PlanSpec>,
    #[serde(default)]
    mode: Option<PrepaymentMode>,
}

/// Arguments for installment computation
#[derive(Args)]
pub struct InstallmentArgs {
    #[command(flatten)]
    pub terms: TermsOpts,
}

/// Arguments for a single schedule run
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to a JSON scenario file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub terms: TermsOpts,

    #[command(flatten)]
    pub prepay: PrepayOpts,
}

/// Arguments for baseline-vs-prepaid comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Path to a JSON scenario file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub terms: TermsOpts,

    #[command(flatten)]
    pub prepay: PrepayOpts,
}

fn resolve_scenario(
    input: &Option<String>,
    terms: &TermsOpts,
    prepay: &PrepayOpts,
) -> Result<(LoanTerms, PrepaymentPlan, PrepaymentMode), Box<dyn std::error::Error>> {
    let scenario: Option<ScenarioInput> = if let Some(ref path) = input {
        Some(input::file::read_json(path)?)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Some(serde_json::from_value(data)?)
    } else {
        None
    };

    match scenario {
        Some(s) => {
            let plan = match s.plan {
                Some(spec) => spec.build()?,
                None => PrepaymentPlan::new(),
            };
            let mode = s.mode.unwrap_or(PrepaymentMode::ShortenTenure);
            Ok((s.terms, plan, mode))
        }
        None => Ok((terms.to_terms()?, prepay.build_plan()?, prepay.mode.into())),
    }
}

pub fn run_installment(args: InstallmentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = args.terms.to_terms()?;
    terms.validate()?;
    let emi = installment::compute_installment(
        terms.principal,
        terms.monthly_rate(),
        terms.tenure_months(),
    )?;
    Ok(serde_json::json!({
        "principal": terms.principal,
        "annual_rate_pct": terms.annual_rate_pct,
        "tenure_months": terms.tenure_months(),
        "installment": emi,
    }))
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (terms, plan, mode) = resolve_scenario(&args.input, &args.terms, &args.prepay)?;
    let plan_ref = if plan.is_empty() { None } else { Some(&plan) };
    let result = simulation::simulate(&terms, plan_ref, mode)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (terms, plan, mode) = resolve_scenario(&args.input, &args.terms, &args.prepay)?;
    let result = comparison::analyze_prepayment_impact(&terms, &plan, mode)?;
    Ok(serde_json::to_value(result)?)
}
