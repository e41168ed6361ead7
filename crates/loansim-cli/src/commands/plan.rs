use clap::Args;
use serde_json::Value;

use crate::commands::loan::PrepayOpts;

/// Arguments for prepayment plan preview
#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub prepay: PrepayOpts,
}

pub fn run_plan(args: PlanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let plan = args.prepay.build_plan()?;
    Ok(serde_json::json!({
        "years": plan.len(),
        "total_prepayment": plan.iter().map(|(_, &a)| a).sum::<rust_decimal::Decimal>(),
        "plan": plan,
    }))
}
