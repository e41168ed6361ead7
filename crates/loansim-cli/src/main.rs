mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::loan::{CompareArgs, InstallmentArgs, SimulateArgs};
use commands::plan::PlanArgs;

/// Loan amortization and prepayment analysis
#[derive(Parser)]
#[command(
    name = "loansim",
    version,
    about = "Loan amortization and prepayment analysis",
    long_about = "A CLI for computing fixed-installment (EMI) amortization schedules \
                  with decimal precision, applying scheduled lump-sum prepayments in \
                  tenure-shortening or installment-reducing mode, and reporting the \
                  interest and time saved against the baseline schedule."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the fixed monthly installment (EMI) for a loan
    Installment(InstallmentArgs),
    /// Produce the month-by-month amortization schedule
    Simulate(SimulateArgs),
    /// Compare a prepayment scenario against the baseline schedule
    Compare(CompareArgs),
    /// Preview a prepayment plan built from one of the input strategies
    Plan(PlanArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Installment(args) => commands::loan::run_installment(args),
        Commands::Simulate(args) => commands::loan::run_simulate(args),
        Commands::Compare(args) => commands::loan::run_compare(args),
        Commands::Plan(args) => commands::plan::run_plan(args),
        Commands::Version => {
            println!("loansim {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
