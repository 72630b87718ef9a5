mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::convert::ConvertArgs;
use commands::mortgage::MortgagePaymentArgs;
use commands::plans::PlansArgs;
use commands::schedule::ScheduleArgs;

/// Off-plan property payment schedules
#[derive(Parser)]
#[command(
    name = "offplan",
    version,
    about = "Off-plan property payment schedules",
    long_about = "Builds the month-by-month payment schedule of an off-plan property \
                  purchase and shows how much of each payment is covered by interest \
                  on a side asset and by rent after handover."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log engine diagnostics to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the payment schedule for a property
    Schedule(ScheduleArgs),
    /// List the payment and mortgage plan catalogs
    Plans(PlansArgs),
    /// Convert an amount between AED and USD at the fixed rates
    Convert(ConvertArgs),
    /// Monthly annuity payment for a loan
    MortgagePayment(MortgagePaymentArgs),
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
    logging::init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::Plans(args) => commands::plans::run_plans(args),
        Commands::Convert(args) => commands::convert::run_convert(args),
        Commands::MortgagePayment(args) => commands::mortgage::run_mortgage_payment(args),
        Commands::Version => {
            println!("offplan {}", env!("CARGO_PKG_VERSION"));
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
