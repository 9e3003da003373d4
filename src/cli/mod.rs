//! Command-line parsing for the apparel sales analyzer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the analysis code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};

/// Input file used when neither `--file` nor `SALES_CSV` is given.
pub const DEFAULT_CSV: &str = "AusApparalSales4thQrt2020.csv";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sales", version, about = "Apparel sales exploratory analysis")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` wins when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the analysis and print the report (optionally ASCII charts and exports).
    Report(ReportArgs),
    /// Run the analysis and browse the charts in a terminal UI.
    View(ViewArgs),
    /// Write a synthetic dataset with the same schema as the real input.
    Demo(DemoArgs),
}

/// Where to read the sales CSV from.
#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Sales CSV (columns: Date, Time, State, Group, Unit, Sales).
    #[arg(short, long, env = "SALES_CSV", default_value = DEFAULT_CSV)]
    pub file: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Numeric column to min-max scale; the result is stored as `{column}_Normalized`.
    #[arg(long, default_value = "Sales")]
    pub column: String,

    /// Rows shown in the head sections.
    #[arg(long, default_value_t = 5)]
    pub head: usize,

    /// Render the charts as ASCII after the report.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,

    /// Export the augmented table (input + derived columns) to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the analysis summary to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct ViewArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Clone, Args)]
pub struct DemoArgs {
    /// Output CSV path.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,

    /// Random seed (same seed, same file).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First date of the generated range (YYYY-MM-DD).
    #[arg(long, default_value = "2020-10-01")]
    pub start: NaiveDate,

    /// Number of consecutive days to generate.
    #[arg(long, default_value_t = 92)]
    pub days: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn report_flags_parse() {
        let cli = Cli::parse_from([
            "sales", "-vv", "report", "--file", "in.csv", "--plot", "--export", "out.csv", "--export-json", "s.json",
        ]);
        assert_eq!(cli.verbose, 2);
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.input.file, PathBuf::from("in.csv"));
        assert!(args.plot);
        assert_eq!(args.export, Some(PathBuf::from("out.csv")));
        assert_eq!(args.export_json, Some(PathBuf::from("s.json")));
        assert_eq!(args.head, 5);
    }

    #[test]
    fn demo_defaults() {
        let cli = Cli::parse_from(["sales", "demo", "--out", "demo.csv"]);
        let Command::Demo(args) = cli.command else {
            panic!("expected demo");
        };
        assert_eq!(args.seed, 42);
        assert_eq!(args.days, 92);
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2020, 10, 1).unwrap());
    }
}
