//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - runs the analysis pipeline
//! - writes optional exports
//! - prints the report/plots or opens the chart viewer

use clap::Parser;
use tracing::info;

use crate::cli::{Command, DemoArgs, ReportArgs, ViewArgs};
use crate::domain::AnalysisConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `sales` binary.
pub fn run() -> Result<(), AppError> {
    // `SALES_CSV` may come from a `.env` file; clap reads it through `env = ...`.
    dotenvy::dotenv().ok();

    // We want `sales` and `sales --file X` to behave like `sales report ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    crate::logging::init_logging(cli.verbose);

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::View(args) => handle_view(args),
        Command::Demo(args) => handle_demo(args),
    }
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let config = config_from_args(&args)?;
    let text = build_report(&config)?;
    println!("{text}");
    Ok(())
}

/// Run the pipeline, write the exports, and return the report (plus plots).
///
/// Every fallible step happens here, so stdout stays empty on error.
pub fn build_report(config: &AnalysisConfig) -> Result<String, AppError> {
    let run = pipeline::run_analysis(config)?;

    if let Some(path) = &config.export_table {
        crate::io::export::write_table_csv(path, &run.table)?;
    }
    if let Some(path) = &config.export_summary {
        let summary = crate::io::export::RunSummary::new(&run, &config.csv_path);
        crate::io::export::write_summary_json(path, &summary)?;
    }

    let mut text = crate::report::format_run_summary(&run, config);
    if config.plot {
        text.push('\n');
        text.push_str(&crate::plot::render_all(&run.charts, config.plot_width, config.plot_height));
    }
    Ok(text)
}

fn handle_view(args: ViewArgs) -> Result<(), AppError> {
    let config = AnalysisConfig::for_path(&args.input.file);
    let run = pipeline::run_analysis(&config)?;
    crate::tui::run(&run, &config)
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let spec = crate::data::DemoSpec {
        seed: args.seed,
        start: args.start,
        days: args.days,
    };
    let rows = crate::data::write_demo_csv(&args.out, &spec)?;
    info!(rows, path = %args.out.display(), "demo dataset written");
    println!("Wrote {rows} rows to {}", args.out.display());
    Ok(())
}

/// Resolve report arguments into the pipeline configuration.
pub fn config_from_args(args: &ReportArgs) -> Result<AnalysisConfig, AppError> {
    if args.column.trim().is_empty() {
        return Err(AppError::InvalidInput("--column must not be empty.".to_string()));
    }
    if args.plot && (args.width < 10 || args.height < 5) {
        return Err(AppError::InvalidInput(format!(
            "Plot size {}x{} is too small (minimum 10x5).",
            args.width, args.height
        )));
    }

    Ok(AnalysisConfig {
        normalize_column: args.column.trim().to_string(),
        head_rows: args.head,
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        export_table: args.export.clone(),
        export_summary: args.export_json.clone(),
        ..AnalysisConfig::for_path(&args.input.file)
    })
}

/// Rewrite argv so `sales` defaults to `sales report`.
///
/// Rules:
/// - `sales`                       -> `sales report`
/// - `sales --file X ...`          -> `sales report --file X ...`
/// - `sales --help/--version/-h`   -> unchanged (show top-level help/version)
/// - `sales [-v...] <subcommand>`  -> unchanged
///
/// Only the first argument after the global `-v` flags can name a
/// subcommand; later ones are option values (`--file report`).
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let first = argv.iter().skip(1).find(|a| !is_verbosity_flag(a)).cloned();
    let Some(first) = first else {
        argv.insert(1, "report".to_string());
        return argv;
    };

    let keeps_argv = matches!(
        first.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help" | "report" | "view" | "demo"
    );
    if !keeps_argv {
        argv.insert(1, "report".to_string());
    }
    argv
}

/// `-v`, `-vv`, ... or `--verbose`: the only global flags, none take a value.
fn is_verbosity_flag(arg: &str) -> bool {
    arg == "--verbose" || (arg.len() > 1 && arg.starts_with('-') && arg[1..].chars().all(|c| c == 'v'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_report() {
        assert_eq!(rewrite_args(args(&["sales"])), args(&["sales", "report"]));
        assert_eq!(
            rewrite_args(args(&["sales", "--file", "x.csv"])),
            args(&["sales", "report", "--file", "x.csv"])
        );
        assert_eq!(rewrite_args(args(&["sales", "-v"])), args(&["sales", "report", "-v"]));
    }

    #[test]
    fn option_value_named_like_a_subcommand_still_defaults_to_report() {
        assert_eq!(
            rewrite_args(args(&["sales", "--file", "report"])),
            args(&["sales", "report", "--file", "report"])
        );
        assert_eq!(
            rewrite_args(args(&["sales", "-vv", "--export", "view", "--plot"])),
            args(&["sales", "report", "-vv", "--export", "view", "--plot"])
        );
        assert_eq!(
            rewrite_args(args(&["sales", "--verbose", "demo"])),
            args(&["sales", "--verbose", "demo"])
        );
    }

    #[test]
    fn explicit_subcommands_and_help_are_untouched() {
        for argv in [
            args(&["sales", "view"]),
            args(&["sales", "-v", "report"]),
            args(&["sales", "demo", "--out", "d.csv"]),
            args(&["sales", "--help"]),
        ] {
            assert_eq!(rewrite_args(argv.clone()), argv);
        }
    }

    #[test]
    fn report_args_become_config() {
        let cli = crate::cli::Cli::parse_from(args(&[
            "sales", "report", "--file", "q4.csv", "--plot", "--width", "80", "--export-json", "s.json",
        ]));
        let Command::Report(report) = cli.command else {
            panic!("expected report");
        };
        let config = config_from_args(&report).unwrap();
        assert_eq!(config.csv_path, PathBuf::from("q4.csv"));
        assert_eq!(config.normalize_column, "Sales");
        assert!(config.plot);
        assert_eq!(config.plot_width, 80);
        assert_eq!(config.export_summary, Some(PathBuf::from("s.json")));
        assert_eq!(config.export_table, None);
    }

    fn fixture(name: &str) -> PathBuf {
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
    }

    #[test]
    fn failed_export_yields_no_report_text() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig {
            plot: true,
            export_table: Some(dir.path().join("missing").join("table.csv")),
            ..AnalysisConfig::for_path(fixture("sales_small.csv"))
        };

        let err = build_report(&config).unwrap_err();
        assert!(matches!(err, AppError::Export { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn report_text_follows_successful_exports() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("summary.json");
        let config = AnalysisConfig {
            export_summary: Some(json.clone()),
            ..AnalysisConfig::for_path(fixture("sales_small.csv"))
        };

        let text = build_report(&config).unwrap();
        assert!(text.starts_with("=== sales - Apparel Sales Analysis ==="));
        assert!(json.exists());
    }

    #[test]
    fn tiny_plot_is_rejected() {
        let cli = crate::cli::Cli::parse_from(args(&["sales", "report", "--plot", "--width", "3"]));
        let Command::Report(report) = cli.command else {
            panic!("expected report");
        };
        let err = config_from_args(&report).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
