//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments (after loading `.env`)
//! - installs logging
//! - loads the sales CSV
//! - runs the overview/forecast pipelines
//! - prints reports/plots and writes optional exports

use clap::Parser;
use tracing::warn;

use crate::cli::picker::resolve_data_path;
use crate::cli::{Command, DataArgs, ForecastArgs, OverviewArgs, PlotArgs, TuiArgs};
use crate::domain::SalesTable;
use crate::error::AppError;
use crate::logging::{self, LogTarget};

pub mod pipeline;

/// Entry point for the `salesdash` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` may provide SALES_CSV / RUST_LOG; a missing file is fine.
    dotenvy::dotenv().ok();

    // We want `salesdash` and `salesdash -c Furniture` to behave like `salesdash tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let target = match (&cli.command, cli.log_file.as_deref()) {
        (_, Some(path)) => LogTarget::File(path),
        (Command::Tui(_), None) => LogTarget::Disabled,
        (_, None) => LogTarget::Stderr,
    };
    logging::init(target)?;

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Overview(args) => handle_overview(args),
        Command::Categories(args) => handle_categories(args),
        Command::Forecast(args) => handle_forecast(args),
        Command::Plot(args) => handle_plot(args),
    }
}

/// Resolve the dataset path and load it.
pub fn load_table(data: &DataArgs) -> Result<SalesTable, AppError> {
    let path = resolve_data_path(data.data.as_deref())?;
    let table = crate::io::load_sales_table(&path)?;
    for e in table.row_errors.iter().take(5) {
        warn!(line = e.line, "skipped row: {}", e.message);
    }
    Ok(table)
}

fn handle_overview(args: OverviewArgs) -> Result<(), AppError> {
    let table = load_table(&args.data)?;
    let selection = crate::query::resolve_selection(
        &table,
        args.selection.category.as_deref(),
        args.selection.sub_category.as_deref(),
    )?;
    let overview = pipeline::run_overview(&table, &selection, &args.columns)?;

    println!("{}", crate::report::format_dataset_summary(&table));
    println!("{}", crate::report::format_overview(&overview, args.rows));

    if !args.no_plot {
        println!(
            "{}",
            crate::plot::render_overview_plot(&overview.series, args.width, args.height)
        );
    }

    if let Some(path) = &args.export {
        let rows = crate::query::select(&table, &selection);
        crate::io::write_selection_csv(path, &table, &rows)?;
    }

    Ok(())
}

fn handle_categories(args: DataArgs) -> Result<(), AppError> {
    let table = load_table(&args)?;
    print!("{}", crate::report::format_categories(&table));
    Ok(())
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let table = load_table(&args.data)?;
    let config = args.model.to_config();
    let run = pipeline::run_forecast(&table, &config)?;

    println!("{}", crate::report::format_dataset_summary(&table));
    println!("{}", crate::report::format_forecast_summary(&run));
    println!("{}", crate::report::format_forecast_tail(run.tail(args.tail)));
    println!("{}", crate::report::format_components(&run.components));

    if !args.no_plot {
        println!(
            "{}",
            crate::plot::render_forecast_plot(&run.history, &run.forecast, args.width, args.height)
        );
        println!(
            "{}",
            crate::plot::render_components_plot(&run.components, args.width, args.height)
        );
    }

    if let Some(path) = &args.export {
        crate::io::write_forecast_csv(path, &run.forecast)?;
    }
    if let Some(path) = &args.export_json {
        crate::io::write_forecast_json(path, &run, &table.source)?;
    }

    Ok(())
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    crate::tui::run(args)
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::read_forecast_json(&args.forecast)?;
    let components = crate::forecast::components(&file.model, &file.forecast);

    print!(
        "{}",
        crate::report::format_forecast_file_header(&file.source, &file.config, file.forecast.len())
    );
    println!(
        "{}",
        crate::plot::render_forecast_plot(&file.history, &file.forecast, args.width, args.height)
    );
    println!(
        "{}",
        crate::plot::render_components_plot(&components, args.width, args.height)
    );
    Ok(())
}

/// Rewrite argv so `salesdash` defaults to `salesdash tui`.
///
/// Rules:
/// - `salesdash`                     -> `salesdash tui`
/// - `salesdash -c Furniture ...`    -> `salesdash tui -c Furniture ...`
/// - `salesdash --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "tui" | "overview" | "categories" | "forecast" | "plot"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(args(&["salesdash"])), args(&["salesdash", "tui"]));
    }

    #[test]
    fn leading_flags_go_to_tui() {
        assert_eq!(
            rewrite_args(args(&["salesdash", "-c", "Furniture"])),
            args(&["salesdash", "tui", "-c", "Furniture"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        for v in [
            args(&["salesdash", "forecast", "-y", "2"]),
            args(&["salesdash", "--help"]),
            args(&["salesdash", "categories"]),
        ] {
            assert_eq!(rewrite_args(v.clone()), v);
        }
    }
}
