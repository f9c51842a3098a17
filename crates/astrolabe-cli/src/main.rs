//! Astrolabe CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use astrolabe_cli::{Args, error_adapter::to_reportables};

fn main() {
    // Panics outside the worker thread get miette's report format
    miette::set_panic_hook();

    let args = Args::parse();

    // An unknown level name is not fatal; fall back to warnings only
    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    // env_logger writes to stderr, leaving stdout for layout output.
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting Astrolabe");
    debug!(args:?; "Parsed arguments");

    // File or serve mode, chosen by the arguments
    if let Err(err) = astrolabe_cli::run(&args) {
        let reporter = miette::GraphicalReportHandler::new();

        // Rendered through the logger so stdout only ever carries layout JSON
        for reportable in to_reportables(&err) {
            let mut writer = String::new();
            reporter
                .render_report(&mut writer, &reportable)
                .expect("Writing to String buffer is infallible");

            error!("{writer}");
        }

        process::exit(1);
    }

    info!("Completed successfully");
}
