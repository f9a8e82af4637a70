// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanscore — document text extraction and recognition quality scoring.
//
// Entry point. Initialises logging, parses the command line, and runs the
// requested command.

mod cli;
mod pipeline;
mod report;
mod services;

use std::process::ExitCode;

use clap::Parser;
use scanscore_core::ScanScoreError;
use scanscore_core::human_errors::humanize_error;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    tracing::info!("Scanscore starting");

    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ScanScoreError>() {
                Some(domain) => {
                    let human = humanize_error(domain);
                    tracing::error!(error = %domain, severity = ?human.severity, "Processing failed");
                    eprintln!("{human}");
                }
                None => {
                    tracing::error!(error = %err, "Processing failed");
                    eprintln!("Error: {err:#}");
                }
            }
            ExitCode::FAILURE
        }
    }
}
