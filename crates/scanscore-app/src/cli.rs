// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line interface.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use scanscore_core::{AppConfig, RectifyMode};
use tracing::info;

use crate::pipeline::Pipeline;
use crate::services::AppContext;

#[derive(Parser, Debug)]
#[command(name = "scanscore")]
#[command(
    version,
    about = "Find a document in a photo, read its text, and score the reading against a reference",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract and score the text of one document image
    Process(ProcessArgs),
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("reference").required(true).args(["truth", "truth_file"])))]
pub struct ProcessArgs {
    /// Document image (JPEG or PNG)
    #[arg(long)]
    pub image: PathBuf,

    /// The text the document actually contains
    #[arg(long)]
    pub truth: Option<String>,

    /// Read the reference text from a file
    #[arg(long)]
    pub truth_file: Option<PathBuf>,

    /// JSON settings file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Denoise model file (.rten); overrides the settings file
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// What to do with the detected page
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Write intermediate images into this directory
    #[arg(long)]
    pub save_dir: Option<PathBuf>,

    /// Print the full report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Outline the page only; OCR reads the outlined image
    Annotate,
    /// Deskew the page onto a square before OCR
    Warp,
}

impl From<Mode> for RectifyMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Annotate => RectifyMode::Annotate,
            Mode::Warp => RectifyMode::Warp,
        }
    }
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Process(args) => process(args),
    }
}

fn process(args: ProcessArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let truth = match (&args.truth, &args.truth_file) {
        (Some(truth), _) => truth.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read reference text from {}", path.display()))?,
        (None, None) => anyhow::bail!("Either --truth or --truth-file is required"),
    };

    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("Failed to read image {}", args.image.display()))?;

    let ctx = AppContext::new(config);
    let output = Pipeline::new(&ctx).run(&bytes, &truth)?;

    if let Some(dir) = &args.save_dir {
        let written = output.artifacts.save(dir)?;
        info!(dir = %dir.display(), files = written.len(), "Intermediate images written");
    }

    if args.json {
        println!("{}", output.report.to_json()?);
    } else {
        println!("{}", output.report.summary());
    }
    Ok(())
}

/// Settings file (or defaults), then command-line overrides.
fn resolve_config(args: &ProcessArgs) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(model) = &args.model {
        config.denoise_model_path = Some(model.clone());
    }
    if let Some(mode) = args.mode {
        config.pipeline.rectify_mode = mode.into();
    }
    config.validate()?;
    Ok(config)
}
