// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bildwerk — images to PDF from the command line.
//
// Entry point. Initialises logging, loads settings, builds the selection from
// the given files and runs the conversion.

mod services;

use std::path::PathBuf;
use std::process::ExitCode;

use bildwerk_core::human_errors::humanize_error;
use bildwerk_core::{AppConfig, BildwerkError, PaperFormat, Quality, SelectionList};
use bildwerk_document::{ConversionOptions, ConversionStage};
use clap::{Args, Parser, Subcommand};

use services::app_services::{AppServices, read_images};

/// Turn images into a PDF, one image per page.
#[derive(Debug, Parser)]
#[command(name = "bildwerk", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert images into a single PDF, in the order given.
    Convert(ConvertArgs),
    /// Show or change saved defaults.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// Image files; non-image files are ignored.
    files: Vec<PathBuf>,

    /// Paper format: a4 or letter. Unknown values fall back to a4.
    #[arg(short, long)]
    paper: Option<String>,

    /// JPEG quality in (0, 1]. Unparsable values fall back to 0.92.
    #[arg(short, long)]
    quality: Option<String>,

    /// Directory the PDF is written to.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Title stored in the PDF metadata.
    #[arg(long)]
    title: Option<String>,

    /// Drop the image at INDEX (0-based) from the selection. Applied before moves.
    #[arg(long = "remove", value_name = "INDEX")]
    removals: Vec<usize>,

    /// Move the image at FROM to TO (0-based, TO counted after removal).
    #[arg(long = "move", value_name = "FROM:TO")]
    moves: Vec<String>,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective settings as JSON.
    Show,
    /// Change and persist default settings.
    Set {
        #[arg(short, long)]
        paper: Option<String>,
        #[arg(short, long)]
        quality: Option<f32>,
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        #[arg(long)]
        title: Option<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut services = AppServices::init();

    let result = match cli.command {
        Command::Convert(args) => convert(&services, args),
        Command::Config { action } => config(&mut services, action),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "bildwerk failed");
            let human = humanize_error(&err);
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn convert(services: &AppServices, args: ConvertArgs) -> Result<(), BildwerkError> {
    let config = services.config();
    let options = ConversionOptions {
        paper: args
            .paper
            .as_deref()
            .map(resolve_paper)
            .unwrap_or(config.default_paper),
        quality: args
            .quality
            .as_deref()
            .map(Quality::parse_or_default)
            .unwrap_or(config.default_quality),
    };

    let mut selection = SelectionList::new();
    selection.on_change(|status| tracing::debug!(%status, "Selection changed"));
    selection.append(read_images(&args.files));
    apply_edits(&mut selection, &args.removals, &args.moves)?;
    println!("{}", selection.status());

    let (report, path) = services.convert(
        &selection,
        options,
        args.title,
        args.output_dir,
        |progress| match progress.stage {
            ConversionStage::PageAppended | ConversionStage::Skipped => {
                if let Some(index) = progress.index {
                    eprintln!("[{}/{}] {:?}", index + 1, progress.total, progress.stage);
                }
            }
            _ => {}
        },
    )?;

    println!("Saved {}", path.display());
    println!(
        "{} page(s), {} of {} image(s) placed on {}, quality {}",
        report.page_count,
        report.images_placed,
        selection.len(),
        options.paper,
        options.quality
    );
    for skipped in &report.skipped {
        println!("  skipped #{} {}: {}", skipped.index, skipped.name, skipped.reason);
    }
    Ok(())
}

fn config(services: &mut AppServices, action: ConfigAction) -> Result<(), BildwerkError> {
    match action {
        ConfigAction::Show => {
            println!("# {}", services.config_path().display());
            println!("{}", serde_json::to_string_pretty(services.config())?);
        }
        ConfigAction::Set {
            paper,
            quality,
            output_dir,
            title,
        } => {
            let mut updated: AppConfig = services.config().clone();
            if let Some(paper) = paper {
                updated.default_paper = resolve_paper(&paper);
            }
            if let Some(quality) = quality {
                updated.default_quality = Quality::new(quality)?;
            }
            if let Some(dir) = output_dir {
                updated.output_dir = Some(dir);
            }
            if let Some(title) = title {
                updated.document_title = title;
            }
            services.save_config(updated)?;
            println!("Saved {}", services.config_path().display());
        }
    }
    Ok(())
}

fn resolve_paper(key: &str) -> PaperFormat {
    PaperFormat::from_key(key).unwrap_or_else(|| {
        tracing::warn!(paper = key, "Unknown paper format; using A4");
        PaperFormat::A4
    })
}

/// Apply `--remove` edits in order, then `--move` edits in order.
///
/// A move that is not of the form `FROM:TO` with integer sides changes
/// nothing. Out-of-range indices are errors.
fn apply_edits(
    selection: &mut SelectionList,
    removals: &[usize],
    moves: &[String],
) -> Result<(), BildwerkError> {
    for &index in removals {
        let removed = selection.remove_at(index)?;
        tracing::info!(index, name = %removed.name, "Removed from selection");
    }
    for spec in moves {
        let (from, to) = spec.split_once(':').unwrap_or((spec.as_str(), ""));
        if !selection.move_parsed(from, to)? {
            tracing::warn!(spec = %spec, "Ignoring malformed --move");
        }
    }
    Ok(())
}
