//! Command-line entry point for the page preparation passes.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use page_prep::deploy::deploy;
use page_prep::imaging::{fix_large_image, run_compress_pass, run_instant_pass, run_variants_pass};
use page_prep::rename::rename_images;
use page_prep::rewrite::inline::inline_html_images;
use page_prep::rewrite::lazy::optimize_html;
use page_prep::rewrite::references::{fix_html_references, repair_image_paths};
use page_prep::{PrepConfig, SiteLayout};

#[derive(Debug, Parser)]
#[command(
    name = "page-prep",
    version,
    about = "Prepare a static page and its images for deployment"
)]
struct Cli {
    /// Configuration file; defaults to `page-prep.config.json` in the root when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the page and its images.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Log debug output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rename legacy image files to ASCII names and update linked documents.
    Rename,
    /// Rewrite legacy image names in every configured document.
    FixReferences,
    /// Normalise variant image paths in the main page.
    FixPaths,
    /// Embed images as data URIs into `<page>_instant.html`.
    Inline,
    /// Shrink root PNGs by size tier after a timestamped backup.
    Instant,
    /// Re-encode root PNGs at a capped width, keeping originals in a backup directory.
    Compress,
    /// Write compressed JPEG, WebP and thumbnail variants.
    Variants,
    /// Downscale the configured oversized image.
    FixLarge,
    /// Write `<page>_optimized.html` with lazy-loading markup.
    OptimizeHtml,
    /// Publish the optimised page with git.
    Deploy,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_layout(cli: &Cli) -> Result<SiteLayout> {
    let config = match &cli.config {
        Some(path) => PrepConfig::load(path)?,
        None => PrepConfig::discover(&cli.root),
    };
    Ok(config.into_layout(&cli.root))
}

fn run(cli: &Cli) -> Result<()> {
    let layout = load_layout(cli)?;
    match cli.command {
        Command::Rename => {
            let report = rename_images(&layout)?;
            info!(renamed = report.renamed, "done");
        }
        Command::FixReferences => {
            let counts = fix_html_references(&layout)?;
            info!(documents = counts.seen, fixed = counts.changed, "done");
        }
        Command::FixPaths => {
            repair_image_paths(&layout)?;
        }
        Command::Inline => {
            let report = inline_html_images(&layout)?;
            info!(output = %report.output.display(), "done");
        }
        Command::Instant => {
            run_instant_pass(&layout)?;
        }
        Command::Compress => {
            run_compress_pass(&layout)?;
        }
        Command::Variants => {
            run_variants_pass(&layout)?;
        }
        Command::FixLarge => {
            fix_large_image(&layout)?;
        }
        Command::OptimizeHtml => {
            let output = optimize_html(&layout)?;
            info!(output = %output.display(), "done");
        }
        Command::Deploy => {
            deploy(&layout)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
