//! acton-svg CLI tool

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use acton_svg::observability::{self, ObservabilityConfig};
use acton_svg_cli_lib::{CheckCommand, RenderCommand, SanitizeCommand};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "acton-svg")]
#[command(version)]
#[command(about = "Inspect, sanitize and render SVG image files", long_about = None)]
struct Cli {
    /// Print machine-readable JSON where supported
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report whether files are SVG by content
    Check {
        /// Files to classify
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Ignore the MIME type implied by the extension
        #[arg(long)]
        permissive: bool,
    },
    /// Sanitize SVG files
    ///
    /// Examples:
    ///   acton-svg sanitize logo.svg
    ///   acton-svg sanitize uploads/*.svg --out-dir clean --title "Company logo"
    Sanitize {
        /// Files to sanitize
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Set the `<title>` of every file
        #[arg(long)]
        title: Option<String>,

        /// Keep XML declarations and DOCTYPEs
        #[arg(long)]
        keep_prolog: bool,

        /// Write `<name>.sanitized.svg` files here instead of printing
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
    /// Render files as one image field and print the HTML
    Render {
        /// Files, relative to the storage base path
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Configuration file (defaults to the standard locations)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Render SVG inline regardless of configuration
        #[arg(long)]
        inline: bool,

        /// Alt text for every item
        #[arg(long)]
        alt: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    observability::init_with(&ObservabilityConfig::new("acton-svg").with_default_filter("warn"))?;

    match cli.command {
        Commands::Check { files, permissive } => {
            CheckCommand::new(files, permissive).execute(cli.json).await?;
        }
        Commands::Sanitize {
            files,
            title,
            keep_prolog,
            out_dir,
        } => {
            SanitizeCommand::new(files)
                .with_title(title)
                .keep_prolog(keep_prolog)
                .with_out_dir(out_dir)
                .execute()
                .await?;
        }
        Commands::Render {
            files,
            config,
            inline,
            alt,
        } => {
            RenderCommand::new(files, config)
                .inline(inline)
                .with_alt(alt)
                .execute(cli.json)
                .await?;
        }
    }

    Ok(())
}
