//! SVG classification command

use acton_svg::storage::{FileItem, SvgDetector};
use anyhow::{Context, Result};
use console::{style, Emoji};
use serde::Serialize;
use std::path::{Path, PathBuf};

static SVG: Emoji = Emoji("✓", "√");
static NOT_SVG: Emoji = Emoji("✗", "x");

/// Classification of one file on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// File checked
    pub path: PathBuf,
    /// MIME type guessed from the extension
    pub declared: String,
    /// MIME type detected from magic numbers, if any
    pub detected: Option<String>,
    /// Whether the content is SVG
    pub svg: bool,
}

/// Prints the SVG classification of files
#[derive(Debug, Clone)]
pub struct CheckCommand {
    files: Vec<PathBuf>,
    detector: SvgDetector,
}

impl CheckCommand {
    /// Create a new command instance
    #[must_use]
    pub const fn new(files: Vec<PathBuf>, permissive: bool) -> Self {
        let detector = if permissive {
            SvgDetector::permissive()
        } else {
            SvgDetector::new()
        };
        Self { files, detector }
    }

    /// Classifies every file
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read.
    pub async fn classify(&self) -> Result<Vec<Classification>> {
        let mut results = Vec::with_capacity(self.files.len());
        for path in &self.files {
            results.push(self.classify_file(path).await?);
        }
        Ok(results)
    }

    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read.
    pub async fn execute(&self, json: bool) -> Result<()> {
        let results = self.classify().await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&results)?);
            return Ok(());
        }

        for result in &results {
            let detected = result.detected.as_deref().unwrap_or("no signature");
            if result.svg {
                println!(
                    "{} {} {}",
                    style(SVG).green(),
                    result.path.display(),
                    style("SVG").green().bold()
                );
            } else {
                println!(
                    "{} {} {} ({}, {detected})",
                    style(NOT_SVG).red(),
                    result.path.display(),
                    style("not SVG").yellow().bold(),
                    result.declared
                );
            }
        }

        Ok(())
    }

    async fn classify_file(&self, path: &Path) -> Result<Classification> {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let file = file_item(path, data);
        let detected = file
            .content()
            .and_then(|data| self.detector.detect_mime(data))
            .map(str::to_string);

        Ok(Classification {
            path: path.to_path_buf(),
            svg: self.detector.is_svg(&file),
            declared: file.content_type,
            detected,
        })
    }
}

/// Builds a loaded file item for a path on disk
fn file_item(path: &Path, data: Vec<u8>) -> FileItem {
    let filename = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
    let content_type = mime_guess::from_path(path).first_or_octet_stream().to_string();

    FileItem::new(filename.clone(), path.display().to_string(), filename, content_type)
        .with_content(data)
}
