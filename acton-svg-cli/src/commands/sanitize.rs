//! Batch sanitization command

use acton_svg::postprocess::{PostProcessOptions, PostProcessor};
use acton_svg::sanitize::{AllowlistSanitizer, SanitizeOptions, SanitizeReport};
use anyhow::{bail, Context, Result};
use console::{style, Emoji};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

static SUCCESS: Emoji = Emoji("✓", "√");
static FAILURE: Emoji = Emoji("✗", "x");

/// Suffix of files written to the output directory
pub const OUTPUT_SUFFIX: &str = "sanitized.svg";

/// Result of sanitizing one file
#[derive(Debug, Clone)]
pub struct SanitizedFile {
    /// Input file
    pub path: PathBuf,
    /// Post-processed markup
    pub markup: String,
    /// What the sanitizer removed
    pub report: SanitizeReport,
    /// Where the markup was written, if anywhere
    pub written_to: Option<PathBuf>,
}

/// Sanitizes SVG files concurrently, one pipeline per file
#[derive(Debug, Clone)]
pub struct SanitizeCommand {
    files: Vec<PathBuf>,
    title: Option<String>,
    keep_prolog: bool,
    out_dir: Option<PathBuf>,
    options: SanitizeOptions,
}

impl SanitizeCommand {
    /// Create a new command instance
    #[must_use]
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            title: None,
            keep_prolog: false,
            out_dir: None,
            options: SanitizeOptions::default(),
        }
    }

    /// Sets the `<title>` injected into every file
    #[must_use]
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Keeps XML declarations and DOCTYPEs the sanitizer let through
    #[must_use]
    pub const fn keep_prolog(mut self, keep: bool) -> Self {
        self.keep_prolog = keep;
        self
    }

    /// Writes results into a directory instead of printing them
    #[must_use]
    pub fn with_out_dir(mut self, out_dir: Option<PathBuf>) -> Self {
        self.out_dir = out_dir;
        self
    }

    /// Overrides the sanitizer options
    #[must_use]
    pub fn with_options(mut self, options: SanitizeOptions) -> Self {
        self.options = options;
        self
    }

    /// Sanitizes every file, returning per-file outcomes in input order
    ///
    /// # Errors
    ///
    /// Returns an error if the output directory cannot be created or a
    /// task panics. Per-file failures are returned in the vector.
    pub async fn run(&self) -> Result<Vec<(PathBuf, Result<SanitizedFile>)>> {
        if let Some(dir) = &self.out_dir {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        let pipeline = Arc::new(Pipeline {
            sanitizer: AllowlistSanitizer::new(self.options.clone()),
            post_processor: PostProcessor::new(),
            post_options: PostProcessOptions {
                strip_prolog: !self.keep_prolog,
                title: self.title.clone(),
                ..PostProcessOptions::default()
            },
            out_dir: self.out_dir.clone(),
        });

        let mut tasks = JoinSet::new();
        for (index, path) in self.files.iter().cloned().enumerate() {
            let pipeline = Arc::clone(&pipeline);
            tasks.spawn(async move {
                let result = pipeline.run(&path).await;
                (index, path, result)
            });
        }

        let mut outcomes = Vec::with_capacity(self.files.len());
        while let Some(joined) = tasks.join_next().await {
            outcomes.push(joined.context("Sanitization task failed")?);
        }
        outcomes.sort_by_key(|(index, _, _)| *index);

        Ok(outcomes
            .into_iter()
            .map(|(_, path, result)| (path, result))
            .collect())
    }

    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if any file failed to sanitize.
    pub async fn execute(&self) -> Result<()> {
        let outcomes = self.run().await?;
        let failed = outcomes.iter().filter(|(_, result)| result.is_err()).count();

        for (path, result) in &outcomes {
            match result {
                Ok(file) => match &file.written_to {
                    Some(target) => println!(
                        "{} {} → {} ({} removed)",
                        style(SUCCESS).green(),
                        path.display(),
                        style(target.display()).cyan(),
                        file.report.total()
                    ),
                    None => println!("{}", file.markup),
                },
                Err(error) => eprintln!(
                    "{} {} {error:#}",
                    style(FAILURE).red(),
                    style(path.display()).bold()
                ),
            }
        }

        if failed > 0 {
            bail!("{failed} of {} files could not be sanitized", outcomes.len());
        }
        Ok(())
    }
}

/// Read-only state shared by every task
struct Pipeline {
    sanitizer: AllowlistSanitizer,
    post_processor: PostProcessor,
    post_options: PostProcessOptions,
    out_dir: Option<PathBuf>,
}

impl Pipeline {
    async fn run(&self, path: &Path) -> Result<SanitizedFile> {
        let raw = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let (markup, report) = self.sanitizer.sanitize_with_report(&raw)?;
        let markup = self.post_processor.process(markup, &self.post_options);

        let written_to = match &self.out_dir {
            Some(dir) => {
                let target = dir.join(output_name(path));
                tokio::fs::write(&target, markup.as_str())
                    .await
                    .with_context(|| format!("Failed to write {}", target.display()))?;
                Some(target)
            }
            None => None,
        };

        tracing::debug!(
            path = %path.display(),
            removed = report.total(),
            "Sanitized SVG file"
        );

        Ok(SanitizedFile {
            path: path.to_path_buf(),
            markup: markup.into_string(),
            report,
            written_to,
        })
    }
}

/// `logo.svg` becomes `logo.sanitized.svg`
#[must_use]
pub fn output_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map_or_else(|| "output".into(), |stem| stem.to_string_lossy());
    format!("{stem}.{OUTPUT_SUFFIX}")
}
