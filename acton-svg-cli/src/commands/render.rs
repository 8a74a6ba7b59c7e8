//! Field rendering command

use acton_svg::config::ActonSvgConfig;
use acton_svg::render::{FieldItem, FieldRenderer, SvgImageFormatter, ViewElement};
use acton_svg::sanitize::AllowlistSanitizer;
use acton_svg::storage::{FileGateway, FileItem, LocalFileStorage};
use anyhow::{Context, Result};
use console::style;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Service name used to locate configuration files
pub const SERVICE_NAME: &str = "acton-svg";

/// Renders files as one image field and prints the HTML
#[derive(Debug, Clone)]
pub struct RenderCommand {
    files: Vec<PathBuf>,
    config: Option<PathBuf>,
    inline: bool,
    alt: Option<String>,
}

impl RenderCommand {
    /// Create a new command instance
    #[must_use]
    pub const fn new(files: Vec<PathBuf>, config: Option<PathBuf>) -> Self {
        Self {
            files,
            config,
            inline: false,
            alt: None,
        }
    }

    /// Forces inline rendering regardless of configuration
    #[must_use]
    pub const fn inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    /// Alt text applied to every item
    #[must_use]
    pub fn with_alt(mut self, alt: Option<String>) -> Self {
        self.alt = alt;
        self
    }

    /// Loads configuration from `--config` or the standard locations
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid.
    pub fn load_config(&self) -> Result<ActonSvgConfig> {
        let mut config = match &self.config {
            Some(path) => ActonSvgConfig::load_from(&path.to_string_lossy())?,
            None => ActonSvgConfig::load_for_service(SERVICE_NAME)?,
        };
        if self.inline {
            config.formatter.render_as_image = false;
        }
        Ok(config)
    }

    /// Renders the files with the given configuration
    ///
    /// Files that cannot be rendered are skipped, as in any field.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage base path is unusable or a file lies
    /// outside it.
    pub async fn render(&self, config: &ActonSvgConfig) -> Result<Vec<ViewElement>> {
        let base_path = config
            .storage
            .base_path
            .canonicalize()
            .with_context(|| format!("Invalid base path {}", config.storage.base_path.display()))?;

        let storage = LocalFileStorage::new(base_path.clone())?
            .with_public_url(config.storage.public_url.clone());
        let gateway = FileGateway::new(storage).with_max_bytes(config.storage.max_file_bytes);
        let formatter = SvgImageFormatter::new(gateway)
            .with_sanitizer(Arc::new(AllowlistSanitizer::new(config.sanitizer.clone())));

        let items = self
            .files
            .iter()
            .enumerate()
            .map(|(delta, path)| {
                let file = storage_item(&base_path, path, delta + 1)?;
                let item = FieldItem::new(delta, file);
                Ok(match &self.alt {
                    Some(alt) => item.with_alt(alt.clone()),
                    None => item,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(formatter.render(&items, &config.formatter).await)
    }

    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or storage setup fails.
    pub async fn execute(&self, json: bool) -> Result<()> {
        let config = self.load_config()?;
        let elements = self.render(&config).await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&elements)?);
            return Ok(());
        }

        for line in config.formatter.summary() {
            eprintln!("{}", style(line).dim());
        }
        for element in &elements {
            println!("{}", element.to_html());
        }
        if elements.len() < self.files.len() {
            eprintln!(
                "{} {} of {} files skipped",
                style("warning:").yellow().bold(),
                self.files.len() - elements.len(),
                self.files.len()
            );
        }

        Ok(())
    }
}

/// Maps a path on disk onto a `public://` item inside the base path
fn storage_item(base_path: &Path, path: &Path, id: usize) -> Result<FileItem> {
    let relative = if path.is_absolute() {
        path.strip_prefix(base_path)
            .with_context(|| format!("{} is outside {}", path.display(), base_path.display()))?
    } else {
        path
    };

    let relative = relative.to_string_lossy().replace('\\', "/");
    let filename = path
        .file_name()
        .map_or_else(|| relative.clone(), |name| name.to_string_lossy().into_owned());
    let content_type = mime_guess::from_path(path).first_or_octet_stream().to_string();

    Ok(FileItem::new(
        id.to_string(),
        format!("public://{relative}"),
        filename,
        content_type,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_item_relative() {
        let item = storage_item(Path::new("/srv/files"), Path::new("img/logo.svg"), 3).unwrap();
        assert_eq!(item.uri, "public://img/logo.svg");
        assert_eq!(item.filename, "logo.svg");
        assert_eq!(item.content_type, "image/svg+xml");
        assert_eq!(item.id, "3");
    }

    #[test]
    fn test_storage_item_absolute_outside_base() {
        assert!(storage_item(Path::new("/srv/files"), Path::new("/etc/passwd"), 1).is_err());
    }
}
