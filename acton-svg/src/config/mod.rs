//! Configuration management for acton-svg
//!
//! Formatter settings, storage and sanitizer options are loaded from
//! multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `ACTON_SVG_` prefix, `__` for nesting)
//! 2. `./acton-svg.toml` (development)
//! 3. `~/.config/acton-svg/{service}/config.toml` (user config, XDG)
//! 4. `/etc/acton-svg/{service}/config.toml` (system config)
//! 5. Hardcoded defaults (fallback)
//!
//! Settings are validated once after loading; a render pass only ever sees
//! a validated, immutable [`RenderSettings`].
//!
//! # Example Configuration
//!
//! ```toml
//! # acton-svg.toml
//! [formatter]
//! svg_render_as_image = false
//! alt_as_title = true
//! image_link = "file"
//!
//! [formatter.svg_attributes]
//! width = "64"
//! height = "64"
//!
//! [storage]
//! base_path = "./files"
//! public_url = "/files"
//!
//! [sanitizer]
//! max_bytes = 1048576
//! allow_data_images = false
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use acton_svg::config::ActonSvgConfig;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = ActonSvgConfig::load_for_service("my-site")?;
//!
//! if config.formatter.render_as_image {
//!     println!("SVG files render as <img>");
//! }
//! # Ok(())
//! # }
//! ```

use crate::postprocess::pixel_value;
use crate::sanitize::{SanitizeOptions, DEFAULT_MAX_BYTES};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A dimension is neither empty nor a non-negative number
    #[error("Invalid SVG {field} {value:?}: expected a non-negative number of pixels")]
    InvalidDimension {
        /// `width` or `height`
        field: &'static str,
        /// Rejected value
        value: String,
    },
}

/// Where a rendered image links to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageLink {
    /// No link
    #[default]
    #[serde(alias = "")]
    None,
    /// The entity that owns the field
    Content,
    /// The image file itself
    File,
}

/// Width and height applied to SVG images
///
/// Empty strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvgAttributes {
    /// Width in pixels, `px` suffix optional
    pub width: String,
    /// Height in pixels, `px` suffix optional
    pub height: String,
}

impl SvgAttributes {
    /// Creates dimensions from pixel values
    #[must_use]
    pub fn new(width: impl Into<String>, height: impl Into<String>) -> Self {
        Self {
            width: width.into(),
            height: height.into(),
        }
    }

    /// Width as `<n>px`, if set and valid
    #[must_use]
    pub fn width_px(&self) -> Option<String> {
        pixel_value(&self.width)
    }

    /// Height as `<n>px`, if set and valid
    #[must_use]
    pub fn height_px(&self) -> Option<String> {
        pixel_value(&self.height)
    }

    /// Whether neither dimension is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width.trim().is_empty() && self.height.trim().is_empty()
    }
}

/// Settings of the SVG image formatter (`[formatter]` section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Render SVG files as `<img>` instead of inline markup
    #[serde(rename = "svg_render_as_image")]
    pub render_as_image: bool,

    /// Use the alt text as the inline SVG `<title>`
    pub alt_as_title: bool,

    /// Image style used for non-inline images
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_style: Option<String>,

    /// Link target
    pub image_link: ImageLink,

    /// Dimensions applied to SVG images
    pub svg_attributes: SvgAttributes,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            render_as_image: true,
            alt_as_title: false,
            image_style: None,
            image_link: ImageLink::None,
            svg_attributes: SvgAttributes::default(),
        }
    }
}

impl RenderSettings {
    /// Checks dimensions
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDimension`] for a width or height that
    /// is set but not a non-negative number.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("width", &self.svg_attributes.width),
            ("height", &self.svg_attributes.height),
        ] {
            if !value.trim().is_empty() && pixel_value(value).is_none() {
                return Err(ConfigError::InvalidDimension {
                    field,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }

    /// Configured image style, ignoring blank names
    #[must_use]
    pub fn image_style(&self) -> Option<&str> {
        self.image_style
            .as_deref()
            .map(str::trim)
            .filter(|style| !style.is_empty())
    }

    /// Human-readable description of the active settings
    ///
    /// # Example
    ///
    /// ```rust
    /// use acton_svg::config::{ImageLink, RenderSettings};
    ///
    /// let settings = RenderSettings {
    ///     render_as_image: false,
    ///     alt_as_title: true,
    ///     image_link: ImageLink::File,
    ///     ..RenderSettings::default()
    /// };
    ///
    /// assert_eq!(
    ///     settings.summary(),
    ///     vec!["Render SVG inline", "Alt text used as SVG title", "Original image", "Linked to file"]
    /// );
    /// ```
    #[must_use]
    pub fn summary(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if self.render_as_image {
            lines.push("Render SVG as <img>".to_string());
        } else {
            lines.push("Render SVG inline".to_string());
            if self.alt_as_title {
                lines.push("Alt text used as SVG title".to_string());
            }
        }

        if !self.svg_attributes.is_empty() {
            let width = self.svg_attributes.width_px().unwrap_or_else(|| "auto".to_string());
            let height = self.svg_attributes.height_px().unwrap_or_else(|| "auto".to_string());
            lines.push(format!("SVG dimensions: {width} × {height}"));
        }

        match self.image_style() {
            Some(style) => lines.push(format!("Image style: {style}")),
            None => lines.push("Original image".to_string()),
        }

        match self.image_link {
            ImageLink::None => {}
            ImageLink::Content => lines.push("Linked to content".to_string()),
            ImageLink::File => lines.push("Linked to file".to_string()),
        }

        lines
    }
}

/// Storage backend configuration (`[storage]` section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory `public://` URIs resolve into
    pub base_path: PathBuf,

    /// URL prefix files are served under
    pub public_url: String,

    /// Largest file read from storage, in bytes
    pub max_file_bytes: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            public_url: "/files".to_string(),
            max_file_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

/// Complete acton-svg configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ActonSvgConfig {
    /// Formatter settings
    #[serde(default)]
    pub formatter: RenderSettings,

    /// Storage settings
    #[serde(default)]
    pub storage: StorageSettings,

    /// Sanitizer settings
    #[serde(default)]
    pub sanitizer: SanitizeOptions,
}

impl ActonSvgConfig {
    /// Load configuration for a specific service
    ///
    /// Searches for configuration in XDG-compliant locations with precedence:
    /// 1. Environment variables (`ACTON_SVG_*`)
    /// 2. `./acton-svg.toml`
    /// 3. `~/.config/acton-svg/{service_name}/config.toml`
    /// 4. `/etc/acton-svg/{service_name}/config.toml`
    /// 5. Defaults
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - A configuration file contains invalid TOML syntax
    /// - Configuration values fail type conversion
    /// - Formatter settings fail validation
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use acton_svg::config::ActonSvgConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = ActonSvgConfig::load_for_service("my-site")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load_for_service(service_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::new()
            // 5. Start with defaults (lowest priority)
            .merge(Toml::string(&toml::to_string(&Self::default())?));

        // 4. System config: /etc/acton-svg/{service_name}/config.toml
        let system_config = PathBuf::from("/etc/acton-svg")
            .join(service_name)
            .join("config.toml");
        if system_config.exists() {
            figment = figment.merge(Toml::file(&system_config));
        }

        // 3. User config: ~/.config/acton-svg/{service_name}/config.toml
        let user_config = Self::recommended_path(service_name);
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }

        // 2. Local config: ./acton-svg.toml
        let local_config = PathBuf::from("./acton-svg.toml");
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }

        // 1. Environment variables (highest priority, double underscore for nesting)
        figment = figment.merge(Env::prefixed("ACTON_SVG_").split("__").lowercase(true));

        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, cannot be parsed, or
    /// holds invalid formatter settings.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use acton_svg::config::ActonSvgConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = ActonSvgConfig::load_from("./config/production.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load_from(path: &str) -> anyhow::Result<Self> {
        if !std::path::Path::new(path).is_file() {
            anyhow::bail!("Configuration file not found: {path}");
        }

        let config: Self = Figment::new()
            .merge(Toml::string(&toml::to_string(&Self::default())?))
            .merge(Toml::file(path))
            .merge(Env::prefixed("ACTON_SVG_").split("__").lowercase(true))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Validates every section
    ///
    /// # Errors
    ///
    /// See [`RenderSettings::validate`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.formatter.validate()
    }

    /// Get the recommended XDG config path for a service
    ///
    /// # Example
    ///
    /// ```rust
    /// use acton_svg::config::ActonSvgConfig;
    ///
    /// let path = ActonSvgConfig::recommended_path("my-site");
    /// // Returns: ~/.config/acton-svg/my-site/config.toml
    /// assert!(path.ends_with("config.toml"));
    /// ```
    #[must_use]
    pub fn recommended_path(service_name: &str) -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from("./acton-svg.toml"),
            |config_dir| {
                config_dir
                    .join("acton-svg")
                    .join(service_name)
                    .join("config.toml")
            },
        )
    }

    /// Create config directory for a service
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn create_config_dir(service_name: &str) -> anyhow::Result<PathBuf> {
        let config_path = Self::recommended_path(service_name);
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(config_path)
    }
}
