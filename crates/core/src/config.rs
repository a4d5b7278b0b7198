//! Editor configuration
//!
//! Layout constants, capture sizes and lookup endpoints for a signing
//! session. Configuration can be loaded from a JSON file, environment
//! variables, or built programmatically.

use pdf_signer_provenance::LookupConfig;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::geometry::{Point, Size};
use crate::overlay::TextFont;

/// Configuration for a signing editor session
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Width the page is rendered at; height follows the page aspect ratio
    pub page_width: f32,
    /// Size of a freshly placed signature
    pub signature_size: Size,
    /// Top-left corner used by click placement
    pub click_position: Point,
    /// Resize floor for placed signatures
    pub min_signature_size: Size,
    /// Content of a newly added text label
    pub default_text: String,
    pub default_text_font: TextFont,
    pub default_text_size: f32,
    /// Font size typed signatures are rendered at
    pub typed_font_size: f32,
    /// Padding added to each dimension of a typed signature bitmap
    pub typed_padding: u32,
    /// Drawing pad size in pixels
    pub pad_width: u32,
    pub pad_height: u32,
    /// Directory holding the handwriting fonts for typed signatures
    pub font_dir: Option<PathBuf>,
    pub lookup: LookupConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            page_width: 600.0,
            signature_size: Size::new(120.0, 60.0),
            click_position: Point::new(50.0, 50.0),
            min_signature_size: Size::new(50.0, 30.0),
            default_text: "Double Click to Edit".to_string(),
            default_text_font: TextFont::Sans,
            default_text_size: 16.0,
            typed_font_size: 48.0,
            typed_padding: 20,
            pad_width: 500,
            pad_height: 200,
            font_dir: None,
            lookup: LookupConfig::default(),
        }
    }
}

impl EditorConfig {
    pub fn with_page_width(mut self, width: f32) -> Self {
        self.page_width = width;
        self
    }

    pub fn with_signature_size(mut self, size: Size) -> Self {
        self.signature_size = size;
        self
    }

    pub fn with_default_text(mut self, text: impl Into<String>) -> Self {
        self.default_text = text.into();
        self
    }

    pub fn with_typed_font_size(mut self, size: f32) -> Self {
        self.typed_font_size = size;
        self
    }

    pub fn with_font_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.font_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn with_lookup(mut self, lookup: LookupConfig) -> Self {
        self.lookup = lookup;
        self
    }

    /// Loads configuration from environment variables over the defaults.
    ///
    /// Environment variables:
    /// - `PDF_SIGNER_PAGE_WIDTH`: page render width in pixels (default: 600)
    /// - `PDF_SIGNER_TYPED_FONT_SIZE`: typed signature font size (default: 48)
    /// - `PDF_SIGNER_FONT_DIR`: directory of handwriting fonts
    /// - `PDF_SIGNER_IP_PRIMARY_URL`: JSON IP endpoint
    /// - `PDF_SIGNER_IP_FALLBACK_URL`: plain-text IP endpoint
    /// - `PDF_SIGNER_IP_TIMEOUT_MS`: lookup timeout (default: 5000)
    ///
    /// # Errors
    /// Returns an error if any variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(width) = env_value("PDF_SIGNER_PAGE_WIDTH")? {
            config.page_width = width;
        }
        if let Some(size) = env_value("PDF_SIGNER_TYPED_FONT_SIZE")? {
            config.typed_font_size = size;
        }
        if let Ok(dir) = std::env::var("PDF_SIGNER_FONT_DIR") {
            config.font_dir = Some(PathBuf::from(dir));
        }
        if let Ok(url) = std::env::var("PDF_SIGNER_IP_PRIMARY_URL") {
            config.lookup.primary_url = url;
        }
        if let Ok(url) = std::env::var("PDF_SIGNER_IP_FALLBACK_URL") {
            config.lookup.fallback_url = url;
        }
        if let Some(timeout) = env_value("PDF_SIGNER_IP_TIMEOUT_MS")? {
            config.lookup.timeout_ms = timeout;
        }

        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file; missing keys take defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Reject values no session can work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.page_width > 0.0) {
            return Err(ConfigError::InvalidValue("page_width".to_string()));
        }
        if !(self.typed_font_size > 0.0) {
            return Err(ConfigError::InvalidValue("typed_font_size".to_string()));
        }
        if self.pad_width == 0 || self.pad_height == 0 {
            return Err(ConfigError::InvalidValue("pad_width/pad_height".to_string()));
        }
        Ok(())
    }
}

fn env_value<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        Err(_) => Ok(None),
    }
}

/// Errors loading or saving configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for configuration key: {0}")]
    InvalidValue(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
