//! Signature asset data model
//!
//! An asset is an immutable rasterized signature. Both capture paths produce
//! the same shape so placement never needs to know where a bitmap came from.

use crate::typed::SignatureFont;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

use crate::error::{CaptureError, CaptureResult};

/// Unique identifier for a library asset
pub type AssetId = uuid::Uuid;

/// How an asset was created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Drawn,
    Typed,
}

/// PNG-encoded bitmap with its pixel dimensions
///
/// Treated as an opaque blob by everything downstream of capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    png: Vec<u8>,
    width: u32,
    height: u32,
}

impl ImageData {
    /// Encode an RGBA buffer as PNG
    pub fn encode(image: &RgbaImage) -> CaptureResult<Self> {
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| CaptureError::Encode(e.to_string()))?;

        Ok(Self {
            png,
            width: image.width(),
            height: image.height(),
        })
    }

    /// Wrap bytes that are already PNG-encoded
    pub fn from_png(png: Vec<u8>, width: u32, height: u32) -> Self {
        Self { png, width, height }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// A reusable rasterized signature
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureAsset {
    id: AssetId,
    image: ImageData,
    source_type: SourceType,
    original_text: Option<String>,
    font: Option<SignatureFont>,
}

impl SignatureAsset {
    /// Asset produced from freehand strokes
    pub fn drawn(image: ImageData) -> Self {
        Self {
            id: AssetId::new_v4(),
            image,
            source_type: SourceType::Drawn,
            original_text: None,
            font: None,
        }
    }

    /// Asset produced from typed text
    pub fn typed(image: ImageData, text: impl Into<String>, font: SignatureFont) -> Self {
        Self {
            id: AssetId::new_v4(),
            image,
            source_type: SourceType::Typed,
            original_text: Some(text.into()),
            font: Some(font),
        }
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn image(&self) -> &ImageData {
        &self.image
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    /// Text the user typed, for typed assets
    pub fn original_text(&self) -> Option<&str> {
        self.original_text.as_deref()
    }

    pub fn font(&self) -> Option<SignatureFont> {
        self.font
    }
}
