//! Overlay export
//!
//! Serializes the placed signatures and texts of a snapshot to a JSON
//! description that a downstream step can burn into the document. The JSON
//! can be written next to the document as a sidecar file.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::geometry::PageSurface;
use crate::overlay::{ItemRef, OverlaySnapshot, PlacementId, SignatureMetadata, TextFont};

/// Format version written into every export
pub const EXPORT_VERSION: u32 = 1;

const SIDECAR_SUFFIX: &str = ".signatures.json";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A placed signature with its bitmap inlined as base64 PNG
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedSignature {
    pub id: PlacementId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub image_png: String,
    pub image_width: u32,
    pub image_height: u32,
    pub metadata: SignatureMetadata,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedText {
    pub id: PlacementId,
    pub content: String,
    pub font: TextFont,
    pub font_size: f32,
    pub x: f32,
    pub y: f32,
}

/// Everything placed on the page surface, in surface coordinates
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayExport {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub page: PageSurface,
    pub signatures: Vec<ExportedSignature>,
    pub texts: Vec<ExportedText>,
    /// Bottom to top
    pub stacking_order: Vec<ItemRef>,
}

impl OverlayExport {
    pub fn from_snapshot(snapshot: &OverlaySnapshot, page: PageSurface) -> Self {
        let signatures = snapshot
            .signatures()
            .iter()
            .map(|sig| {
                let origin = sig.origin();
                let size = sig.size();
                ExportedSignature {
                    id: sig.id(),
                    x: origin.x,
                    y: origin.y,
                    width: size.width,
                    height: size.height,
                    image_png: STANDARD.encode(sig.image().as_bytes()),
                    image_width: sig.image().width(),
                    image_height: sig.image().height(),
                    metadata: sig.metadata().clone(),
                }
            })
            .collect();

        let texts = snapshot
            .texts()
            .iter()
            .map(|text| ExportedText {
                id: text.id(),
                content: text.content().to_string(),
                font: text.font(),
                font_size: text.font_size(),
                x: text.origin().x,
                y: text.origin().y,
            })
            .collect();

        Self {
            version: EXPORT_VERSION,
            exported_at: Utc::now(),
            page,
            signatures,
            texts,
            stacking_order: snapshot.stacking_order().to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the export next to `pdf_path`, replacing any previous one
    ///
    /// Returns the sidecar path.
    pub fn write_sidecar(&self, pdf_path: &Path) -> Result<PathBuf, ExportError> {
        let path = sidecar_path(pdf_path);
        let json = self.to_json()?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &path)?;

        tracing::info!(
            path = %path.display(),
            signatures = self.signatures.len(),
            texts = self.texts.len(),
            "overlay exported"
        );
        Ok(path)
    }
}

/// Sidecar location for a document: `<file>.signatures.json`
pub fn sidecar_path(pdf_path: &Path) -> PathBuf {
    let mut path = pdf_path.as_os_str().to_owned();
    path.push(SIDECAR_SUFFIX);
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Size};
    use crate::overlay::{Overlay, PlacedSignature, PlacedText};
    use chrono::TimeZone;
    use pdf_signer_capture::{ImageData, SourceType};

    fn populated_overlay() -> Overlay {
        let mut overlay = Overlay::new();
        let metadata = SignatureMetadata {
            ip_address: "203.0.113.5".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            signature_type: SourceType::Drawn,
        };
        overlay.insert_signature(PlacedSignature::new(
            &ImageData::from_png(b"png".to_vec(), 3, 1),
            Point::new(50.0, 50.0),
            Size::new(120.0, 60.0),
            metadata,
        ));
        overlay.insert_text(PlacedText::new(
            "Approved",
            TextFont::Serif,
            16.0,
            Point::new(10.0, 20.0),
        ));
        overlay
    }

    #[test]
    fn test_sidecar_path_appends_suffix() {
        assert_eq!(
            sidecar_path(Path::new("/docs/lease.pdf")),
            PathBuf::from("/docs/lease.pdf.signatures.json")
        );
    }

    #[test]
    fn test_export_json_shape() {
        let overlay = populated_overlay();
        let export =
            OverlayExport::from_snapshot(overlay.current(), PageSurface::new(600.0, 776.0));
        let value: serde_json::Value = serde_json::from_str(&export.to_json().unwrap()).unwrap();

        assert_eq!(value["version"], 1);
        assert_eq!(value["page"]["width"], 600.0);

        let sig = &value["signatures"][0];
        assert_eq!(sig["x"], 50.0);
        assert_eq!(sig["width"], 120.0);
        assert_eq!(sig["imagePng"], "cG5n");
        assert_eq!(sig["metadata"]["ipAddress"], "203.0.113.5");
        assert_eq!(sig["metadata"]["signatureType"], "drawn");

        let text = &value["texts"][0];
        assert_eq!(text["content"], "Approved");
        assert_eq!(text["font"], "serif");
        assert_eq!(text["fontSize"], 16.0);

        assert_eq!(value["stackingOrder"].as_array().unwrap().len(), 2);
        assert_eq!(value["stackingOrder"][1]["kind"], "text");
    }

    #[test]
    fn test_write_sidecar_replaces_previous() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("contract.pdf");
        let mut overlay = populated_overlay();

        let first = OverlayExport::from_snapshot(overlay.current(), PageSurface::default());
        let path = first.write_sidecar(&pdf).unwrap();
        assert_eq!(path, dir.path().join("contract.pdf.signatures.json"));

        let id = overlay.current().texts()[0].id();
        overlay.remove_text(id).unwrap();
        OverlayExport::from_snapshot(overlay.current(), PageSurface::default())
            .write_sidecar(&pdf)
            .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(written["texts"].as_array().unwrap().is_empty());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let export =
            OverlayExport::from_snapshot(&OverlaySnapshot::default(), PageSurface::default());
        let err = export
            .write_sidecar(&dir.path().join("nope").join("a.pdf"))
            .unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
    }
}
