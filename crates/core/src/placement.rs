//! Placement controller
//!
//! Creates placed signatures and text labels. Signatures are placed by click
//! (fixed position) or by dragging a library asset onto the page surface, in
//! which case the drop point becomes the center of the new signature. Drop
//! positions are not clamped; only drag gestures are bounded.

use pdf_signer_capture::SignatureAsset;
use pdf_signer_provenance::MetadataStamper;
use std::sync::Arc;

use crate::config::EditorConfig;
use crate::geometry::{Point, Size};
use crate::overlay::{
    Overlay, PlacedSignature, PlacedText, PlacementId, SignatureMetadata, TextFont,
};

/// Geometry and content for new placements
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementDefaults {
    pub signature_size: Size,
    pub click_position: Point,
    pub text: String,
    pub text_font: TextFont,
    pub text_size: f32,
}

impl From<&EditorConfig> for PlacementDefaults {
    fn from(config: &EditorConfig) -> Self {
        Self {
            signature_size: config.signature_size,
            click_position: config.click_position,
            text: config.default_text.clone(),
            text_font: config.default_text_font,
            text_size: config.default_text_size,
        }
    }
}

impl Default for PlacementDefaults {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

/// Creates placements and tracks the asset being dragged from the library
#[derive(Debug, Clone)]
pub struct PlacementController {
    defaults: PlacementDefaults,
    stamper: MetadataStamper,
    /// At most one asset in flight between drag start and drag end
    in_flight: Option<Arc<SignatureAsset>>,
}

impl PlacementController {
    pub fn new(defaults: PlacementDefaults, stamper: MetadataStamper) -> Self {
        Self {
            defaults,
            stamper,
            in_flight: None,
        }
    }

    pub fn defaults(&self) -> &PlacementDefaults {
        &self.defaults
    }

    pub fn stamper(&self) -> &MetadataStamper {
        &self.stamper
    }

    fn place_at(
        &self,
        overlay: &mut Overlay,
        asset: &SignatureAsset,
        origin: Point,
    ) -> PlacementId {
        let metadata = SignatureMetadata::new(self.stamper.stamp(), asset.source_type());
        let signature =
            PlacedSignature::new(asset.image(), origin, self.defaults.signature_size, metadata);
        let id = overlay.insert_signature(signature);
        tracing::debug!(
            placement = %id,
            asset_id = %asset.id(),
            x = origin.x,
            y = origin.y,
            "signature placed"
        );
        id
    }

    /// Place `asset` at the fixed click position
    pub fn place_by_click(&self, overlay: &mut Overlay, asset: &SignatureAsset) -> PlacementId {
        self.place_at(overlay, asset, self.defaults.click_position)
    }

    /// Place `asset` centered on a drop point given in viewport coordinates
    ///
    /// `surface_origin` is the viewport position of the page surface's
    /// top-left corner. The result may lie partly off the surface.
    pub fn place_by_drop(
        &self,
        overlay: &mut Overlay,
        asset: &SignatureAsset,
        pointer: Point,
        surface_origin: Point,
    ) -> PlacementId {
        self.place_at(overlay, asset, self.drop_origin(pointer, surface_origin))
    }

    /// Top-left corner of a signature dropped at `pointer`
    pub fn drop_origin(&self, pointer: Point, surface_origin: Point) -> Point {
        let local = pointer.offset_from(&surface_origin);
        Point::new(
            local.x - self.defaults.signature_size.width / 2.0,
            local.y - self.defaults.signature_size.height / 2.0,
        )
    }

    /// Add a text label with the default content, font and size at (0, 0)
    pub fn add_text(&self, overlay: &mut Overlay) -> PlacementId {
        let text = PlacedText::new(
            self.defaults.text.clone(),
            self.defaults.text_font,
            self.defaults.text_size,
            Point::default(),
        );
        let id = overlay.insert_text(text);
        tracing::debug!(placement = %id, "text label added");
        id
    }

    /// Start dragging a library asset; replaces any asset already in flight
    pub fn drag_start(&mut self, asset: Arc<SignatureAsset>) {
        if let Some(previous) = self.in_flight.replace(asset) {
            tracing::debug!(asset_id = %previous.id(), "in-flight asset replaced");
        }
    }

    pub fn in_flight(&self) -> Option<&SignatureAsset> {
        self.in_flight.as_deref()
    }

    /// Whether a drop onto the surface right now would place a signature
    pub fn drag_over(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Complete a drag by dropping onto the page surface
    ///
    /// Returns `None` (and places nothing) when no asset is in flight. The
    /// in-flight state is cleared either way.
    pub fn drop_on_surface(
        &mut self,
        overlay: &mut Overlay,
        pointer: Point,
        surface_origin: Point,
    ) -> Option<PlacementId> {
        match self.in_flight.take() {
            Some(asset) => Some(self.place_by_drop(overlay, &asset, pointer, surface_origin)),
            None => {
                tracing::warn!("drop with no asset in flight ignored");
                None
            }
        }
    }

    /// Drag finished without a drop, or after one
    pub fn drag_end(&mut self) {
        self.in_flight = None;
    }
}
