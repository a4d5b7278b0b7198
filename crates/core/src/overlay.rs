//! Overlay model
//!
//! The canonical collection of placed signatures and text labels on the page
//! surface. The overlay publishes immutable [`OverlaySnapshot`]s: every
//! mutation builds the next snapshot and swaps it in whole, so a reader holding
//! a snapshot never observes a partially applied change.

use chrono::{DateTime, Utc};
use pdf_signer_capture::{ImageData, SourceType};
use pdf_signer_provenance::ProvenanceMetadata;
use std::sync::Arc;

use crate::error::{EditorError, EditorResult};
use crate::geometry::{Point, Rect, Size};

/// Unique identifier for a placed item
///
/// Generated using UUID v4, unique within its owning collection.
pub type PlacementId = uuid::Uuid;

/// Reference to one placed item of either kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ItemRef {
    Signature(PlacementId),
    Text(PlacementId),
}

impl ItemRef {
    pub fn id(&self) -> PlacementId {
        match self {
            ItemRef::Signature(id) | ItemRef::Text(id) => *id,
        }
    }
}

impl std::fmt::Display for ItemRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemRef::Signature(id) => write!(f, "signature {id}"),
            ItemRef::Text(id) => write!(f, "text {id}"),
        }
    }
}

/// Provenance stamped on a signature when it was placed
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureMetadata {
    pub ip_address: String,
    pub timestamp: DateTime<Utc>,
    pub signature_type: SourceType,
}

impl SignatureMetadata {
    pub fn new(provenance: ProvenanceMetadata, signature_type: SourceType) -> Self {
        Self {
            ip_address: provenance.ip_address,
            timestamp: provenance.timestamp,
            signature_type,
        }
    }
}

/// A signature bitmap positioned on the page surface
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedSignature {
    id: PlacementId,
    /// Private copy of the asset bitmap taken at placement time
    image: Arc<ImageData>,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    metadata: SignatureMetadata,
}

impl PlacedSignature {
    pub fn new(image: &ImageData, origin: Point, size: Size, metadata: SignatureMetadata) -> Self {
        Self {
            id: PlacementId::new_v4(),
            image: Arc::new(image.clone()),
            x: origin.x,
            y: origin.y,
            width: size.width,
            height: size.height,
            metadata,
        }
    }

    pub fn id(&self) -> PlacementId {
        self.id
    }

    pub fn image(&self) -> &ImageData {
        &self.image
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.origin(), self.size())
    }

    pub fn metadata(&self) -> &SignatureMetadata {
        &self.metadata
    }
}

/// Font families available to text labels
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TextFont {
    #[default]
    Sans,
    Serif,
    Mono,
}

impl TextFont {
    pub const ALL: [TextFont; 3] = [TextFont::Sans, TextFont::Serif, TextFont::Mono];

    /// Generic CSS family for hosts rendering with a web engine
    pub fn css_family(&self) -> &'static str {
        match self {
            TextFont::Sans => "sans-serif",
            TextFont::Serif => "serif",
            TextFont::Mono => "monospace",
        }
    }
}

/// An editable text label positioned on the page surface
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    id: PlacementId,
    content: String,
    font: TextFont,
    font_size: f32,
    x: f32,
    y: f32,
}

impl PlacedText {
    pub fn new(content: impl Into<String>, font: TextFont, font_size: f32, origin: Point) -> Self {
        Self {
            id: PlacementId::new_v4(),
            content: content.into(),
            font,
            font_size,
            x: origin.x,
            y: origin.y,
        }
    }

    pub fn id(&self) -> PlacementId {
        self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn font(&self) -> TextFont {
        self.font
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Rough rendered extent, for hosts that do not report a measured one
    ///
    /// Assumes an average advance of 0.6em and a 1.2em line.
    pub fn estimated_extent(&self) -> Size {
        let chars = self.content.chars().count().max(1) as f32;
        Size::new(chars * self.font_size * 0.6, self.font_size * 1.2)
    }
}

/// Immutable view of every placed item
#[derive(Debug, Clone, Default)]
pub struct OverlaySnapshot {
    signatures: Vec<PlacedSignature>,
    texts: Vec<PlacedText>,
    /// Render order, bottom to top
    stack: Vec<ItemRef>,
    revision: u64,
}

impl OverlaySnapshot {
    /// Placed signatures in insertion order
    pub fn signatures(&self) -> &[PlacedSignature] {
        &self.signatures
    }

    /// Placed texts in insertion order
    pub fn texts(&self) -> &[PlacedText] {
        &self.texts
    }

    pub fn signature(&self, id: PlacementId) -> Option<&PlacedSignature> {
        self.signatures.iter().find(|s| s.id == id)
    }

    pub fn text(&self, id: PlacementId) -> Option<&PlacedText> {
        self.texts.iter().find(|t| t.id == id)
    }

    /// All items bottom to top
    pub fn stacking_order(&self) -> &[ItemRef] {
        &self.stack
    }

    /// Incremented by every committed mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn contains(&self, item: ItemRef) -> bool {
        match item {
            ItemRef::Signature(id) => self.signature(id).is_some(),
            ItemRef::Text(id) => self.text(id).is_some(),
        }
    }

    pub fn len(&self) -> usize {
        self.signatures.len() + self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Current top-left corner of an item
    pub fn origin_of(&self, item: ItemRef) -> Option<Point> {
        match item {
            ItemRef::Signature(id) => self.signature(id).map(PlacedSignature::origin),
            ItemRef::Text(id) => self.text(id).map(PlacedText::origin),
        }
    }

    /// Bounding box of an item; texts use `rendered` when the host measured one
    pub fn bounds_of(&self, item: ItemRef, rendered: Option<Size>) -> Option<Rect> {
        match item {
            ItemRef::Signature(id) => self.signature(id).map(PlacedSignature::bounds),
            ItemRef::Text(id) => self.text(id).map(|text| {
                Rect::new(
                    text.origin(),
                    rendered.unwrap_or_else(|| text.estimated_extent()),
                )
            }),
        }
    }

    /// Topmost item under `point`, if any
    pub fn hit_test(&self, point: &Point) -> Option<ItemRef> {
        self.stack
            .iter()
            .rev()
            .copied()
            .find(|item| {
                self.bounds_of(*item, None)
                    .map_or(false, |bounds| bounds.contains(point))
            })
    }

    fn signature_mut(&mut self, id: PlacementId) -> Option<&mut PlacedSignature> {
        self.signatures.iter_mut().find(|s| s.id == id)
    }

    fn text_mut(&mut self, id: PlacementId) -> Option<&mut PlacedText> {
        self.texts.iter_mut().find(|t| t.id == id)
    }

    fn raise(&mut self, item: ItemRef) {
        self.stack.retain(|other| *other != item);
        self.stack.push(item);
    }
}

/// Owner of the current overlay snapshot
#[derive(Debug, Default)]
pub struct Overlay {
    current: Arc<OverlaySnapshot>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot; stays valid and unchanged after later mutations
    pub fn snapshot(&self) -> Arc<OverlaySnapshot> {
        Arc::clone(&self.current)
    }

    /// Borrow the current snapshot without bumping its refcount
    pub fn current(&self) -> &OverlaySnapshot {
        &self.current
    }

    /// Build the next snapshot with `change` and publish it if it succeeds
    fn apply<R>(
        &mut self,
        change: impl FnOnce(&mut OverlaySnapshot) -> EditorResult<R>,
    ) -> EditorResult<R> {
        let mut next = (*self.current).clone();
        let result = change(&mut next)?;
        next.revision += 1;
        self.current = Arc::new(next);
        Ok(result)
    }

    pub fn insert_signature(&mut self, signature: PlacedSignature) -> PlacementId {
        let id = signature.id;
        let _ = self.apply(|next| {
            next.stack.push(ItemRef::Signature(id));
            next.signatures.push(signature);
            Ok(())
        });
        id
    }

    pub fn insert_text(&mut self, text: PlacedText) -> PlacementId {
        let id = text.id;
        let _ = self.apply(|next| {
            next.stack.push(ItemRef::Text(id));
            next.texts.push(text);
            Ok(())
        });
        id
    }

    /// Move an item and raise it to the top of the stack in one step
    pub fn commit_move(&mut self, item: ItemRef, origin: Point) -> EditorResult<()> {
        self.apply(|next| {
            match item {
                ItemRef::Signature(id) => {
                    let sig = next
                        .signature_mut(id)
                        .ok_or(EditorError::UnknownItem(item))?;
                    sig.x = origin.x;
                    sig.y = origin.y;
                }
                ItemRef::Text(id) => {
                    let text = next.text_mut(id).ok_or(EditorError::UnknownItem(item))?;
                    text.x = origin.x;
                    text.y = origin.y;
                }
            }
            next.raise(item);
            Ok(())
        })
    }

    pub fn resize_signature(&mut self, id: PlacementId, size: Size) -> EditorResult<()> {
        self.apply(|next| {
            let sig = next
                .signature_mut(id)
                .ok_or(EditorError::UnknownItem(ItemRef::Signature(id)))?;
            sig.width = size.width;
            sig.height = size.height;
            Ok(())
        })
    }

    pub fn set_text_content(&mut self, id: PlacementId, content: String) -> EditorResult<()> {
        self.apply(|next| {
            let text = next
                .text_mut(id)
                .ok_or(EditorError::UnknownItem(ItemRef::Text(id)))?;
            text.content = content;
            Ok(())
        })
    }

    pub fn set_text_font(&mut self, id: PlacementId, font: TextFont) -> EditorResult<()> {
        self.apply(|next| {
            let text = next
                .text_mut(id)
                .ok_or(EditorError::UnknownItem(ItemRef::Text(id)))?;
            text.font = font;
            Ok(())
        })
    }

    pub fn remove_signature(&mut self, id: PlacementId) -> EditorResult<PlacedSignature> {
        let item = ItemRef::Signature(id);
        self.apply(|next| {
            let index = next
                .signatures
                .iter()
                .position(|s| s.id == id)
                .ok_or(EditorError::UnknownItem(item))?;
            next.stack.retain(|other| *other != item);
            Ok(next.signatures.remove(index))
        })
    }

    pub fn remove_text(&mut self, id: PlacementId) -> EditorResult<PlacedText> {
        let item = ItemRef::Text(id);
        self.apply(|next| {
            let index = next
                .texts
                .iter()
                .position(|t| t.id == id)
                .ok_or(EditorError::UnknownItem(item))?;
            next.stack.retain(|other| *other != item);
            Ok(next.texts.remove(index))
        })
    }
}
