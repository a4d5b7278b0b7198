//! Editor error types

use pdf_signer_capture::{AssetId, CaptureError};

use crate::interaction::GestureKind;
use crate::overlay::ItemRef;

/// Errors surfaced by editor actions
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("no library asset with id {0}")]
    UnknownAsset(AssetId),

    #[error("no placed item {0}")]
    UnknownItem(ItemRef),

    #[error(transparent)]
    Interaction(#[from] InteractionError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Errors starting a drag or resize gesture
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InteractionError {
    #[error("{item} is already being {active}")]
    Busy { item: ItemRef, active: GestureKind },

    #[error("no placed item {0}")]
    UnknownItem(ItemRef),
}

/// Page renderer failures; reported to the host, never fatal to the overlay
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to load document: {0}")]
    Load(String),

    #[error("page {page} out of range (document has {page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },

    #[error("failed to render page: {0}")]
    Render(String),
}

pub type EditorResult<T> = Result<T, EditorError>;
