//! Capture validation and rasterization errors

use crate::typed::SignatureFont;

/// Errors produced while turning a drawing or typed text into an asset.
///
/// The validation variants carry the message shown to the user. None of them
/// are fatal: the capture surface keeps its state so the user can retry.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Please draw a signature before saving")]
    EmptyDrawing,

    #[error("Please type your name before saving")]
    BlankText,

    #[error("font '{}' is not loaded", .0.family_name())]
    FontUnavailable(SignatureFont),

    #[error("invalid font data for '{}': {reason}", .font.family_name())]
    InvalidFont { font: SignatureFont, reason: String },

    #[error("failed to encode signature bitmap: {0}")]
    Encode(String),
}

impl CaptureError {
    /// Whether this error is a user-facing validation failure (as opposed to
    /// a font or encoder problem on the host side).
    pub fn is_validation(&self) -> bool {
        matches!(self, CaptureError::EmptyDrawing | CaptureError::BlankText)
    }
}

pub type CaptureResult<T> = Result<T, CaptureError>;
