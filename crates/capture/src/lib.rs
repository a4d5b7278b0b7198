//! Signature capture
//!
//! Turns a freehand drawing or typed text into a rasterized [`SignatureAsset`].

pub mod asset;
pub mod draw;
pub mod error;
pub mod typed;

pub use asset::{AssetId, ImageData, SignatureAsset, SourceType};
pub use draw::{DrawingPad, PenStyle, Stroke, StrokePoint};
pub use error::{CaptureError, CaptureResult};
pub use typed::{FontBook, SignatureFont, TextRasterizer, TypedSignature};
