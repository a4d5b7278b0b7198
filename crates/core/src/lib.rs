//! PDF Signer Core Library
//!
//! Overlay engine for placing signatures and text labels on a rendered
//! document page: the signature library, placement rules, bounded drag and
//! resize gestures, and the editor facade a UI drives.

pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod geometry;
pub mod interaction;
pub mod library;
pub mod overlay;
pub mod page;
pub mod placement;

pub use config::{ConfigError, EditorConfig};
pub use editor::SigningEditor;
pub use error::{EditorError, EditorResult, InteractionError, RenderError};
pub use export::{sidecar_path, ExportError, ExportedSignature, ExportedText, OverlayExport};
pub use geometry::{PageSurface, Point, Rect, Size};
pub use interaction::{
    ControlKind, DragSession, GestureKind, GestureLease, GestureRegistry, InteractionEngine,
    PointerPress, PressTarget, ResizeSession,
};
pub use library::SignatureLibrary;
pub use overlay::{
    ItemRef, Overlay, OverlaySnapshot, PlacedSignature, PlacedText, PlacementId,
    SignatureMetadata, TextFont,
};
pub use page::{render_first_page, PageRenderer, RenderedPage, FIRST_PAGE};
pub use placement::{PlacementController, PlacementDefaults};

pub use pdf_signer_capture as capture;
pub use pdf_signer_provenance as provenance;
