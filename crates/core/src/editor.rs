//! Signing editor facade
//!
//! [`SigningEditor`] ties the capture surfaces, the signature library, the
//! placement controller, the overlay and the interaction engine together and
//! exposes every action the hosting UI can take. All mutation happens through
//! `&mut self` on the UI thread; the only background work is the one-shot IP
//! resolution started by [`SigningEditor::start_ip_resolution`].

use pdf_signer_capture::{
    AssetId, DrawingPad, FontBook, SignatureAsset, TextRasterizer, TypedSignature,
};
use pdf_signer_provenance::{HttpIpLookup, IpLookup, MetadataStamper, ResolutionHandle};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::EditorConfig;
use crate::error::{EditorError, EditorResult, RenderError};
use crate::export::{ExportError, OverlayExport};
use crate::geometry::{PageSurface, Point, Size};
use crate::interaction::{DragSession, InteractionEngine, PointerPress, ResizeSession};
use crate::library::SignatureLibrary;
use crate::overlay::{ItemRef, Overlay, OverlaySnapshot, PlacementId, TextFont};
use crate::page::{render_first_page, PageRenderer, RenderedPage};
use crate::placement::{PlacementController, PlacementDefaults};

/// One signing session over one document page
pub struct SigningEditor {
    config: EditorConfig,
    drawing: DrawingPad,
    typed: TypedSignature,
    rasterizer: Box<dyn TextRasterizer>,
    library: SignatureLibrary,
    placement: PlacementController,
    overlay: Overlay,
    interaction: InteractionEngine,
    stamper: MetadataStamper,
    surface: PageSurface,
    page_count: Option<u32>,
}

impl SigningEditor {
    /// Editor using the handwriting fonts found in `config.font_dir`
    pub fn new(config: EditorConfig) -> Self {
        let mut fonts = FontBook::new();
        if let Some(dir) = &config.font_dir {
            match fonts.load_dir(dir) {
                Ok(count) => {
                    tracing::info!(dir = %dir.display(), count, "loaded signature fonts")
                }
                Err(err) => {
                    tracing::warn!(dir = %dir.display(), %err, "failed to load signature fonts")
                }
            }
        }
        Self::with_rasterizer(config, fonts)
    }

    /// Editor rendering typed signatures with `rasterizer`
    pub fn with_rasterizer(
        config: EditorConfig,
        rasterizer: impl TextRasterizer + 'static,
    ) -> Self {
        let stamper = MetadataStamper::new();
        Self {
            drawing: DrawingPad::new(config.pad_width, config.pad_height),
            typed: TypedSignature::new(config.typed_font_size, config.typed_padding),
            rasterizer: Box::new(rasterizer),
            library: SignatureLibrary::new(),
            placement: PlacementController::new(PlacementDefaults::from(&config), stamper.clone()),
            overlay: Overlay::new(),
            interaction: InteractionEngine::new(config.min_signature_size),
            surface: PageSurface::from_aspect(config.page_width, 612.0, 792.0),
            page_count: None,
            stamper,
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // Provenance

    /// Resolve the public IP in the background using the configured endpoints
    ///
    /// Only the first call per session starts a lookup.
    pub fn start_ip_resolution(&self) -> Option<ResolutionHandle> {
        self.start_ip_resolution_with(HttpIpLookup::new(self.config.lookup.clone()))
    }

    pub fn start_ip_resolution_with<L: IpLookup + 'static>(
        &self,
        lookup: L,
    ) -> Option<ResolutionHandle> {
        self.stamper.spawn_resolution(lookup)
    }

    pub fn stamper(&self) -> &MetadataStamper {
        &self.stamper
    }

    // Capture

    pub fn drawing_pad(&self) -> &DrawingPad {
        &self.drawing
    }

    /// Drawing surface for forwarding pointer events
    pub fn drawing_pad_mut(&mut self) -> &mut DrawingPad {
        &mut self.drawing
    }

    pub fn typed_input(&self) -> &TypedSignature {
        &self.typed
    }

    pub fn typed_input_mut(&mut self) -> &mut TypedSignature {
        &mut self.typed
    }

    /// Rasterize the drawing into a new library asset
    pub fn commit_drawing(&mut self) -> EditorResult<AssetId> {
        let asset = self.drawing.commit()?;
        Ok(self.library.add(asset))
    }

    pub fn clear_drawing(&mut self) {
        self.drawing.clear();
    }

    /// Render the typed name into a new library asset
    pub fn commit_typed(&mut self) -> EditorResult<AssetId> {
        let asset = self.typed.commit(self.rasterizer.as_ref())?;
        Ok(self.library.add(asset))
    }

    // Library

    /// Library assets in insertion order
    pub fn library(&self) -> &[Arc<SignatureAsset>] {
        self.library.list()
    }

    fn asset(&self, id: AssetId) -> EditorResult<Arc<SignatureAsset>> {
        self.library.get(id).ok_or(EditorError::UnknownAsset(id))
    }

    /// Remove an asset from the library; placed copies are unaffected
    pub fn delete_library_asset(&mut self, id: AssetId) -> EditorResult<()> {
        self.library
            .remove(id)
            .map(|_| ())
            .ok_or(EditorError::UnknownAsset(id))
    }

    // Placement

    pub fn place_by_click(&mut self, asset_id: AssetId) -> EditorResult<PlacementId> {
        let asset = self.asset(asset_id)?;
        Ok(self.placement.place_by_click(&mut self.overlay, &asset))
    }

    /// Begin dragging a library asset toward the page
    pub fn start_asset_drag(&mut self, asset_id: AssetId) -> EditorResult<()> {
        let asset = self.asset(asset_id)?;
        self.placement.drag_start(asset);
        Ok(())
    }

    /// Whether the page would accept a drop now
    pub fn drag_over(&self) -> bool {
        self.placement.drag_over()
    }

    /// Drop the in-flight asset at a viewport point
    ///
    /// `surface_origin` is the viewport position of the page's top-left corner.
    pub fn drop_asset(&mut self, pointer: Point, surface_origin: Point) -> Option<PlacementId> {
        self.placement
            .drop_on_surface(&mut self.overlay, pointer, surface_origin)
    }

    pub fn end_asset_drag(&mut self) {
        self.placement.drag_end();
    }

    pub fn add_text(&mut self) -> PlacementId {
        self.placement.add_text(&mut self.overlay)
    }

    // Overlay

    /// Current overlay snapshot
    pub fn snapshot(&self) -> Arc<OverlaySnapshot> {
        self.overlay.snapshot()
    }

    pub fn edit_text_content(
        &mut self,
        id: PlacementId,
        content: impl Into<String>,
    ) -> EditorResult<()> {
        self.overlay.set_text_content(id, content.into())
    }

    pub fn change_text_font(&mut self, id: PlacementId, font: TextFont) -> EditorResult<()> {
        self.overlay.set_text_font(id, font)
    }

    pub fn delete_signature(&mut self, id: PlacementId) -> EditorResult<()> {
        let removed = self.overlay.remove_signature(id)?;
        tracing::debug!(placement = %removed.id(), "signature deleted");
        Ok(())
    }

    pub fn delete_text(&mut self, id: PlacementId) -> EditorResult<()> {
        let removed = self.overlay.remove_text(id)?;
        tracing::debug!(placement = %removed.id(), "text deleted");
        Ok(())
    }

    // Gestures

    /// Start dragging a placed item
    ///
    /// `rendered` is the host-measured size of a text label, if known.
    /// Returns `Ok(None)` when the press belongs to a child control.
    pub fn begin_drag(
        &self,
        item: ItemRef,
        press: PointerPress,
        rendered: Option<Size>,
    ) -> EditorResult<Option<DragSession>> {
        Ok(self
            .interaction
            .begin_drag(self.overlay.current(), self.surface, item, press, rendered)?)
    }

    pub fn end_drag(&mut self, session: DragSession) -> EditorResult<Point> {
        session.end(&mut self.overlay)
    }

    pub fn cancel_drag(&self, session: DragSession) -> Point {
        session.cancel()
    }

    pub fn begin_resize(
        &self,
        signature_id: PlacementId,
        press: PointerPress,
    ) -> EditorResult<Option<ResizeSession>> {
        Ok(self
            .interaction
            .begin_resize(self.overlay.current(), signature_id, press)?)
    }

    pub fn end_resize(&mut self, session: ResizeSession) -> EditorResult<Size> {
        session.end(&mut self.overlay)
    }

    pub fn cancel_resize(&self, session: ResizeSession) -> Size {
        session.cancel()
    }

    // Page

    /// Render page 1 and size the page surface from it
    ///
    /// A failure is returned to the host and leaves the overlay and the
    /// previous surface untouched.
    pub fn load_page(&mut self, renderer: &dyn PageRenderer) -> Result<RenderedPage, RenderError> {
        match render_first_page(renderer, self.config.page_width) {
            Ok(page) => {
                self.surface = page.surface(self.config.page_width);
                self.page_count = Some(page.page_count);
                Ok(page)
            }
            Err(err) => {
                tracing::warn!(%err, "page render failed");
                Err(err)
            }
        }
    }

    pub fn surface(&self) -> PageSurface {
        self.surface
    }

    /// Number of pages in the loaded document
    pub fn page_count(&self) -> Option<u32> {
        self.page_count
    }

    // Export

    pub fn export(&self) -> OverlayExport {
        OverlayExport::from_snapshot(self.overlay.current(), self.surface)
    }

    /// Write the overlay description next to the document
    pub fn export_sidecar(&self, pdf_path: &Path) -> Result<PathBuf, ExportError> {
        self.export().write_sidecar(pdf_path)
    }
}

impl Default for SigningEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{ControlKind, PressTarget};
    use crate::page::tests::{BlankRenderer, BrokenRenderer};
    use image::{Rgba, RgbaImage};
    use pdf_signer_capture::{CaptureError, CaptureResult, SignatureFont, SourceType, StrokePoint};

    /// 8px per char, height equal to size
    struct FixedRasterizer;

    impl TextRasterizer for FixedRasterizer {
        fn measure(
            &self,
            text: &str,
            _font: SignatureFont,
            size: f32,
        ) -> CaptureResult<(u32, u32)> {
            Ok((text.chars().count() as u32 * 8, size as u32))
        }

        fn draw(
            &self,
            canvas: &mut RgbaImage,
            _text: &str,
            _font: SignatureFont,
            _size: f32,
            origin: (i32, i32),
            color: Rgba<u8>,
        ) -> CaptureResult<()> {
            canvas.put_pixel(origin.0 as u32, origin.1 as u32, color);
            Ok(())
        }
    }

    fn editor() -> SigningEditor {
        SigningEditor::with_rasterizer(EditorConfig::default(), FixedRasterizer)
    }

    fn draw_line(editor: &mut SigningEditor) {
        let pad = editor.drawing_pad_mut();
        pad.pointer_down(StrokePoint::new(10.0, 10.0));
        pad.pointer_move(StrokePoint::new(60.0, 30.0));
        pad.pointer_up();
    }

    #[test]
    fn test_commit_drawing_adds_asset() {
        let mut editor = editor();
        draw_line(&mut editor);

        let id = editor.commit_drawing().unwrap();
        assert_eq!(editor.library().len(), 1);
        assert_eq!(editor.library()[0].id(), id);
        assert!(editor.drawing_pad().is_empty());
    }

    #[test]
    fn test_empty_drawing_is_validation_error() {
        let mut editor = editor();
        let err = editor.commit_drawing().unwrap_err();
        assert!(matches!(err, EditorError::Capture(CaptureError::EmptyDrawing)));
        assert!(editor.library().is_empty());
    }

    #[test]
    fn test_clear_drawing_discards_strokes() {
        let mut editor = editor();
        draw_line(&mut editor);
        editor.clear_drawing();
        assert!(editor.drawing_pad().is_empty());
        assert!(editor.commit_drawing().is_err());
    }

    #[test]
    fn test_commit_typed() {
        let mut editor = editor();
        editor.typed_input_mut().set_text("   ");
        assert!(editor.commit_typed().is_err());
        assert_eq!(editor.typed_input().text(), "   ");

        editor.typed_input_mut().set_text("Ines");
        let id = editor.commit_typed().unwrap();
        let asset = &editor.library()[0];
        assert_eq!(asset.id(), id);
        assert_eq!(asset.source_type(), SourceType::Typed);
        assert_eq!(asset.original_text(), Some("Ines"));
    }

    #[test]
    fn test_place_unknown_asset() {
        let mut editor = editor();
        let missing = AssetId::new_v4();
        assert!(matches!(
            editor.place_by_click(missing),
            Err(EditorError::UnknownAsset(id)) if id == missing
        ));
        assert!(editor.start_asset_drag(missing).is_err());
        assert!(!editor.drag_over());
    }

    #[test]
    fn test_drag_from_library_and_drop() {
        let mut editor = editor();
        draw_line(&mut editor);
        let asset = editor.commit_drawing().unwrap();

        editor.start_asset_drag(asset).unwrap();
        assert!(editor.drag_over());
        let placed = editor
            .drop_asset(Point::new(260.0, 200.0), Point::new(60.0, 50.0))
            .unwrap();
        editor.end_asset_drag();

        let snap = editor.snapshot();
        assert_eq!(snap.signature(placed).unwrap().origin(), Point::new(140.0, 120.0));
        assert!(!editor.drag_over());
    }

    #[test]
    fn test_drag_gesture_roundtrip() {
        let mut editor = editor();
        let text = editor.add_text();
        let item = ItemRef::Text(text);

        let mut session = editor
            .begin_drag(item, PointerPress::body(5.0, 5.0), Some(Size::new(100.0, 20.0)))
            .unwrap()
            .unwrap();
        session.update(Point::new(105.0, 45.0));
        let end = editor.end_drag(session).unwrap();

        assert_eq!(end, Point::new(100.0, 40.0));
        assert_eq!(editor.snapshot().text(text).unwrap().origin(), end);
    }

    #[test]
    fn test_cancelled_drag_leaves_item_in_place() {
        let mut editor = editor();
        let text = editor.add_text();
        let before = editor.snapshot().revision();

        let mut session = editor
            .begin_drag(ItemRef::Text(text), PointerPress::body(0.0, 0.0), None)
            .unwrap()
            .unwrap();
        session.update(Point::new(300.0, 300.0));
        assert_eq!(editor.cancel_drag(session), Point::new(0.0, 0.0));

        assert_eq!(editor.snapshot().revision(), before);
        assert_eq!(editor.snapshot().text(text).unwrap().origin(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_press_on_text_input_does_not_drag() {
        let mut editor = editor();
        let text = editor.add_text();
        let press = PointerPress::new(
            Point::new(2.0, 2.0),
            PressTarget::Control(ControlKind::TextInput),
        );
        assert!(editor
            .begin_drag(ItemRef::Text(text), press, None)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_busy_item_is_reported() {
        let mut editor = editor();
        draw_line(&mut editor);
        let asset = editor.commit_drawing().unwrap();
        let sig = editor.place_by_click(asset).unwrap();

        let _drag = editor
            .begin_drag(ItemRef::Signature(sig), PointerPress::body(60.0, 60.0), None)
            .unwrap()
            .unwrap();
        let err = editor
            .begin_resize(sig, PointerPress::resize_handle(170.0, 110.0))
            .unwrap_err();
        assert!(matches!(err, EditorError::Interaction(_)));
    }

    #[test]
    fn test_resize_gesture() {
        let mut editor = editor();
        draw_line(&mut editor);
        let asset = editor.commit_drawing().unwrap();
        let sig = editor.place_by_click(asset).unwrap();

        let mut session = editor
            .begin_resize(sig, PointerPress::resize_handle(170.0, 110.0))
            .unwrap()
            .unwrap();
        session.update(Point::new(100.0, 60.0));
        assert_eq!(editor.end_resize(session).unwrap(), Size::new(50.0, 30.0));
        assert_eq!(editor.snapshot().signature(sig).unwrap().size(), Size::new(50.0, 30.0));
    }

    #[test]
    fn test_text_edits() {
        let mut editor = editor();
        let id = editor.add_text();
        editor.edit_text_content(id, "Witness").unwrap();
        editor.change_text_font(id, TextFont::Mono).unwrap();

        let snap = editor.snapshot();
        let text = snap.text(id).unwrap();
        assert_eq!(text.content(), "Witness");
        assert_eq!(text.font(), TextFont::Mono);

        editor.delete_text(id).unwrap();
        assert!(editor.delete_text(id).is_err());
        assert!(editor.edit_text_content(id, "gone").is_err());
    }

    #[test]
    fn test_load_page_sizes_surface() {
        let mut editor = editor();
        let page = editor.load_page(&BlankRenderer::letter(2)).unwrap();
        assert_eq!(page.page_count, 2);
        assert_eq!(editor.page_count(), Some(2));
        assert_eq!(editor.surface().width, 600.0);
    }

    #[test]
    fn test_failed_page_load_keeps_overlay() {
        let mut editor = editor();
        let text = editor.add_text();
        let surface = editor.surface();

        assert!(editor.load_page(&BrokenRenderer).is_err());
        assert!(editor.snapshot().text(text).is_some());
        assert_eq!(editor.surface(), surface);
        assert_eq!(editor.page_count(), None);
    }

    #[test]
    fn test_export_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = editor();
        editor.add_text();

        let path = editor.export_sidecar(&dir.path().join("form.pdf")).unwrap();
        assert!(path.exists());
        assert_eq!(editor.export().texts.len(), 1);
    }

    #[test]
    fn test_delete_library_asset() {
        let mut editor = editor();
        draw_line(&mut editor);
        let asset = editor.commit_drawing().unwrap();
        editor.delete_library_asset(asset).unwrap();
        assert!(editor.library().is_empty());
        assert!(matches!(
            editor.delete_library_asset(asset),
            Err(EditorError::UnknownAsset(_))
        ));
    }
}
