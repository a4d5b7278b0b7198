use image::{Rgba, RgbaImage};
use pdf_signer_core::capture::{CaptureResult, SignatureFont, StrokePoint, TextRasterizer};
use pdf_signer_core::provenance::{IpLookup, LookupError, UNKNOWN_IP};
use pdf_signer_core::{
    EditorConfig, ItemRef, PageSurface, Point, PointerPress, Size, SigningEditor,
};
use std::sync::mpsc;
use std::sync::Mutex;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

struct MonoRasterizer;

impl TextRasterizer for MonoRasterizer {
    fn measure(&self, text: &str, _font: SignatureFont, size: f32) -> CaptureResult<(u32, u32)> {
        Ok((text.chars().count() as u32 * 12, size as u32))
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
    init_tracing();
    SigningEditor::with_rasterizer(EditorConfig::default(), MonoRasterizer)
}

fn drawn_asset(editor: &mut SigningEditor) -> pdf_signer_core::capture::AssetId {
    let pad = editor.drawing_pad_mut();
    pad.pointer_down(StrokePoint::new(20.0, 20.0));
    pad.pointer_move(StrokePoint::new(120.0, 80.0));
    pad.pointer_up();
    editor.commit_drawing().expect("non-empty drawing should commit")
}

/// Both endpoints down
struct OfflineLookup;

impl IpLookup for OfflineLookup {
    fn primary(&self) -> Result<String, LookupError> {
        Err(LookupError::Network("offline".into()))
    }

    fn fallback(&self) -> Result<String, LookupError> {
        Err(LookupError::Network("offline".into()))
    }
}

/// Answers once the test opens the gate
struct GatedLookup {
    gate: Mutex<mpsc::Receiver<()>>,
}

impl IpLookup for GatedLookup {
    fn primary(&self) -> Result<String, LookupError> {
        let gate = self.gate.lock().map_err(|_| LookupError::WorkerPanicked)?;
        gate.recv().map_err(|e| LookupError::Network(e.to_string()))?;
        Ok("198.51.100.23".to_string())
    }

    fn fallback(&self) -> Result<String, LookupError> {
        Err(LookupError::Network("unused".into()))
    }
}

#[test]
fn test_drawing_commit_yields_one_asset_and_resets_pad() {
    let mut editor = editor();
    drawn_asset(&mut editor);

    assert_eq!(editor.library().len(), 1);
    assert!(editor.drawing_pad().is_empty());
}

#[test]
fn test_blank_typed_input_creates_nothing_and_stays_open() {
    let mut editor = editor();
    for input in ["", "   ", "\t\n"] {
        editor.typed_input_mut().set_text(input);
        assert!(editor.commit_typed().is_err());
        assert_eq!(editor.typed_input().text(), input);
    }
    assert!(editor.library().is_empty());
}

#[test]
fn test_click_placements_are_independent_copies() {
    let mut editor = editor();
    let asset = drawn_asset(&mut editor);

    let first = editor.place_by_click(asset).expect("asset exists");
    let second = editor.place_by_click(asset).expect("asset exists");
    assert_ne!(first, second);

    let snap = editor.snapshot();
    for id in [first, second] {
        let sig = snap.signature(id).expect("placed");
        assert_eq!(sig.origin(), Point::new(50.0, 50.0));
        assert_eq!(sig.size(), Size::new(120.0, 60.0));
    }

    editor.delete_signature(first).expect("placed");
    let snap = editor.snapshot();
    assert!(snap.signature(first).is_none());
    assert!(snap.signature(second).is_some());
    assert_eq!(editor.library().len(), 1);
    assert_eq!(editor.library()[0].id(), asset);
}

#[test]
fn test_removing_library_asset_keeps_placed_copy() {
    let mut editor = editor();
    let asset = drawn_asset(&mut editor);
    let bitmap = editor.library()[0].image().clone();
    let placed = editor.place_by_click(asset).expect("asset exists");
    let before = editor.snapshot();

    editor.delete_library_asset(asset).expect("asset exists");

    let after = editor.snapshot();
    let sig = after.signature(placed).expect("copy survives");
    assert_eq!(sig, before.signature(placed).expect("placed"));
    assert_eq!(sig.image(), &bitmap);
}

#[test]
fn test_resize_floors_exactly_at_minimum() {
    let mut editor = editor();
    let asset = drawn_asset(&mut editor);
    let sig = editor.place_by_click(asset).expect("asset exists");

    let mut session = editor
        .begin_resize(sig, PointerPress::resize_handle(170.0, 110.0))
        .expect("not busy")
        .expect("press on handle");

    assert_eq!(session.update(Point::new(-500.0, -500.0)), Size::new(50.0, 30.0));
    assert_eq!(session.update(Point::new(100.0, 80.0)), Size::new(50.0, 30.0));
    assert_eq!(session.update(Point::new(101.0, 81.0)), Size::new(51.0, 31.0));

    editor.end_resize(session).expect("still placed");
}

#[test]
fn test_every_drag_step_stays_on_the_page() {
    let mut editor = editor();
    let asset = drawn_asset(&mut editor);
    let sig = editor.place_by_click(asset).expect("asset exists");
    let surface: PageSurface = editor.surface();

    let mut session = editor
        .begin_drag(ItemRef::Signature(sig), PointerPress::body(60.0, 60.0), None)
        .expect("not busy")
        .expect("press on body");

    // sweep well past every edge
    let mut step = 0;
    for x in (-400..=1000).step_by(37) {
        for y in (-400..=1200).step_by(53) {
            step += 1;
            session.update(Point::new(x as f32, y as f32));
            let bounds = session.bounds();
            assert!(
                bounds.is_within(&surface.bounds()),
                "step {step} left the page: {bounds:?}"
            );
        }
    }

    let end = editor.end_drag(session).expect("still placed");
    let snap = editor.snapshot();
    let placed = snap.signature(sig).expect("placed");
    assert_eq!(placed.origin(), end);
    assert!(placed.bounds().is_within(&surface.bounds()));
}

#[test]
fn test_drop_centers_signature_on_pointer() {
    let mut editor = editor();
    let asset = drawn_asset(&mut editor);

    editor.start_asset_drag(asset).expect("asset exists");
    let id = editor
        .drop_asset(Point::new(200.0, 150.0), Point::new(0.0, 0.0))
        .expect("asset in flight");
    editor.end_asset_drag();

    assert_eq!(
        editor.snapshot().signature(id).expect("placed").origin(),
        Point::new(140.0, 120.0)
    );
}

#[test]
fn test_drag_without_move_pulls_dropped_item_onto_page() {
    let mut editor = editor();
    let asset = drawn_asset(&mut editor);
    let surface = editor.surface();

    editor.start_asset_drag(asset).expect("asset exists");
    let id = editor
        .drop_asset(Point::new(10.0, 5.0), Point::new(0.0, 0.0))
        .expect("asset in flight");
    editor.end_asset_drag();
    assert_eq!(
        editor.snapshot().signature(id).expect("placed").origin(),
        Point::new(-50.0, -25.0)
    );

    let session = editor
        .begin_drag(ItemRef::Signature(id), PointerPress::body(0.0, 0.0), None)
        .expect("not busy")
        .expect("press on body");
    let end = editor.end_drag(session).expect("still placed");

    assert_eq!(end, Point::new(0.0, 0.0));
    let snap = editor.snapshot();
    assert!(snap
        .signature(id)
        .expect("placed")
        .bounds()
        .is_within(&surface.bounds()));
}

#[test]
fn test_added_texts_share_defaults() {
    let mut editor = editor();
    let a = editor.add_text();
    let b = editor.add_text();
    assert_ne!(a, b);

    let snap = editor.snapshot();
    let (ta, tb) = (snap.text(a).expect("added"), snap.text(b).expect("added"));
    assert_eq!(ta.content(), tb.content());
    assert_eq!(ta.font(), tb.font());
    assert_eq!(ta.font_size(), tb.font_size());
    assert_eq!(ta.origin(), tb.origin());
}

#[test]
fn test_failed_lookup_stamps_unknown_on_every_placement() {
    let mut editor = editor();
    let asset = drawn_asset(&mut editor);

    let handle = editor
        .start_ip_resolution_with(OfflineLookup)
        .expect("first resolution");
    assert_eq!(handle.wait().expect("worker finished"), UNKNOWN_IP);

    for _ in 0..3 {
        let id = editor.place_by_click(asset).expect("asset exists");
        assert_eq!(
            editor.snapshot().signature(id).expect("placed").metadata().ip_address,
            UNKNOWN_IP
        );
    }
}

#[test]
fn test_early_placements_are_never_retro_updated() {
    let mut editor = editor();
    let asset = drawn_asset(&mut editor);
    let (release, gate) = mpsc::channel();

    let handle = editor
        .start_ip_resolution_with(GatedLookup {
            gate: Mutex::new(gate),
        })
        .expect("first resolution");
    let early = editor.place_by_click(asset).expect("asset exists");

    release.send(()).expect("worker waiting");
    assert_eq!(handle.wait().expect("worker finished"), "198.51.100.23");
    let late = editor.place_by_click(asset).expect("asset exists");

    let snap = editor.snapshot();
    assert_eq!(snap.signature(early).expect("placed").metadata().ip_address, UNKNOWN_IP);
    assert_eq!(
        snap.signature(late).expect("placed").metadata().ip_address,
        "198.51.100.23"
    );
    assert!(editor.start_ip_resolution_with(OfflineLookup).is_none());
}
