//! Freehand signature pad
//!
//! Accumulates pointer strokes in pad-local pixel coordinates and rasterizes
//! them to a transparent PNG on commit. Pointer handling follows the
//! down/move/up shape of a mouse-driven input handler: a stroke begins on
//! press, grows on every move while pressed, and ends on release.

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;

use crate::asset::{ImageData, SignatureAsset};
use crate::error::{CaptureError, CaptureResult};

/// Point on the drawing pad (pixels, origin top-left)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
}

impl StrokePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    fn lerp(&self, other: &StrokePoint, t: f32) -> StrokePoint {
        StrokePoint::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    fn distance_to(&self, other: &StrokePoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Pen used to ink strokes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenStyle {
    pub color: Rgba<u8>,
    /// Stroke width in pixels
    pub width: f32,
}

impl Default for PenStyle {
    fn default() -> Self {
        Self {
            color: Rgba([0, 0, 0, 255]),
            width: 2.0,
        }
    }
}

/// One continuous pen-down gesture
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stroke {
    points: Vec<StrokePoint>,
}

impl Stroke {
    pub fn points(&self) -> &[StrokePoint] {
        &self.points
    }
}

/// Freehand drawing surface
#[derive(Debug, Clone)]
pub struct DrawingPad {
    width: u32,
    height: u32,
    pen: PenStyle,
    strokes: Vec<Stroke>,
    /// Stroke currently being drawn (pointer held)
    active: Option<Stroke>,
}

impl DrawingPad {
    /// Create an empty pad of the given pixel size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pen: PenStyle::default(),
            strokes: Vec::new(),
            active: None,
        }
    }

    pub fn with_pen(mut self, pen: PenStyle) -> Self {
        self.pen = pen;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Finished strokes, oldest first
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Handle pointer press: start a new stroke
    pub fn pointer_down(&mut self, point: StrokePoint) {
        // A press without a matching release closes the previous stroke.
        self.finish_active();
        self.active = Some(Stroke {
            points: vec![point],
        });
    }

    /// Handle pointer motion; ignored unless a stroke is in progress
    pub fn pointer_move(&mut self, point: StrokePoint) {
        if let Some(stroke) = self.active.as_mut() {
            stroke.points.push(point);
        }
    }

    /// Handle pointer release
    pub fn pointer_up(&mut self) {
        self.finish_active();
    }

    fn finish_active(&mut self) {
        if let Some(stroke) = self.active.take() {
            if !stroke.points.is_empty() {
                self.strokes.push(stroke);
            }
        }
    }

    /// Whether nothing has been drawn yet
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
            && self
                .active
                .as_ref()
                .map_or(true, |stroke| stroke.points.is_empty())
    }

    /// Discard all strokes without producing an asset
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.active = None;
    }

    /// Rasterize the current strokes into a new drawn asset
    ///
    /// On success the pad is reset. An empty pad yields
    /// [`CaptureError::EmptyDrawing`] and keeps its state.
    pub fn commit(&mut self) -> CaptureResult<SignatureAsset> {
        self.finish_active();
        if self.is_empty() {
            tracing::debug!("drawing commit rejected: pad is empty");
            return Err(CaptureError::EmptyDrawing);
        }

        let image = ImageData::encode(&self.rasterize())?;
        let asset = SignatureAsset::drawn(image);
        tracing::debug!(
            asset_id = %asset.id(),
            strokes = self.strokes.len(),
            "committed drawn signature"
        );
        self.clear();
        Ok(asset)
    }

    /// Render strokes onto a transparent canvas the size of the pad
    pub fn rasterize(&self) -> RgbaImage {
        let mut canvas = RgbaImage::from_pixel(self.width, self.height, Rgba([0, 0, 0, 0]));
        let radius = ((self.pen.width / 2.0).round() as i32).max(1);

        for stroke in &self.strokes {
            let points = stroke.points();
            if let [only] = points {
                if only.is_finite() {
                    stamp(&mut canvas, only, radius, self.pen.color);
                }
                continue;
            }
            for pair in points.windows(2) {
                // Only the part of a segment that can touch the canvas is inked
                let Some((start, end)) = clip_segment(&pair[0], &pair[1], &canvas, radius)
                else {
                    continue;
                };
                ink_segment(&mut canvas, &start, &end, radius, self.pen.color);
            }
        }

        canvas
    }
}

fn stamp(canvas: &mut RgbaImage, point: &StrokePoint, radius: i32, color: Rgba<u8>) {
    draw_filled_circle_mut(
        canvas,
        (point.x.round() as i32, point.y.round() as i32),
        radius,
        color,
    );
}

/// Part of the segment inside the canvas grown by `radius` on every side
///
/// Liang-Barsky clipping. `None` when the segment misses the canvas or has a
/// non-finite end.
fn clip_segment(
    start: &StrokePoint,
    end: &StrokePoint,
    canvas: &RgbaImage,
    radius: i32,
) -> Option<(StrokePoint, StrokePoint)> {
    if !start.is_finite() || !end.is_finite() {
        return None;
    }
    let margin = radius as f32 + 1.0;
    let (min_x, min_y) = (-margin, -margin);
    let max_x = canvas.width() as f32 + margin;
    let max_y = canvas.height() as f32 + margin;

    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let (mut t0, mut t1) = (0.0_f32, 1.0_f32);
    for (p, q) in [
        (-dx, start.x - min_x),
        (dx, max_x - start.x),
        (-dy, start.y - min_y),
        (dy, max_y - start.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }

    Some((start.lerp(end, t0), start.lerp(end, t1)))
}

/// Ink a segment by stamping round dabs at one-pixel spacing
fn ink_segment(
    canvas: &mut RgbaImage,
    start: &StrokePoint,
    end: &StrokePoint,
    radius: i32,
    color: Rgba<u8>,
) {
    let steps = start.distance_to(end).ceil().max(1.0) as usize;
    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        stamp(canvas, &start.lerp(end, t), radius, color);
    }
}
