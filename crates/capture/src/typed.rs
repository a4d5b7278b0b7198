//! Typed signatures
//!
//! Renders a name in one of five handwriting-style fonts onto a bitmap that is
//! cropped to the inked area of the text plus a fixed padding.

use ab_glyph::{point, Font, FontArc, OutlinedGlyph, PxScale, Rect, ScaleFont};
use image::{Rgba, RgbaImage};
use std::collections::HashMap;

use crate::asset::{ImageData, SignatureAsset};
use crate::error::{CaptureError, CaptureResult};

/// Handwriting styles offered for typed signatures
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureFont {
    #[default]
    DancingScript,
    GreatVibes,
    Pacifico,
    Satisfy,
    Caveat,
}

impl SignatureFont {
    pub const ALL: [SignatureFont; 5] = [
        SignatureFont::DancingScript,
        SignatureFont::GreatVibes,
        SignatureFont::Pacifico,
        SignatureFont::Satisfy,
        SignatureFont::Caveat,
    ];

    /// Family name as shown in a font picker
    pub fn family_name(&self) -> &'static str {
        match self {
            SignatureFont::DancingScript => "Dancing Script",
            SignatureFont::GreatVibes => "Great Vibes",
            SignatureFont::Pacifico => "Pacifico",
            SignatureFont::Satisfy => "Satisfy",
            SignatureFont::Caveat => "Caveat",
        }
    }

    /// Conventional file stem used when loading fonts from a directory
    pub fn file_stem(&self) -> &'static str {
        match self {
            SignatureFont::DancingScript => "DancingScript-Regular",
            SignatureFont::GreatVibes => "GreatVibes-Regular",
            SignatureFont::Pacifico => "Pacifico-Regular",
            SignatureFont::Satisfy => "Satisfy-Regular",
            SignatureFont::Caveat => "Caveat-Regular",
        }
    }
}

/// Measures and draws text for typed signatures
///
/// Both operations work on the ink box: the tight bounds of the pixels the
/// glyphs actually cover, not the font's line metrics.
pub trait TextRasterizer {
    /// (width, height) of the ink box of `text` at `size` pixels
    fn measure(&self, text: &str, font: SignatureFont, size: f32) -> CaptureResult<(u32, u32)>;

    /// Draw `text` with the top-left corner of its ink box at `origin`
    fn draw(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        font: SignatureFont,
        size: f32,
        origin: (i32, i32),
        color: Rgba<u8>,
    ) -> CaptureResult<()>;
}

/// Font faces for each signature style, parsed with `ab_glyph`
#[derive(Default, Clone)]
pub struct FontBook {
    faces: HashMap<SignatureFont, FontArc>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register TrueType/OpenType bytes for a style
    pub fn load(&mut self, font: SignatureFont, data: Vec<u8>) -> CaptureResult<()> {
        let face = FontArc::try_from_vec(data).map_err(|e| CaptureError::InvalidFont {
            font,
            reason: e.to_string(),
        })?;
        self.faces.insert(font, face);
        Ok(())
    }

    /// Load every style whose `<file_stem>.ttf` exists in `dir`
    ///
    /// Returns the number of faces loaded. Missing files are skipped so a host
    /// can ship a subset of the styles.
    pub fn load_dir(&mut self, dir: &std::path::Path) -> CaptureResult<usize> {
        let mut loaded = 0;
        for font in SignatureFont::ALL {
            let path = dir.join(format!("{}.ttf", font.file_stem()));
            match std::fs::read(&path) {
                Ok(data) => {
                    self.load(font, data)?;
                    loaded += 1;
                }
                Err(err) => {
                    tracing::debug!(path = %path.display(), %err, "signature font not found");
                }
            }
        }
        Ok(loaded)
    }

    pub fn contains(&self, font: SignatureFont) -> bool {
        self.faces.contains_key(&font)
    }

    fn face(&self, font: SignatureFont) -> CaptureResult<&FontArc> {
        self.faces
            .get(&font)
            .ok_or(CaptureError::FontUnavailable(font))
    }
}

/// Outlined glyphs of a single line of text and the ink box they cover
struct InkLayout {
    glyphs: Vec<OutlinedGlyph>,
    ink: Rect,
}

impl InkLayout {
    /// Lay `text` out on one baseline; `None` when nothing would be inked
    fn new(face: &FontArc, text: &str, size: f32) -> Option<Self> {
        let scale = PxScale::from(size);
        let scaled = face.as_scaled(scale);

        let mut caret = 0.0;
        let mut previous = None;
        let mut glyphs = Vec::new();
        let mut ink: Option<Rect> = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, scaled.ascent()));
            if let Some(outlined) = face.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                ink = Some(match ink {
                    Some(acc) => Rect {
                        min: point(acc.min.x.min(bounds.min.x), acc.min.y.min(bounds.min.y)),
                        max: point(acc.max.x.max(bounds.max.x), acc.max.y.max(bounds.max.y)),
                    },
                    None => bounds,
                });
                glyphs.push(outlined);
            }
            caret += scaled.h_advance(id);
            previous = Some(id);
        }

        ink.map(|ink| Self { glyphs, ink })
    }

    fn size(&self) -> (u32, u32) {
        (
            (self.ink.max.x - self.ink.min.x).ceil() as u32,
            (self.ink.max.y - self.ink.min.y).ceil() as u32,
        )
    }
}

impl TextRasterizer for FontBook {
    fn measure(&self, text: &str, font: SignatureFont, size: f32) -> CaptureResult<(u32, u32)> {
        let face = self.face(font)?;
        Ok(InkLayout::new(face, text, size).map_or((0, 0), |layout| layout.size()))
    }

    fn draw(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        font: SignatureFont,
        size: f32,
        origin: (i32, i32),
        color: Rgba<u8>,
    ) -> CaptureResult<()> {
        let face = self.face(font)?;
        let Some(layout) = InkLayout::new(face, text, size) else {
            return Ok(());
        };

        let (width, height) = canvas.dimensions();
        for glyph in &layout.glyphs {
            let bounds = glyph.px_bounds();
            let left = origin.0 + (bounds.min.x - layout.ink.min.x) as i32;
            let top = origin.1 + (bounds.min.y - layout.ink.min.y) as i32;
            glyph.draw(|gx, gy, coverage| {
                let x = left + gx as i32;
                let y = top + gy as i32;
                if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                    return;
                }
                // Source-over with a single ink color only changes alpha
                let alpha = coverage.clamp(0.0, 1.0) * f32::from(color[3]) / 255.0;
                let pixel = canvas.get_pixel_mut(x as u32, y as u32);
                let below = f32::from(pixel[3]) / 255.0;
                let out = alpha + below * (1.0 - alpha);
                *pixel = Rgba([color[0], color[1], color[2], (out * 255.0).round() as u8]);
            });
        }
        Ok(())
    }
}

/// Text input state of the "type your signature" surface
#[derive(Debug, Clone)]
pub struct TypedSignature {
    text: String,
    font: SignatureFont,
    font_size: f32,
    /// Total padding added to each dimension, split evenly on both sides
    padding: u32,
    color: Rgba<u8>,
}

impl TypedSignature {
    pub fn new(font_size: f32, padding: u32) -> Self {
        Self {
            text: String::new(),
            font: SignatureFont::default(),
            font_size,
            padding,
            color: Rgba([0, 0, 0, 255]),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn font(&self) -> SignatureFont {
        self.font
    }

    pub fn set_font(&mut self, font: SignatureFont) {
        self.font = font;
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Bitmap size for the current text: ink box plus padding
    pub fn canvas_size(&self, rasterizer: &dyn TextRasterizer) -> CaptureResult<(u32, u32)> {
        let (width, height) = rasterizer.measure(&self.text, self.font, self.font_size)?;
        Ok((width + self.padding, height + self.padding))
    }

    /// Render the current text into a new typed asset
    ///
    /// Blank input yields [`CaptureError::BlankText`] and leaves the text in
    /// place. On success the input is cleared.
    pub fn commit(&mut self, rasterizer: &dyn TextRasterizer) -> CaptureResult<SignatureAsset> {
        if self.text.trim().is_empty() {
            tracing::debug!("typed commit rejected: blank input");
            return Err(CaptureError::BlankText);
        }

        let (width, height) = self.canvas_size(rasterizer)?;
        let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
        let inset = (self.padding / 2) as i32;
        rasterizer.draw(
            &mut canvas,
            &self.text,
            self.font,
            self.font_size,
            (inset, inset),
            self.color,
        )?;

        let image = ImageData::encode(&canvas)?;
        let asset = SignatureAsset::typed(image, self.text.clone(), self.font);
        tracing::debug!(
            asset_id = %asset.id(),
            font = self.font.family_name(),
            width,
            height,
            "committed typed signature"
        );
        self.text.clear();
        Ok(asset)
    }
}
