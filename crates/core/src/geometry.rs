//! Surface-space geometry
//!
//! All placed-item coordinates are in page-surface space:
//! - Origin (0, 0) at the top-left of the rendered page
//! - X increases to the right
//! - Y increases downward
//! - Units are surface pixels

/// Point in page-surface space
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - origin`
    pub fn offset_from(&self, origin: &Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }

    pub fn distance_to(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned box anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn right(&self) -> f32 {
        self.origin.x + self.size.width
    }

    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.height
    }

    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.origin.x
            && point.x <= self.right()
            && point.y >= self.origin.y
            && point.y <= self.bottom()
    }

    /// Whether this box lies entirely inside `outer`
    pub fn is_within(&self, outer: &Rect) -> bool {
        self.origin.x >= outer.origin.x
            && self.origin.y >= outer.origin.y
            && self.right() <= outer.right()
            && self.bottom() <= outer.bottom()
    }
}

/// The rendered page that items are placed on
///
/// Width is fixed by configuration; height follows the page's aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PageSurface {
    pub width: f32,
    pub height: f32,
}

impl PageSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Surface of `width` for a page of the given intrinsic size
    pub fn from_aspect(width: f32, page_width: f32, page_height: f32) -> Self {
        let height = if page_width > 0.0 {
            width * page_height / page_width
        } else {
            0.0
        };
        Self { width, height }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(Point::default(), Size::new(self.width, self.height))
    }

    /// Clamp a top-left corner so a box of `size` stays on the surface
    ///
    /// A box larger than the surface is pinned to the origin on that axis.
    pub fn clamp_origin(&self, origin: Point, size: Size) -> Point {
        let max_x = (self.width - size.width).max(0.0);
        let max_y = (self.height - size.height).max(0.0);
        Point::new(origin.x.clamp(0.0, max_x), origin.y.clamp(0.0, max_y))
    }
}

/// US Letter at 600px wide, used until a page has been rendered
impl Default for PageSurface {
    fn default() -> Self {
        Self::from_aspect(600.0, 612.0, 792.0)
    }
}
