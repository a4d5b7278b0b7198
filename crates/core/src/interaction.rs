//! Drag and resize interaction sessions
//!
//! A gesture is an explicit session: `begin` on pointer press, `update` for
//! every pointer move, `end` on release. A session only reads the item's
//! position from the overlay when it begins and writes the committed result
//! when it ends; in between, the live preview lives in the session.
//!
//! Each session holds a [`GestureLease`] on its item. The lease is released
//! when the session is consumed or dropped, so an abandoned gesture can never
//! leave an item locked. Dropping a session without `end()` commits nothing,
//! which leaves the item at its pre-gesture geometry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{EditorResult, InteractionError};
use crate::geometry::{PageSurface, Point, Rect, Size};
use crate::overlay::{ItemRef, Overlay, OverlaySnapshot, PlacementId};

/// Interactive child controls that consume presses instead of dragging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    TextInput,
    Button,
    Selector,
}

/// Where on a placed item a press landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressTarget {
    /// The item itself; starts a drag
    Body,
    /// The corner resize handle (signatures only)
    ResizeHandle,
    /// An interactive child control
    Control(ControlKind),
}

/// Pointer press in page-surface coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPress {
    pub position: Point,
    pub target: PressTarget,
}

impl PointerPress {
    pub fn new(position: Point, target: PressTarget) -> Self {
        Self { position, target }
    }

    pub fn body(x: f32, y: f32) -> Self {
        Self::new(Point::new(x, y), PressTarget::Body)
    }

    pub fn resize_handle(x: f32, y: f32) -> Self {
        Self::new(Point::new(x, y), PressTarget::ResizeHandle)
    }
}

/// Which gesture holds an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Drag,
    Resize,
}

impl std::fmt::Display for GestureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GestureKind::Drag => write!(f, "dragged"),
            GestureKind::Resize => write!(f, "resized"),
        }
    }
}

/// Tracks which items currently have an active gesture
///
/// The map is shared through `Arc<Mutex<_>>` so sessions and leases stay
/// `Send` and can live in host state that requires it.
#[derive(Debug, Clone, Default)]
pub struct GestureRegistry {
    active: Arc<Mutex<HashMap<ItemRef, GestureKind>>>,
}

impl GestureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ItemRef, GestureKind>> {
        // The map holds plain data; a panic mid-update cannot leave it torn.
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim `item` for a gesture, failing if another gesture holds it
    pub fn acquire(
        &self,
        item: ItemRef,
        kind: GestureKind,
    ) -> Result<GestureLease, InteractionError> {
        let mut active = self.lock();
        if let Some(held) = active.get(&item) {
            return Err(InteractionError::Busy {
                item,
                active: *held,
            });
        }
        active.insert(item, kind);
        Ok(GestureLease {
            item,
            kind,
            registry: self.clone(),
        })
    }

    /// Gesture currently holding `item`
    pub fn active(&self, item: ItemRef) -> Option<GestureKind> {
        self.lock().get(&item).copied()
    }

    pub fn active_count(&self) -> usize {
        self.lock().len()
    }
}

/// Exclusive claim on one item; released on drop
#[derive(Debug)]
pub struct GestureLease {
    item: ItemRef,
    kind: GestureKind,
    registry: GestureRegistry,
}

impl GestureLease {
    pub fn item(&self) -> ItemRef {
        self.item
    }

    pub fn kind(&self) -> GestureKind {
        self.kind
    }
}

impl Drop for GestureLease {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.item);
        tracing::trace!(item = %self.item, kind = ?self.kind, "gesture lease released");
    }
}

/// Bounded drag of one placed item
#[derive(Debug)]
pub struct DragSession {
    lease: GestureLease,
    start_pointer: Point,
    start_origin: Point,
    extent: Size,
    surface: PageSurface,
    current: Point,
}

impl DragSession {
    pub fn item(&self) -> ItemRef {
        self.lease.item()
    }

    /// Item position when the gesture began
    pub fn start_origin(&self) -> Point {
        self.start_origin
    }

    /// Live (clamped) position of the item
    pub fn current(&self) -> Point {
        self.current
    }

    /// Live bounding box of the item
    pub fn bounds(&self) -> Rect {
        Rect::new(self.current, self.extent)
    }

    /// Follow the pointer, keeping the item's box on the page surface
    pub fn update(&mut self, pointer: Point) -> Point {
        let delta = pointer.offset_from(&self.start_pointer);
        let proposed = Point::new(self.start_origin.x + delta.x, self.start_origin.y + delta.y);
        self.current = self.surface.clamp_origin(proposed, self.extent);
        self.current
    }

    /// Commit the final position and bring the item to the front
    pub fn end(self, overlay: &mut Overlay) -> EditorResult<Point> {
        overlay.commit_move(self.item(), self.current)?;
        tracing::debug!(
            item = %self.item(),
            x = self.current.x,
            y = self.current.y,
            "drag committed"
        );
        Ok(self.current)
    }

    /// Abandon the gesture; the item keeps its pre-gesture position
    pub fn cancel(self) -> Point {
        tracing::debug!(item = %self.item(), "drag cancelled");
        self.start_origin
    }
}

/// Corner-handle resize of one placed signature
#[derive(Debug)]
pub struct ResizeSession {
    lease: GestureLease,
    start_pointer: Point,
    start_size: Size,
    min_size: Size,
    current: Size,
}

impl ResizeSession {
    pub fn signature_id(&self) -> PlacementId {
        self.lease.item().id()
    }

    pub fn start_size(&self) -> Size {
        self.start_size
    }

    pub fn current(&self) -> Size {
        self.current
    }

    /// Apply cumulative pointer displacement, respecting the size floor
    pub fn update(&mut self, pointer: Point) -> Size {
        let delta = pointer.offset_from(&self.start_pointer);
        self.current = Size::new(
            (self.start_size.width + delta.x).max(self.min_size.width),
            (self.start_size.height + delta.y).max(self.min_size.height),
        );
        self.current
    }

    pub fn end(self, overlay: &mut Overlay) -> EditorResult<Size> {
        overlay.resize_signature(self.signature_id(), self.current)?;
        tracing::debug!(
            signature = %self.signature_id(),
            width = self.current.width,
            height = self.current.height,
            "resize committed"
        );
        Ok(self.current)
    }

    pub fn cancel(self) -> Size {
        tracing::debug!(signature = %self.signature_id(), "resize cancelled");
        self.start_size
    }
}

/// Starts gestures against overlay snapshots
#[derive(Debug, Clone)]
pub struct InteractionEngine {
    registry: GestureRegistry,
    min_size: Size,
}

impl InteractionEngine {
    /// `min_size` is the resize floor
    pub fn new(min_size: Size) -> Self {
        Self {
            registry: GestureRegistry::new(),
            min_size,
        }
    }

    pub fn registry(&self) -> &GestureRegistry {
        &self.registry
    }

    /// Begin dragging `item`
    ///
    /// Returns `Ok(None)` when the press belongs to a child control or the
    /// resize handle, which consume the gesture instead. `rendered` is the
    /// host-measured size of a text label; signatures use their own size.
    pub fn begin_drag(
        &self,
        snapshot: &OverlaySnapshot,
        surface: PageSurface,
        item: ItemRef,
        press: PointerPress,
        rendered: Option<Size>,
    ) -> Result<Option<DragSession>, InteractionError> {
        if press.target != PressTarget::Body {
            tracing::debug!(item = %item, target = ?press.target, "drag suppressed");
            return Ok(None);
        }

        let bounds = snapshot
            .bounds_of(item, rendered)
            .ok_or(InteractionError::UnknownItem(item))?;
        let lease = self.registry.acquire(item, GestureKind::Drag)?;
        tracing::debug!(item = %item, x = bounds.origin.x, y = bounds.origin.y, "drag started");

        // A dropped item may start partly off the page; even a drag with no
        // moves must end inside it.
        Ok(Some(DragSession {
            lease,
            start_pointer: press.position,
            start_origin: bounds.origin,
            extent: bounds.size,
            surface,
            current: surface.clamp_origin(bounds.origin, bounds.size),
        }))
    }

    /// Begin resizing a signature from its corner handle
    ///
    /// Returns `Ok(None)` unless the press landed on the resize handle.
    pub fn begin_resize(
        &self,
        snapshot: &OverlaySnapshot,
        signature_id: PlacementId,
        press: PointerPress,
    ) -> Result<Option<ResizeSession>, InteractionError> {
        if press.target != PressTarget::ResizeHandle {
            return Ok(None);
        }

        let item = ItemRef::Signature(signature_id);
        let start_size = snapshot
            .signature(signature_id)
            .map(|sig| sig.size())
            .ok_or(InteractionError::UnknownItem(item))?;
        let lease = self.registry.acquire(item, GestureKind::Resize)?;
        tracing::debug!(
            signature = %signature_id,
            width = start_size.width,
            height = start_size.height,
            "resize started"
        );

        Ok(Some(ResizeSession {
            lease,
            start_pointer: press.position,
            start_size,
            min_size: self.min_size,
            current: start_size,
        }))
    }
}
