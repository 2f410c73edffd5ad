//! Transform controller: drag, resize and rotate the active overlay layer.
//!
//! Every commit resolves the active view from the session at that moment; a
//! drag never remembers which view it started on. Proposed placements that
//! would leave the print area are clamped, never rejected.

use crate::bounds::{clamp_range, clamp_rect};
use crate::overlay::{OverlayLayer, normalize_degrees};
use crate::session::{ActiveEdit, DesignSession, EditBlocked};
use kurbo::{Point, Rect, Size, Vec2};

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Type of manipulation handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    /// Corner handle (resizes both axes).
    Corner(Corner),
    /// Edge midpoint handle (resizes one axis, or both when aspect is locked).
    Edge(Edge),
    /// Rotation handle, above the top edge.
    Rotate,
}

impl HandleKind {
    /// Growth direction per axis: +1 grows right/down, -1 left/up, 0 symmetric.
    fn direction(self) -> (f64, f64) {
        match self {
            HandleKind::Corner(Corner::TopLeft) => (-1.0, -1.0),
            HandleKind::Corner(Corner::TopRight) => (1.0, -1.0),
            HandleKind::Corner(Corner::BottomLeft) => (-1.0, 1.0),
            HandleKind::Corner(Corner::BottomRight) => (1.0, 1.0),
            HandleKind::Edge(Edge::Top) => (0.0, -1.0),
            HandleKind::Edge(Edge::Bottom) => (0.0, 1.0),
            HandleKind::Edge(Edge::Left) => (-1.0, 0.0),
            HandleKind::Edge(Edge::Right) => (1.0, 0.0),
            HandleKind::Rotate => (0.0, 0.0),
        }
    }
}

/// A manipulation handle with its position.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    /// Position in container pixels.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    /// Create a new handle.
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point hits this handle.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }
}

/// Rotate a vector by `degrees`.
fn rotate_vec(v: Vec2, degrees: f64) -> Vec2 {
    let (sin_r, cos_r) = degrees.to_radians().sin_cos();
    Vec2::new(v.x * cos_r - v.y * sin_r, v.x * sin_r + v.y * cos_r)
}

/// Handles for a layer, rotated with it. Rotation handle first, then corners,
/// then edges; earlier handles win overlapping hits.
pub fn layer_handles(layer: &OverlayLayer, rotate_offset: f64) -> Vec<Handle> {
    let center = layer.center();
    let half_w = layer.width / 2.0;
    let half_h = layer.height / 2.0;
    let at = |dx: f64, dy: f64| center + rotate_vec(Vec2::new(dx, dy), layer.rotation);

    vec![
        Handle::new(at(0.0, -half_h - rotate_offset), HandleKind::Rotate),
        Handle::new(at(-half_w, -half_h), HandleKind::Corner(Corner::TopLeft)),
        Handle::new(at(half_w, -half_h), HandleKind::Corner(Corner::TopRight)),
        Handle::new(at(-half_w, half_h), HandleKind::Corner(Corner::BottomLeft)),
        Handle::new(at(half_w, half_h), HandleKind::Corner(Corner::BottomRight)),
        Handle::new(at(0.0, -half_h), HandleKind::Edge(Edge::Top)),
        Handle::new(at(half_w, 0.0), HandleKind::Edge(Edge::Right)),
        Handle::new(at(0.0, half_h), HandleKind::Edge(Edge::Bottom)),
        Handle::new(at(-half_w, 0.0), HandleKind::Edge(Edge::Left)),
    ]
}

/// Find which handle (if any) is hit at the given point.
pub fn hit_test_handles(
    layer: &OverlayLayer,
    point: Point,
    tolerance: f64,
    rotate_offset: f64,
) -> Option<HandleKind> {
    layer_handles(layer, rotate_offset)
        .into_iter()
        .find(|handle| handle.hit_test(point, tolerance))
        .map(|handle| handle.kind)
}

/// Whether a point falls inside the (rotated) layer.
pub fn hit_test_body(layer: &OverlayLayer, point: Point) -> bool {
    let local = rotate_vec(point - layer.center(), -layer.rotation);
    local.x.abs() <= layer.width / 2.0 && local.y.abs() <= layer.height / 2.0
}

/// What a drag is manipulating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Body,
    Handle(HandleKind),
}

/// Modifier state for a pointer move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Snap rotation to the configured increment.
    pub snap_rotation: bool,
    /// Resize without preserving aspect ratio, even when locked by config.
    pub free_aspect: bool,
}

/// Result of an edit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Committed as proposed.
    Applied,
    /// Committed after clamping into the print area.
    Clamped,
    /// No drag in progress.
    Idle,
    /// The active view has no layer.
    NoLayer,
    /// The active view's print area is not available.
    BoundsUnavailable,
    /// Non-finite input was discarded.
    InvalidInput,
}

impl EditOutcome {
    /// Whether the layer was written.
    pub fn is_committed(self) -> bool {
        matches!(self, EditOutcome::Applied | EditOutcome::Clamped)
    }
}

#[derive(Debug, Clone, Copy)]
struct Interaction {
    target: DragTarget,
    last_point: Point,
}

/// Translates pointer input into overlay layer updates.
#[derive(Debug, Clone, Default)]
pub struct TransformController {
    interaction: Option<Interaction>,
}

impl TransformController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.interaction.is_some()
    }

    pub fn target(&self) -> Option<DragTarget> {
        self.interaction.map(|i| i.target)
    }

    /// Start a drag if `point` hits the active layer or one of its handles.
    pub fn pointer_down(&mut self, session: &DesignSession, point: Point) -> Option<DragTarget> {
        self.interaction = None;
        if !session.active_bounds().is_available() {
            return None;
        }
        let layer = session.active_layer()?;
        let config = session.config();

        let hit = hit_test_handles(
            layer,
            point,
            config.handle_hit_tolerance,
            config.rotate_handle_offset,
        );
        let target = match hit {
            Some(kind) => DragTarget::Handle(kind),
            None if hit_test_body(layer, point) => DragTarget::Body,
            None => return None,
        };
        self.interaction = Some(Interaction {
            target,
            last_point: point,
        });
        Some(target)
    }

    /// Continue the drag. The delta since the previous pointer position is
    /// applied to whichever view is active now.
    pub fn pointer_move(
        &mut self,
        session: &mut DesignSession,
        point: Point,
        modifiers: Modifiers,
    ) -> EditOutcome {
        let Some(interaction) = self.interaction.as_mut() else {
            return EditOutcome::Idle;
        };
        if !point.x.is_finite() || !point.y.is_finite() {
            return EditOutcome::InvalidInput;
        }
        let delta = point - interaction.last_point;
        interaction.last_point = point;

        match interaction.target {
            DragTarget::Body => commit(session, |edit| translate(edit, delta)),
            DragTarget::Handle(HandleKind::Rotate) => {
                commit(session, |edit| rotate_toward(edit, point, modifiers.snap_rotation))
            }
            DragTarget::Handle(kind) => commit(session, |edit| {
                let lock = edit.config.lock_aspect_ratio && !modifiers.free_aspect;
                resize(edit, kind, delta, lock)
            }),
        }
    }

    /// End the drag.
    pub fn pointer_up(&mut self) -> Option<DragTarget> {
        self.interaction.take().map(|i| i.target)
    }
}

/// Move the active layer by `delta`.
pub fn move_by(session: &mut DesignSession, delta: Vec2) -> EditOutcome {
    if !delta.is_finite() {
        return EditOutcome::InvalidInput;
    }
    commit(session, |edit| translate(edit, delta))
}

/// Resize the active layer around its center. With aspect lock the height
/// follows the requested width.
pub fn resize_to(session: &mut DesignSession, size: Size) -> EditOutcome {
    if !size.width.is_finite() || !size.height.is_finite() {
        return EditOutcome::InvalidInput;
    }
    commit(session, |edit| {
        let lock = edit.config.lock_aspect_ratio;
        let min = edit.config.min_layer_size;
        let aspect = edit.layer.aspect_ratio();
        let width = size.width.max(min);
        let height = if lock { width / aspect } else { size.height.max(min) };
        let proposed = Rect::from_center_size(edit.layer.center(), Size::new(width, height));
        let clamped = clamp_rect(proposed, edit.bounds, lock);
        edit.layer.set_rect(clamped);
        differs(clamped, proposed)
    })
}

/// Add `degrees` to the active layer's rotation.
pub fn rotate_by(session: &mut DesignSession, degrees: f64) -> EditOutcome {
    if !degrees.is_finite() {
        return EditOutcome::InvalidInput;
    }
    commit(session, |edit| {
        edit.layer.rotation += degrees;
        false
    })
}

/// Set the active layer's rotation.
pub fn set_rotation(session: &mut DesignSession, degrees: f64) -> EditOutcome {
    if !degrees.is_finite() {
        return EditOutcome::InvalidInput;
    }
    commit(session, |edit| {
        edit.layer.rotation = degrees;
        false
    })
}

pub fn reset_rotation(session: &mut DesignSession) -> EditOutcome {
    set_rotation(session, 0.0)
}

/// Read-modify-write the active view's layer. `apply` reports whether it clamped.
fn commit(
    session: &mut DesignSession,
    apply: impl FnOnce(&mut ActiveEdit<'_>) -> bool,
) -> EditOutcome {
    match session.active_edit() {
        Ok(mut edit) => {
            if apply(&mut edit) {
                EditOutcome::Clamped
            } else {
                EditOutcome::Applied
            }
        }
        Err(EditBlocked::NoLayer) => EditOutcome::NoLayer,
        Err(EditBlocked::BoundsUnavailable) => EditOutcome::BoundsUnavailable,
    }
}

fn differs(a: Rect, b: Rect) -> bool {
    const EPS: f64 = 1e-9;
    (a.x0 - b.x0).abs() > EPS
        || (a.y0 - b.y0).abs() > EPS
        || (a.x1 - b.x1).abs() > EPS
        || (a.y1 - b.y1).abs() > EPS
}

fn translate(edit: &mut ActiveEdit<'_>, delta: Vec2) -> bool {
    let proposed = edit.layer.rect() + delta;
    let clamped = clamp_rect(proposed, edit.bounds, edit.config.lock_aspect_ratio);
    edit.layer.set_rect(clamped);
    differs(clamped, proposed)
}

fn rotate_toward(edit: &mut ActiveEdit<'_>, point: Point, snap: bool) -> bool {
    let center = edit.layer.center();
    // 0° points up from the center.
    let mut angle = (point.y - center.y).atan2(point.x - center.x).to_degrees() + 90.0;
    let step = edit.config.rotation_snap_degrees;
    if snap && step > 0.0 {
        angle = (angle / step).round() * step;
    }
    // Keep the stored value continuous with the current rotation.
    let current = edit.layer.rotation;
    edit.layer.rotation = current + normalize_degrees(angle - current);
    false
}

/// Resize from a handle, keeping the opposite side anchored.
fn resize(edit: &mut ActiveEdit<'_>, kind: HandleKind, delta: Vec2, lock: bool) -> bool {
    let (dir_x, dir_y) = kind.direction();
    if dir_x == 0.0 && dir_y == 0.0 {
        return false;
    }

    let local = rotate_vec(delta, -edit.layer.rotation);
    let rect = edit.layer.rect();
    let center = rect.center();
    let bounds = edit.bounds;
    let min = edit.config.min_layer_size;
    let aspect = edit.layer.aspect_ratio();
    let (w, h) = (rect.width(), rect.height());

    let mut new_w = w + dir_x * local.x;
    let mut new_h = h + dir_y * local.y;

    // Space between the anchor and the bounds on each axis.
    let room = |dir: f64, lo: f64, hi: f64, mid: f64, b_lo: f64, b_hi: f64| -> f64 {
        let r = if dir > 0.0 {
            b_hi - lo
        } else if dir < 0.0 {
            hi - b_lo
        } else {
            2.0 * (mid - b_lo).min(b_hi - mid)
        };
        r.max(0.0)
    };
    let room_w = room(dir_x, rect.x0, rect.x1, center.x, bounds.x0, bounds.x1);
    let room_h = room(dir_y, rect.y0, rect.y1, center.y, bounds.y0, bounds.y1);

    if lock {
        if dir_x != 0.0 && dir_y != 0.0 {
            if ((new_w - w) / w).abs() >= ((new_h - h) / h).abs() {
                new_h = new_w / aspect;
            } else {
                new_w = new_h * aspect;
            }
        } else if dir_x != 0.0 {
            new_h = new_w / aspect;
        } else {
            new_w = new_h * aspect;
        }
    }
    let requested = Size::new(new_w, new_h);

    if lock {
        let upper = room_w.min(room_h * aspect);
        let lower = min.max(min * aspect).min(upper);
        new_w = clamp_range(new_w, lower, upper);
        new_h = new_w / aspect;
    } else {
        new_w = clamp_range(new_w, min.min(room_w), room_w);
        new_h = clamp_range(new_h, min.min(room_h), room_h);
    }

    let anchor = |dir: f64, lo: f64, hi: f64, mid: f64, size: f64| -> f64 {
        if dir > 0.0 {
            lo
        } else if dir < 0.0 {
            hi - size
        } else {
            mid - size / 2.0
        }
    };
    let x0 = anchor(dir_x, rect.x0, rect.x1, center.x, new_w);
    let y0 = anchor(dir_y, rect.y0, rect.y1, center.y, new_h);

    let placed = clamp_rect(Rect::new(x0, y0, x0 + new_w, y0 + new_h), bounds, lock);
    edit.layer.set_rect(placed);

    const EPS: f64 = 1e-9;
    (placed.width() - requested.width).abs() > EPS
        || (placed.height() - requested.height).abs() > EPS
}
