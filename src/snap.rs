//! Magnetic alignment while dragging and the collision nudge on release.

use crate::hit_test::Bounds;

/// Position produced by [`snap_position`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapOutcome {
    pub x: f32,
    pub y: f32,
    /// Whether the x axis locked onto another node.
    pub snapped_x: bool,
    pub snapped_y: bool,
}

/// Candidate target positions along one axis, in priority order:
/// start-start, start-end, end-start, end-end, centre-centre.
fn axis_candidates(start: f32, size: f32, other_start: f32, other_end: f32) -> [(f32, f32); 5] {
    let end = start + size;
    let center = start + size / 2.0;
    let other_center = (other_start + other_end) / 2.0;
    [
        (start - other_start, other_start),
        (start - other_end, other_end),
        (end - other_start, other_start - size),
        (end - other_end, other_end - size),
        (center - other_center, other_center - size / 2.0),
    ]
}

/// Align `moving` to nearby rectangles.
///
/// `threshold` is in canvas units; callers divide the screen tolerance by the
/// zoom. Axes snap independently and the first candidate within the
/// threshold wins on each axis.
pub fn snap_position<I>(moving: Bounds, others: I, threshold: f32) -> SnapOutcome
where
    I: IntoIterator<Item = Bounds>,
{
    let mut out = SnapOutcome {
        x: moving.x,
        y: moving.y,
        snapped_x: false,
        snapped_y: false,
    };
    for other in others {
        if !out.snapped_x {
            if let Some(&(_, x)) = axis_candidates(moving.x, moving.width, other.x, other.r)
                .iter()
                .find(|(diff, _)| diff.abs() < threshold)
            {
                out.x = x;
                out.snapped_x = true;
            }
        }
        if !out.snapped_y {
            if let Some(&(_, y)) = axis_candidates(moving.y, moving.height, other.y, other.b)
                .iter()
                .find(|(diff, _)| diff.abs() < threshold)
            {
                out.y = y;
                out.snapped_y = true;
            }
        }
        if out.snapped_x && out.snapped_y {
            break;
        }
    }
    out
}

/// Push `moving` out of the first rectangle it overlaps.
///
/// Picks the shallowest of the four push directions (left, right, up, down;
/// ties resolved in that order) and adds `padding`. Only the first overlap is
/// resolved; returns `None` when nothing overlaps.
pub fn resolve_collision<I>(moving: Bounds, others: I, padding: f32) -> Option<(f32, f32)>
where
    I: IntoIterator<Item = Bounds>,
{
    let other = others.into_iter().find(|o| moving.overlaps(o))?;

    let push_left = moving.r - other.x;
    let push_right = other.r - moving.x;
    let push_up = moving.b - other.y;
    let push_down = other.b - moving.y;

    let pushes = [
        (push_left, (-(push_left + padding), 0.0)),
        (push_right, (push_right + padding, 0.0)),
        (push_up, (0.0, -(push_up + padding))),
        (push_down, (0.0, push_down + padding)),
    ];
    let mut best = pushes[0];
    for candidate in &pushes[1..] {
        if candidate.0 < best.0 {
            best = *candidate;
        }
    }
    let (dx, dy) = best.1;
    Some((moving.x + dx, moving.y + dy))
}
