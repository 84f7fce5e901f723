//! Static world colliders
//!
//! All overlap tests are two dimensional on the (x, z) plane. A climbable
//! collider also has a top surface the player may stand on.

use metal_core::Vec3;
use serde::{Deserialize, Serialize};

/// Static collider shapes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Collider {
    /// Vertical cylinder of unbounded height (trees, pillars, NPCs)
    Circle { center: Vec3, radius: f32 },
    /// Box rotated about the Y axis; `half_extents.y` is ignored
    Box {
        center: Vec3,
        half_extents: Vec3,
        rotation: f32,
    },
    /// Cylinder with a standable top at `base_y + height` (rocks, crates)
    Climbable {
        center: Vec3,
        radius: f32,
        height: f32,
        base_y: f32,
    },
}

impl Collider {
    /// Circle collider
    pub fn circle(center: Vec3, radius: f32) -> Self {
        Self::Circle { center, radius }
    }

    /// Box collider with yaw `rotation` in radians
    pub fn rotated_box(center: Vec3, half_extents: Vec3, rotation: f32) -> Self {
        Self::Box {
            center,
            half_extents,
            rotation,
        }
    }

    /// Climbable collider
    pub fn climbable(center: Vec3, radius: f32, height: f32, base_y: f32) -> Self {
        Self::Climbable {
            center,
            radius,
            height,
            base_y,
        }
    }

    /// Center of the shape
    pub fn center(&self) -> Vec3 {
        match *self {
            Self::Circle { center, .. }
            | Self::Box { center, .. }
            | Self::Climbable { center, .. } => center,
        }
    }

    /// Height of a climbable top
    pub fn top_height(&self) -> Option<f32> {
        match *self {
            Self::Climbable { height, base_y, .. } => Some(base_y + height),
            _ => None,
        }
    }

    /// Whether the footprint covers (x, z)
    pub fn contains_xz(&self, x: f32, z: f32) -> bool {
        match *self {
            Self::Circle { center, radius } | Self::Climbable { center, radius, .. } => {
                let dx = x - center.x;
                let dz = z - center.z;
                dx * dx + dz * dz <= radius * radius
            }
            Self::Box {
                center,
                half_extents,
                rotation,
            } => {
                let (lx, lz) = to_local(x - center.x, z - center.z, rotation);
                lx.abs() <= half_extents.x && lz.abs() <= half_extents.z
            }
        }
    }

    /// Horizontal push that moves a circle at `point` out of this shape
    ///
    /// Returns `None` when they do not overlap.
    pub fn push_out(&self, point: Vec3, radius: f32) -> Option<(f32, f32)> {
        match *self {
            Self::Circle {
                center,
                radius: own,
            }
            | Self::Climbable {
                center,
                radius: own,
                ..
            } => push_out_of_circle(point, radius, center, own),
            Self::Box {
                center,
                half_extents,
                rotation,
            } => push_out_of_box(point, radius, center, half_extents, rotation),
        }
    }

    /// Whether this collider blocks a mover whose feet are at `feet_y`
    ///
    /// Climbables stop blocking once the mover stands at or above their top
    /// minus `step_height`.
    pub fn blocks_at(&self, feet_y: f32, step_height: f32) -> bool {
        match self.top_height() {
            Some(top) => feet_y < top - step_height,
            None => true,
        }
    }
}

/// Rotate a world offset into the box's local frame
fn to_local(dx: f32, dz: f32, rotation: f32) -> (f32, f32) {
    let (sin, cos) = rotation.sin_cos();
    (dx * cos - dz * sin, dx * sin + dz * cos)
}

/// Rotate a local offset back into world space
fn to_world(lx: f32, lz: f32, rotation: f32) -> (f32, f32) {
    let (sin, cos) = rotation.sin_cos();
    (lx * cos + lz * sin, -lx * sin + lz * cos)
}

fn push_out_of_circle(point: Vec3, radius: f32, center: Vec3, own: f32) -> Option<(f32, f32)> {
    let dx = point.x - center.x;
    let dz = point.z - center.z;
    let min_dist = radius + own;
    let dist_sq = dx * dx + dz * dz;
    if dist_sq >= min_dist * min_dist {
        return None;
    }

    let dist = dist_sq.sqrt();
    if dist <= f32::EPSILON {
        return Some((min_dist, 0.0));
    }
    let push = min_dist - dist;
    Some((dx / dist * push, dz / dist * push))
}

fn push_out_of_box(
    point: Vec3,
    radius: f32,
    center: Vec3,
    half: Vec3,
    rotation: f32,
) -> Option<(f32, f32)> {
    let (lx, lz) = to_local(point.x - center.x, point.z - center.z, rotation);

    let inside = lx.abs() < half.x && lz.abs() < half.z;
    let (px, pz) = if inside {
        // Leave through the nearest face
        let exit_x = half.x - lx.abs() + radius;
        let exit_z = half.z - lz.abs() + radius;
        if exit_x <= exit_z {
            (exit_x * sign(lx), 0.0)
        } else {
            (0.0, exit_z * sign(lz))
        }
    } else {
        let cx = lx.clamp(-half.x, half.x);
        let cz = lz.clamp(-half.z, half.z);
        let dx = lx - cx;
        let dz = lz - cz;
        let dist_sq = dx * dx + dz * dz;
        if dist_sq >= radius * radius {
            return None;
        }
        let dist = dist_sq.sqrt();
        if dist <= f32::EPSILON {
            // On the boundary: push straight out along the face normal
            if lx.abs() >= half.x {
                (radius * sign(lx), 0.0)
            } else {
                (0.0, radius * sign(lz))
            }
        } else {
            let push = radius - dist;
            (dx / dist * push, dz / dist * push)
        }
    };

    Some(to_world(px, pz, rotation))
}

fn sign(v: f32) -> f32 {
    if v < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Move a circle out of every collider that blocks it
///
/// Colliders are visited in order and each push is applied before the next
/// test. Climbables count as solid for this query; use
/// [`resolve_movement_at_height`] when the mover may stand on them.
pub fn resolve_movement(position: Vec3, radius: f32, colliders: &[Collider]) -> Vec3 {
    resolve_movement_at_height(position, radius, colliders, f32::NEG_INFINITY, 0.0)
}

/// Like [`resolve_movement`], ignoring climbables whose top is within
/// `step_height` of `feet_y`
pub fn resolve_movement_at_height(
    position: Vec3,
    radius: f32,
    colliders: &[Collider],
    feet_y: f32,
    step_height: f32,
) -> Vec3 {
    let mut resolved = position;
    for collider in colliders {
        if !collider.blocks_at(feet_y, step_height) {
            continue;
        }
        if let Some((dx, dz)) = collider.push_out(resolved, radius) {
            resolved.x += dx;
            resolved.z += dz;
        }
    }
    resolved
}

/// Highest climbable top under (x, z) reachable from `current_y`
pub fn standable_height(
    x: f32,
    z: f32,
    current_y: f32,
    step_height: f32,
    colliders: &[Collider],
) -> Option<f32> {
    colliders
        .iter()
        .filter(|c| c.contains_xz(x, z))
        .filter_map(Collider::top_height)
        .filter(|top| *top <= current_y + step_height)
        .fold(None, |best: Option<f32>, top| match best {
            Some(b) if b >= top => Some(b),
            _ => Some(top),
        })
}
