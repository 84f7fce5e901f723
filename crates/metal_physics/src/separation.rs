//! Circle-circle separation on the horizontal plane

use metal_core::Vec3;

/// Unit direction from `b` to `a`, or +x when they coincide
fn separating_axis(a: Vec3, b: Vec3) -> (f32, f32, f32) {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    let dist = (dx * dx + dz * dz).sqrt();
    if dist <= f32::EPSILON {
        (1.0, 0.0, 0.0)
    } else {
        (dx / dist, dz / dist, dist)
    }
}

/// Push two overlapping circles apart by equal and opposite amounts
///
/// Each moves half the overlap plus `epsilon`. Returns whether they overlapped.
pub fn separate_pair(
    a: &mut Vec3,
    b: &mut Vec3,
    radius_a: f32,
    radius_b: f32,
    epsilon: f32,
) -> bool {
    let min_dist = radius_a + radius_b;
    let (nx, nz, dist) = separating_axis(*a, *b);
    if dist >= min_dist {
        return false;
    }

    let push = (min_dist - dist) * 0.5 + epsilon;
    a.x += nx * push;
    a.z += nz * push;
    b.x -= nx * push;
    b.z -= nz * push;
    true
}

/// Push `mover` away from a fixed `obstacle` by half the overlap plus `epsilon`
///
/// Only the mover is displaced. Returns whether they overlapped.
pub fn push_from(mover: &mut Vec3, obstacle: Vec3, radius_sum: f32, epsilon: f32) -> bool {
    let (nx, nz, dist) = separating_axis(*mover, obstacle);
    if dist >= radius_sum {
        return false;
    }

    let push = (radius_sum - dist) * 0.5 + epsilon;
    mover.x += nx * push;
    mover.z += nz * push;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use metal_core::horizontal_distance;

    #[test]
    fn test_overlapping_pair_ends_apart() {
        let mut a = Vec3::new(0.0, 0.0, 0.0);
        let mut b = Vec3::new(0.3, 0.0, 0.0);

        assert!(separate_pair(&mut a, &mut b, 0.4, 0.4, 0.01));
        assert!(horizontal_distance(a, b) >= 0.8);
        // Symmetric about the old midpoint
        assert_relative_eq!((a.x + b.x) * 0.5, 0.15, epsilon = 1e-6);
    }

    #[test]
    fn test_separated_pair_untouched() {
        let mut a = Vec3::new(0.0, 1.0, 0.0);
        let mut b = Vec3::new(0.0, 5.0, 0.9);
        assert!(!separate_pair(&mut a, &mut b, 0.4, 0.4, 0.01));
        assert_eq!(a, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_height_ignored() {
        let mut a = Vec3::new(0.0, 0.0, 0.0);
        let mut b = Vec3::new(0.0, 10.0, 0.0);
        assert!(separate_pair(&mut a, &mut b, 0.4, 0.4, 0.01));
        assert!(a.x > 0.0 && b.x < 0.0);
        assert_eq!(a.y, 0.0);
        assert_eq!(b.y, 10.0);
    }

    #[test]
    fn test_push_from_moves_only_mover() {
        let obstacle = Vec3::ZERO;
        let mut mover = Vec3::new(0.0, 0.0, 0.5);
        assert!(push_from(&mut mover, obstacle, 0.9, 0.01));
        assert_relative_eq!(mover.z, 0.5 + 0.2 + 0.01, epsilon = 1e-6);
        assert_relative_eq!(mover.x, 0.0);
    }
}
