//! Terrain oracle

use metal_core::Vec3;

/// Sample spacing for the default normal
const NORMAL_SAMPLE: f32 = 0.1;

/// A height field the simulation can sample anywhere
///
/// Implementations must be pure and total: the same (x, z) always gives the
/// same answer, and every input gives one.
pub trait Terrain {
    /// Ground height at (x, z)
    fn height_at(&self, x: f32, z: f32) -> f32;

    /// Surface normal at (x, z), from central differences by default
    fn normal_at(&self, x: f32, z: f32) -> Vec3 {
        let e = NORMAL_SAMPLE;
        let dx = self.height_at(x - e, z) - self.height_at(x + e, z);
        let dz = self.height_at(x, z - e) - self.height_at(x, z + e);
        Vec3::new(dx, 2.0 * e, dz).normalize_or_zero()
    }
}

impl<T: Terrain + ?Sized> Terrain for &T {
    fn height_at(&self, x: f32, z: f32) -> f32 {
        (**self).height_at(x, z)
    }

    fn normal_at(&self, x: f32, z: f32) -> Vec3 {
        (**self).normal_at(x, z)
    }
}

/// Level ground at a fixed height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlatTerrain {
    pub height: f32,
}

impl FlatTerrain {
    pub fn new(height: f32) -> Self {
        Self { height }
    }
}

impl Terrain for FlatTerrain {
    fn height_at(&self, _x: f32, _z: f32) -> f32 {
        self.height
    }

    fn normal_at(&self, _x: f32, _z: f32) -> Vec3 {
        Vec3::Y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Ramp;

    impl Terrain for Ramp {
        fn height_at(&self, x: f32, _z: f32) -> f32 {
            x
        }
    }

    #[test]
    fn test_flat() {
        let t = FlatTerrain::new(2.5);
        assert_eq!(t.height_at(-100.0, 42.0), 2.5);
        assert_eq!(t.normal_at(0.0, 0.0), Vec3::Y);
    }

    #[test]
    fn test_default_normal_on_ramp() {
        let n = Ramp.normal_at(3.0, -1.0);
        let expected = std::f32::consts::FRAC_1_SQRT_2;
        assert_relative_eq!(n.x, -expected, epsilon = 1e-4);
        assert_relative_eq!(n.y, expected, epsilon = 1e-4);
        assert_relative_eq!(n.z, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_reference_forwarding() {
        let t = FlatTerrain::new(1.0);
        let r: &dyn Terrain = &t;
        assert_eq!((&r).height_at(0.0, 0.0), 1.0);
    }
}
