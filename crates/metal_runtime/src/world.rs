//! Procedural test world: rolling hills, a few obstacles and a patrol route

use metal_core::Vec3;
use metal_physics::{Collider, Terrain};
use std::f32::consts::TAU;

/// Smooth rolling hills built from a few sine layers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollingHills {
    pub amplitude: f32,
    pub wavelength: f32,
}

impl Default for RollingHills {
    fn default() -> Self {
        Self {
            amplitude: 1.5,
            wavelength: 40.0,
        }
    }
}

impl Terrain for RollingHills {
    fn height_at(&self, x: f32, z: f32) -> f32 {
        let k = TAU / self.wavelength;
        let broad = (x * k).sin() * (z * k).cos();
        let ripple = ((x + z) * k * 2.3).sin() * 0.25;
        self.amplitude * (broad + ripple)
    }
}

/// Static scenery the player collides with
pub fn obstacles<T: Terrain>(terrain: &T) -> Vec<Collider> {
    let ground = |x: f32, z: f32| Vec3::new(x, terrain.height_at(x, z), z);
    vec![
        // Boulders
        Collider::circle(ground(12.0, 4.0), 1.5),
        Collider::circle(ground(-9.0, 14.0), 2.0),
        // Market stall and a crate stack
        Collider::rotated_box(ground(4.0, -6.0), Vec3::new(2.0, 1.0, 1.0), 0.4),
        Collider::rotated_box(ground(-14.0, -10.0), Vec3::new(1.0, 1.0, 1.0), 0.0),
        // Low rock the player can climb onto
        Collider::climbable(ground(18.0, -12.0), 1.8, 0.5, terrain.height_at(18.0, -12.0)),
    ]
}

/// Closed loop of waypoints around the origin
pub fn patrol_route(radius: f32, points: usize) -> Vec<Vec3> {
    let points = points.max(3);
    (0..points)
        .map(|i| {
            let angle = i as f32 / points as f32 * TAU;
            Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
        })
        .collect()
}
