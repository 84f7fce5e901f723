//! Walking a circle through a small obstacle course

use metal_physics::*;

fn course() -> Vec<Collider> {
    vec![
        Collider::circle(Vec3::new(3.0, 0.0, 0.0), 0.8),
        Collider::rotated_box(Vec3::new(6.0, 0.0, 0.5), Vec3::new(0.5, 1.0, 1.5), 0.3),
        Collider::climbable(Vec3::new(9.0, 0.0, 0.0), 1.0, 0.4, 0.0),
    ]
}

#[test]
fn test_walker_never_ends_inside_a_solid() {
    let config = PhysicsConfig::default();
    let colliders = course();
    let terrain = FlatTerrain::new(0.0);
    let mut position = Vec3::new(0.0, 0.0, 0.1);

    for _ in 0..400 {
        position.x += 0.03;
        position = resolve_movement(position, config.player_radius, &colliders[..2]);
        position.y = terrain.height_at(position.x, position.z);

        for collider in &colliders[..2] {
            assert!(collider.push_out(position, config.player_radius - 1e-3).is_none());
        }
    }
}

#[test]
fn test_walker_climbs_low_rock() {
    let config = PhysicsConfig::default();
    let colliders = course();
    let rock = colliders[2];
    let mut position = Vec3::new(7.5, 0.0, 0.0);

    for _ in 0..50 {
        position.x += 0.03;
        position = resolve_movement_at_height(
            position,
            config.player_radius,
            &colliders,
            position.y,
            config.step_height,
        );
        position.y = standable_height(
            position.x,
            position.z,
            position.y,
            config.step_height,
            &colliders,
        )
        .unwrap_or(0.0);
    }

    assert!(rock.contains_xz(position.x, position.z));
    assert!((position.y - 0.4).abs() < 1e-6);
}
