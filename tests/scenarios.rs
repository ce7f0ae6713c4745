//! End-to-end scenarios driving a [`World`] through whole simulations,
//! as opposed to the unit tests living alongside each module.

use approx::assert_abs_diff_eq;

use kinetica2d::math::{Vec2, Vec3};
use kinetica2d::{RigidBodyMaterial, WorldConfig};

const DT: f32 = 1.0 / 60.0;

fn rect_points(half_x: f32, half_y: f32) -> Vec<Vec2> {
    vec![
        Vec2::new(-half_x, -half_y),
        Vec2::new(half_x, -half_y),
        Vec2::new(half_x, half_y),
        Vec2::new(-half_x, half_y),
    ]
}

fn square_points(half_extent: f32) -> Vec<Vec2> {
    rect_points(half_extent, half_extent)
}

#[test]
fn ball_settles_on_a_static_floor() {
    let mut world = WorldConfig::default().build();

    let floor = world.add_object(-1.0, -1.0, RigidBodyMaterial { restitution: 0.0, friction: 0.5 }).unwrap();
    world.body_mut(floor).unwrap().pos = Vec2::new(0.0, -1.0);
    world.add_polygon_collider(floor, rect_points(10.0, 1.0)).unwrap();

    let ball = world.add_object(1.0, 1.0, RigidBodyMaterial { restitution: 0.0, friction: 0.5 }).unwrap();
    world.body_mut(ball).unwrap().pos = Vec2::new(0.0, 5.0);
    world.add_circle_collider(ball, 1.0).unwrap();

    for _ in 0..200 {
        world.update(DT);
    }

    let body = world.body(ball).unwrap();
    // Floor top is at y = 0 (center -1, half-extent 1); a radius-1 ball
    // resting on it settles with its center at y = 1.
    assert_abs_diff_eq!(body.pos.y, 1.0, epsilon = 0.1);
    assert!(body.vel.length() < 0.2, "ball should have come to rest, got vel={:?}", body.vel);

    for contact in world.contacts() {
        assert!(contact.num_points() <= 2);
    }
}

#[test]
fn stack_of_three_boxes_settles_without_interpenetrating() {
    let mut world = WorldConfig::default().build();

    let floor = world.add_object(-1.0, -1.0, RigidBodyMaterial { restitution: 0.0, friction: 0.5 }).unwrap();
    world.body_mut(floor).unwrap().pos = Vec2::new(0.0, -1.0);
    world.add_polygon_collider(floor, rect_points(10.0, 1.0)).unwrap();

    let mut boxes = Vec::new();
    for &y in &[1.0, 3.0, 5.0] {
        let id = world.add_object(1.0, 2.0 / 3.0, RigidBodyMaterial { restitution: 0.0, friction: 0.5 }).unwrap();
        world.body_mut(id).unwrap().pos = Vec2::new(0.0, y);
        world.add_polygon_collider(id, square_points(1.0)).unwrap();
        boxes.push(id);
    }

    for _ in 0..300 {
        world.update(DT);
    }

    for (id, &expected_y) in boxes.iter().zip(&[1.0, 3.0, 5.0]) {
        let body = world.body(*id).unwrap();
        assert_abs_diff_eq!(body.pos.y, expected_y, epsilon = 0.15);
        assert!(body.vel.length() < 0.2);
    }

    for contact in world.contacts() {
        for point in contact.points() {
            assert!(point.penetration() < 0.05, "penetration too deep: {}", point.penetration());
        }
    }
}

#[test]
fn pivot_pendulum_keeps_its_anchor_and_does_not_gain_energy() {
    let mut world = WorldConfig::default().with_gravity(Vec2::new(0.0, -10.0)).build();

    let anchor = world.add_object(-1.0, -1.0, RigidBodyMaterial { restitution: 0.0, friction: 0.0 }).unwrap();

    let rod_mass = 1.0;
    let rod_moment = 1.0 / 3.0;
    let rod = world.add_object(rod_mass, rod_moment, RigidBodyMaterial { restitution: 0.0, friction: 0.0 }).unwrap();
    world.body_mut(rod).unwrap().pos = Vec2::new(1.0, 0.0);

    world.add_pivot_constraint(anchor, rod, Vec2::ZERO, Vec2::new(-1.0, 0.0)).unwrap();

    let energy_bound = 5.0;
    for step in 0..60 {
        world.update(DT);

        let body = world.body(rod).unwrap();
        let anchor_point = body.local_to_global(Vec2::new(-1.0, 0.0));
        assert!(anchor_point.length() < 0.1, "pivot drifted at step {step}: {anchor_point:?}");

        let ke = 0.5 * rod_mass * body.vel.length2() + 0.5 * rod_moment * body.rot_v * body.rot_v;
        let pe = rod_mass * 10.0 * body.pos.y;
        let energy = ke + pe;
        assert!(energy.is_finite());
        assert!(energy.abs() < energy_bound, "energy diverged at step {step}: {energy}");
    }
}

#[test]
fn elastic_head_on_collision_matches_the_1d_formula() {
    let mut world = WorldConfig::default().with_gravity(Vec2::ZERO).build();

    let mass_a = 1.0;
    let mass_b = 3.0;
    let a = world.add_object(mass_a, 1.0, RigidBodyMaterial { restitution: 1.0, friction: 0.0 }).unwrap();
    world.body_mut(a).unwrap().pos = Vec2::new(-3.0, 0.0);
    world.body_mut(a).unwrap().vel = Vec2::new(2.0, 0.0);
    world.add_circle_collider(a, 1.0).unwrap();

    let b = world.add_object(mass_b, 1.0, RigidBodyMaterial { restitution: 1.0, friction: 0.0 }).unwrap();
    world.body_mut(b).unwrap().pos = Vec2::new(0.0, 0.0);
    world.add_circle_collider(b, 1.0).unwrap();

    let initial_momentum = mass_a * 2.0;

    for _ in 0..180 {
        world.update(DT);
    }

    let vel_a = world.body(a).unwrap().vel.x;
    let vel_b = world.body(b).unwrap().vel.x;

    let final_momentum = mass_a * vel_a + mass_b * vel_b;
    assert_abs_diff_eq!(final_momentum, initial_momentum, epsilon = 0.1);

    // 1D elastic collision: v1' = ((m1-m2)u1)/(m1+m2), v2' = (2 m1 u1)/(m1+m2)
    assert_abs_diff_eq!(vel_a, -1.0, epsilon = 0.2);
    assert_abs_diff_eq!(vel_b, 1.0, epsilon = 0.2);
}

#[test]
fn gjk_epa_reports_axis_aligned_penetration() {
    let mut world = WorldConfig::default().build();

    let circle = world.add_object(-1.0, -1.0, RigidBodyMaterial { restitution: 0.0, friction: 0.0 }).unwrap();
    world.body_mut(circle).unwrap().pos = Vec2::new(1.4, 0.0);
    world.add_circle_collider(circle, 1.0).unwrap();

    let square = world.add_object(-1.0, -1.0, RigidBodyMaterial { restitution: 0.0, friction: 0.0 }).unwrap();
    world.add_polygon_collider(square, square_points(0.5)).unwrap();

    world.update(DT);

    let contact = world.contacts().next().expect("circle and square should overlap");
    assert_eq!(contact.num_points(), 1);
    let point = &contact.points()[0];

    // Separating normal points from the circle (A) into the square (B).
    assert_abs_diff_eq!(point.normal().x, -1.0, epsilon = 0.05);
    assert_abs_diff_eq!(point.normal().y, 0.0, epsilon = 0.05);
    assert_abs_diff_eq!(point.penetration(), 0.1, epsilon = 0.02);
}

#[test]
fn gjk_epa_reports_diagonal_corner_penetration() {
    let mut world = WorldConfig::default().build();

    let circle = world.add_object(-1.0, -1.0, RigidBodyMaterial { restitution: 0.0, friction: 0.0 }).unwrap();
    world.body_mut(circle).unwrap().pos = Vec2::new(1.0, 1.0);
    world.add_circle_collider(circle, 1.0).unwrap();

    let square = world.add_object(-1.0, -1.0, RigidBodyMaterial { restitution: 0.0, friction: 0.0 }).unwrap();
    world.add_polygon_collider(square, square_points(0.5)).unwrap();

    world.update(DT);

    let contact = world.contacts().next().expect("circle and square corner should overlap");
    let point = &contact.points()[0];

    // Nearest point on the square is its corner at (0.5, 0.5); the
    // circle's center is sqrt(0.5) away from it, penetrating by
    // 1 - sqrt(0.5).
    let expected_penetration = 1.0 - 0.5f32.sqrt();
    assert_abs_diff_eq!(point.penetration(), expected_penetration, epsilon = 0.02);
    assert!(point.normal().x < 0.0 && point.normal().y < 0.0);
}

#[test]
fn sph_column_stays_finite_and_bounded() {
    let mut world = WorldConfig::default().with_sph_scale_factor(10.0).build();

    let floor = world.add_object(-1.0, -1.0, RigidBodyMaterial { restitution: 0.0, friction: 0.3 }).unwrap();
    world.body_mut(floor).unwrap().pos = Vec2::new(0.0, -0.2);
    world.add_polygon_collider(floor, rect_points(1.0, 0.2)).unwrap();
    for i in 0..6 {
        let x = -0.5 + i as f32 * 0.2;
        world.add_rigid_particle(floor, Vec2::new(x, 0.2));
    }

    let mut count = 0;
    for row in 0..6 {
        for col in 0..6 {
            let pos = Vec2::new(-0.15 + col as f32 * 0.05, 0.2 + row as f32 * 0.05);
            world.add_fluid_particle(pos, Vec2::ZERO, Vec3::ZERO, 1.0);
            count += 1;
        }
    }

    for _ in 0..120 {
        world.update(DT);
    }

    assert_eq!(world.fluid_particles().len(), count);
    for particle in world.fluid_particles() {
        assert!(particle.pos.x.is_finite() && particle.pos.y.is_finite(), "particle position went non-finite");
        assert!(particle.vel.x.is_finite() && particle.vel.y.is_finite(), "particle velocity went non-finite");
        assert!(particle.pos.length() < 1000.0, "particle escaped to {:?}", particle.pos);
    }
}
