//! End-to-end simulation scenarios.
//!
//! Each test builds a small world, runs it for a fixed number of steps, and
//! asserts the physical outcome: resting contact, constraint satisfaction,
//! stack stability, warm-start behavior, and the Coulomb friction limits.

use nalgebra::{Point2, Vector2};
use planar_core::{Body, BodyId, World, ALLOWED_PENETRATION};

const DT: f64 = 1.0 / 60.0;

fn world() -> World {
    World::new(Vector2::new(0.0, -10.0), 10)
}

/// Ground slab 100 x 20 with its top surface at y = 0.
fn add_ground(world: &mut World) -> BodyId {
    world.add_body(
        Body::new_static(Vector2::new(100.0, 20.0)).with_position(Point2::new(0.0, -10.0)),
    )
}

fn run(world: &mut World, steps: usize) {
    for _ in 0..steps {
        world.step(DT).expect("step should succeed");
    }
}

#[test]
fn free_fall_comes_to_rest_on_ground() {
    let mut world = world();
    add_ground(&mut world);
    let falling = world.add_body(
        Body::new(Vector2::new(1.0, 1.0), 200.0).with_position(Point2::new(0.0, 4.0)),
    );

    // Contact happens after ~0.84 s; give the box time to settle
    run(&mut world, 200);

    let body = world.body(falling).expect("body exists");
    // Resting on the ground surface: center at half the box height, less
    // at most the allowed penetration plus solver tolerance
    assert!(
        body.position.y >= 0.5 - ALLOWED_PENETRATION - 0.005,
        "box sank into the ground: y = {}",
        body.position.y
    );
    assert!(body.position.y <= 0.6, "box hovering: y = {}", body.position.y);
    assert!(
        body.velocity.y.abs() < 1e-2,
        "box still moving: vy = {}",
        body.velocity.y
    );
}

#[test]
fn pendulum_joint_holds_anchor_distance() {
    let mut world = world();
    let ground = add_ground(&mut world);
    let bob = world.add_body(
        Body::new(Vector2::new(1.0, 1.0), 100.0).with_position(Point2::new(9.0, 11.0)),
    );
    let joint = world
        .add_joint(ground, bob, Point2::new(0.0, 11.0))
        .expect("valid joint");

    // The anchors coincide at set-up
    {
        let j = world.joint(joint).expect("joint exists");
        let (p1, p2) = j.world_anchors(
            world.body(ground).expect("ground"),
            world.body(bob).expect("bob"),
        );
        assert!((p2 - p1).norm() < 1e-12);
    }

    // Swing for ten seconds; Baumgarte correction keeps the positional
    // drift bounded at centimeter scale on a 9-meter pendulum
    let mut max_drift: f64 = 0.0;
    for _ in 0..600 {
        world.step(DT).expect("step should succeed");
        let j = world.joint(joint).expect("joint exists");
        let (p1, p2) = j.world_anchors(
            world.body(ground).expect("ground"),
            world.body(bob).expect("bob"),
        );
        max_drift = max_drift.max((p2 - p1).norm());
    }

    assert!(max_drift < 0.05, "anchor drift {max_drift} too large");
    // Relative to the pendulum length the constraint holds to well under 1%
    assert!(max_drift / 9.0 < 0.01);
}

#[test]
fn stack_of_ten_settles_without_deep_penetration() {
    let mut world = world();
    add_ground(&mut world);

    let mut boxes = Vec::new();
    for i in 0..10 {
        let y = 0.51 + 1.05 * f64::from(i);
        boxes.push(world.add_body(
            Body::new(Vector2::new(1.0, 1.0), 1.0).with_position(Point2::new(0.0, y)),
        ));
    }

    run(&mut world, 300);

    // No contact sits deeper than the allowed penetration (plus a small
    // solver tolerance while the stack finishes settling)
    for (_, arbiter) in world.arbiters() {
        assert!(!arbiter.contacts().is_empty());
        assert!(arbiter.contacts().len() <= 2);
        for c in arbiter.contacts() {
            assert!(
                c.separation >= -(ALLOWED_PENETRATION + 0.01),
                "contact penetrated {}",
                -c.separation
            );
        }
    }

    // The tower is still a tower: boxes stacked in order, roughly settled
    let mut last_y = f64::NEG_INFINITY;
    for &id in &boxes {
        let body = world.body(id).expect("body exists");
        assert!(body.position.y > last_y, "stack order broken");
        last_y = body.position.y;
    }
    let avg_speed: f64 = boxes
        .iter()
        .map(|&id| world.body(id).expect("body exists").velocity.norm())
        .sum::<f64>()
        / boxes.len() as f64;
    assert!(avg_speed < 0.05, "stack still moving: avg speed {avg_speed}");
}

#[test]
fn separation_retires_the_arbiter() {
    let mut world = world();
    world.gravity = Vector2::zeros();
    let a = world.add_body(Body::new(Vector2::new(1.0, 1.0), 1.0));
    let b = world.add_body(
        Body::new(Vector2::new(1.0, 1.0), 1.0).with_position(Point2::new(0.9, 0.0)),
    );

    world.step(DT).expect("step should succeed");
    assert!(world.arbiter(a, b).is_some());

    world.body_mut(b).expect("body exists").position = Point2::new(1000.0, 0.0);
    world.step(DT).expect("step should succeed");
    assert!(world.arbiter(a, b).is_none());
}

#[test]
fn warm_starting_reduces_velocity_residuals() {
    let mut world = world();
    add_ground(&mut world);
    for i in 0..5 {
        world.add_body(
            Body::new(Vector2::new(1.0, 1.0), 1.0)
                .with_position(Point2::new(0.0, 0.51 + 1.05 * f64::from(i))),
        );
    }
    run(&mut world, 300);

    let avg_speed = |w: &World| -> f64 {
        let (sum, n) = w
            .bodies()
            .filter(|b| !b.is_static())
            .fold((0.0, 0), |(s, n), b| (s + b.velocity.norm(), n + 1));
        sum / f64::from(n)
    };

    // Step the settled stack once with warm starting...
    let mut warm = world.clone();
    warm.step(DT).expect("step should succeed");

    // ...and once from cold, with cached impulses discarded
    let mut cold = world.clone();
    cold.solver.warm_starting = false;
    cold.step(DT).expect("step should succeed");

    assert!(
        avg_speed(&warm) < avg_speed(&cold),
        "warm {} vs cold {}",
        avg_speed(&warm),
        avg_speed(&cold)
    );
}

#[test]
fn frictionless_slide_conserves_tangential_velocity() {
    let mut world = world();
    let ground = add_ground(&mut world);
    world.body_mut(ground).expect("ground exists").friction = 0.0;

    let slider = world.add_body(
        Body::new(Vector2::new(1.0, 1.0), 1.0)
            .with_position(Point2::new(0.0, 0.49))
            .with_velocity(Vector2::new(1.0, 0.0))
            .with_friction(0.0),
    );

    run(&mut world, 60);

    // Normal impulses are vertical; with a zero Coulomb cone nothing ever
    // touches the horizontal velocity
    let body = world.body(slider).expect("body exists");
    assert!(
        (body.velocity.x - 1.0).abs() < 1e-9,
        "tangential velocity drifted: vx = {}",
        body.velocity.x
    );
}

#[test]
fn friction_brings_slider_to_rest() {
    let mut world = world();
    let ground = add_ground(&mut world);
    world.body_mut(ground).expect("ground exists").friction = 1.0;

    let slider = world.add_body(
        Body::new(Vector2::new(1.0, 1.0), 1.0)
            .with_position(Point2::new(0.0, 0.49))
            .with_velocity(Vector2::new(1.0, 0.0))
            .with_friction(1.0),
    );

    // At mu = 1 the deceleration is ~g, so 1 m/s dies in ~0.1 s; allow a
    // generous margin for the settling transient
    run(&mut world, 240);

    let body = world.body(slider).expect("body exists");
    assert!(
        body.velocity.x.abs() < 0.01,
        "slider still moving: vx = {}",
        body.velocity.x
    );
}

#[test]
fn static_bodies_stay_quiescent() {
    let mut world = world();
    let ground = add_ground(&mut world);

    // Rain boxes onto the ground and hang one from a joint
    for i in 0..3 {
        world.add_body(
            Body::new(Vector2::new(1.0, 1.0), 5.0)
                .with_position(Point2::new(f64::from(i) - 1.0, 2.0 + f64::from(i))),
        );
    }
    let bob = world.add_body(
        Body::new(Vector2::new(1.0, 1.0), 10.0).with_position(Point2::new(5.0, 6.0)),
    );
    world
        .add_joint(ground, bob, Point2::new(3.0, 6.0))
        .expect("valid joint");

    run(&mut world, 120);

    let body = world.body(ground).expect("ground exists");
    assert_eq!(body.position, Point2::new(0.0, -10.0));
    assert_eq!(body.rotation, 0.0);
    assert_eq!(body.velocity, Vector2::zeros());
    assert_eq!(body.angular_velocity, 0.0);
}

#[test]
fn contact_features_stable_at_rest() {
    let mut world = world();
    add_ground(&mut world);
    // Slight horizontal offsets keep the clipping away from degenerate
    // exactly-aligned edges, the way a real scene would sit
    for i in 0..3 {
        world.add_body(
            Body::new(Vector2::new(1.0, 1.0), 1.0)
                .with_position(Point2::new(0.02 * f64::from(i), 0.51 + 1.05 * f64::from(i))),
        );
    }
    run(&mut world, 300);

    let snapshot = |w: &World| {
        let mut features: Vec<(planar_core::ArbiterKey, Vec<u32>)> = w
            .arbiters()
            .map(|(key, arb)| {
                (*key, arb.contacts().iter().map(|c| c.feature.key()).collect())
            })
            .collect();
        features.sort_by_key(|(key, _)| *key);
        features
    };

    let before = snapshot(&world);
    world.step(DT).expect("step should succeed");
    let after = snapshot(&world);

    assert_eq!(before, after, "contact features changed at rest");
}

#[test]
fn accumulated_impulses_respect_bounds() {
    let mut world = world();
    add_ground(&mut world);
    for i in 0..4 {
        world.add_body(
            Body::new(Vector2::new(1.0, 1.0), 2.0)
                .with_position(Point2::new(0.2 * f64::from(i), 1.0 + 1.2 * f64::from(i))),
        );
    }

    for _ in 0..200 {
        world.step(DT).expect("step should succeed");
        for (_, arbiter) in world.arbiters() {
            for c in arbiter.contacts() {
                assert!(c.normal_impulse >= 0.0, "negative normal impulse");
                assert!(
                    c.tangent_impulse.abs() <= arbiter.friction() * c.normal_impulse + 1e-9,
                    "friction impulse outside the Coulomb cone"
                );
            }
        }
    }
}

#[test]
fn gravity_free_fall_is_exact_before_contact() {
    let mut world = world();
    let id = world.add_body(
        Body::new(Vector2::new(1.0, 1.0), 1.0).with_position(Point2::new(0.0, 1000.0)),
    );

    run(&mut world, 50);

    let body = world.body(id).expect("body exists");
    assert!((body.velocity.y - (-10.0 * 50.0 * DT)).abs() < 1e-9);
}
