use glam::{Quat, Vec3};
use physics::{BodyDesc, BodyHandle, ContactMaterial, ContactProperties, PhysicsWorld, Shape};

const DT: f32 = 1.0 / 60.0;

fn world_with_floor() -> PhysicsWorld {
    let mut world = PhysicsWorld::default();
    let floor = BodyDesc::new(0.0, Shape::Plane)
        .with_rotation(Quat::from_axis_angle(Vec3::NEG_X, std::f32::consts::FRAC_PI_2));
    world.add_body(&floor);
    world
}

fn drop_ball(world: &mut PhysicsWorld, height: f32) -> BodyHandle {
    world.add_body(
        &BodyDesc::new(1.0, Shape::Sphere { radius: 0.5 }).with_position(Vec3::new(0.0, height, 0.0)),
    )
}

#[test]
fn falling_ball_reports_a_hard_impact() {
    let mut world = world_with_floor();
    let ball = drop_ball(&mut world, 3.0);
    world.subscribe_collide(ball).unwrap();

    let mut strongest = 0.0_f32;
    for _ in 0..120 {
        world.step(DT, DT, 3);
        for event in world.drain_collide_events() {
            assert_eq!(event.body, ball);
            assert!(event.other.is_some(), "the floor is a body too");
            strongest = strongest.max(event.impact_velocity);
        }
    }

    // free fall from 2.5 m above contact: sqrt(2 * 9.82 * 2.5) ~ 7 m/s
    println!("strongest impact: {strongest:.3}");
    assert!(strongest > 5.0, "impact {strongest} should be close to 7 m/s");
    assert!(strongest < 8.0, "impact {strongest} should be close to 7 m/s");
}

#[test]
fn resting_contact_is_soft() {
    let mut world = world_with_floor();
    let ball = drop_ball(&mut world, 0.5);
    world.subscribe_collide(ball).unwrap();

    for _ in 0..30 {
        world.step(DT, DT, 3);
    }
    world.drain_collide_events();

    for _ in 0..30 {
        world.step(DT, DT, 3);
        for event in world.drain_collide_events() {
            assert!(
                event.impact_velocity < 1.5,
                "resting ball reported impact {}",
                event.impact_velocity
            );
        }
    }
}

#[test]
fn unsubscribed_bodies_are_silent() {
    let mut world = world_with_floor();
    let ball = drop_ball(&mut world, 2.0);
    world.subscribe_collide(ball).unwrap();
    assert!(world.unsubscribe_collide(ball));

    for _ in 0..120 {
        world.step(DT, DT, 3);
    }
    assert!(world.drain_collide_events().is_empty());
}

#[test]
fn contact_material_controls_bounce() {
    let bounce_peak = |properties: ContactProperties| {
        let mut world = world_with_floor();
        let material = world.add_material("default").unwrap();
        world.add_contact_material(ContactMaterial::new(
            material,
            material,
            properties.friction,
            properties.restitution,
        ));
        world.set_default_contact_material(properties);

        let ball = world.add_body(
            &BodyDesc::new(1.0, Shape::Sphere { radius: 0.5 })
                .with_position(Vec3::new(0.0, 3.0, 0.0))
                .with_material(material),
        );

        let mut landed = false;
        let mut peak = 0.0_f32;
        for _ in 0..180 {
            world.step(DT, DT, 3);
            let velocity = world.linear_velocity(ball).unwrap();
            let y = world.pose(ball).unwrap().position.y;
            if !landed && velocity.y > 0.0 {
                landed = true;
            }
            if landed {
                peak = peak.max(y);
            }
        }
        peak
    };

    let bouncy = bounce_peak(ContactProperties::new(0.1, 0.7));
    let dead = bounce_peak(ContactProperties::new(0.1, 0.0));
    println!("bouncy peak {bouncy:.3}, dead peak {dead:.3}");
    assert!(bouncy > dead + 0.3, "restitution 0.7 should bounce visibly higher");
}

#[test]
fn slow_frames_never_exceed_the_substep_cap() {
    let mut world = world_with_floor();
    drop_ball(&mut world, 3.0);

    for real_dt in [0.0, DT, 0.05, 0.25, 2.0, 30.0] {
        let report = world.step(DT, real_dt, 3);
        assert!(report.substeps <= 3);
        assert!((report.fixed_dt - DT).abs() < f32::EPSILON);
    }
}

#[test]
fn each_bounce_reports_once() {
    let mut world = world_with_floor();
    world.set_default_contact_material(ContactProperties::new(0.1, 0.7));
    let ball = drop_ball(&mut world, 3.0);
    world.subscribe_collide(ball).unwrap();

    // Landing near step 43 at ~7 m/s, the first bounce lands near step 100
    // at ~5 m/s and the next one not before step 125.
    let mut hits = Vec::new();
    for step in 0..120 {
        world.step(DT, DT, 3);
        let events = world.drain_collide_events();
        assert!(events.len() <= 1, "step {step}: {events:?}");
        hits.extend(events.iter().map(|e| (step, e.impact_velocity)));
    }

    println!("hits: {hits:?}");
    assert_eq!(hits.len(), 2, "one event per bounce, got {hits:?}");
    assert!(hits.iter().all(|&(_, impact)| impact > 1.5));
    assert!(hits[1].0 - hits[0].0 > 30, "bounces are far apart: {hits:?}");
}

#[test]
fn resting_box_reports_its_contact_once() {
    let mut world = world_with_floor();
    let crate_box = world.add_body(
        &BodyDesc::new(
            1.0,
            Shape::Box {
                half_extents: Vec3::splat(0.5),
            },
        )
        .with_position(Vec3::new(0.0, 0.5, 0.0)),
    );
    world.subscribe_collide(crate_box).unwrap();

    let mut events = 0;
    for _ in 0..60 {
        world.step(DT, DT, 3);
        events += world.drain_collide_events().len();
    }
    assert_eq!(events, 1);
}

#[test]
fn subscribing_mid_contact_reports_nothing_new() {
    let mut world = world_with_floor();
    let ball = drop_ball(&mut world, 0.5);
    for _ in 0..10 {
        world.step(DT, DT, 3);
    }

    world.subscribe_collide(ball).unwrap();
    for _ in 0..30 {
        world.step(DT, DT, 3);
    }
    assert!(world.drain_collide_events().is_empty());
}
