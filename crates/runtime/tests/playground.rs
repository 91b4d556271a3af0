use glam::Vec3;
use runtime::{
    DebugAction, HitSound, ObjectPair, Playground, PlaygroundConfig, ShapeKind, SpawnRanges,
};

const DT: f32 = 1.0 / 60.0;

#[derive(Default)]
struct Recording {
    volumes: Vec<f32>,
}

impl HitSound for Recording {
    fn play(&mut self, volume: f32) {
        self.volumes.push(volume);
    }
}

fn playground(initial: bool) -> Playground<Recording> {
    let mut config = PlaygroundConfig::default();
    if !initial {
        config.initial_objects.clear();
    }
    Playground::new(config, Recording::default(), Some(42)).unwrap()
}

fn run(playground: &mut Playground<Recording>, frames: usize) -> usize {
    (0..frames).map(|_| playground.frame(DT).sounds_played).sum()
}

#[test]
fn populate_spawns_the_startup_pair() {
    let mut playground = playground(true);
    let pairs = playground.populate();

    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].kind, ShapeKind::Sphere);
    assert_eq!(pairs[1].kind, ShapeKind::Box);

    let sphere = playground.scene().get(pairs[0].visual).unwrap();
    assert_eq!(sphere.transform.position, Vec3::new(0.0, 3.0, 0.0));
    assert_eq!(sphere.transform.scale, Vec3::splat(0.5));
    let cube = playground.scene().get(pairs[1].visual).unwrap();
    assert_eq!(cube.transform.position, Vec3::new(-2.0, 3.0, 0.0));
    assert_eq!(cube.transform.scale, Vec3::ONE);
}

#[test]
fn spawning_adds_one_visual_and_one_body_each() {
    let mut playground = playground(false);
    let scene_before = playground.scene().len();
    let bodies_before = playground.world().body_count();

    for i in 0..5 {
        playground.create_sphere(0.3, Vec3::new(i as f32, 2.0, 0.0));
        playground.create_box(0.4, 0.5, 0.6, Vec3::new(i as f32, 4.0, 0.0));
    }

    assert_eq!(playground.registry().len(), 10);
    assert_eq!(playground.registry().count(ShapeKind::Sphere), 5);
    assert_eq!(playground.scene().len(), scene_before + 10);
    assert_eq!(playground.world().body_count(), bodies_before + 10);
    for pair in playground.registry() {
        assert!(playground.scene().contains(pair.visual));
        assert!(playground.world().contains(pair.body));
        assert!(playground.world().is_subscribed(pair.body));
    }
}

#[test]
fn reset_removes_every_pair_and_subscription() {
    let mut playground = playground(true);
    let mut spawned: Vec<ObjectPair> = playground.populate();
    spawned.push(playground.spawn_random_box());
    spawned.push(playground.spawn_random_sphere());
    run(&mut playground, 30);

    assert_eq!(playground.reset(), 4);

    assert!(playground.registry().is_empty());
    for pair in &spawned {
        assert!(!playground.scene().contains(pair.visual));
        assert!(!playground.world().contains(pair.body));
        assert!(!playground.world().is_subscribed(pair.body));
    }
    // Only the floor is left.
    assert_eq!(playground.scene().len(), 1);
    assert_eq!(playground.world().body_count(), 1);
    assert_eq!(playground.reset(), 0);
}

#[test]
fn visuals_copy_body_poses_exactly() {
    let mut playground = playground(true);
    playground.populate();
    for _ in 0..3 {
        playground.spawn_random_box();
    }

    for frame in 0..90 {
        let report = playground.frame(DT);
        assert_eq!(report.synced, playground.registry().len());
        if frame % 15 != 0 {
            continue;
        }
        for pair in playground.registry() {
            let pose = playground.world().pose(pair.body).unwrap();
            let transform = playground.scene().get(pair.visual).unwrap().transform;
            assert_eq!(transform.position, pose.position);
            assert_eq!(transform.rotation, pose.rotation);
        }
    }
}

#[test]
fn debug_spawns_respect_the_random_ranges() {
    let mut playground = playground(false);
    let ranges = SpawnRanges::default();
    for _ in 0..200 {
        playground.run_action(DebugAction::CreateSphere);
        playground.run_action(DebugAction::CreateBox);
    }

    for pair in playground.registry() {
        let transform = playground.scene().get(pair.visual).unwrap().transform;
        let p = transform.position;
        assert!(ranges.x.contains(p.x), "x = {}", p.x);
        assert!(ranges.y.contains(p.y), "y = {}", p.y);
        assert!(ranges.z.contains(p.z), "z = {}", p.z);
        let s = transform.scale;
        for size in [s.x, s.y, s.z] {
            assert!(ranges.size.contains(size), "size = {size}");
        }
        if pair.kind == ShapeKind::Sphere {
            assert_eq!(s.x, s.y);
            assert_eq!(s.y, s.z);
        }
    }

    playground.run_action(DebugAction::Reset);
    assert!(playground.registry().is_empty());
}

#[test]
fn a_hard_landing_plays_the_hit_sound_once_per_bounce() {
    let mut playground = playground(false);
    playground.create_sphere(0.5, Vec3::new(0.0, 3.0, 0.0));

    // Two bounces above the threshold land within two seconds: ~7 m/s
    // near frame 43 and ~5 m/s near frame 100. The third comes later.
    let mut sounding_frames = Vec::new();
    for frame in 0..120 {
        let report = playground.frame(DT);
        assert!(report.sounds_played <= 1, "frame {frame}: {report:?}");
        if report.sounds_played == 1 {
            sounding_frames.push(frame);
        }
    }

    assert_eq!(sounding_frames.len(), 2, "frames: {sounding_frames:?}");
    assert!(sounding_frames[1] - sounding_frames[0] > 30);
    let volumes = &playground.sound().volumes;
    assert_eq!(volumes.len(), 2);
    assert!(volumes.iter().all(|v| (0.0..1.0).contains(v)));
}

#[test]
fn resting_objects_stop_colliding() {
    let mut playground = playground(false);
    playground.create_box(1.0, 1.0, 1.0, Vec3::new(0.0, 0.5, 0.0));

    let collisions: usize = (0..60).map(|_| playground.frame(DT).collisions).sum();
    assert_eq!(collisions, 1);
}

#[test]
fn a_gentle_landing_stays_silent() {
    let mut playground = playground(false);
    playground.create_sphere(0.5, Vec3::new(0.0, 0.52, 0.0));

    let played = run(&mut playground, 120);

    assert_eq!(played, 0);
    assert!(playground.sound().volumes.is_empty());
}

#[test]
fn slow_frames_never_exceed_three_fixed_substeps() {
    let mut playground = playground(true);
    playground.populate();
    for real_dt in [0.0, DT, 0.05, 0.25, 2.0] {
        let report = playground.frame(real_dt);
        assert!(report.step.substeps <= 3);
        assert_eq!(report.step.fixed_dt, DT);
        assert_eq!(report.step.max_substeps, 3);
    }
}

#[test]
fn backlog_from_a_long_frame_is_dropped() {
    let mut playground = playground(true);
    playground.populate();

    let long = playground.frame(1.0 + DT * 0.5);
    assert_eq!(long.step.substeps, 3);

    let next = playground.frame(0.001);
    assert_eq!(next.step.substeps, 0);
}

#[test]
fn tick_uses_the_wall_clock() {
    let mut playground = playground(true);
    playground.populate();
    let report = playground.tick();
    assert!(report.step.real_dt >= 0.0);
    assert!(report.step.substeps <= 3);
}
