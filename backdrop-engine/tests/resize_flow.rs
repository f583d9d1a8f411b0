//! Viewport changes driving scene rebuilds, end to end.

use backdrop_engine::lifecycle::{Mount, TextureTable};
use backdrop_engine::render::records;
use backdrop_engine::scene::Kind;
use backdrop_engine::{build_scene, refit, Animator, Encoder, Rng, SceneConfig, SceneKind, Viewport};

#[test]
fn profile_flip_rebuilds_with_new_counts() {
    let config = SceneConfig::default();
    let mut rng = Rng::new(21);
    let mut vp = Viewport::new(1600.0, 900.0, 1.0, false);
    let mut scene = build_scene(SceneKind::Spaceport, vp.state(), &config, &mut rng);
    assert_eq!(scene.stars.len(), config.desktop.stars);

    // Narrow window crosses the breakpoint
    let outcome = vp.resize(600.0, 900.0, 2.0);
    assert!(outcome.profile_changed);
    assert!(refit(&mut scene, outcome, vp.state(), &config, &mut rng));
    assert_eq!(scene.stars.len(), config.mobile.stars);
    assert_eq!(scene.root.count_kind(Kind::Tower), config.mobile.towers + 1);
    assert_eq!(scene.root.count_kind(Kind::Craft), config.mobile.craft);
    assert_eq!(scene.detail, config.mobile.segments);

    let outcome = vp.resize(1920.0, 1080.0, 1.0);
    assert!(refit(&mut scene, outcome, vp.state(), &config, &mut rng));
    assert_eq!(scene.stars.len(), config.desktop.stars);
    assert_eq!(scene.root.count_kind(Kind::Craft), config.desktop.craft);
}

#[test]
fn mobile_user_agent_stays_mobile_when_wide() {
    let config = SceneConfig::default();
    let mut rng = Rng::new(22);
    let mut vp = Viewport::new(400.0, 800.0, 3.0, true);
    let mut scene = build_scene(SceneKind::Skyline, vp.state(), &config, &mut rng);
    assert_eq!(scene.stars.len(), config.mobile.stars);

    let outcome = vp.resize(1200.0, 800.0, 3.0);
    assert!(!outcome.profile_changed);
    assert!(!refit(&mut scene, outcome, vp.state(), &config, &mut rng));
    assert_eq!(scene.stars.len(), config.mobile.stars);
    assert_eq!(vp.projection().pixel_ratio, 2.0);
}

#[test]
fn widening_a_skyline_keeps_existing_buildings() {
    let config = SceneConfig::default();
    let mut rng = Rng::new(23);
    let mut vp = Viewport::new(1000.0, 1000.0, 1.0, false);
    let mut scene = build_scene(SceneKind::Skyline, vp.state(), &config, &mut rng);
    let before: Vec<_> = scene
        .root
        .children
        .iter()
        .filter(|c| c.kind == Kind::Building)
        .map(|b| (b.transform.position, b.transform.scale))
        .collect();

    let outcome = vp.resize(2400.0, 1000.0, 1.0);
    assert!(!refit(&mut scene, outcome, vp.state(), &config, &mut rng));
    assert!(scene.span >= 2.4);

    let after: Vec<_> = scene
        .root
        .children
        .iter()
        .filter(|c| c.kind == Kind::Building)
        .map(|b| (b.transform.position, b.transform.scale))
        .collect();
    assert!(after.len() > before.len());
    assert_eq!(&after[..before.len()], &before[..]);

    // Shrinking never removes anything
    let count = after.len();
    let outcome = vp.resize(1000.0, 1000.0, 1.0);
    refit(&mut scene, outcome, vp.state(), &config, &mut rng);
    assert_eq!(scene.root.count_kind(Kind::Building), count);
}

#[test]
fn textures_appear_only_while_mounted() {
    let config = SceneConfig::default();
    let mut rng = Rng::new(24);
    let vp = Viewport::new(1280.0, 720.0, 1.0, false);
    let mut scene = build_scene(SceneKind::Globe, vp.state(), &config, &mut rng);
    let mut animator = Animator::new();
    animator.step(&mut scene, 1.0, &mut rng);

    let mut table = TextureTable::new(config.textures.clone());
    let mount = Mount::new();
    let mut enc = Encoder::new();
    let globe_texture = |enc: &Encoder| {
        records(enc.as_slice()).find(|r| r.kind() == Some(Kind::Globe)).and_then(|r| r.texture())
    };

    enc.encode(&scene, 1.0, &table);
    assert_eq!(globe_texture(&enc), None);

    let early = mount.token();
    assert!(table.resolve(&early, 0, true));
    enc.encode(&scene, 1.0, &table);
    assert_eq!(globe_texture(&enc), Some(0));

    // Clouds finish loading after the view went away
    drop(mount);
    assert!(!table.resolve(&early, 2, true));
    assert!(!table.is_ready(2));
}
