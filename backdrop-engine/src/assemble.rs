// assemble.rs - Scene assembler
//
// Places builder output into a spatial arrangement once per build. Placement
// is best-effort: a candidate too close to an accepted one is re-rolled, and
// after the retry budget the last candidate is taken anyway.

use glam::{Vec2, Vec3};

use crate::animate::Meteors;
use crate::builders;
use crate::config::{ProfileCounts, SceneConfig};
use crate::rng::Rng;
use crate::scene::{Kind, Scene, SceneKind, SceneObject, StarBounds, StarField};
use crate::viewport::{ResizeOutcome, ViewportState};

// Skyline
const BUILDING_MIN_HEIGHT: f32 = 0.2;
const BUILDING_MAX_HEIGHT: f32 = 0.65;
const SKY_HEIGHT: f32 = 0.7;
const MOON_RADIUS: f32 = 0.045;

// Space-port
const HUB_HEIGHT: f32 = 7.0;
const HUB_RADIUS: f32 = 0.7;
const STAR_SHELL: (f32, f32) = (60.0, 120.0);

/// Ring-shaped region on the ground plane (x, z), optionally squashed along z.
#[derive(Debug, Clone, Copy)]
pub struct Annulus {
    pub center: Vec2,
    pub inner: f32,
    pub outer: f32,
    pub squash: f32,
}

impl Annulus {
    /// Uniform by area between the two radii
    pub fn sample(&self, rng: &mut Rng) -> Vec2 {
        let angle = rng.range(0.0, std::f32::consts::TAU);
        let r = rng.range(self.inner * self.inner, self.outer * self.outer).sqrt();
        self.center + Vec2::new(r * angle.cos(), r * angle.sin() * self.squash)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub point: Vec2,
    /// Accepted only because the retry budget ran out
    pub forced: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Placer {
    pub min_separation: f32,
    pub max_retries: u32,
}

impl Placer {
    pub fn place(&self, count: usize, area: &Annulus, rng: &mut Rng) -> Vec<Placement> {
        let mut accepted: Vec<Placement> = Vec::with_capacity(count);
        let mut forced_total = 0;

        for _ in 0..count {
            let mut candidate = area.sample(rng);
            let mut forced = true;
            for _ in 0..self.max_retries {
                if self.clear_of(&accepted, candidate) {
                    forced = false;
                    break;
                }
                candidate = area.sample(rng);
            }
            forced_total += usize::from(forced);
            accepted.push(Placement { point: candidate, forced });
        }

        if forced_total > 0 {
            log::debug!("placed {count} objects, {forced_total} overlapping after {} retries", self.max_retries);
        }
        accepted
    }

    fn clear_of(&self, accepted: &[Placement], candidate: Vec2) -> bool {
        accepted.iter().all(|p| p.point.distance(candidate) >= self.min_separation)
    }
}

/// Build the full object graph for `kind` at the counts `viewport` calls for.
pub fn build_scene(kind: SceneKind, viewport: &ViewportState, config: &SceneConfig, rng: &mut Rng) -> Scene {
    let counts = config.counts(viewport.profile());
    let scene = match kind {
        SceneKind::Globe => globe_scene(counts, config),
        SceneKind::Spaceport => spaceport_scene(counts, config, rng),
        SceneKind::Skyline => skyline_scene(viewport.aspect(), counts, rng),
    };
    log::info!(
        "assembled {kind:?} scene: {} nodes, {} stars ({:?})",
        scene.root.count(),
        scene.stars.len(),
        viewport.profile()
    );
    scene
}

fn globe_scene(counts: &ProfileCounts, config: &SceneConfig) -> Scene {
    let root = SceneObject::group()
        .with_child(builders::star_dome())
        .with_child(builders::globe(config.globe_spin))
        .with_child(builders::atmosphere(config.globe_spin));
    Scene {
        kind: SceneKind::Globe,
        root,
        stars: StarField::default(),
        meteors: None,
        span: 0.0,
        detail: counts.segments,
    }
}

fn spaceport_scene(counts: &ProfileCounts, config: &SceneConfig, rng: &mut Rng) -> Scene {
    let placer = Placer { min_separation: config.min_separation, max_retries: config.max_retries };
    let area = Annulus {
        center: Vec2::ZERO,
        inner: config.ring_inner,
        outer: config.ring_outer,
        squash: config.ring_squash,
    };

    let mut towers: Vec<SceneObject> = placer
        .place(counts.towers, &area, rng)
        .into_iter()
        .map(|p| {
            let rings = usize::from(rng.chance(0.5));
            let height = rng.range(2.0, 5.5);
            let radius = rng.range(0.25, 0.5);
            builders::tower(Vec3::new(p.point.x, 0.0, p.point.y), height, radius, rings, rng)
        })
        .collect();
    // Back to front for a camera on +z, decided once here
    towers.sort_by(|a, b| a.transform.position.z.total_cmp(&b.transform.position.z));

    let mut root = SceneObject::group().with_spin(config.scene_spin);
    root.children.push(builders::tower(Vec3::ZERO, HUB_HEIGHT, HUB_RADIUS, 2, rng));
    root.children.extend(towers);
    for _ in 0..counts.craft {
        let orbit = builders::random_orbit(config.ring_inner * 0.6, config.ring_outer * 1.1, rng);
        let color = *rng.pick(&builders::CRAFT_COLORS);
        root.children.push(builders::craft(orbit, color, config.trail_length));
    }

    let stars = StarField::generate(
        counts.stars,
        StarBounds::Shell { inner: STAR_SHELL.0, outer: STAR_SHELL.1 },
        config.star_drift,
        rng,
    );

    Scene {
        kind: SceneKind::Spaceport,
        root,
        stars,
        meteors: None,
        span: config.ring_outer * 2.0,
        detail: counts.segments,
    }
}

/// The moon sits near the right edge of the visible sky.
fn moon_anchor(aspect: f32) -> Vec3 {
    Vec3::new(0.8 * aspect, 0.15, 0.0)
}

fn skyline_scene(aspect: f32, counts: &ProfileCounts, rng: &mut Rng) -> Scene {
    let span = aspect.max(1.0);
    let mut root = SceneObject::group();
    root.children.push(builders::moon(moon_anchor(aspect), MOON_RADIUS));

    let mut scene = Scene {
        kind: SceneKind::Skyline,
        root,
        stars: StarField::default(),
        meteors: Some(Meteors::new()),
        span: 0.0,
        detail: counts.segments,
    };
    pack_buildings(&mut scene, span, counts, rng);
    scene.stars = sky_stars(scene.span, counts, rng);
    scene
}

/// Bring `scene` in line with a resized viewport. A profile flip
/// re-assembles it for the new counts; otherwise only a skyline grows.
/// Returns true when the scene was rebuilt.
pub fn refit(
    scene: &mut Scene,
    outcome: ResizeOutcome,
    viewport: &ViewportState,
    config: &SceneConfig,
    rng: &mut Rng,
) -> bool {
    if outcome.profile_changed {
        log::info!("viewport profile is now {:?}, rebuilding {:?}", viewport.profile(), scene.kind);
        *scene = build_scene(scene.kind, viewport, config, rng);
        return true;
    }
    extend_skyline(scene, viewport.aspect(), config.counts(viewport.profile()), rng);
    false
}

/// Widen a skyline to cover `span` without touching existing buildings.
/// Returns the number of buildings added; other scene kinds are left alone.
pub fn extend_skyline(scene: &mut Scene, span: f32, counts: &ProfileCounts, rng: &mut Rng) -> usize {
    if scene.kind != SceneKind::Skyline || span <= scene.span {
        return 0;
    }
    let added = pack_buildings(scene, span, counts, rng);
    for node in scene.root.children.iter_mut().filter(|n| n.kind == Kind::Moon) {
        node.transform.position = moon_anchor(span);
    }
    // The sky is regenerated whole; a field is never edited in place
    scene.stars = sky_stars(scene.span, counts, rng);
    log::debug!("skyline extended to {:.2} with {added} buildings", scene.span);
    added
}

/// Pack buildings edge to edge from the current span until `span` is covered.
fn pack_buildings(scene: &mut Scene, span: f32, counts: &ProfileCounts, rng: &mut Rng) -> usize {
    let mut x = scene.span;
    let mut added = 0;
    while x < span {
        let width = rng.range(counts.building_min_width, counts.building_max_width);
        let height = rng.range(BUILDING_MIN_HEIGHT, BUILDING_MAX_HEIGHT);
        scene.root.children.push(builders::building(x, width, height, rng));
        x += width;
        added += 1;
    }
    scene.span = x;
    added
}

fn sky_stars(span: f32, counts: &ProfileCounts, rng: &mut Rng) -> StarField {
    StarField::generate(counts.stars, StarBounds::Sky { width: span, height: SKY_HEIGHT }, 0.0, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::Viewport;

    fn area(inner: f32, outer: f32) -> Annulus {
        Annulus { center: Vec2::ZERO, inner, outer, squash: 1.0 }
    }

    #[test]
    fn samples_stay_in_annulus() {
        let mut rng = Rng::new(8);
        let a = area(3.0, 6.0);
        for _ in 0..1000 {
            let d = a.sample(&mut rng).length();
            assert!((3.0 - 1e-4..=6.0 + 1e-4).contains(&d));
        }
    }

    #[test]
    fn unforced_placements_respect_separation() {
        let mut rng = Rng::new(21);
        let placer = Placer { min_separation: 1.0, max_retries: 50 };
        let placed = placer.place(20, &area(4.0, 12.0), &mut rng);
        assert_eq!(placed.len(), 20);
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[..i] {
                if !a.forced {
                    assert!(a.point.distance(b.point) >= 1.0);
                }
            }
        }
    }

    #[test]
    fn crowded_area_tolerates_overlap_and_terminates() {
        let mut rng = Rng::new(4);
        let placer = Placer { min_separation: 2.0, max_retries: 10 };
        // A ring of width 1 and radius ~1.5 fits only a handful at spacing 2
        let placed = placer.place(200, &area(1.0, 2.0), &mut rng);
        assert_eq!(placed.len(), 200);
        assert!(placed.iter().any(|p| p.forced));
        assert!(!placed[0].forced);
    }

    #[test]
    fn skyline_covers_span() {
        let vp = Viewport::new(1600.0, 900.0, 1.0, false);
        let config = SceneConfig::default();
        let mut rng = Rng::new(10);
        let scene = build_scene(SceneKind::Skyline, vp.state(), &config, &mut rng);
        assert!(scene.span >= vp.state().aspect());
        assert_eq!(scene.stars.len(), config.desktop.stars);
        assert_eq!(scene.root.count_kind(Kind::Moon), 1);

        let mut right = 0.0f32;
        for b in scene.root.children.iter().filter(|c| c.kind == Kind::Building) {
            assert!((b.transform.position.x - right).abs() < 1e-4, "buildings must abut");
            right = b.transform.position.x + b.transform.scale.x;
        }
        assert!((right - scene.span).abs() < 1e-4);
    }

    #[test]
    fn extend_adds_without_rebuilding() {
        let vp = Viewport::new(1000.0, 1000.0, 1.0, false);
        let config = SceneConfig::default();
        let mut rng = Rng::new(12);
        let mut scene = build_scene(SceneKind::Skyline, vp.state(), &config, &mut rng);
        let first = scene.root.children[1].transform.position;
        let before = scene.root.children.len();

        let added = extend_skyline(&mut scene, 2.5, &config.desktop, &mut rng);
        assert!(added > 0);
        assert_eq!(scene.root.children.len(), before + added);
        assert_eq!(scene.root.children[1].transform.position, first);
        assert!(scene.span >= 2.5);

        assert_eq!(extend_skyline(&mut scene, 1.0, &config.desktop, &mut rng), 0);
    }

    #[test]
    fn moon_follows_a_widened_skyline() {
        let vp = Viewport::new(1000.0, 1000.0, 1.0, false);
        let config = SceneConfig::default();
        let mut rng = Rng::new(21);
        let mut scene = build_scene(SceneKind::Skyline, vp.state(), &config, &mut rng);
        assert_eq!(scene.root.children[0].kind, Kind::Moon);
        assert_eq!(scene.root.children[0].transform.position, moon_anchor(1.0));

        extend_skyline(&mut scene, 2.5, &config.desktop, &mut rng);
        let moon = &scene.root.children[0];
        assert_eq!(moon.transform.position, Vec3::new(0.8 * 2.5, 0.15, 0.0));
        assert_eq!(moon.count_kind(Kind::Crater), 2);
    }

    #[test]
    fn spaceport_counts_follow_profile() {
        let config = SceneConfig::default();
        let mut rng = Rng::new(13);
        let desktop = Viewport::new(1600.0, 900.0, 1.0, false);
        let mobile = Viewport::new(400.0, 800.0, 2.0, true);

        let d = build_scene(SceneKind::Spaceport, desktop.state(), &config, &mut rng);
        let m = build_scene(SceneKind::Spaceport, mobile.state(), &config, &mut rng);

        // +1 for the hub
        assert_eq!(d.root.count_kind(Kind::Tower), config.desktop.towers + 1);
        assert_eq!(m.root.count_kind(Kind::Tower), config.mobile.towers + 1);
        assert_eq!(d.root.count_kind(Kind::Craft), config.desktop.craft);
        assert_eq!(m.root.count_kind(Kind::Craft), config.mobile.craft);
        assert_eq!(m.stars.len(), config.mobile.stars);
        assert_eq!(m.detail, config.mobile.segments);
    }

    #[test]
    fn spaceport_towers_sorted_back_to_front() {
        let config = SceneConfig::default();
        let vp = Viewport::new(1600.0, 900.0, 1.0, false);
        let scene = build_scene(SceneKind::Spaceport, vp.state(), &config, &mut Rng::new(14));
        let zs: Vec<f32> = scene.root.children[1..]
            .iter()
            .filter(|c| c.kind == Kind::Tower)
            .map(|c| c.transform.position.z)
            .collect();
        assert!(zs.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn globe_scene_layers() {
        let config = SceneConfig::default();
        let vp = Viewport::new(1600.0, 900.0, 1.0, false);
        let scene = build_scene(SceneKind::Globe, vp.state(), &config, &mut Rng::new(1));
        let kinds: Vec<Kind> = scene.root.children.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![Kind::StarDome, Kind::Globe, Kind::Atmosphere]);
        assert_eq!(scene.detail, config.desktop.segments);
    }
}
