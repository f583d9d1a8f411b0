// animate.rs - Per-frame animator
//
// Visual state is a pure function of elapsed time and each object's fixed
// parameters, recomputed every tick; nothing accumulates except trail history
// and the short-lived meteors.

use glam::Vec3;

use crate::rng::Rng;
use crate::scene::{Blink, BlinkMode, Orbit, Scene, SceneObject};

// Meteors (shooting stars)
const METEOR_CHANCE: f32 = 0.01;
const MAX_METEORS: usize = 3;
/// Upper band of the sky where meteors start
const METEOR_BAND: f32 = 0.3;
/// Longest frame gap honoured; longer gaps (hidden tab) are clamped
const MAX_DT: f32 = 0.25;

/// Position on `orbit` at time `t`, relative to the orbit centre.
#[inline]
pub fn orbit_position(orbit: &Orbit, t: f32) -> Vec3 {
    let angle = orbit_angle(orbit, t);
    Vec3::new(
        orbit.radius * angle.cos(),
        orbit.height + orbit.hover_amplitude * (orbit.hover_speed * t + orbit.hover_phase).sin(),
        orbit.radius * angle.sin(),
    )
}

#[inline]
pub fn orbit_angle(orbit: &Orbit, t: f32) -> f32 {
    orbit.angle0 + orbit.direction.sign() * orbit.angular_speed * t
}

/// Yaw facing along the direction of travel
pub fn orbit_heading(orbit: &Orbit, t: f32) -> f32 {
    let angle = orbit_angle(orbit, t);
    let s = orbit.direction.sign();
    let (vx, vz) = (-s * angle.sin(), s * angle.cos());
    vx.atan2(vz)
}

#[inline]
pub fn blink_intensity(blink: &Blink, t: f32) -> f32 {
    blink.base + blink.amplitude * (blink.frequency * t + blink.phase).sin()
}

/// Discrete state for threshold lights; smooth lights are always on.
#[inline]
pub fn blink_on(blink: &Blink, t: f32) -> bool {
    match blink.mode {
        BlinkMode::Smooth => true,
        BlinkMode::OffAbove(threshold) => (blink.frequency * t + blink.phase).sin() <= threshold,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Meteor {
    pub start: Vec3,
    pub length: f32,
    pub angle: f32,
    /// 0..1 along the streak
    pub progress: f32,
    /// Progress per 60th of a second
    pub speed: f32,
}

impl Meteor {
    pub fn head(&self) -> Vec3 {
        let reach = self.length * self.progress;
        self.start + Vec3::new(self.angle.cos() * reach, self.angle.sin() * reach, 0.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Meteors {
    live: Vec<Meteor>,
}

impl Meteors {
    pub fn new() -> Self {
        Self { live: Vec::with_capacity(MAX_METEORS) }
    }

    pub fn live(&self) -> &[Meteor] { &self.live }

    pub fn clear(&mut self) {
        self.live.clear();
    }

    /// Maybe spawn one, then advance and retire finished streaks.
    pub fn update(&mut self, dt: f32, span: f32, rng: &mut Rng) {
        if rng.chance(METEOR_CHANCE) && self.live.len() < MAX_METEORS {
            self.live.push(Meteor {
                start: Vec3::new(rng.next_f32() * span, rng.next_f32() * METEOR_BAND, 0.0),
                length: rng.range(0.05, 0.15),
                angle: std::f32::consts::FRAC_PI_4 * (1.0 + rng.next_f32()),
                progress: 0.0,
                speed: rng.range(0.01, 0.03),
            });
        }

        let frames = dt * 60.0;
        self.live.retain_mut(|m| {
            m.progress += m.speed * frames;
            m.progress < 1.0
        });
    }
}

/// Drives one scene from a monotonic clock supplied by the host.
pub struct Animator {
    last_t: Option<f32>,
}

impl Animator {
    pub fn new() -> Self {
        Self { last_t: None }
    }

    /// Forget the previous timestamp, e.g. after the view was hidden.
    pub fn reset_clock(&mut self) {
        self.last_t = None;
    }

    /// Pick up after a pause. Restarts the clock and drops trail history
    /// recorded before the pause.
    pub fn resume(&mut self, scene: &mut Scene) {
        self.reset_clock();
        scene.root.walk_mut(&mut |node| {
            if let Some(trail) = node.trail.as_mut() {
                trail.clear();
            }
        });
    }

    /// Bring every object in `scene` to time `t` (seconds).
    pub fn step(&mut self, scene: &mut Scene, t: f32, rng: &mut Rng) {
        let dt = match self.last_t {
            Some(prev) => (t - prev).clamp(0.0, MAX_DT),
            None => 0.0,
        };
        self.last_t = Some(t);

        scene.root.walk_mut(&mut |node| update_node(node, t));
        scene.stars.rotation = scene.stars.drift_speed * t;

        if let Some(meteors) = scene.meteors.as_mut() {
            meteors.update(dt, scene.span, rng);
        }
    }
}

impl Default for Animator {
    fn default() -> Self {
        Self::new()
    }
}

fn update_node(node: &mut SceneObject, t: f32) {
    if node.spin != 0.0 {
        node.transform.rotation.y = node.spin * t;
    }

    if let Some(orbit) = node.orbit {
        let position = orbit_position(&orbit, t);
        node.transform.position = position;
        node.transform.rotation.y = orbit_heading(&orbit, t);
        if let Some(trail) = node.trail.as_mut() {
            trail.push(position);
        }
    }

    if let Some(blink) = node.blink {
        node.style.emissive = if blink_on(&blink, t) { blink_intensity(&blink, t).max(0.0) } else { 0.0 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Color, Direction, Kind, SceneKind, StarField, Style, TrailBuffer, Transform};
    use proptest::prelude::*;
    use crate::rng::Rng;

    fn orbit(direction: Direction) -> Orbit {
        Orbit {
            radius: 5.0,
            angular_speed: 0.5,
            angle0: 0.3,
            height: 2.0,
            hover_amplitude: 0.25,
            hover_speed: 1.5,
            hover_phase: 0.7,
            direction,
        }
    }

    fn scene_with(root: SceneObject) -> Scene {
        Scene {
            kind: SceneKind::Spaceport,
            root,
            stars: StarField::default(),
            meteors: None,
            span: 1.0,
            detail: 16,
        }
    }

    proptest! {
        #[test]
        fn orbit_stays_on_radius(t in 0.0f32..10_000.0, radius in 0.1f32..50.0, cw in any::<bool>()) {
            let mut o = orbit(if cw { Direction::Clockwise } else { Direction::CounterClockwise });
            o.radius = radius;
            let p = orbit_position(&o, t);
            let planar = (p.x * p.x + p.z * p.z).sqrt();
            prop_assert!((planar - radius).abs() <= radius * 1e-4);
            prop_assert!((p.y - o.height).abs() <= o.hover_amplitude + 1e-4);
        }
    }

    #[test]
    fn direction_flips_travel() {
        let ccw = orbit(Direction::CounterClockwise);
        let cw = orbit(Direction::Clockwise);
        assert!(orbit_angle(&ccw, 1.0) > ccw.angle0);
        assert!(orbit_angle(&cw, 1.0) < cw.angle0);
    }

    #[test]
    fn orbit_is_deterministic_in_time() {
        let o = orbit(Direction::CounterClockwise);
        assert_eq!(orbit_position(&o, 12.5), orbit_position(&o, 12.5));
    }

    #[test]
    fn threshold_blink_switches_off() {
        let b = Blink { base: 1.0, amplitude: 0.0, frequency: 1.0, phase: 0.0, mode: BlinkMode::OffAbove(0.7) };
        assert!(blink_on(&b, 0.0));
        assert!(!blink_on(&b, std::f32::consts::FRAC_PI_2));
    }

    #[test]
    fn smooth_blink_oscillates() {
        let b = Blink { base: 0.6, amplitude: 0.4, frequency: 2.0, phase: 0.0, mode: BlinkMode::Smooth };
        assert!((blink_intensity(&b, std::f32::consts::FRAC_PI_4) - 1.0).abs() < 1e-5);
        assert!(blink_on(&b, 123.0));
    }

    #[test]
    fn step_moves_orbiters_and_fills_trails() {
        let mut craft = SceneObject::new(Kind::Craft, Transform::IDENTITY, Style::solid(Color::WHITE));
        craft.orbit = Some(orbit(Direction::Clockwise));
        craft.trail = Some(TrailBuffer::new(4));
        let mut scene = scene_with(SceneObject::group().with_child(craft).with_spin(0.1));

        let mut animator = Animator::new();
        let mut rng = Rng::new(1);
        for i in 0..10 {
            animator.step(&mut scene, i as f32 / 60.0, &mut rng);
        }

        let t = 9.0 / 60.0;
        let craft = &scene.root.children[0];
        assert_eq!(craft.transform.position, orbit_position(&orbit(Direction::Clockwise), t));
        let trail = craft.trail.as_ref().unwrap();
        assert_eq!(trail.len(), 4);
        assert_eq!(trail.iter().next(), Some(&craft.transform.position));
        assert!((scene.root.transform.rotation.y - 0.1 * t).abs() < 1e-6);
    }

    #[test]
    fn resume_drops_stale_trails() {
        let mut craft = SceneObject::new(Kind::Craft, Transform::IDENTITY, Style::solid(Color::WHITE));
        craft.orbit = Some(orbit(Direction::Clockwise));
        craft.trail = Some(TrailBuffer::new(8));
        let mut scene = scene_with(SceneObject::group().with_child(craft));

        let mut animator = Animator::new();
        let mut rng = Rng::new(2);
        for i in 0..5 {
            animator.step(&mut scene, i as f32 / 60.0, &mut rng);
        }
        animator.resume(&mut scene);
        assert!(scene.root.children[0].trail.as_ref().unwrap().is_empty());

        animator.step(&mut scene, 300.0, &mut rng);
        let craft = &scene.root.children[0];
        let trail = craft.trail.as_ref().unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.iter().next(), Some(&orbit_position(&orbit(Direction::Clockwise), 300.0)));
    }

    #[test]
    fn meteors_capped_and_retired() {
        let mut meteors = Meteors::new();
        let mut rng = Rng::new(77);
        let mut seen = false;
        for _ in 0..20_000 {
            meteors.update(1.0 / 60.0, 2.0, &mut rng);
            assert!(meteors.live().len() <= MAX_METEORS);
            seen |= !meteors.live().is_empty();
            for m in meteors.live() {
                assert!(m.progress < 1.0);
            }
        }
        assert!(seen);
    }

    #[test]
    fn long_gap_is_clamped() {
        let mut scene = scene_with(SceneObject::group());
        scene.meteors = Some(Meteors::new());
        let mut animator = Animator::new();
        let mut rng = Rng::new(3);
        animator.step(&mut scene, 0.0, &mut rng);
        animator.step(&mut scene, 1_000.0, &mut rng);
        for m in scene.meteors.as_ref().unwrap().live() {
            assert!(m.progress <= m.speed * MAX_DT * 60.0 + 1e-6);
        }
    }
}
