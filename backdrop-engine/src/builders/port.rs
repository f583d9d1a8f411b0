// port.rs - Space-port towers, rings, beacons and orbiting craft
//
// Scene units, y up. Towers stand on y = 0 with their origin at the base.

use glam::Vec3;

use crate::rng::Rng;
use crate::scene::{Blink, BlinkMode, Color, Direction, Kind, Orbit, SceneObject, Style, TrailBuffer, Transform};

const TOWER_COLOR: Color = Color::from_hex(0x1b2a4a);
const RING_COLOR: Color = Color::from_hex(0x3fd0ff);
const BEACON_COLOR: Color = Color::from_hex(0xff3355);
const THRUSTER_COLOR: Color = Color::from_hex(0xffa640);

pub const CRAFT_COLORS: [Color; 4] = [
    Color::from_hex(0xe8e8f0),
    Color::from_hex(0xff6ad5),
    Color::from_hex(0x7afcff),
    Color::from_hex(0xfeff9c),
];

/// Tower at `base` with an optional ring around its upper third and a beacon
/// on top.
pub fn tower(base: Vec3, height: f32, radius: f32, rings: usize, rng: &mut Rng) -> SceneObject {
    let mut t = SceneObject::new(
        Kind::Tower,
        Transform::at(base).with_scale(Vec3::new(radius, height, radius)),
        Style::glowing(TOWER_COLOR, 0.1),
    );
    for i in 0..rings {
        let y = height * (0.6 + 0.15 * i as f32);
        let mut r = ring(radius * rng.range(2.2, 3.2), radius * 0.25, RING_COLOR);
        r.transform.position = Vec3::new(0.0, y, 0.0);
        r.spin = rng.sign() * rng.range(0.2, 0.8);
        t.children.push(r);
    }
    t.children.push(beacon(Vec3::new(0.0, height, 0.0), rng));
    t
}

/// Flat torus in the xz plane
pub fn ring(radius: f32, thickness: f32, color: Color) -> SceneObject {
    SceneObject::new(
        Kind::Ring,
        Transform::IDENTITY.with_scale(Vec3::new(radius, thickness, radius)),
        Style::glowing(color, 0.8).with_opacity(0.85),
    )
}

pub fn beacon(offset: Vec3, rng: &mut Rng) -> SceneObject {
    let mut b = SceneObject::new(
        Kind::Beacon,
        Transform::at(offset).with_scale(Vec3::splat(0.12)),
        Style::glowing(BEACON_COLOR, 1.0),
    );
    b.blink = Some(Blink {
        base: 0.6,
        amplitude: 0.4,
        frequency: rng.range(1.5, 3.5),
        phase: rng.range(0.0, std::f32::consts::TAU),
        mode: BlinkMode::Smooth,
    });
    b
}

/// Flying vehicle on `orbit` with two thrusters trailing behind it.
pub fn craft(orbit: Orbit, color: Color, trail_len: usize) -> SceneObject {
    let thruster = |x: f32| {
        SceneObject::new(
            Kind::Thruster,
            Transform::at(Vec3::new(x, 0.0, -0.25)).with_scale(Vec3::splat(0.06)),
            Style::glowing(THRUSTER_COLOR, 1.0),
        )
    };
    let mut c = SceneObject::new(
        Kind::Craft,
        Transform::IDENTITY.with_scale(Vec3::new(0.3, 0.12, 0.5)),
        Style::glowing(color, 0.3),
    )
    .with_child(thruster(-0.12))
    .with_child(thruster(0.12));
    c.orbit = Some(orbit);
    c.trail = Some(TrailBuffer::new(trail_len));
    c
}

/// Random orbit between `inner` and `outer`
pub fn random_orbit(inner: f32, outer: f32, rng: &mut Rng) -> Orbit {
    Orbit {
        radius: rng.range(inner, outer),
        angular_speed: rng.range(0.15, 0.5),
        angle0: rng.range(0.0, std::f32::consts::TAU),
        height: rng.range(1.5, 7.0),
        hover_amplitude: rng.range(0.05, 0.3),
        hover_speed: rng.range(0.8, 2.0),
        hover_phase: rng.range(0.0, std::f32::consts::TAU),
        direction: if rng.chance(0.5) { Direction::Clockwise } else { Direction::CounterClockwise },
    }
}
