// city.rs - Skyline buildings and the moon
//
// Skyline units: screen height is 1.0, y grows downward from the top edge,
// buildings stand on y = 1.0. Windows hang off the building's top-left corner.

use glam::Vec3;

use crate::rng::Rng;
use crate::scene::{Blink, BlinkMode, Color, Kind, SceneObject, Style, Transform};

pub const BUILDING_COLORS: [Color; 5] = [
    Color::from_hex(0x111926),
    Color::from_hex(0x0a0f1a),
    Color::from_hex(0x141e33),
    Color::from_hex(0x192231),
    Color::from_hex(0x1e293b),
];

const WINDOW_WARM: Color = Color { r: 1.0, g: 1.0, b: 150.0 / 255.0 };
const WINDOW_COOL: Color = Color { r: 200.0 / 255.0, g: 200.0 / 255.0, b: 1.0 };
const WINDOW_DARK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };
const WINDOW_LIT_OPACITY: f32 = 0.6;

// 3px windows on 5px gaps at a 1000px tall screen
pub const WINDOW_SIZE: f32 = 0.003;
pub const WINDOW_SPACING: f32 = 0.005;

const LIT_CHANCE: f32 = 0.75;
const FLICKER_CHANCE: f32 = 0.1;
/// Flickering windows go dark while their sine is above this
const FLICKER_THRESHOLD: f32 = 0.7;

/// A building whose left edge sits at `x`.
pub fn building(x: f32, width: f32, height: f32, rng: &mut Rng) -> SceneObject {
    let color = *rng.pick(&BUILDING_COLORS);
    let transform = Transform::at(Vec3::new(x, 1.0 - height, 0.0))
        .with_scale(Vec3::new(width, height, 1.0));
    let mut b = SceneObject::new(Kind::Building, transform, Style::solid(color));

    let pitch = WINDOW_SIZE + WINDOW_SPACING;
    let per_floor = (width / pitch) as usize;
    let floors = (height / pitch) as usize;
    b.children.reserve(per_floor * floors);

    for floor in 0..floors {
        for col in 0..per_floor {
            let offset = Vec3::new(
                col as f32 * pitch + WINDOW_SPACING,
                floor as f32 * pitch + WINDOW_SPACING,
                0.0,
            );
            b.children.push(window(offset, rng));
        }
    }
    b
}

fn window(offset: Vec3, rng: &mut Rng) -> SceneObject {
    let transform = Transform::at(offset).with_scale(Vec3::new(WINDOW_SIZE, WINDOW_SIZE, 1.0));
    if !rng.chance(LIT_CHANCE) {
        return SceneObject::new(Kind::Window, transform, Style::solid(WINDOW_DARK));
    }

    let color = if rng.chance(0.5) { WINDOW_WARM } else { WINDOW_COOL };
    let mut w = SceneObject::new(Kind::Window, transform, Style::glowing(color, 1.0).with_opacity(WINDOW_LIT_OPACITY));
    if rng.chance(FLICKER_CHANCE) {
        w.blink = Some(Blink {
            base: 1.0,
            amplitude: 0.0,
            frequency: rng.range(0.6, 1.8),
            phase: rng.range(0.0, std::f32::consts::TAU),
            mode: BlinkMode::OffAbove(FLICKER_THRESHOLD),
        });
    }
    w
}

/// Moon centred at `center` with two craters.
pub fn moon(center: Vec3, radius: f32) -> SceneObject {
    let moon_color = Color { r: 1.0, g: 1.0, b: 240.0 / 255.0 };
    let crater_color = Color::from_hex(0xc8c8c8);
    let crater = |dx: f32, dy: f32, r: f32| {
        SceneObject::new(
            Kind::Crater,
            Transform::at(Vec3::new(dx * radius, dy * radius, 0.0)).with_scale(Vec3::splat(r * radius)),
            Style::solid(crater_color).with_opacity(0.3),
        )
    };

    SceneObject::new(
        Kind::Moon,
        Transform::at(center).with_scale(Vec3::splat(radius)),
        Style::glowing(moon_color, 0.6).with_opacity(0.9),
    )
    .with_child(crater(-0.2, -0.3, 0.2))
    .with_child(crater(0.3, 0.1, 0.15))
}
