// globe.rs - Earth, cloud shell and star dome
//
// Meshes themselves are the host's business; these nodes carry radius (as
// uniform scale), material and texture slots.

use glam::Vec3;

use crate::scene::{Color, Kind, SceneObject, Style, Transform};

// Texture table slots, in SceneConfig::textures order
pub const TEX_EARTH: usize = 0;
pub const TEX_LIGHTS: usize = 1;
pub const TEX_CLOUDS: usize = 2;
pub const TEX_STARS: usize = 3;

const EARTH_RADIUS: f32 = 1.5;
const ATMOSPHERE_RADIUS: f32 = 1.55;
const DOME_RADIUS: f32 = 90.0;

pub fn globe(spin: f32) -> SceneObject {
    // Night-side city lights come from the emissive map
    let style = Style { emissive: 0.4, ..Style::solid(Color::WHITE).with_texture(TEX_EARTH) };
    SceneObject::new(Kind::Globe, Transform::IDENTITY.with_scale(Vec3::splat(EARTH_RADIUS)), style)
        .with_spin(spin)
}

pub fn atmosphere(spin: f32) -> SceneObject {
    SceneObject::new(
        Kind::Atmosphere,
        Transform::IDENTITY.with_scale(Vec3::splat(ATMOSPHERE_RADIUS)),
        Style::solid(Color::WHITE).with_opacity(0.5).with_texture(TEX_CLOUDS),
    )
    .with_spin(spin)
}

/// Inside-out sphere behind everything
pub fn star_dome() -> SceneObject {
    SceneObject::new(
        Kind::StarDome,
        Transform::IDENTITY.with_scale(Vec3::splat(DOME_RADIUS)),
        Style::solid(Color::WHITE).with_texture(TEX_STARS),
    )
}
