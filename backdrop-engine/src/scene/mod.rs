// scene/ - Scene graph data model
//
// One root SceneObject per scene. Children are positioned relative to their
// parent and live exactly as long as it does.

mod stars;
mod trail;

pub use stars::{Star, StarBounds, StarField};
pub use trail::TrailBuffer;

use glam::{Mat4, Quat, Vec3};

use crate::animate::Meteors;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles (radians), applied Y then X then Z
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform { position: Vec3::ZERO, rotation: Vec3::ZERO, scale: Vec3::ONE };

    pub fn at(position: Vec3) -> Self {
        Self { position, ..Self::IDENTITY }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn matrix(&self) -> Mat4 {
        let rot = Quat::from_euler(glam::EulerRot::YXZ, self.rotation.y, self.rotation.x, self.rotation.z);
        Mat4::from_scale_rotation_translation(self.scale, rot, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub color: Color,
    pub emissive: f32,
    pub opacity: f32,
    /// Slot in the scene's texture table; untextured until that slot loads
    pub texture: Option<usize>,
}

impl Style {
    pub fn solid(color: Color) -> Self {
        Self { color, emissive: 0.0, opacity: 1.0, texture: None }
    }

    pub fn glowing(color: Color, emissive: f32) -> Self {
        Self { emissive, ..Self::solid(color) }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_texture(mut self, slot: usize) -> Self {
        self.texture = Some(slot);
        self
    }
}

/// What the host draws for a record. Discriminants are part of the output
/// encoding and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Kind {
    Group = 0,
    Building = 1,
    Window = 2,
    Tower = 3,
    Ring = 4,
    Beacon = 5,
    Craft = 6,
    Thruster = 7,
    TrailDot = 8,
    Globe = 9,
    Atmosphere = 10,
    StarDome = 11,
    Moon = 12,
    Crater = 13,
    Star = 14,
    Meteor = 15,
}

impl Kind {
    const ALL: [Kind; 16] = [
        Kind::Group,
        Kind::Building,
        Kind::Window,
        Kind::Tower,
        Kind::Ring,
        Kind::Beacon,
        Kind::Craft,
        Kind::Thruster,
        Kind::TrailDot,
        Kind::Globe,
        Kind::Atmosphere,
        Kind::StarDome,
        Kind::Moon,
        Kind::Crater,
        Kind::Star,
        Kind::Meteor,
    ];

    /// Inverse of `kind as u8`
    pub fn from_code(code: u8) -> Option<Kind> {
        Self::ALL.get(code as usize).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Clockwise => -1.0,
            Direction::CounterClockwise => 1.0,
        }
    }
}

/// Circular path around the parent's origin, in its xz plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub radius: f32,
    pub angular_speed: f32,
    pub angle0: f32,
    pub height: f32,
    pub hover_amplitude: f32,
    pub hover_speed: f32,
    pub hover_phase: f32,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlinkMode {
    /// Emissive follows the sine directly
    Smooth,
    /// Light switches off while the raw sine is above the threshold
    OffAbove(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blink {
    pub base: f32,
    pub amplitude: f32,
    pub frequency: f32,
    pub phase: f32,
    pub mode: BlinkMode,
}

#[derive(Debug, Clone)]
pub struct SceneObject {
    pub kind: Kind,
    pub transform: Transform,
    pub style: Style,
    pub orbit: Option<Orbit>,
    pub blink: Option<Blink>,
    pub trail: Option<TrailBuffer>,
    /// Radians per second around local y
    pub spin: f32,
    pub children: Vec<SceneObject>,
}

impl SceneObject {
    pub fn new(kind: Kind, transform: Transform, style: Style) -> Self {
        Self {
            kind,
            transform,
            style,
            orbit: None,
            blink: None,
            trail: None,
            spin: 0.0,
            children: Vec::new(),
        }
    }

    pub fn group() -> Self {
        Self::new(Kind::Group, Transform::IDENTITY, Style::solid(Color::WHITE))
    }

    pub fn with_child(mut self, child: SceneObject) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_spin(mut self, spin: f32) -> Self {
        self.spin = spin;
        self
    }

    /// Number of nodes in this subtree, including self
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(SceneObject::count).sum::<usize>()
    }

    pub fn count_kind(&self, kind: Kind) -> usize {
        let own = usize::from(self.kind == kind);
        own + self.children.iter().map(|c| c.count_kind(kind)).sum::<usize>()
    }

    /// Depth-first visit of every node
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut SceneObject)) {
        f(self);
        for child in &mut self.children {
            child.walk_mut(f);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    Globe,
    Spaceport,
    Skyline,
}

impl SceneKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "globe" => Some(SceneKind::Globe),
            "spaceport" => Some(SceneKind::Spaceport),
            "skyline" | "cityscape" => Some(SceneKind::Skyline),
            _ => None,
        }
    }
}

pub struct Scene {
    pub kind: SceneKind,
    pub root: SceneObject,
    pub stars: StarField,
    /// Shooting stars; only the skyline has them
    pub meteors: Option<Meteors>,
    /// Horizontal extent covered by generated content, in scene units
    pub span: f32,
    /// Mesh subdivision hint for the host (sphere segments)
    pub detail: u32,
}
