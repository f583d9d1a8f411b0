// render.rs - Encode scene state to the instance buffer
//
// One record of STRIDE f32s per drawable, read by the host through
// output_ptr/output_len:
//
//   0      kind (scene::Kind discriminant)
//   1..4   world position x, y, z
//   4..7   size / scale x, y, z
//   7      yaw (radians)
//   8..11  r, g, b (0..1)
//   11     opacity
//   12     glow (emissive); a Window with glow 0 is drawn unlit
//   13     texture slot, or -1 while untextured
//
// Stars come first, then meteors, then the scene graph depth first, so the
// host can draw in buffer order. Meteor records reuse the size slots as
// (length, progress, angle).

use glam::{Mat4, Quat, Vec3};

use crate::animate::Meteors;
use crate::lifecycle::TextureTable;
use crate::scene::{Color, Kind, Scene, SceneObject, StarField, Style};

pub const STRIDE: usize = 14;

const TRAIL_SIZE: f32 = 0.05;
const STAR_COLOR: Color = Color::WHITE;
const METEOR_COLOR: Color = Color { r: 200.0 / 255.0, g: 200.0 / 255.0, b: 1.0 };

pub struct Encoder {
    out: Vec<f32>,
}

impl Encoder {
    pub fn new() -> Self {
        Self { out: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.out.clear();
    }

    pub fn ptr(&self) -> *const f32 {
        self.out.as_ptr()
    }

    /// Length in f32s
    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub fn records(&self) -> usize {
        self.out.len() / STRIDE
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.out
    }

    /// Encode the whole scene as it stands at time `t`.
    pub fn encode(&mut self, scene: &Scene, t: f32, textures: &TextureTable) {
        self.clear();
        self.encode_stars(&scene.stars, t);
        if let Some(meteors) = scene.meteors.as_ref() {
            self.encode_meteors(meteors);
        }
        self.encode_node(&scene.root, Mat4::IDENTITY, textures);
    }

    fn encode_stars(&mut self, stars: &StarField, t: f32) {
        let spin = Quat::from_rotation_y(stars.rotation);
        for star in stars.stars() {
            let p = if stars.rotation == 0.0 { star.position } else { spin * star.position };
            let style = Style::solid(STAR_COLOR).with_opacity(StarField::twinkle(star, t));
            self.push(Kind::Star, p, Vec3::splat(star.size), 0.0, &style, -1.0);
        }
    }

    fn encode_meteors(&mut self, meteors: &Meteors) {
        for m in meteors.live() {
            let style = Style::glowing(METEOR_COLOR, 1.0).with_opacity(0.8);
            self.push(Kind::Meteor, m.start, Vec3::new(m.length, m.progress, m.angle), 0.0, &style, -1.0);
        }
    }

    /// Children inherit position and rotation but not scale.
    fn encode_node(&mut self, node: &SceneObject, parent: Mat4, textures: &TextureTable) {
        let rot = Quat::from_euler(
            glam::EulerRot::YXZ,
            node.transform.rotation.y,
            node.transform.rotation.x,
            node.transform.rotation.z,
        );
        let world = parent * Mat4::from_rotation_translation(rot, node.transform.position);

        if node.kind != Kind::Group {
            let (_, world_rot, world_pos) = world.to_scale_rotation_translation();
            let (yaw, _, _) = world_rot.to_euler(glam::EulerRot::YXZ);
            let tex = node
                .style
                .texture
                .filter(|&slot| textures.is_ready(slot))
                .map_or(-1.0, |slot| slot as f32);
            self.push(node.kind, world_pos, node.transform.scale, yaw, &node.style, tex);
        }

        if let Some(trail) = node.trail.as_ref() {
            // Trail points are recorded in the parent's space
            for (i, p) in trail.iter().enumerate() {
                let fade = trail.fade(i);
                let style = Style { opacity: node.style.opacity * fade, ..node.style };
                self.push(Kind::TrailDot, parent.transform_point3(*p), Vec3::splat(TRAIL_SIZE * fade), 0.0, &style, -1.0);
            }
        }

        for child in &node.children {
            self.encode_node(child, world, textures);
        }
    }

    #[inline]
    fn push(&mut self, kind: Kind, p: Vec3, s: Vec3, yaw: f32, style: &Style, tex: f32) {
        self.out.extend_from_slice(&[
            kind as u8 as f32,
            p.x, p.y, p.z,
            s.x, s.y, s.z,
            yaw,
            style.color.r, style.color.g, style.color.b,
            style.opacity,
            style.emissive,
            tex,
        ]);
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of one record in an encoded buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record<'a>(pub &'a [f32]);

impl Record<'_> {
    pub fn kind(&self) -> Option<Kind> { Kind::from_code(self.0[0] as u8) }
    pub fn position(&self) -> Vec3 { Vec3::new(self.0[1], self.0[2], self.0[3]) }
    pub fn size(&self) -> Vec3 { Vec3::new(self.0[4], self.0[5], self.0[6]) }
    pub fn yaw(&self) -> f32 { self.0[7] }
    pub fn color(&self) -> Color { Color { r: self.0[8], g: self.0[9], b: self.0[10] } }
    pub fn opacity(&self) -> f32 { self.0[11] }
    pub fn glow(&self) -> f32 { self.0[12] }
    pub fn texture(&self) -> Option<usize> {
        (self.0[13] >= 0.0).then_some(self.0[13] as usize)
    }
}

pub fn records(buf: &[f32]) -> impl Iterator<Item = Record<'_>> {
    buf.chunks_exact(STRIDE).map(Record)
}
