// raster.rs - Software rasteriser for encoded instance buffers
//
// Draws each record as a flat primitive: rectangles for facades, discs for
// bodies and stars, strokes for meteors and rings. Perspective scenes are
// painted back to front.

use backdrop_engine::render::{records, Record};
use backdrop_engine::scene::{Color, Kind, SceneKind};
use backdrop_engine::viewport::Projection;
use glam::{Mat4, Vec2, Vec3};
use image::{Rgba, RgbaImage};

const SKY_TOP: Color = Color::from_hex(0x04050d);
const SKY_BOTTOM: Color = Color::from_hex(0x1b1036);
const BARE_GLOBE: Color = Color::from_hex(0x2b5fa8);
const BARE_CLOUDS: Color = Color::from_hex(0xdfe8f5);
/// Cloud shell is drawn as a faint veil, not a solid disc
const CLOUD_VEIL: f32 = 0.3;
const METEOR_TAIL: f32 = 0.25;
const RING_SEGMENTS: usize = 48;

pub enum Camera {
    /// Skyline units, one unit per image height
    Flat { px_per_unit: f32 },
    Perspective { view_proj: Mat4, focal: f32, width: f32, height: f32 },
}

impl Camera {
    pub fn for_scene(kind: SceneKind, projection: &Projection, width: u32, height: u32) -> Self {
        match kind {
            SceneKind::Skyline => Camera::Flat { px_per_unit: height as f32 },
            SceneKind::Globe => Self::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, projection, width, height),
            SceneKind::Spaceport => {
                Self::looking_at(Vec3::new(0.0, 9.0, 22.0), Vec3::new(0.0, 3.0, 0.0), projection, width, height)
            }
        }
    }

    fn looking_at(eye: Vec3, target: Vec3, projection: &Projection, width: u32, height: u32) -> Self {
        let fov = projection.fov_deg.to_radians();
        let proj = Mat4::perspective_rh_gl(fov, projection.aspect, projection.near, projection.far);
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        Camera::Perspective {
            view_proj: proj * view,
            focal: height as f32 * 0.5 / (fov * 0.5).tan(),
            width: width as f32,
            height: height as f32,
        }
    }

    /// Screen position, pixels per world unit at that point, and view depth.
    fn project(&self, p: Vec3) -> Option<(Vec2, f32, f32)> {
        match *self {
            Camera::Flat { px_per_unit } => Some((Vec2::new(p.x, p.y) * px_per_unit, px_per_unit, 0.0)),
            Camera::Perspective { view_proj, focal, width, height } => {
                let clip = view_proj * p.extend(1.0);
                if clip.w <= f32::EPSILON {
                    return None;
                }
                let ndc = clip.truncate() / clip.w;
                let screen = Vec2::new((ndc.x + 1.0) * 0.5 * width, (1.0 - ndc.y) * 0.5 * height);
                Some((screen, focal / clip.w, clip.w))
            }
        }
    }

    fn is_flat(&self) -> bool {
        matches!(self, Camera::Flat { .. })
    }
}

pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// Blank night sky
    pub fn new(width: u32, height: u32) -> Self {
        let mut image = RgbaImage::new(width, height);
        for y in 0..height {
            let t = y as f32 / height.max(1) as f32;
            let c = mix(SKY_TOP, SKY_BOTTOM, t).to_rgb8();
            for x in 0..width {
                image.put_pixel(x, y, Rgba([c[0], c[1], c[2], 255]));
            }
        }
        Self { image }
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Paint every record in `buffer`; returns how many were drawn.
    pub fn draw(&mut self, buffer: &[f32], camera: &Camera) -> usize {
        let mut items: Vec<(f32, Record<'_>)> = records(buffer)
            .filter_map(|r| camera.project(r.position()).map(|(_, _, depth)| (depth, r)))
            .collect();
        if !camera.is_flat() {
            items.sort_by(|a, b| b.0.total_cmp(&a.0));
        }
        let mut drawn = 0;
        for (_, r) in &items {
            if self.draw_record(r, camera) {
                drawn += 1;
            }
        }
        drawn
    }

    fn draw_record(&mut self, r: &Record<'_>, camera: &Camera) -> bool {
        let Some(kind) = r.kind() else { return false };
        let Some((at, scale, _)) = camera.project(r.position()) else { return false };
        let size = r.size();
        let alpha = r.opacity();
        let color = shade(r.color(), r.glow());

        match kind {
            Kind::Group | Kind::StarDome => return false,
            Kind::Building | Kind::Window => self.fill_rect(at, at + Vec2::new(size.x, size.y) * scale, color, alpha),
            Kind::Star => self.fill_disc(at, (size.x * scale).max(0.5), color, alpha),
            Kind::Meteor => {
                // size slots carry (length, progress, angle)
                let dir = Vec2::new(size.z.cos(), size.z.sin());
                let head = at + dir * size.x * size.y * scale;
                let tail = at + dir * size.x * (size.y - METEOR_TAIL).max(0.0) * scale;
                self.stroke(tail, head, 1.5, color, alpha);
            }
            Kind::Tower => {
                let Some((top, _, _)) = camera.project(r.position() + Vec3::Y * size.y) else { return false };
                let half = size.x * scale;
                self.fill_rect(Vec2::new(at.x - half, top.y), Vec2::new(at.x + half, at.y), color, alpha);
            }
            Kind::Ring => self.stroke_ring(r.position(), size.x, (size.y * scale).max(1.0), camera, color, alpha),
            Kind::Globe if r.texture().is_none() => self.fill_disc(at, size.x * scale, BARE_GLOBE, alpha),
            Kind::Atmosphere if r.texture().is_none() => {
                self.fill_disc(at, size.x * scale, BARE_CLOUDS, alpha * CLOUD_VEIL)
            }
            Kind::Atmosphere => self.fill_disc(at, size.x * scale, color, alpha * CLOUD_VEIL),
            _ => self.fill_disc(at, size.max_element() * scale, color, alpha),
        }
        true
    }

    fn blend(&mut self, x: i64, y: i64, color: Color, alpha: f32) {
        if x < 0 || y < 0 || x >= self.image.width() as i64 || y >= self.image.height() as i64 {
            return;
        }
        let a = alpha.clamp(0.0, 1.0);
        let px = self.image.get_pixel_mut(x as u32, y as u32);
        let src = color.to_rgb8();
        for (dst, s) in px.0.iter_mut().zip(src) {
            *dst = (*dst as f32 * (1.0 - a) + s as f32 * a).round() as u8;
        }
    }

    fn fill_rect(&mut self, min: Vec2, max: Vec2, color: Color, alpha: f32) {
        let (x0, x1) = (min.x.min(max.x).floor() as i64, min.x.max(max.x).ceil() as i64);
        let (y0, y1) = (min.y.min(max.y).floor() as i64, min.y.max(max.y).ceil() as i64);
        for y in y0..y1.max(y0 + 1) {
            for x in x0..x1.max(x0 + 1) {
                self.blend(x, y, color, alpha);
            }
        }
    }

    fn fill_disc(&mut self, center: Vec2, radius: f32, color: Color, alpha: f32) {
        let r = radius.max(0.5);
        let (x0, x1) = ((center.x - r).floor() as i64, (center.x + r).ceil() as i64);
        let (y0, y1) = ((center.y - r).floor() as i64, (center.y + r).ceil() as i64);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance(center);
                if d <= r {
                    // soften the last pixel of the rim
                    let edge = (r - d).min(1.0);
                    self.blend(x, y, color, alpha * edge.max(0.25));
                }
            }
        }
    }

    fn stroke(&mut self, a: Vec2, b: Vec2, width: f32, color: Color, alpha: f32) {
        let steps = a.distance(b).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let p = a.lerp(b, i as f32 / steps as f32);
            self.fill_disc(p, width * 0.5, color, alpha);
        }
    }

    fn stroke_ring(&mut self, center: Vec3, radius: f32, width: f32, camera: &Camera, color: Color, alpha: f32) {
        let point = |i: usize| {
            let a = i as f32 / RING_SEGMENTS as f32 * std::f32::consts::TAU;
            camera.project(center + Vec3::new(a.cos() * radius, 0.0, a.sin() * radius)).map(|(p, _, _)| p)
        };
        for i in 0..RING_SEGMENTS {
            if let (Some(a), Some(b)) = (point(i), point(i + 1)) {
                self.stroke(a, b, width, color, alpha);
            }
        }
    }
}

/// Unlit surfaces keep most of their colour; glowing ones reach full.
fn shade(color: Color, glow: f32) -> Color {
    let k = 0.6 + 0.4 * glow.clamp(0.0, 1.0);
    Color { r: color.r * k, g: color.g * k, b: color.b * k }
}

fn mix(a: Color, b: Color, t: f32) -> Color {
    Color { r: a.r + (b.r - a.r) * t, g: a.g + (b.g - a.g) * t, b: a.b + (b.b - a.b) * t }
}
