// stars.rs - Static star field
//
// Generated once. Only the whole-field rotation changes afterwards; twinkle is
// derived from time at encode time and never written back.

use glam::Vec3;

use crate::rng::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub position: Vec3,
    pub size: f32,
    pub opacity: f32,
    /// Radians per second of the twinkle sine; 0 for steady stars
    pub twinkle_speed: f32,
}

#[derive(Debug, Clone, Default)]
pub struct StarField {
    stars: Vec<Star>,
    pub rotation: f32,
    pub drift_speed: f32,
}

/// Where stars may appear.
#[derive(Debug, Clone, Copy)]
pub enum StarBounds {
    /// Flat rectangle of the 2D sky, z = 0
    Sky { width: f32, height: f32 },
    /// Shell around the origin
    Shell { inner: f32, outer: f32 },
}

impl StarField {
    pub fn generate(count: usize, bounds: StarBounds, drift_speed: f32, rng: &mut Rng) -> Self {
        let stars = (0..count).map(|_| random_star(bounds, rng)).collect();
        Self { stars, rotation: 0.0, drift_speed }
    }

    pub fn stars(&self) -> &[Star] { &self.stars }
    pub fn len(&self) -> usize { self.stars.len() }
    pub fn is_empty(&self) -> bool { self.stars.is_empty() }

    /// Brightness of `star` at time `t`
    pub fn twinkle(star: &Star, t: f32) -> f32 {
        if star.twinkle_speed == 0.0 {
            return star.opacity;
        }
        star.opacity * ((t * star.twinkle_speed).sin() * 0.3 + 0.7)
    }
}

fn random_star(bounds: StarBounds, rng: &mut Rng) -> Star {
    match bounds {
        StarBounds::Sky { width, height } => Star {
            position: Vec3::new(rng.next_f32() * width, rng.next_f32() * height, 0.0),
            size: rng.next_f32() * 0.002,
            opacity: rng.range(0.2, 1.0),
            // a few seconds per twinkle
            twinkle_speed: rng.range(0.6, 2.4),
        },
        StarBounds::Shell { inner, outer } => {
            // Uniform direction on the sphere
            let z = rng.range(-1.0, 1.0);
            let theta = rng.next_f32() * std::f32::consts::TAU;
            let r = (1.0 - z * z).sqrt();
            let dir = Vec3::new(r * theta.cos(), z, r * theta.sin());
            Star {
                position: dir * rng.range(inner, outer),
                size: rng.range(0.05, 0.2),
                opacity: rng.range(0.4, 1.0),
                twinkle_speed: 0.0,
            }
        }
    }
}
