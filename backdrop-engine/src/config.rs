// config.rs - Host-supplied tuning for scenes, chat and the embedded frame
//
// Every struct has a Default matching the live site, and the scene config can
// be overridden from JSON passed in by the page.

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::viewport::Profile;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

/// Object counts and detail levels for one viewport profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileCounts {
    pub stars: usize,
    pub towers: usize,
    pub craft: usize,
    /// Sphere subdivision for globe-like meshes
    pub segments: u32,
    /// Narrowest building, in skyline units (screen height = 1.0)
    pub building_min_width: f32,
    pub building_max_width: f32,
}

impl ProfileCounts {
    pub fn desktop() -> Self {
        Self {
            stars: 200,
            towers: 12,
            craft: 24,
            segments: 32,
            building_min_width: 0.05,
            building_max_width: 0.15,
        }
    }

    pub fn mobile() -> Self {
        Self {
            stars: 100,
            towers: 6,
            craft: 10,
            segments: 16,
            building_min_width: 0.08,
            building_max_width: 0.2,
        }
    }
}

impl Default for ProfileCounts {
    fn default() -> Self {
        Self::desktop()
    }
}

/// Partial profile from the page; absent fields keep the profile's own
/// defaults.
#[derive(Debug, Deserialize)]
struct CountsOverride {
    stars: Option<usize>,
    towers: Option<usize>,
    craft: Option<usize>,
    segments: Option<u32>,
    building_min_width: Option<f32>,
    building_max_width: Option<f32>,
}

impl CountsOverride {
    fn apply(self, base: ProfileCounts) -> ProfileCounts {
        ProfileCounts {
            stars: self.stars.unwrap_or(base.stars),
            towers: self.towers.unwrap_or(base.towers),
            craft: self.craft.unwrap_or(base.craft),
            segments: self.segments.unwrap_or(base.segments),
            building_min_width: self.building_min_width.unwrap_or(base.building_min_width),
            building_max_width: self.building_max_width.unwrap_or(base.building_max_width),
        }
    }
}

fn desktop_counts<'de, D: Deserializer<'de>>(de: D) -> Result<ProfileCounts, D::Error> {
    CountsOverride::deserialize(de).map(|o| o.apply(ProfileCounts::desktop()))
}

fn mobile_counts<'de, D: Deserializer<'de>>(de: D) -> Result<ProfileCounts, D::Error> {
    CountsOverride::deserialize(de).map(|o| o.apply(ProfileCounts::mobile()))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    #[serde(deserialize_with = "desktop_counts")]
    pub desktop: ProfileCounts,
    #[serde(deserialize_with = "mobile_counts")]
    pub mobile: ProfileCounts,

    // Placement
    pub min_separation: f32,
    pub max_retries: u32,
    pub ring_inner: f32,
    pub ring_outer: f32,
    /// Ellipse flattening of the tower ring along z (1.0 = circle)
    pub ring_squash: f32,

    // Motion
    pub trail_length: usize,
    pub globe_spin: f32,
    pub scene_spin: f32,
    pub star_drift: f32,

    pub textures: Vec<String>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            desktop: ProfileCounts::desktop(),
            mobile: ProfileCounts::mobile(),
            min_separation: 1.6,
            max_retries: 40,
            ring_inner: 4.0,
            ring_outer: 11.0,
            ring_squash: 0.7,
            trail_length: 12,
            // 0.001 rad per frame at 60fps
            globe_spin: 0.06,
            scene_spin: 0.02,
            star_drift: 0.005,
            textures: vec![
                "textures/00_earthmap1k.jpg".into(),
                "textures/03_earthlights1k.jpg".into(),
                "textures/05_earthcloudmaptrans.jpg".into(),
                "textures/stars/circle.png".into(),
            ],
        }
    }
}

impl SceneConfig {
    /// Parse overrides; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trail_length == 0 {
            return Err(ConfigError::Invalid { field: "trail_length", reason: "must be at least 1" });
        }
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid { field: "max_retries", reason: "must be at least 1" });
        }
        if !(self.ring_inner > 0.0 && self.ring_outer > self.ring_inner) {
            return Err(ConfigError::Invalid { field: "ring_outer", reason: "ring radii must satisfy 0 < inner < outer" });
        }
        if self.min_separation < 0.0 {
            return Err(ConfigError::Invalid { field: "min_separation", reason: "must not be negative" });
        }
        for counts in [&self.desktop, &self.mobile] {
            if !(counts.building_min_width > 0.0 && counts.building_max_width >= counts.building_min_width) {
                return Err(ConfigError::Invalid { field: "building_max_width", reason: "building widths must satisfy 0 < min <= max" });
            }
        }
        Ok(())
    }

    pub fn counts(&self, profile: Profile) -> &ProfileCounts {
        match profile {
            Profile::Desktop => &self.desktop,
            Profile::Mobile => &self.mobile,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub endpoint: String,
    /// Header that carries the visitor's access key, when one is set
    pub key_header: String,
    /// Local storage slot for the key
    pub storage_key: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://scholarai.azurewebsites.net/api/claudeChat".into(),
            key_header: "x-functions-key".into(),
            storage_key: "scholarAiApiKey".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub max_attempts: u32,
    pub delay_ms: u32,
    /// Site-relative stylesheet linked into the frame alongside the inline theme
    pub stylesheet_href: String,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay_ms: 500,
            stylesheet_href: "/css/scholar-theme.css".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_default() {
        let config = SceneConfig::from_json("{}").unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_fields() {
        let config = SceneConfig::from_json(r#"{"trail_length": 4, "mobile": {"stars": 10}}"#).unwrap();
        assert_eq!(config.trail_length, 4);
        assert_eq!(config.mobile.stars, 10);
        assert_eq!(config.max_retries, SceneConfig::default().max_retries);
    }

    #[test]
    fn partial_profile_keeps_its_own_defaults() {
        let config = SceneConfig::from_json(r#"{"mobile": {"stars": 50}, "desktop": {"craft": 30}}"#).unwrap();
        let mobile = ProfileCounts::mobile();
        assert_eq!(config.mobile, ProfileCounts { stars: 50, ..mobile });
        assert_eq!(config.mobile.towers, mobile.towers);
        assert_eq!(config.mobile.segments, mobile.segments);
        assert_eq!(config.desktop, ProfileCounts { craft: 30, ..ProfileCounts::desktop() });
    }

    #[test]
    fn mistyped_profile_field_is_rejected() {
        assert!(matches!(SceneConfig::from_json(r#"{"mobile": {"stars": "many"}}"#), Err(ConfigError::Json(_))));
    }

    #[test]
    fn rejects_zero_trail() {
        let err = SceneConfig::from_json(r#"{"trail_length": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "trail_length", .. }));
    }

    #[test]
    fn rejects_inverted_ring() {
        let err = SceneConfig::from_json(r#"{"ring_inner": 5.0, "ring_outer": 2.0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "ring_outer", .. }));
    }

    #[test]
    fn rejects_bad_json() {
        assert!(matches!(SceneConfig::from_json("not json"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn chat_defaults() {
        let config = ChatConfig::default();
        assert!(config.endpoint.starts_with("https://"));
        assert_eq!(config.storage_key, "scholarAiApiKey");
    }
}
