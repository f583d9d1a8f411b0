// viewport.rs - Viewport/resize adapter
//
// Scene coordinates are pixel independent: 3D scenes use scene units and the
// skyline uses units where the screen height is 1.0. A resize therefore only
// touches the projection, unless the profile flips between desktop and mobile,
// in which case the caller re-assembles with the new counts.

use serde::Serialize;

/// Below this css width a desktop user agent is still treated as mobile.
pub const MOBILE_BREAKPOINT: f32 = 768.0;
pub const MAX_PIXEL_RATIO: f32 = 2.0;

const FOV_DEG: f32 = 75.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Profile {
    Desktop,
    Mobile,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportState {
    pub width: f32,
    pub height: f32,
    pub device_pixel_ratio: f32,
    pub is_mobile_profile: bool,
}

impl ViewportState {
    pub fn profile(&self) -> Profile {
        if self.is_mobile_profile { Profile::Mobile } else { Profile::Desktop }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Projection {
    pub fov_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub pixel_ratio: f32,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl Projection {
    fn for_state(state: &ViewportState) -> Self {
        let pixel_ratio = state.device_pixel_ratio.min(MAX_PIXEL_RATIO);
        Self {
            fov_deg: FOV_DEG,
            aspect: state.aspect(),
            near: NEAR,
            far: FAR,
            pixel_ratio,
            canvas_width: (state.width * pixel_ratio).round() as u32,
            canvas_height: (state.height * pixel_ratio).round() as u32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeOutcome {
    pub profile_changed: bool,
}

pub struct Viewport {
    state: ViewportState,
    projection: Projection,
    /// User-agent sniff, taken once at page load
    ua_mobile: bool,
}

impl Viewport {
    pub fn new(width: f32, height: f32, dpr: f32, ua_mobile: bool) -> Self {
        let state = classify(width, height, dpr, ua_mobile);
        Self { state, projection: Projection::for_state(&state), ua_mobile }
    }

    /// Recompute projection and profile synchronously.
    pub fn resize(&mut self, width: f32, height: f32, dpr: f32) -> ResizeOutcome {
        let before = self.state.profile();
        self.state = classify(width, height, dpr, self.ua_mobile);
        self.projection = Projection::for_state(&self.state);
        let profile_changed = before != self.state.profile();
        if profile_changed {
            log::info!("viewport profile changed to {:?}", self.state.profile());
        }
        ResizeOutcome { profile_changed }
    }

    pub fn state(&self) -> &ViewportState { &self.state }
    pub fn projection(&self) -> &Projection { &self.projection }
}

/// User-agent sniff for phones and tablets, taken once at page load.
pub fn is_mobile_user_agent(ua: &str) -> bool {
    const MARKERS: [&str; 8] = ["android", "webos", "iphone", "ipad", "ipod", "blackberry", "iemobile", "opera mini"];
    let ua = ua.to_ascii_lowercase();
    MARKERS.iter().any(|m| ua.contains(m))
}

fn classify(width: f32, height: f32, dpr: f32, ua_mobile: bool) -> ViewportState {
    let width = width.max(1.0);
    let height = height.max(1.0);
    let device_pixel_ratio = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    ViewportState {
        width,
        height,
        device_pixel_ratio,
        is_mobile_profile: ua_mobile || width < MOBILE_BREAKPOINT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_tracks_size() {
        let vp = Viewport::new(1600.0, 900.0, 3.0, false);
        let p = vp.projection();
        assert!((p.aspect - 16.0 / 9.0).abs() < 1e-6);
        assert_eq!(p.pixel_ratio, 2.0);
        assert_eq!((p.canvas_width, p.canvas_height), (3200, 1800));
    }

    #[test]
    fn narrow_window_is_mobile() {
        let mut vp = Viewport::new(1280.0, 800.0, 1.0, false);
        assert_eq!(vp.state().profile(), Profile::Desktop);

        let outcome = vp.resize(500.0, 800.0, 1.0);
        assert!(outcome.profile_changed);
        assert!(vp.state().is_mobile_profile);

        let outcome = vp.resize(520.0, 700.0, 1.0);
        assert!(!outcome.profile_changed);
    }

    #[test]
    fn mobile_user_agent_sticks() {
        let mut vp = Viewport::new(1280.0, 800.0, 2.0, true);
        assert!(vp.state().is_mobile_profile);
        assert!(!vp.resize(1920.0, 1080.0, 2.0).profile_changed);
        assert!(vp.state().is_mobile_profile);
    }

    #[test]
    fn sniffs_mobile_agents() {
        assert!(is_mobile_user_agent("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)"));
        assert!(is_mobile_user_agent("Mozilla/5.0 (Linux; Android 14; Pixel 8)"));
        assert!(!is_mobile_user_agent("Mozilla/5.0 (X11; Linux x86_64) Firefox/130.0"));
    }

    #[test]
    fn degenerate_sizes_are_clamped() {
        let vp = Viewport::new(0.0, 0.0, f32::NAN, false);
        assert_eq!(vp.state().width, 1.0);
        assert_eq!(vp.state().height, 1.0);
        assert_eq!(vp.projection().pixel_ratio, 1.0);
    }
}
