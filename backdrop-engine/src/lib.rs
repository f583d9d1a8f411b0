// backdrop-engine - Procedural backdrops and page widgets for the site
//
// Scenes are assembled and animated here; the page reads a flat instance
// buffer each frame and draws it. Browser glue lives in `web`, compiled only
// for wasm32, so everything else builds and tests natively.

pub mod animate;
pub mod assemble;
pub mod builders;
pub mod chat;
pub mod comic;
pub mod config;
pub mod frame;
pub mod lifecycle;
pub mod panels;
pub mod render;
pub mod rng;
pub mod scene;
pub mod viewport;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use animate::Animator;
pub use assemble::{build_scene, refit};
pub use config::{ChatConfig, ConfigError, FrameConfig, SceneConfig};
pub use render::{Encoder, STRIDE};
pub use rng::Rng;
pub use scene::{Scene, SceneKind};
pub use viewport::{Viewport, ViewportState};
