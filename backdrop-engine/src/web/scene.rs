// scene.rs - wasm handle for one animated backdrop

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlImageElement;

use crate::animate::Animator;
use crate::assemble::{build_scene, refit};
use crate::config::SceneConfig;
use crate::lifecycle::{Mount, TextureTable};
use crate::render::{Encoder, STRIDE};
use crate::rng::Rng;
use crate::scene::{Scene, SceneKind};
use crate::viewport::Viewport;

#[wasm_bindgen]
pub struct SceneHandle {
    config: SceneConfig,
    viewport: Viewport,
    scene: Scene,
    animator: Animator,
    encoder: Encoder,
    textures: Rc<RefCell<TextureTable>>,
    mount: Mount,
    rng: Rng,
    visible: bool,
}

#[wasm_bindgen]
impl SceneHandle {
    /// `kind` is "globe", "spaceport" or "skyline"; `config_json` overrides
    /// any subset of the scene config.
    #[wasm_bindgen(constructor)]
    pub fn new(
        kind: &str,
        width: f32,
        height: f32,
        dpr: f32,
        ua_mobile: bool,
        config_json: Option<String>,
    ) -> Result<SceneHandle, JsValue> {
        super::init_logging();
        let kind = SceneKind::parse(kind).ok_or_else(|| JsValue::from_str(&format!("unknown scene kind {kind:?}")))?;
        let config = match config_json {
            Some(json) => SceneConfig::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => SceneConfig::default(),
        };

        let viewport = Viewport::new(width, height, dpr, ua_mobile);
        let mut rng = Rng::from_entropy();
        let scene = build_scene(kind, viewport.state(), &config, &mut rng);
        let textures = Rc::new(RefCell::new(TextureTable::new(config.textures.clone())));

        Ok(Self {
            config,
            viewport,
            scene,
            animator: Animator::new(),
            encoder: Encoder::new(),
            textures,
            mount: Mount::new(),
            rng,
            visible: true,
        })
    }

    /// Advance to `t` seconds and re-encode. Skipped while hidden.
    pub fn tick(&mut self, t: f32) {
        if !self.visible {
            return;
        }
        self.animator.step(&mut self.scene, t, &mut self.rng);
        let textures = self.textures.borrow();
        self.encoder.encode(&self.scene, t, &textures);
    }

    /// Returns true when the scene was re-assembled for a new profile.
    pub fn resize(&mut self, width: f32, height: f32, dpr: f32) -> bool {
        let outcome = self.viewport.resize(width, height, dpr);
        let rebuilt = refit(&mut self.scene, outcome, self.viewport.state(), &self.config, &mut self.rng);
        if rebuilt {
            self.animator.reset_clock();
        }
        rebuilt
    }

    /// Pause while off screen; the clock restarts cleanly on return.
    pub fn set_visible(&mut self, visible: bool) {
        if visible && !self.visible {
            self.animator.resume(&mut self.scene);
        }
        self.visible = visible;
    }

    /// Fire-and-forget image loads. Results arriving after this handle is
    /// freed are ignored.
    pub fn load_textures(&self) -> Result<(), JsValue> {
        let urls: Vec<String> = self.textures.borrow().slots().iter().map(|s| s.url.clone()).collect();
        for (slot, url) in urls.into_iter().enumerate() {
            let image = HtmlImageElement::new()?;
            let settle = |ok: bool| {
                let table = Rc::clone(&self.textures);
                let token = self.mount.token();
                Closure::once_into_js(move || {
                    table.borrow_mut().resolve(&token, slot, ok);
                })
            };
            image.set_onload(Some(settle(true).unchecked_ref()));
            image.set_onerror(Some(settle(false).unchecked_ref()));
            image.set_src(&url);
        }
        Ok(())
    }

    pub fn texture_url(&self, slot: usize) -> Option<String> {
        self.textures.borrow().slots().get(slot).map(|s| s.url.clone())
    }

    pub fn projection(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.viewport.projection()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn is_mobile(&self) -> bool {
        self.viewport.state().is_mobile_profile
    }

    /// Sphere segments the host should use for this profile
    pub fn detail(&self) -> u32 {
        self.scene.detail
    }

    pub fn span(&self) -> f32 {
        self.scene.span
    }

    pub fn output_ptr(&self) -> *const f32 { self.encoder.ptr() }
    pub fn output_len(&self) -> usize { self.encoder.len() }
    pub fn stride(&self) -> usize { STRIDE }
    pub fn instance_count(&self) -> usize { self.encoder.records() }
}
