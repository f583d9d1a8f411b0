// panels.rs - Scroll-driven panels

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, HtmlMediaElement};

use super::{listen, play_media};
use crate::panels::{entrance, parallax, PanelRect, PanelTracker};

const PANEL_SELECTOR: &str = ".scroll-panel";
const ACTIVE_CLASS: &str = "active";

#[wasm_bindgen]
pub struct ScrollPanels {
    view: Rc<View>,
}

struct View {
    panels: Vec<HtmlElement>,
    tracker: RefCell<PanelTracker>,
}

#[wasm_bindgen]
impl ScrollPanels {
    /// Track every `.scroll-panel` on the page.
    pub fn init() -> Result<ScrollPanels, JsValue> {
        super::init_logging();
        let window = super::window()?;
        let list = super::document()?.query_selector_all(PANEL_SELECTOR)?;
        let panels: Vec<HtmlElement> = (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .collect();
        for panel in &panels {
            let style = panel.style();
            style.set_property("transition", "opacity 1s ease-out, transform 1s ease-out")?;
        }
        log::debug!("tracking {} scroll panels", panels.len());

        let view = Rc::new(View { panels, tracker: RefCell::new(PanelTracker::new()) });
        for event in ["scroll", "resize"] {
            let this = Rc::clone(&view);
            listen(&window, event, move |_| this.refresh())?;
        }
        view.refresh();
        Ok(Self { view })
    }

    /// Re-measure after layout changes the page did not announce.
    pub fn refresh(&self) {
        self.view.refresh();
    }
}

impl View {
    fn refresh(&self) {
        let Some(viewport_h) = super::window()
            .ok()
            .and_then(|w| w.inner_height().ok())
            .and_then(|h| h.as_f64())
        else {
            return;
        };
        let viewport_h = viewport_h as f32;

        let rects: Vec<PanelRect> = self
            .panels
            .iter()
            .map(|panel| {
                let rect = panel.get_bounding_client_rect();
                PanelRect { top: rect.top() as f32, bottom: rect.bottom() as f32 }
            })
            .collect();

        for event in self.tracker.borrow_mut().update(&rects, viewport_h) {
            let panel = &self.panels[event.index];
            let classes = panel.class_list();
            let video = panel
                .query_selector("video")
                .ok()
                .flatten()
                .and_then(|v| v.dyn_into::<HtmlMediaElement>().ok());
            if event.crossing.activates() {
                let _ = classes.add_1(ACTIVE_CLASS);
                if let Some(video) = video {
                    play_media(&video);
                }
            } else {
                let _ = classes.remove_1(ACTIVE_CLASS);
                if let Some(video) = video {
                    let _ = video.pause();
                }
            }
        }

        for (panel, rect) in self.panels.iter().zip(&rects) {
            let state = entrance(rect.top, viewport_h);
            let style = panel.style();
            let _ = style.set_property("opacity", &state.opacity.to_string());
            let _ = style.set_property("transform", &format!("translateY({}px)", state.offset_y));

            let media = panel
                .query_selector(".card-media")
                .ok()
                .flatten()
                .and_then(|m| m.dyn_into::<HtmlElement>().ok());
            if let Some(media) = media {
                let shift = parallax(*rect, viewport_h);
                let _ = media.style().set_property("transform", &format!("translateY({shift}%)"));
            }
        }
    }
}
