// web/ - Browser glue (wasm32 only)
//
// Thin DOM wiring over the pure modules. Failures end in a console log or a
// degraded view, never an exception escaping into the page.

mod chat;
mod comic;
mod fetch;
mod frame;
mod panels;
mod scene;
mod storage;

pub use chat::ChatWidget;
pub use comic::ComicViewer;
pub use fetch::FetchTransport;
pub use frame::{frame_load_chat, frame_new_chat, theme_chat_frame};
pub use panels::ScrollPanels;
pub use scene::SceneHandle;
pub use storage::LocalStorageKeyStore;

use std::sync::Once;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

static LOGGING: Once = Once::new();

#[wasm_bindgen(start)]
pub fn start() {
    init_logging();
}

pub fn init_logging() {
    LOGGING.call_once(|| {
        console_error_panic_hook::set_once();
        let level = if cfg!(debug_assertions) { log::Level::Debug } else { log::Level::Info };
        if console_log::init_with_level(level).is_err() {
            web_sys::console::warn_1(&"backdrop-engine: logger already installed".into());
        }
    });
}

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

fn document() -> Result<web_sys::Document, JsValue> {
    window()?.document().ok_or_else(|| JsValue::from_str("no document"))
}

fn by_id<T: JsCast>(id: &str) -> Result<T, JsValue> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("#{id} has the wrong element type")))
}

/// Attach `handler` for the lifetime of the page.
fn listen(target: &web_sys::EventTarget, event: &str, handler: impl FnMut(web_sys::Event) + 'static) -> Result<(), JsValue> {
    let callback = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
    target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

fn create<T: JsCast>(document: &web_sys::Document, tag: &str, class: &str) -> Result<T, JsValue> {
    let element = document.create_element(tag)?;
    element.set_class_name(class);
    element.dyn_into::<T>().map_err(|_| JsValue::from_str(&format!("<{tag}> has the wrong element type")))
}

/// Human-readable text of a thrown JS value
fn js_message(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Resolve after `ms` milliseconds
async fn sleep(ms: u32) -> Result<(), JsValue> {
    let window = window()?;
    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        if let Err(err) = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms as i32) {
            let _ = reject.call1(&JsValue::NULL, &err);
        }
    });
    wasm_bindgen_futures::JsFuture::from(promise).await.map(|_| ())
}

/// Start a media element, logging a refused autoplay instead of failing.
fn play_media(media: &web_sys::HtmlMediaElement) {
    match media.play() {
        Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = wasm_bindgen_futures::JsFuture::from(promise).await {
                log::info!("video play refused: {}", js_message(&err));
            }
        }),
        Err(err) => log::info!("video play failed: {}", js_message(&err)),
    }
}

#[wasm_bindgen]
pub fn is_mobile_user_agent() -> bool {
    web_sys::window()
        .and_then(|w| w.navigator().user_agent().ok())
        .is_some_and(|ua| crate::viewport::is_mobile_user_agent(&ua))
}
