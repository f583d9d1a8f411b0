// frame.rs - Embedded chat frame: theme injection and commands

use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlIFrameElement};

use super::{js_message, listen, sleep};
use crate::config::FrameConfig;
use crate::frame::{FrameCommand, RetryStep, StyleError, StyleRetry, THEME_CSS};

/// Re-theme `#frame_id` every time it loads. Cross-origin frames end in a
/// logged give-up after the configured attempts.
#[wasm_bindgen]
pub fn theme_chat_frame(frame_id: &str, config_json: Option<String>) -> Result<(), JsValue> {
    super::init_logging();
    let config = match config_json {
        Some(json) => serde_json::from_str::<FrameConfig>(&json).map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => FrameConfig::default(),
    };
    let frame: HtmlIFrameElement = super::by_id(frame_id)?;

    let target = frame.clone();
    listen(&frame, "load", move |_| {
        let frame = target.clone();
        let config = config.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let mut retry = StyleRetry::new(&config);
            loop {
                match retry.record(inject(&frame, &config.stylesheet_href)) {
                    RetryStep::RetryAfter(ms) => {
                        if let Err(err) = sleep(ms).await {
                            log::error!("retry timer failed: {}", js_message(&err));
                            return;
                        }
                    }
                    RetryStep::Done | RetryStep::GaveUp => return,
                }
            }
        });
    })
}

fn inject(frame: &HtmlIFrameElement, stylesheet_href: &str) -> Result<(), StyleError> {
    let document: Document = frame
        .content_document()
        .ok_or_else(|| StyleError::CrossOrigin(frame.src()))?;
    let head = document
        .query_selector("head")
        .map_err(|e| StyleError::Dom(js_message(&e)))?
        .ok_or(StyleError::NoHead)?;
    let dom = |e: JsValue| StyleError::Dom(js_message(&e));

    let style = document.create_element("style").map_err(dom)?;
    style.set_text_content(Some(THEME_CSS));
    head.append_child(&style).map_err(dom)?;

    let origin = super::window().and_then(|w| w.location().origin()).map_err(dom)?;
    let link = document.create_element("link").map_err(dom)?;
    link.set_attribute("rel", "stylesheet").map_err(dom)?;
    link.set_attribute("type", "text/css").map_err(dom)?;
    link.set_attribute("href", &format!("{origin}{stylesheet_href}")).map_err(dom)?;
    head.append_child(&link).map_err(dom)?;
    Ok(())
}

fn post(frame_id: &str, command: &FrameCommand) -> Result<(), JsValue> {
    let frame: HtmlIFrameElement = super::by_id(frame_id)?;
    let Some(target) = frame.content_window() else {
        log::warn!("#{frame_id} has no window to receive {command:?}");
        return Ok(());
    };
    let message = serde_wasm_bindgen::to_value(command).map_err(|e| JsValue::from_str(&e.to_string()))?;
    target.post_message(&message, "*")
}

/// Ask the frame to open a fresh conversation.
#[wasm_bindgen]
pub fn frame_new_chat(frame_id: &str) -> Result<(), JsValue> {
    post(frame_id, &FrameCommand::NewChat)
}

#[wasm_bindgen]
pub fn frame_load_chat(frame_id: &str, chat_id: &str) -> Result<(), JsValue> {
    post(frame_id, &FrameCommand::LoadChat { id: chat_id.to_owned() })
}
