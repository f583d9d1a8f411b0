// chat.rs - Chat box wired to the remote endpoint

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlButtonElement, HtmlInputElement, HtmlTextAreaElement, KeyboardEvent};

use super::{create, listen, FetchTransport, LocalStorageKeyStore};
use crate::chat::{format_reply, outgoing, ApiKeyContext, ChatClient, KeyStore, MemoryKeyStore};
use crate::config::ChatConfig;
use crate::lifecycle::{Liveness, Mount};

const FAILURE_ALERT: &str = "Sorry, the assistant could not be reached. Please try again in a moment.";
const THINKING: &str = "Thinking...";

#[wasm_bindgen]
pub struct ChatWidget {
    widget: Rc<Widget>,
    mount: Mount,
}

struct Widget {
    client: ChatClient<FetchTransport>,
    key: RefCell<ApiKeyContext<Box<dyn KeyStore>>>,
    document: Document,
    log: Element,
    input: HtmlTextAreaElement,
    send: HtmlButtonElement,
    key_input: HtmlInputElement,
    token: Liveness,
}

#[wasm_bindgen]
impl ChatWidget {
    /// Build the chat box inside `#container_id`.
    #[wasm_bindgen(constructor)]
    pub fn new(container_id: &str, config_json: Option<String>) -> Result<ChatWidget, JsValue> {
        super::init_logging();
        let config = match config_json {
            Some(json) => serde_json::from_str::<ChatConfig>(&json).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => ChatConfig::default(),
        };

        let store: Box<dyn KeyStore> = match LocalStorageKeyStore::open() {
            Ok(store) => Box::new(store),
            Err(err) => {
                log::warn!("local storage unavailable ({err}), key will not persist");
                Box::new(MemoryKeyStore::new())
            }
        };
        let key = ApiKeyContext::load(store, config.storage_key.clone());

        let document = super::document()?;
        let container: Element = super::by_id(container_id)?;

        let log: Element = create(&document, "div", "chat-log")?;
        let input: HtmlTextAreaElement = create(&document, "textarea", "chat-input")?;
        input.set_id("user-message");
        input.set_placeholder("Ask me anything...");
        input.set_rows(1);
        let send: HtmlButtonElement = create(&document, "button", "chat-send")?;
        send.set_type("button");
        send.set_text_content(Some("Send"));

        let key_input: HtmlInputElement = create(&document, "input", "chat-key-input")?;
        key_input.set_type("password");
        key_input.set_placeholder(if key.is_set() { "Key saved" } else { "Access key (optional)" });
        let save_key: HtmlButtonElement = create(&document, "button", "chat-key-save")?;
        save_key.set_type("button");
        save_key.set_text_content(Some("Save key"));
        let reset_key: HtmlButtonElement = create(&document, "button", "chat-key-reset")?;
        reset_key.set_type("button");
        reset_key.set_text_content(Some("Reset key"));

        let compose: Element = create(&document, "div", "chat-compose")?;
        compose.append_child(&input)?;
        compose.append_child(&send)?;
        let key_row: Element = create(&document, "div", "chat-key")?;
        key_row.append_child(&key_input)?;
        key_row.append_child(&save_key)?;
        key_row.append_child(&reset_key)?;
        container.append_child(&log)?;
        container.append_child(&compose)?;
        container.append_child(&key_row)?;

        let mount = Mount::new();
        let widget = Rc::new(Widget {
            client: ChatClient::new(FetchTransport, config),
            key: RefCell::new(key),
            document,
            log,
            input,
            send,
            key_input,
            token: mount.token(),
        });
        widget.wire(&save_key, &reset_key)?;
        log::info!("chat widget ready (key {})", if widget.key.borrow().is_set() { "present" } else { "absent" });

        Ok(Self { widget, mount })
    }

    /// Connectivity check; resolves to the outcome object.
    pub fn probe(&self) -> js_sys::Promise {
        let widget = Rc::clone(&self.widget);
        wasm_bindgen_futures::future_to_promise(async move {
            let outcome = widget.client.probe().await;
            serde_wasm_bindgen::to_value(&outcome).map_err(|e| JsValue::from_str(&e.to_string()))
        })
    }

    /// Detach; replies still in flight are dropped.
    pub fn unmount(&self) {
        self.mount.unmount();
    }
}

impl Widget {
    fn wire(self: &Rc<Self>, save_key: &HtmlButtonElement, reset_key: &HtmlButtonElement) -> Result<(), JsValue> {
        let this = Rc::clone(self);
        listen(&self.send, "click", move |_| this.submit())?;

        let this = Rc::clone(self);
        listen(&self.input, "keydown", move |event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>() else { return };
            if key.key() == "Enter" && !key.shift_key() {
                event.prevent_default();
                this.submit();
            }
        })?;

        let this = Rc::clone(self);
        listen(&self.input, "input", move |_| this.fit_input())?;

        let this = Rc::clone(self);
        listen(save_key, "click", move |_| this.save_key())?;

        let this = Rc::clone(self);
        listen(reset_key, "click", move |_| this.reset_key())?;
        Ok(())
    }

    fn submit(self: &Rc<Self>) {
        if !self.token.is_alive() {
            return;
        }
        let input = self.input.value();
        let Some(message) = outgoing(&input, self.send.disabled()).map(str::to_owned) else {
            return;
        };
        self.input.set_value("");
        self.fit_input();
        self.append("chat-message user", &message);
        let pending = self.append("chat-message assistant pending", THINKING);
        self.send.set_disabled(true);

        let this = Rc::clone(self);
        wasm_bindgen_futures::spawn_local(async move {
            let key = this.key.borrow().get().map(str::to_owned);
            let outcome = this.client.send(&message, key.as_deref()).await;
            if !this.token.is_alive() {
                log::debug!("chat reply arrived after the widget was unmounted");
                return;
            }
            if let Some(pending) = pending {
                pending.remove();
            }
            this.send.set_disabled(false);

            match outcome.reply_text().filter(|_| outcome.success) {
                Some(text) => {
                    if let Some(bubble) = this.append("chat-message assistant", "") {
                        bubble.set_inner_html(&format_reply(&text));
                    }
                }
                None => {
                    log::error!("chat call failed: {}", outcome.error.as_deref().unwrap_or("unknown error"));
                    alert(FAILURE_ALERT);
                }
            }
        });
    }

    fn append(&self, class: &str, text: &str) -> Option<Element> {
        let bubble = self.document.create_element("div").ok()?;
        bubble.set_class_name(class);
        bubble.set_text_content(Some(text));
        if let Err(err) = self.log.append_child(&bubble) {
            log::warn!("could not append chat message: {}", super::js_message(&err));
            return None;
        }
        self.log.set_scroll_top(self.log.scroll_height());
        Some(bubble)
    }

    fn fit_input(&self) {
        let style = self.input.style();
        let _ = style.set_property("height", "auto");
        let _ = style.set_property("height", &format!("{}px", self.input.scroll_height()));
    }

    fn save_key(&self) {
        let value = self.key_input.value();
        match self.key.borrow_mut().set(&value) {
            Ok(()) => {
                self.key_input.set_value("");
                self.key_input.set_placeholder(if value.trim().is_empty() { "Access key (optional)" } else { "Key saved" });
            }
            Err(err) => {
                log::error!("could not store key: {err}");
                alert("Could not save the key in this browser.");
            }
        }
    }

    /// Forget the key and start over with a fresh page.
    fn reset_key(&self) {
        if let Err(err) = self.key.borrow_mut().clear() {
            log::error!("could not remove key: {err}");
        }
        if let Ok(window) = super::window() {
            if let Err(err) = window.location().reload() {
                log::error!("reload failed: {}", super::js_message(&err));
            }
        }
    }
}

fn alert(message: &str) {
    if let Ok(window) = super::window() {
        let _ = window.alert_with_message(message);
    }
}
