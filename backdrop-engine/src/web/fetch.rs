// fetch.rs - Chat transport over window.fetch

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

use crate::chat::{ChatRequest, RawResponse, Transport, TransportError};

/// No timeout of its own; the browser's network stack decides.
pub struct FetchTransport;

impl Transport for FetchTransport {
    async fn post(&self, request: ChatRequest<'_>) -> Result<RawResponse, TransportError> {
        fetch(request).await.map_err(|err| TransportError::Network(super::js_message(&err)))
    }
}

async fn fetch(request: ChatRequest<'_>) -> Result<RawResponse, JsValue> {
    let window = super::window()?;

    let headers = Headers::new()?;
    for (name, value) in &request.headers {
        headers.set(name, value)?;
    }
    let init = RequestInit::new();
    init.set_method("POST");
    init.set_headers(&headers);
    init.set_body(&JsValue::from_str(&request.body));

    let req = Request::new_with_str_and_init(request.url, &init)?;
    let resp: Response = JsFuture::from(window.fetch_with_request(&req)).await?.dyn_into()?;
    let content_type = resp.headers().get("content-type")?;
    let body = JsFuture::from(resp.text()?).await?.as_string().unwrap_or_default();

    Ok(RawResponse { status: resp.status(), content_type, body })
}
