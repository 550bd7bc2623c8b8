use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Headers, HtmlCanvasElement, Request, RequestInit, Response, Window};

use shapesketch_shared::{decode_response, ClientError, PredictRequest, PredictionResult};

pub const DEFAULT_ENDPOINT: &str = "/predict";

pub fn endpoint_url(canvas: &HtmlCanvasElement) -> String {
    canvas
        .get_attribute("data-endpoint")
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
}

pub fn encode_canvas(canvas: &HtmlCanvasElement) -> Result<String, JsValue> {
    canvas.to_data_url_with_type("image/png")
}

fn build_request(url: &str, image: String) -> Result<Request, JsValue> {
    let body = serde_json::to_string(&PredictRequest { image })
        .map_err(|error| JsValue::from_str(&format!("Request encode failed: {error}")))?;
    let headers = Headers::new()?;
    headers.set("Content-Type", "application/json")?;
    let init = RequestInit::new();
    init.set_method("POST");
    init.set_headers(&headers);
    init.set_body(&JsValue::from_str(&body));
    Request::new_with_str_and_init(url, &init)
}

/// Posts the image and calls `on_done` exactly once with the decoded outcome.
pub fn send_prediction(
    window: &Window,
    url: &str,
    image: String,
    on_done: impl 'static + FnOnce(Result<PredictionResult, ClientError>),
) {
    let request = match build_request(url, image) {
        Ok(request) => request,
        Err(error) => {
            on_done(Err(ClientError::Transport(format!(
                "request build failed: {error:?}"
            ))));
            return;
        }
    };

    let on_done = std::rc::Rc::new(std::cell::RefCell::new(Some(on_done)));
    let finish = move |outcome: Result<PredictionResult, ClientError>| {
        if let Some(on_done) = on_done.borrow_mut().take() {
            on_done(outcome);
        }
    };
    let finish = std::rc::Rc::new(finish);

    let on_response = {
        let finish = finish.clone();
        Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            let response: Response = match value.dyn_into() {
                Ok(response) => response,
                Err(_) => {
                    finish(Err(ClientError::Transport("fetch resolved to non-response".into())));
                    return;
                }
            };
            let status = response.status();
            let text_promise = match response.text() {
                Ok(promise) => promise,
                Err(_) => {
                    finish(Err(ClientError::Transport("response body unreadable".into())));
                    return;
                }
            };

            let finish_text = finish.clone();
            let on_text = Closure::<dyn FnMut(JsValue)>::new(move |text: JsValue| {
                let text = text.as_string().unwrap_or_default();
                finish_text(decode_response(status, &text));
            });
            let finish_err = finish.clone();
            let on_text_err = Closure::<dyn FnMut(JsValue)>::new(move |_err: JsValue| {
                finish_err(Err(ClientError::Transport("response body read failed".into())));
            });
            let _ = text_promise.then2(&on_text, &on_text_err);
            on_text.forget();
            on_text_err.forget();
        })
    };

    let on_error = {
        let finish = finish.clone();
        Closure::<dyn FnMut(JsValue)>::new(move |err: JsValue| {
            let reason = err
                .as_string()
                .or_else(|| {
                    js_sys::Reflect::get(&err, &JsValue::from_str("message"))
                        .ok()
                        .and_then(|message| message.as_string())
                })
                .unwrap_or_else(|| "network error".to_string());
            finish(Err(ClientError::Transport(reason)));
        })
    };

    let _ = window.fetch_with_request(&request).then2(&on_response, &on_error);
    on_response.forget();
    on_error.forget();
}
