use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, CanvasRenderingContext2d, Event, HtmlButtonElement,
    HtmlCanvasElement, HtmlElement, PointerEvent, TouchEvent,
};

use shapesketch_shared::{
    ClientError, Effect, GestureTracker, InputEvent, RequestSeq, Session, SessionEvent,
};

use crate::dom::{
    active_touches, changed_touches, debug_enabled, get_element, is_touch_event,
    pointer_to_bitmap,
};
use crate::net::{encode_canvas, endpoint_url, send_prediction};
use crate::panel::ResultPanel;
use crate::render::{configure_ink, draw_segment, fill_background};
use crate::state::State;

fn document_ready_state(document: &web_sys::Document) -> Option<String> {
    Reflect::get(document.as_ref(), &JsValue::from_str("readyState"))
        .ok()?
        .as_string()
}

fn debug_log(state: &State, message: &str) {
    if state.debug {
        web_sys::console::log_1(&message.into());
    }
}

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;
    let started = Rc::new(Cell::new(false));

    if document_ready_state(&document).as_deref() == Some("complete") {
        started.set(true);
        return start_app();
    }

    let onload_started = started.clone();
    let onload = Closure::<dyn FnMut(Event)>::new(move |_| {
        if onload_started.replace(true) {
            return;
        }
        if let Err(err) = start_app() {
            web_sys::console::error_1(&err);
        }
    });
    window.add_event_listener_with_callback("load", onload.as_ref().unchecked_ref())?;
    onload.forget();

    Ok(())
}

/// Applies one event to the session and carries out the resulting effects in order.
fn dispatch(state: &Rc<RefCell<State>>, event: SessionEvent) {
    let effects = state.borrow_mut().session.apply(event);
    for effect in effects {
        run_effect(state, effect);
    }
}

fn run_effect(state: &Rc<RefCell<State>>, effect: Effect) {
    match effect {
        Effect::FillBackground => {
            let state = state.borrow();
            fill_background(&state.canvas, &state.ctx);
        }
        Effect::DrawSegment { from, to } => {
            draw_segment(&state.borrow().ctx, from, to);
        }
        Effect::RequestPrediction(seq) => request_prediction(state, seq),
        Effect::Render(patch) => {
            let mut state = state.borrow_mut();
            if let Err(err) = state.panel.apply(&patch) {
                web_sys::console::error_2(&"Result render failed".into(), &err);
            }
            let rows = state.panel.row_count();
            debug_log(&state, &format!("Rendered state={:?} rows={rows}", patch.state));
        }
        Effect::ResetResults => state.borrow_mut().panel.reset(),
        Effect::Discarded(seq) => {
            debug_log(&state.borrow(), &format!("Dropped stale response seq={}", seq.0));
        }
    }
}

fn request_prediction(state: &Rc<RefCell<State>>, seq: RequestSeq) {
    let (window, url, image) = {
        let state = state.borrow();
        debug_log(&state, &format!("Predict request seq={} url={}", seq.0, state.endpoint));
        (
            state.window.clone(),
            state.endpoint.clone(),
            encode_canvas(&state.canvas),
        )
    };
    let image = match image {
        Ok(image) => image,
        Err(err) => {
            web_sys::console::error_2(&"Canvas export failed".into(), &err);
            dispatch(
                state,
                SessionEvent::PredictionFailed(seq, ClientError::Transport("canvas export".into())),
            );
            return;
        }
    };
    let state_cb = state.clone();
    send_prediction(&window, &url, image, move |outcome| {
        let event = match outcome {
            Ok(result) => SessionEvent::PredictionResolved(seq, result),
            Err(error) => {
                web_sys::console::warn_1(&format!("Predict seq={} failed: {error}", seq.0).into());
                SessionEvent::PredictionFailed(seq, error)
            }
        };
        dispatch(&state_cb, event);
    });
}

fn feed_input(state: &Rc<RefCell<State>>, input: InputEvent) {
    let gesture = state.borrow_mut().tracker.feed(input);
    if let Some(gesture) = gesture {
        dispatch(state, gesture.into());
    }
}

fn start_app() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;
    let debug = debug_enabled(&window);

    let canvas: HtmlCanvasElement = get_element(&document, "drawingCanvas")?;
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("Missing canvas context"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    configure_ink(&ctx);

    let headline: HtmlElement = get_element(&document, "predictionLabel")?;
    let confidence: HtmlElement = get_element(&document, "confidenceText")?;
    let divider: HtmlElement = get_element(&document, "divider")?;
    let bars: HtmlElement = get_element(&document, "probabilityBars")?;
    let clear_button: HtmlButtonElement = get_element(&document, "clearBtn")?;

    let endpoint = endpoint_url(&canvas);
    if debug {
        web_sys::console::log_1(
            &format!(
                "ShapeSketch debug enabled endpoint={endpoint} bitmap={}x{}",
                canvas.width(),
                canvas.height()
            )
            .into(),
        );
    }

    let session = Session::new();
    let init_effects = session.init();
    let state = Rc::new(RefCell::new(State {
        window: window.clone(),
        canvas: canvas.clone(),
        ctx,
        panel: ResultPanel::new(document.clone(), headline, confidence, divider, bars),
        session,
        tracker: GestureTracker::new(),
        endpoint,
        debug,
    }));
    for effect in init_effects {
        run_effect(&state, effect);
    }
    state.borrow_mut().panel.reset();

    {
        let down_state = state.clone();
        let down_canvas = canvas.clone();
        let ondown = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if is_touch_event(&event) {
                return;
            }
            let Some(point) = pointer_to_bitmap(&down_canvas, &event) else {
                debug_log(&down_state.borrow(), "pointerdown on unlaid canvas ignored");
                return;
            };
            event.prevent_default();
            feed_input(
                &down_state,
                InputEvent::PointerDown {
                    button: event.button(),
                    point,
                },
            );
        });
        canvas.add_event_listener_with_callback("pointerdown", ondown.as_ref().unchecked_ref())?;
        ondown.forget();
    }

    {
        let move_state = state.clone();
        let move_canvas = canvas.clone();
        let onmove = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if is_touch_event(&event) || !move_state.borrow().tracker.is_tracking() {
                return;
            }
            if let Some(point) = pointer_to_bitmap(&move_canvas, &event) {
                feed_input(&move_state, InputEvent::PointerMove { point });
            }
        });
        canvas.add_event_listener_with_callback("pointermove", onmove.as_ref().unchecked_ref())?;
        onmove.forget();
    }

    {
        let stop_state = state.clone();
        let onstop = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if is_touch_event(&event) {
                return;
            }
            let input = if event.type_() == "pointerup" {
                InputEvent::PointerUp
            } else {
                InputEvent::PointerLeave
            };
            feed_input(&stop_state, input);
        });
        canvas.add_event_listener_with_callback("pointerup", onstop.as_ref().unchecked_ref())?;
        canvas
            .add_event_listener_with_callback("pointercancel", onstop.as_ref().unchecked_ref())?;
        canvas.add_event_listener_with_callback("pointerleave", onstop.as_ref().unchecked_ref())?;
        onstop.forget();
    }

    {
        let options = AddEventListenerOptions::new();
        options.set_passive(false);

        let touch_state = state.clone();
        let touch_canvas = canvas.clone();
        let ontouch = Closure::<dyn FnMut(TouchEvent)>::new(move |event: TouchEvent| {
            let input = match event.type_().as_str() {
                "touchstart" => InputEvent::TouchStart {
                    changed: changed_touches(&touch_canvas, &event),
                },
                "touchmove" => InputEvent::TouchMove {
                    touches: active_touches(&touch_canvas, &event),
                },
                _ => InputEvent::TouchEnd {
                    changed: changed_touches(&touch_canvas, &event),
                },
            };
            if GestureTracker::suppresses_default(&input) {
                event.prevent_default();
            }
            feed_input(&touch_state, input);
        });
        for name in ["touchstart", "touchmove", "touchend", "touchcancel"] {
            canvas.add_event_listener_with_callback_and_add_event_listener_options(
                name,
                ontouch.as_ref().unchecked_ref(),
                &options,
            )?;
        }
        ontouch.forget();
    }

    {
        let clear_state = state.clone();
        let onclear = Closure::<dyn FnMut(Event)>::new(move |_| {
            debug_log(&clear_state.borrow(), "Clear");
            dispatch(&clear_state, SessionEvent::Clear);
        });
        clear_button.add_event_listener_with_callback("click", onclear.as_ref().unchecked_ref())?;
        onclear.forget();
    }

    Ok(())
}
