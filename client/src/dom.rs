use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, PointerEvent, Touch, TouchEvent, TouchList, Window};

use shapesketch_shared::{map_to_bitmap, BitmapSize, ClientRect, Point, TouchPoint};

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element: {id}")))?;
    element
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Invalid element type: {id}")))
}

pub fn debug_enabled(window: &Window) -> bool {
    let search = window.location().search().ok().unwrap_or_default();
    search.contains("debug=1")
        || search.contains("debug=true")
        || search.contains("log=1")
        || search.contains("log=true")
}

pub fn bitmap_size(canvas: &HtmlCanvasElement) -> BitmapSize {
    BitmapSize {
        width: canvas.width() as f64,
        height: canvas.height() as f64,
    }
}

/// Current on-screen box of the canvas, or `None` while it is hidden or not laid out.
pub fn client_rect(canvas: &HtmlCanvasElement) -> Option<ClientRect> {
    let rect = canvas.get_bounding_client_rect();
    let rect = ClientRect {
        left: rect.left(),
        top: rect.top(),
        width: rect.width(),
        height: rect.height(),
    };
    rect.is_laid_out().then_some(rect)
}

pub fn pointer_to_bitmap(canvas: &HtmlCanvasElement, event: &PointerEvent) -> Option<Point> {
    let rect = client_rect(canvas)?;
    Some(map_to_bitmap(
        event.client_x() as f64,
        event.client_y() as f64,
        rect,
        bitmap_size(canvas),
    ))
}

pub fn is_touch_event(event: &PointerEvent) -> bool {
    event.pointer_type() == "touch"
}

fn touch_list_to_points(canvas: &HtmlCanvasElement, list: &TouchList) -> Vec<TouchPoint> {
    let Some(rect) = client_rect(canvas) else {
        return Vec::new();
    };
    let bitmap = bitmap_size(canvas);
    (0..list.length())
        .filter_map(|index| list.item(index))
        .map(|touch: Touch| TouchPoint {
            id: touch.identifier(),
            point: map_to_bitmap(touch.client_x() as f64, touch.client_y() as f64, rect, bitmap),
        })
        .collect()
}

pub fn changed_touches(canvas: &HtmlCanvasElement, event: &TouchEvent) -> Vec<TouchPoint> {
    touch_list_to_points(canvas, &event.changed_touches())
}

pub fn active_touches(canvas: &HtmlCanvasElement, event: &TouchEvent) -> Vec<TouchPoint> {
    touch_list_to_points(canvas, &event.touches())
}
