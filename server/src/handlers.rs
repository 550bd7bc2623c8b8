use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use shapesketch_shared::PredictRequest;
use uuid::Uuid;

use crate::state::AppState;

fn error_reply(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

pub async fn predict_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let request_id = Uuid::new_v4();
    let Ok(value) = serde_json::from_slice::<Value>(&body) else {
        eprintln!("predict req={request_id} rejected: body is not JSON");
        return error_reply(StatusCode::BAD_REQUEST, "Invalid JSON body");
    };
    let image = value
        .get("image")
        .and_then(Value::as_str)
        .filter(|image| !image.is_empty());
    let Some(image) = image else {
        eprintln!("predict req={request_id} rejected: no image");
        return error_reply(StatusCode::BAD_REQUEST, "No image data provided");
    };
    let request = PredictRequest {
        image: image.to_string(),
    };

    match state.classifier.classify(&request).await {
        Ok(reply) => {
            let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
            eprintln!(
                "predict req={request_id} bytes={} status={}",
                request.image.len(),
                status.as_u16()
            );
            (status, Json(reply.body)).into_response()
        }
        Err(error) => {
            eprintln!("predict req={request_id} failed: {error}");
            (StatusCode::BAD_GATEWAY, Json(json!({}))).into_response()
        }
    }
}
