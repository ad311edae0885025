// Form actions posted by rendered pages
// An action named after a registered collection creates an item in it; any
// other action is acknowledged and echoed back.

use axum::{
    extract::{rejection::JsonRejection, Path as AxumPath, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::{app_state::AppState, error::AppError};
use super::api::into_item;

pub async fn run_action_handler(
    State(state): State<AppState>,
    AxumPath(action): AxumPath<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(payload) = payload?;
    info!("Executing action: {} with payload: {}", action, payload);

    if state.store.is_registered(&action).await {
        let item = state.store.create(&action, into_item(payload)?).await?;
        return Ok((
            StatusCode::CREATED,
            Json(json!({"success": true, "result": item})),
        ));
    }

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": format!("Action {} executed", action),
            "data": payload
        })),
    ))
}
