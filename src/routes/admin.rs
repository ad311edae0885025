// Schema administration

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::{
    app_state::AppState,
    error::{AppError, AppResult},
    models::{default_schema, Schema},
};

#[derive(Debug, Deserialize)]
pub struct SaveSchemaRequest {
    pub name: Option<String>,
    pub schema: Option<Schema>,
}

pub async fn list_schemas_handler(State(state): State<AppState>) -> Json<Map<String, Value>> {
    Json(state.store.schemas().await)
}

/// Create a collection or replace its schema
pub async fn save_schema_handler(
    State(state): State<AppState>,
    req: Result<Json<SaveSchemaRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(req) = req?;
    let name = req
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("Collection name required".to_string()))?;

    let schema = state
        .store
        .put_schema(&name, req.schema.unwrap_or_else(default_schema))
        .await?;

    Ok(Json(json!({"success": true, "schema": schema})))
}
