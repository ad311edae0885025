// Generic REST surface over the collection store
// Every collection route answers 404 for collections without a schema.

use axum::{
    extract::{rejection::JsonRejection, Path as AxumPath, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use crate::{
    app_state::AppState,
    error::{AppError, AppResult},
    models::Item,
};

async fn require_collection(state: &AppState, collection: &str) -> AppResult<()> {
    if state.store.is_registered(collection).await {
        Ok(())
    } else {
        Err(AppError::NotFound("Collection not found".to_string()))
    }
}

/// Request bodies for item writes must be JSON objects
pub(crate) fn into_item(body: Value) -> AppResult<Item> {
    match body {
        Value::Object(fields) => Ok(fields),
        _ => Err(AppError::BadRequest("Request body must be a JSON object".to_string())),
    }
}

pub async fn list_collections_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.store.list_collection_names().await)
}

pub async fn get_schema_handler(
    State(state): State<AppState>,
    AxumPath(collection): AxumPath<String>,
) -> Result<Json<Value>, AppError> {
    state
        .store
        .get_schema(&collection)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Collection not found".to_string()))
}

pub async fn list_items_handler(
    State(state): State<AppState>,
    AxumPath(collection): AxumPath<String>,
) -> Result<Json<Vec<Item>>, AppError> {
    require_collection(&state, &collection).await?;
    Ok(Json(state.store.get_all(&collection).await))
}

pub async fn get_item_handler(
    State(state): State<AppState>,
    AxumPath((collection, id)): AxumPath<(String, String)>,
) -> Result<Json<Item>, AppError> {
    require_collection(&state, &collection).await?;
    state
        .store
        .get_by_id(&collection, &id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))
}

pub async fn create_item_handler(
    State(state): State<AppState>,
    AxumPath(collection): AxumPath<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Item>), AppError> {
    let Json(body) = body?;
    require_collection(&state, &collection).await?;
    let item = state.store.create(&collection, into_item(body)?).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_item_handler(
    State(state): State<AppState>,
    AxumPath((collection, id)): AxumPath<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Item>, AppError> {
    let Json(body) = body?;
    require_collection(&state, &collection).await?;
    let item = state.store.update(&collection, &id, into_item(body)?).await?;
    Ok(Json(item))
}

pub async fn delete_item_handler(
    State(state): State<AppState>,
    AxumPath((collection, id)): AxumPath<(String, String)>,
) -> Result<Json<Value>, AppError> {
    require_collection(&state, &collection).await?;
    state.store.delete(&collection, &id).await?;
    Ok(Json(json!({"success": true})))
}
