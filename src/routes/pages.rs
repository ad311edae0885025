// Page rendering route

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::error;

use crate::{app_state::AppState, error::AppError};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub id: Option<String>,
}

/// Rendered text on success; plain-text bodies for failures
pub async fn render_page_handler(
    State(state): State<AppState>,
    AxumPath(page_id): AxumPath<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    match state.pages.resolve_page(&page_id, query.id.as_deref()).await {
        Ok(html) => Html(html).into_response(),
        Err(AppError::NotFound(message)) => (StatusCode::NOT_FOUND, message).into_response(),
        Err(e) => {
            error!("Error rendering page {}: {}", page_id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error rendering page").into_response()
        }
    }
}
