// HTTP surface: REST collections, page rendering, schema admin and actions

pub mod actions;
pub mod admin;
pub mod api;
pub mod pages;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::{
    app_state::AppState,
    infrastructure::middleware::request_logging_middleware,
};

async fn root_handler() -> &'static str {
    "Universal App Builder Engine Running"
}

pub fn create_app_router(state: AppState) -> Router {
    let public_dir = state.config.storage.public_dir.clone();

    Router::new()
        .route("/", get(root_handler))

        // Generic collection CRUD
        .route("/api", get(api::list_collections_handler))
        .route("/api/", get(api::list_collections_handler))
        .route("/api/{collection}/schema", get(api::get_schema_handler))
        .route(
            "/api/{collection}",
            get(api::list_items_handler).post(api::create_item_handler),
        )
        .route(
            "/api/{collection}/{id}",
            get(api::get_item_handler)
                .put(api::update_item_handler)
                .delete(api::delete_item_handler),
        )

        // Rendered pages
        .route("/pages/{page_id}", get(pages::render_page_handler))

        // Schema administration
        .route(
            "/admin-api/schemas",
            get(admin::list_schemas_handler).post(admin::save_schema_handler),
        )

        // Form actions
        .route("/actions/{action}", post(actions::run_action_handler))

        .fallback_service(ServeDir::new(public_dir))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_logging_middleware))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
