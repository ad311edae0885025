use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use page_builder::{
    app_state::AppState,
    config::{Config, ServerConfig, StorageConfig},
    routes::create_app_router,
};

struct TestApp {
    router: Router,
    dir: TempDir,
}

async fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("templates")).unwrap();
    std::fs::create_dir_all(dir.path().join("public")).unwrap();

    let config = Config {
        storage: StorageConfig {
            data_dir: dir.path().join("data"),
            templates_dir: dir.path().join("templates"),
            public_dir: dir.path().join("public"),
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
    };

    let state = AppState::new(config).await.unwrap();
    TestApp {
        router: create_app_router(state),
        dir,
    }
}

impl TestApp {
    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, String) {
        match body {
            Some(body) => {
                self.send_raw(method, uri, Some("application/json"), body.to_string())
                    .await
            }
            None => self.send_raw(method, uri, None, String::new()).await,
        }
    }

    async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: String,
    ) -> (StatusCode, String) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            request = request.header("content-type", content_type);
        }
        let body = Body::from(body);

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, text) = self.send(method, uri, body).await;
        (status, serde_json::from_str(&text).unwrap())
    }
}

#[tokio::test]
async fn test_root() {
    let app = test_app().await;
    let (status, body) = app.send(Method::GET, "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Universal App Builder Engine Running");
}

#[tokio::test]
async fn test_reserved_collections_are_registered() {
    let app = test_app().await;
    let (status, names) = app.json(Method::GET, "/api", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(names, json!(["pages", "templates"]));
}

#[tokio::test]
async fn test_collection_crud() {
    let app = test_app().await;

    let (status, _) = app
        .json(
            Method::POST,
            "/admin-api/schemas",
            Some(json!({"name": "menu", "schema": {"name": "text", "price": "number"}})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, schema) = app.json(Method::GET, "/api/menu/schema", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(schema, json!({"name": "text", "price": "number"}));

    let (status, created) = app
        .json(Method::POST, "/api/menu", Some(json!({"name": "Tea", "price": 3})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, fetched) = app.json(Method::GET, &format!("/api/menu/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) = app
        .json(Method::PUT, &format!("/api/menu/{}", id), Some(json!({"price": 4})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated, json!({"id": id, "name": "Tea", "price": 4}));

    let (status, all) = app.json(Method::GET, "/api/menu", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all, json!([updated]));

    let (status, deleted) = app.json(Method::DELETE, &format!("/api/menu/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({"success": true}));

    let (status, _) = app.json(Method::GET, &format!("/api/menu/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.json(Method::DELETE, &format!("/api/menu/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unregistered_collection_is_hidden() {
    let app = test_app().await;

    for (method, uri, body) in [
        (Method::GET, "/api/orders", None),
        (Method::GET, "/api/orders/schema", None),
        (Method::GET, "/api/orders/1", None),
        (Method::POST, "/api/orders", Some(json!({"qty": 1}))),
        (Method::PUT, "/api/orders/1", Some(json!({"qty": 2}))),
        (Method::DELETE, "/api/orders/1", None),
    ] {
        let (status, body) = app.json(method, uri, body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["error"], "Collection not found");
    }

    assert!(!app.dir.path().join("data").join("orders.json").exists());
}

#[tokio::test]
async fn test_non_object_body_is_rejected() {
    let app = test_app().await;
    let (status, _) = app.json(Method::POST, "/api/pages", Some(json!([1, 2]))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_bodies_get_error_shape() {
    let app = test_app().await;

    let cases = [
        (Method::POST, "/api/pages", Some("application/json"), "{not json"),
        (Method::PUT, "/api/pages/home", Some("application/json"), "[1,"),
        (Method::POST, "/admin-api/schemas", Some("application/json"), "{\"name\": 5}"),
        (Method::POST, "/actions/subscribe", Some("application/json"), "oops"),
        (Method::POST, "/actions/subscribe", None, "{}"),
    ];

    for (method, uri, content_type, body) in cases {
        let (status, text) = app
            .send_raw(method, uri, content_type, body.to_string())
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}: {text}");

        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["status"], json!(400), "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn test_save_schema_requires_name() {
    let app = test_app().await;
    let (status, body) = app
        .json(Method::POST, "/admin-api/schemas", Some(json!({"schema": {}})))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Collection name required");
}

#[tokio::test]
async fn test_save_schema_defaults() {
    let app = test_app().await;
    let (status, body) = app
        .json(Method::POST, "/admin-api/schemas", Some(json!({"name": "notes"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "schema": {"name": "text"}}));

    let (_, schemas) = app.json(Method::GET, "/admin-api/schemas", None).await;
    assert_eq!(schemas["notes"], json!({"name": "text"}));
}

#[tokio::test]
async fn test_render_page_with_data_source() {
    let app = test_app().await;

    app.json(Method::POST, "/admin-api/schemas", Some(json!({"name": "menu"})))
        .await;
    app.json(Method::POST, "/api/menu", Some(json!({"id": "1", "name": "Tea"})))
        .await;
    app.json(Method::POST, "/api/menu", Some(json!({"id": "2", "name": "Coffee"})))
        .await;
    app.json(
        Method::POST,
        "/api/pages",
        Some(json!({
            "id": "menu_list",
            "title": "Our Menu",
            "dataSource": "menu",
            "templateContent": "<h1>{{title}}</h1><ul>{{#each items}}<li>{{name}}</li>{{/each}}</ul>"
        })),
    )
    .await;

    let (status, html) = app.send(Method::GET, "/pages/menu_list", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(html, "<h1>Our Menu</h1><ul><li>Tea</li><li>Coffee</li></ul>");

    let (status, html) = app.send(Method::GET, "/pages/menu_list?id=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(html, "<h1>Our Menu</h1><ul></ul>");
}

#[tokio::test]
async fn test_render_page_from_template_record() {
    let app = test_app().await;

    let (_, template) = app
        .json(
            Method::POST,
            "/api/templates",
            Some(json!({"name": "hello", "content": "Hello {{name}}"})),
        )
        .await;
    let template_id = template["id"].as_str().unwrap();

    app.json(
        Method::POST,
        "/api/pages",
        Some(json!({
            "id": "hello",
            "name": "Ana",
            "templateId": template_id,
            "templateContent": "ignored"
        })),
    )
    .await;

    let (status, html) = app.send(Method::GET, "/pages/hello", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(html, "Hello Ana");
}

#[tokio::test]
async fn test_render_page_from_file() {
    let app = test_app().await;
    std::fs::write(
        app.dir.path().join("templates").join("about.html"),
        "{{#if title}}<h1>{{title}}</h1>{{/if}}",
    )
    .unwrap();

    app.json(
        Method::POST,
        "/api/pages",
        Some(json!({"id": "about", "title": "About us", "template": "about.html"})),
    )
    .await;
    app.json(
        Method::POST,
        "/api/pages",
        Some(json!({"id": "broken", "template": "missing.html"})),
    )
    .await;

    let (status, html) = app.send(Method::GET, "/pages/about", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(html, "<h1>About us</h1>");

    let (status, html) = app.send(Method::GET, "/pages/broken", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(html, "Error: Template missing.html not found");
}

#[tokio::test]
async fn test_unknown_page() {
    let app = test_app().await;
    let (status, body) = app.send(Method::GET, "/pages/nope", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Page Configuration Not Found");
}

#[tokio::test]
async fn test_actions() {
    let app = test_app().await;
    app.json(Method::POST, "/admin-api/schemas", Some(json!({"name": "orders"})))
        .await;

    let (status, body) = app
        .json(Method::POST, "/actions/orders", Some(json!({"item_id": "1", "qty": "2"})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["result"]["qty"], "2");

    let (_, orders) = app.json(Method::GET, "/api/orders", None).await;
    assert_eq!(orders.as_array().unwrap().len(), 1);

    let (status, body) = app
        .json(Method::POST, "/actions/subscribe", Some(json!({"email": "a@b.c"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "message": "Action subscribe executed",
            "data": {"email": "a@b.c"}
        })
    );
}

#[tokio::test]
async fn test_static_files_fallback() {
    let app = test_app().await;
    std::fs::write(app.dir.path().join("public").join("app.js"), "console.log(1);").unwrap();

    let (status, body) = app.send(Method::GET, "/app.js", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "console.log(1);");
}
