//! End-to-end request/response tests against the in-memory backend.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use recipebox::{app::build_app, data::MemoryClient, state::AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "recipebox-test-boundary";

// =============================================================================
// Helpers
// =============================================================================

struct TestApp {
    router: Router,
    memory: Arc<MemoryClient>,
    storage: Arc<recipebox::state::FakeStorage>,
}

impl TestApp {
    fn new() -> Self {
        let (state, memory, storage) = AppState::fake();
        Self {
            router: build_app(state),
            memory,
            storage,
        }
    }

    async fn send(&self, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
        let res = self.router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let headers = res.headers().clone();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, body)
    }

    /// Signs up and returns (access token, refresh token).
    async fn sign_up(&self, email: &str, username: &str) -> (String, String) {
        let req = Request::post("/auth/sign-up")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "email": email, "password": "correct horse", "username": username })
                    .to_string(),
            ))
            .unwrap();
        let (status, _, body) = self.send(req).await;
        assert_eq!(status, StatusCode::OK, "sign-up failed: {body}");
        (
            body["access_token"].as_str().unwrap().to_string(),
            body["refresh_token"].as_str().unwrap().to_string(),
        )
    }

    async fn get(&self, uri: &str, token: &str) -> (StatusCode, axum::http::HeaderMap, Value) {
        let req = Request::get(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        self.send(req).await
    }

    async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        let req = Request::delete(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = self.send(req).await;
        (status, body)
    }

    async fn create(
        &self,
        token: &str,
        parts: &[Part<'_>],
    ) -> (StatusCode, axum::http::HeaderMap, Value) {
        let req = Request::post("/recipes")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart(parts)))
            .unwrap();
        self.send(req).await
    }
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File(name, content_type, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"upload\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn names(page: &Value) -> Vec<String> {
    page["recipes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect()
}

fn tomato_soup<'a>() -> Vec<Part<'a>> {
    vec![
        Part::Text("name", "Tomato Soup"),
        Part::Text("ingredients", ""),
        Part::Text("ingredients", "2 tomatoes"),
        Part::Text("instructions", "Boil water"),
        Part::Text("cooking_time", "20"),
        Part::Text("category", "Soup"),
    ]
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_sign_up_creates_profile() {
    let app = TestApp::new();
    let (token, _) = app.sign_up("Julia@Example.com", "julia").await;

    let (status, _, me) = app.get("/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "julia@example.com");
    assert_eq!(me["profile"]["username"], "julia");
}

#[tokio::test]
async fn test_duplicate_sign_up_conflicts() {
    let app = TestApp::new();
    app.sign_up("julia@example.com", "julia").await;

    let req = Request::post("/auth/sign-up")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": "julia@example.com", "password": "another one" }).to_string(),
        ))
        .unwrap();
    let (status, _, body) = app.send(req).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_pages_redirect_without_session() {
    let app = TestApp::new();
    for uri in ["/feed", "/profile", "/recipes/new"] {
        let req = Request::get(uri).body(Body::empty()).unwrap();
        let (status, headers, _) = app.send(req).await;
        assert_eq!(status, StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(headers[header::LOCATION], "/auth");
    }
}

#[tokio::test]
async fn test_api_rejects_without_session() {
    let app = TestApp::new();
    let req = Request::get("/me").body(Body::empty()).unwrap();
    let (status, _, _) = app.send(req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sign_out_revokes_tokens() {
    let app = TestApp::new();
    let (token, refresh) = app.sign_up("julia@example.com", "julia").await;

    let req = Request::post("/auth/sign-out")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = app.send(req).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/auth");

    let (status, headers, _) = app.get("/feed", &token).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/auth");

    let req = Request::post("/auth/refresh")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "refresh_token": refresh }).to_string()))
        .unwrap();
    let (status, _, _) = app.send(req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Feed
// =============================================================================

#[tokio::test]
async fn test_feed_search_and_detail() {
    let app = TestApp::new();
    let (token, _) = app.sign_up("julia@example.com", "julia").await;
    let (status, _, _) = app
        .create(
            &token,
            &[
                Part::Text("name", "Apple Pie"),
                Part::Text("ingredients", "apples"),
                Part::Text("instructions", "Bake"),
                Part::Text("instructions", "Cool"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, _, crumble) = app
        .create(
            &token,
            &[
                Part::Text("name", "Apple Crumble"),
                Part::Text("ingredients", "apples"),
                Part::Text("instructions", "Bake"),
            ],
        )
        .await;
    app.create(
        &token,
        &[
            Part::Text("name", "Banana Bread"),
            Part::Text("ingredients", "bananas"),
            Part::Text("instructions", "Bake"),
        ],
    )
    .await;

    let (status, _, page) = app.get("/feed", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&page), vec!["Banana Bread", "Apple Crumble", "Apple Pie"]);
    assert_eq!(page["recipes"][0]["author"], "julia");
    assert_eq!(page["header"]["user"]["display_name"], "julia");

    let (_, _, page) = app.get("/feed?q=APPLE", &token).await;
    assert_eq!(names(&page), vec!["Apple Crumble", "Apple Pie"]);
    assert_eq!(page["header"]["search"]["query"], "APPLE");
    assert!(page["detail"].is_null());

    let id = crumble["id"].as_str().unwrap();
    let (_, _, page) = app.get(&format!("/feed?q=pie&selected={id}"), &token).await;
    assert_eq!(names(&page), vec!["Apple Pie"]);
    assert_eq!(page["detail"]["name"], "Apple Crumble");
    assert_eq!(page["detail"]["instructions"][0]["number"], 1);
}

#[tokio::test]
async fn test_feed_fetch_failure_shows_empty_list() {
    let app = TestApp::new();
    let (token, _) = app.sign_up("julia@example.com", "julia").await;
    app.create(&token, &tomato_soup()).await;

    app.memory.set_failing(true);
    let (status, _, page) = app.get("/feed", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(names(&page).is_empty());
    // header falls back to the email local-part
    assert_eq!(page["header"]["user"]["display_name"], "julia");
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_recipe_redirects_to_profile() {
    let app = TestApp::new();
    let (token, _) = app.sign_up("julia@example.com", "julia").await;

    let (status, headers, recipe) = app.create(&token, &tomato_soup()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(headers[header::LOCATION], "/profile");
    assert_eq!(recipe["name"], "Tomato Soup");
    assert_eq!(recipe["ingredients"], json!(["2 tomatoes"]));
    assert_eq!(recipe["instructions"], json!(["Boil water"]));
    assert_eq!(recipe["cooking_time"], 20);
    assert_eq!(recipe["category"], "Soup");
    assert!(recipe["image_url"].is_null());
    assert!(app.storage.keys().is_empty());
}

#[tokio::test]
async fn test_create_recipe_with_image() {
    let app = TestApp::new();
    let (token, _) = app.sign_up("julia@example.com", "julia").await;

    let mut parts = tomato_soup();
    parts.push(Part::File("image", "image/png", b"\x89PNG fake"));
    let (status, _, recipe) = app.create(&token, &parts).await;

    assert_eq!(status, StatusCode::CREATED);
    let keys = app.storage.keys();
    assert_eq!(keys.len(), 1);
    assert!(keys[0].ends_with(".png"));
    let url = recipe["image_url"].as_str().unwrap();
    assert!(url.starts_with("https://fake.local/"));
    assert!(url.ends_with(&keys[0]));
}

#[tokio::test]
async fn test_invalid_recipe_makes_no_calls() {
    let app = TestApp::new();
    let (token, _) = app.sign_up("julia@example.com", "julia").await;
    let calls = app.memory.call_count();

    let (status, _, body) = app
        .create(
            &token,
            &[
                Part::Text("name", "Ab"),
                Part::Text("ingredients", "  "),
                Part::Text("instructions", "Stir"),
                Part::File("image", "image/png", b"png"),
            ],
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["fields"]["name"].is_string());
    assert!(body["fields"]["ingredients"].is_string());
    assert!(body["fields"].get("instructions").is_none());
    // rejected before any store or upload call
    assert_eq!(app.memory.call_count(), calls);
    assert!(app.storage.keys().is_empty());
}

#[tokio::test]
async fn test_upload_failure_aborts_create() {
    let app = TestApp::new();
    let (token, _) = app.sign_up("julia@example.com", "julia").await;
    app.storage.set_failing(true);

    let mut parts = tomato_soup();
    parts.push(Part::File("image", "image/jpeg", b"jpeg"));
    let (status, _, body) = app.create(&token, &parts).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to create recipe");

    let (_, _, page) = app.get("/profile", &token).await;
    assert!(names(&page).is_empty());
}

// =============================================================================
// Profile
// =============================================================================

#[tokio::test]
async fn test_profile_lists_only_own_recipes() {
    let app = TestApp::new();
    let (julia, _) = app.sign_up("julia@example.com", "julia").await;
    let (jacques, _) = app.sign_up("jacques@example.com", "jacques").await;
    app.create(&julia, &tomato_soup()).await;
    app.create(
        &jacques,
        &[
            Part::Text("name", "Omelette"),
            Part::Text("ingredients", "eggs"),
            Part::Text("instructions", "Whisk"),
        ],
    )
    .await;

    let (status, _, page) = app.get("/profile", &julia).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&page), vec!["Tomato Soup"]);
    assert_eq!(page["profile"]["username"], "julia");
    assert!(page["header"].get("search").is_none());
}

#[tokio::test]
async fn test_delete_requires_confirmation() {
    let app = TestApp::new();
    let (token, _) = app.sign_up("julia@example.com", "julia").await;
    let (_, _, recipe) = app.create(&token, &tomato_soup()).await;
    let id = recipe["id"].as_str().unwrap();

    let calls = app.memory.call_count();
    let (status, _) = app.delete(&format!("/profile/recipes/{id}"), &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .delete(&format!("/profile/recipes/{id}?confirm=false"), &token)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.memory.call_count(), calls);

    let (status, page) = app
        .delete(&format!("/profile/recipes/{id}?confirm=true"), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(names(&page).is_empty());

    let (_, _, feed) = app.get("/feed", &token).await;
    assert!(names(&feed).is_empty());
}

#[tokio::test]
async fn test_cannot_delete_someone_elses_recipe() {
    let app = TestApp::new();
    let (julia, _) = app.sign_up("julia@example.com", "julia").await;
    let (jacques, _) = app.sign_up("jacques@example.com", "jacques").await;
    let (_, _, recipe) = app.create(&julia, &tomato_soup()).await;
    let id = recipe["id"].as_str().unwrap();

    let (status, _) = app
        .delete(&format!("/profile/recipes/{id}?confirm=true"), &jacques)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, _, page) = app.get("/profile", &julia).await;
    assert_eq!(names(&page), vec!["Tomato Soup"]);
}

#[tokio::test]
async fn test_failed_delete_reports_error() {
    let app = TestApp::new();
    let (token, _) = app.sign_up("julia@example.com", "julia").await;
    let (_, _, recipe) = app.create(&token, &tomato_soup()).await;
    let id = recipe["id"].as_str().unwrap();

    app.memory.set_failing(true);
    let (status, body) = app
        .delete(&format!("/profile/recipes/{id}?confirm=true"), &token)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to delete recipe");

    app.memory.set_failing(false);
    let (_, _, page) = app.get("/profile", &token).await;
    assert_eq!(names(&page), vec!["Tomato Soup"]);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let res = app
        .router
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
