use std::sync::Arc;
use std::time::Duration;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test};
use serde_json::{Value, json};
use tempfile::TempDir;

use imagine_studio::app::{AppState, frontend_service};
use imagine_studio::domain::types::ImageUrl;
use imagine_studio::models::config::{AuthConfig, HistoryConfig};
use imagine_studio::repository::{DieselRepository, MemoryRepository, Repository};
use imagine_studio::simulator::GenerationSimulator;
use imagine_studio::uploads::UploadStore;

mod common;

const BOUNDARY: &str = "studio-test-boundary";
const OVERLOADED: &str =
    "Our AI models are currently experiencing high demand. Please try again in a moment.";

fn state_with(repo: Arc<dyn Repository>, failure_rate: f64, dir: &TempDir) -> AppState {
    let mock_images_dir = dir.path().join("mock-images");
    std::fs::create_dir_all(&mock_images_dir).unwrap();
    std::fs::write(mock_images_dir.join("example1.png"), b"png bytes").unwrap();

    AppState::new(
        repo,
        AuthConfig {
            secret: "test-secret".to_string(),
            token_ttl_hours: 1,
            bcrypt_cost: 4,
        },
        HistoryConfig {
            limit: 5,
            retention: Some(50),
        },
        GenerationSimulator::new(
            failure_rate,
            Duration::ZERO,
            vec![
                ImageUrl::new("/api/mock-images/example1.png").unwrap(),
                ImageUrl::new("/api/mock-images/example2.png").unwrap(),
            ],
        )
        .unwrap(),
        UploadStore::new(dir.path().join("uploads")).unwrap(),
        mock_images_dir,
    )
}

fn state(failure_rate: f64, dir: &TempDir) -> AppState {
    state_with(Arc::new(MemoryRepository::new()), failure_rate, dir)
}

fn credentials(username: &str, password: &str) -> Value {
    json!({ "username": username, "password": password })
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

/// Encodes text fields and an optional `image` part as `multipart/form-data`.
fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, data)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn generate_request(token: &str, body: Vec<u8>) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/generate")
        .insert_header(bearer(token))
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
}

/// Signs up `$username` and evaluates to the issued token.
macro_rules! sign_up {
    ($app:expr, $username:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(credentials($username, "password123"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        body["token"].as_str().unwrap().to_string()
    }};
}

/// Generates `$prompt` in the realistic style and evaluates to the response.
macro_rules! generate {
    ($app:expr, $token:expr, $prompt:expr) => {{
        let prompt: &str = $prompt;
        let body = multipart_body(&[("prompt", prompt), ("style", "realistic")], None);
        test::call_service(&$app, generate_request($token, body).to_request()).await
    }};
}

#[actix_web::test]
async fn signup_returns_user_and_token_without_password() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(0.0, &dir);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(credentials("testuser", "password123"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["username"], "testuser");
    assert!(body["user"]["id"].is_string());
    assert!(body["token"].is_string());
    assert!(body["user"].get("password").is_none());
    assert!(!body.to_string().contains("password123"));
}

#[actix_web::test]
async fn signup_rejects_duplicates_and_short_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(0.0, &dir);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    sign_up!(app, "testuser");

    let cases = [
        (credentials("testuser", "newpassword"), "Username already exists"),
        (credentials("ab", "password123"), "Username must be at least 3 characters"),
        (credentials("validuser", "123"), "Password must be at least 6 characters"),
        (credentials("ab", "123"), "Username must be at least 3 characters"),
        (
            credentials(&"u".repeat(51), "123"),
            "Username must be at most 50 characters",
        ),
    ];
    for (payload, message) in cases {
        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": message }));
    }
}

#[actix_web::test]
async fn malformed_json_is_a_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(0.0, &dir);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn login_checks_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(0.0, &dir);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    sign_up!(app, "testuser");

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(credentials("testuser", "password123"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["username"], "testuser");

    for payload in [
        credentials("testuser", "wrongpassword"),
        credentials("wronguser", "password123"),
        credentials("", ""),
        credentials("testuser", ""),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Invalid credentials" }));
    }
}

#[actix_web::test]
async fn login_reports_missing_fields() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(0.0, &dir);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let cases = [
        (json!({ "password": "password123" }), "Username is required"),
        (json!({ "username": "testuser" }), "Password is required"),
        (json!({}), "Username is required"),
    ];
    for (payload, message) in cases {
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": message }));
    }
}

#[actix_web::test]
async fn protected_routes_require_a_valid_token() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(0.0, &dir);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let req = test::TestRequest::get().uri("/api/generations").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "No token provided" }));

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(bearer("invalid-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Invalid or expired token" }));

    let body = multipart_body(&[("prompt", "sunset"), ("style", "realistic")], None);
    let req = test::TestRequest::post()
        .uri("/api/generate")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn me_returns_the_token_owner() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(0.0, &dir);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let token = sign_up!(app, "testuser");

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["username"], "testuser");
    assert!(body.get("password_hash").is_none());
}

#[actix_web::test]
async fn generate_persists_and_lists_history() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(0.0, &dir);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let token = sign_up!(app, "testuser");

    let resp = generate!(app, &token, "A beautiful sunset over mountains");
    assert_eq!(resp.status(), StatusCode::OK);
    let generation: Value = test::read_body_json(resp).await;
    assert_eq!(generation["prompt"], "A beautiful sunset over mountains");
    assert_eq!(generation["style"], "realistic");
    assert!(
        generation["imageUrl"]
            .as_str()
            .unwrap()
            .starts_with("/api/mock-images/")
    );
    assert!(generation["uploadedImage"].is_null());
    assert!(generation["createdAt"].is_string());

    let req = test::TestRequest::get()
        .uri("/api/generations")
        .insert_header(bearer(&token))
        .to_request();
    let history: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(history, json!([generation]));
}

#[actix_web::test]
async fn generate_validates_the_form() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(0.0, &dir);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let token = sign_up!(app, "testuser");

    let long_prompt = "a".repeat(1001);
    let cases = [
        (vec![("style", "realistic")], "Prompt is required"),
        (
            vec![("prompt", long_prompt.as_str()), ("style", "realistic")],
            "Prompt must be at most 1000 characters",
        ),
        (
            vec![("prompt", "Test"), ("style", "invalid-style")],
            "Invalid style. Expected one of: realistic, artistic, abstract, cyberpunk",
        ),
    ];
    for (fields, message) in cases {
        let req = generate_request(&token, multipart_body(&fields, None)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": message }));
    }
}

#[actix_web::test]
async fn prompt_is_stored_as_sent() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(0.0, &dir);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let token = sign_up!(app, "testuser");

    let resp = generate!(app, &token, "  sunset  ");
    assert_eq!(resp.status(), StatusCode::OK);
    let generation: Value = test::read_body_json(resp).await;
    assert_eq!(generation["prompt"], "  sunset  ");

    let resp = generate!(app, &token, "   ");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Prompt is required" }));
}

#[actix_web::test]
async fn overloaded_engine_returns_retryable_503() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(1.0, &dir);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let token = sign_up!(app, "testuser");

    let resp = generate!(app, &token, "A beautiful sunset");
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": OVERLOADED, "retryable": true }));

    let req = test::TestRequest::get()
        .uri("/api/generations")
        .insert_header(bearer(&token))
        .to_request();
    let history: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(history, json!([]));
}

#[actix_web::test]
async fn history_returns_five_newest_generations() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(0.0, &dir);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let token = sign_up!(app, "testuser");

    for i in 0..7 {
        let resp = generate!(app, &token, &format!("Test prompt {i}"));
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri("/api/generations")
        .insert_header(bearer(&token))
        .to_request();
    let history: Value = test::call_and_read_body_json(&app, req).await;
    let prompts = history
        .as_array()
        .unwrap()
        .iter()
        .map(|generation| generation["prompt"].as_str().unwrap().to_string())
        .collect::<Vec<_>>();

    assert_eq!(
        prompts,
        vec![
            "Test prompt 6",
            "Test prompt 5",
            "Test prompt 4",
            "Test prompt 3",
            "Test prompt 2",
        ]
    );
}

#[actix_web::test]
async fn generation_access_is_limited_to_its_owner() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(0.0, &dir);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let owner = sign_up!(app, "testuser");
    let other = sign_up!(app, "otheruser");

    let resp = generate!(app, &owner, "Test prompt");
    let generation: Value = test::read_body_json(resp).await;
    let uri = format!("/api/generations/{}", generation["id"].as_str().unwrap());

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&owner))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched, generation);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&other))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Access denied" }));

    let req = test::TestRequest::get()
        .uri("/api/generations/non-existent-id")
        .insert_header(bearer(&owner))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Generation not found" }));
}

#[actix_web::test]
async fn reference_image_is_stored_and_served() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(0.0, &dir);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let token = sign_up!(app, "testuser");

    let body = multipart_body(
        &[("prompt", "Like this"), ("style", "cyberpunk")],
        Some(("reference.PNG", "image/png", b"fake png data")),
    );
    let resp = test::call_service(&app, generate_request(&token, body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let generation: Value = test::read_body_json(resp).await;

    let uploaded = generation["uploadedImage"].as_str().unwrap().to_string();
    assert!(uploaded.starts_with("/uploads/"));
    assert!(uploaded.ends_with(".png"));

    let req = test::TestRequest::get().uri(&uploaded).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("Cross-Origin-Resource-Policy").unwrap(),
        "cross-origin"
    );
    let bytes = test::read_body(resp).await;
    assert_eq!(&bytes[..], b"fake png data");
}

#[actix_web::test]
async fn non_image_upload_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(0.0, &dir);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let token = sign_up!(app, "testuser");

    let body = multipart_body(
        &[("prompt", "Like this"), ("style", "abstract")],
        Some(("notes.txt", "text/plain", b"hello")),
    );
    let resp = test::call_service(&app, generate_request(&token, body).to_request()).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Only image files are allowed" }));
    assert_eq!(
        std::fs::read_dir(dir.path().join("uploads")).unwrap().count(),
        0
    );
}

#[actix_web::test]
async fn oversized_upload_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(0.0, &dir);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let token = sign_up!(app, "testuser");

    let image = vec![0u8; 11 * 1024 * 1024];
    let body = multipart_body(
        &[("prompt", "Too big"), ("style", "realistic")],
        Some(("huge.png", "image/png", &image)),
    );
    let resp = test::call_service(&app, generate_request(&token, body).to_request()).await;

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "File too large (max 10MB)" }));
    assert_eq!(
        std::fs::read_dir(dir.path().join("uploads")).unwrap().count(),
        0
    );
}

#[actix_web::test]
async fn frontend_routes_fall_back_to_index() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(0.0, &dir);
    let static_dir = dir.path().join("dist");
    std::fs::create_dir_all(&static_dir).unwrap();
    std::fs::write(static_dir.join("index.html"), "<div id=\"root\"></div>").unwrap();
    let static_dir = static_dir.to_str().unwrap().to_string();

    let app = test::init_service(
        App::new()
            .configure(|cfg| state.configure(cfg))
            .service(frontend_service(&static_dir)),
    )
    .await;

    for uri in ["/", "/history", "/generations/abc"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        let bytes = test::read_body(resp).await;
        assert_eq!(&bytes[..], b"<div id=\"root\"></div>", "{uri}");
    }

    let req = test::TestRequest::get().uri("/api/auth/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn mock_images_are_served() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(0.0, &dir);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let req = test::TestRequest::get()
        .uri("/api/mock-images/example1.png")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = test::read_body(resp).await;
    assert_eq!(&bytes[..], b"png bytes");
}

#[actix_web::test]
async fn sqlite_storage_serves_the_full_flow() {
    let dir = tempfile::tempdir().unwrap();
    let test_db = common::TestDb::new("test_sqlite_full_flow.db");
    let state = state_with(
        Arc::new(DieselRepository::new(test_db.pool())),
        0.0,
        &dir,
    );
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let token = sign_up!(app, "testuser");

    let resp = generate!(app, &token, "Stored in SQLite");
    assert_eq!(resp.status(), StatusCode::OK);
    let generation: Value = test::read_body_json(resp).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(credentials("testuser", "password123"))
        .to_request();
    let login: Value = test::call_and_read_body_json(&app, req).await;
    let token = login["token"].as_str().unwrap();

    let req = test::TestRequest::get()
        .uri("/api/generations")
        .insert_header(bearer(token))
        .to_request();
    let history: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(history, json!([generation]));
}
