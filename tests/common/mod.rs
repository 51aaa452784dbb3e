use axum::{
    body::Body,
    http::{header, Request, Response},
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tempfile::TempDir;

// Re-export the main app modules for testing
use photo_vault::{handlers, services, utils, AppState};

/// Setup a test application backed by a temporary directory.
///
/// The TempDir guard is returned so storage stays alive for the duration of
/// the test.
pub async fn setup_test_app() -> (Router, TempDir) {
    setup_test_app_with_max_size(10 * 1024 * 1024).await
}

pub async fn setup_test_app_with_max_size(max_file_size: usize) -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let uploads_dir = temp_dir.path().join("uploads");
    let users_file = temp_dir.path().join("users.json");

    // Create test configuration
    let config = utils::config::AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0, // Use random port for testing
        uploads_dir: uploads_dir.to_str().unwrap().to_string(),
        users_file: users_file.to_str().unwrap().to_string(),
        max_file_size,
        session_ttl_seconds: 24 * 60 * 60,
        cookie_secure: false,
        cors_origins: vec!["*".to_string()],
        request_timeout_seconds: 30,
    };

    // Initialize services
    let storage = services::photo_storage::PhotoStorage::new(&uploads_dir)
        .expect("Failed to create photo storage");
    let credentials = services::credential_store::CredentialStore::new(&users_file);
    let sessions = services::session_manager::SessionManager::with_ttl(
        std::time::Duration::from_secs(config.session_ttl_seconds),
    );

    // Create app state
    let app_state = AppState {
        config: Arc::new(config),
        credentials: Arc::new(credentials),
        sessions: Arc::new(sessions),
        storage: Arc::new(storage),
    };

    // Build router (simplified version without middleware for testing)
    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/health", get(handlers::health::health_check))
        .route("/api/signup", post(handlers::auth::signup))
        .route("/api/login", post(handlers::auth::login))
        .route("/api/logout", post(handlers::auth::logout))
        .route("/api/user", get(handlers::auth::current_user))
        .route("/api/upload", post(handlers::photos::upload_photo))
        .route("/api/photos", get(handlers::photos::list_photos))
        .route("/api/delete/:name", delete(handlers::photos::delete_photo))
        .with_state(app_state);

    (app, temp_dir)
}

/// Build a JSON POST request.
pub fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Extract the session cookie value from a response's Set-Cookie header.
pub fn session_cookie(response: &Response<Body>) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("response has no Set-Cookie header")
        .to_str()
        .unwrap();
    set_cookie
        .split(';')
        .next()
        .expect("empty Set-Cookie header")
        .to_string()
}

/// Build a multipart/form-data body with a single `photo` field.
pub fn multipart_photo(filename: &str, data: &[u8]) -> (String, Vec<u8>) {
    let boundary = "PhotoVaultTestBoundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"photo\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    (
        format!("multipart/form-data; boundary={}", boundary),
        body,
    )
}

/// Build an authenticated multipart upload request.
pub fn upload_request(cookie: &str, filename: &str, data: &[u8]) -> Request<Body> {
    let (content_type, body) = multipart_photo(filename, data);
    Request::builder()
        .uri("/api/upload")
        .method("POST")
        .header(header::CONTENT_TYPE, content_type)
        .header(header::COOKIE, cookie)
        .body(Body::from(body))
        .unwrap()
}

pub async fn response_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
