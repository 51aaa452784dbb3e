use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue},
    response::Json,
};
use serde_json::{json, Value};

use crate::models::errors::AppError;
use crate::models::user::AuthRequest;
use crate::AppState;

pub const SESSION_COOKIE: &str = "photovault_session";

fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie = headers.get("cookie").or_else(|| headers.get("Cookie"))?;
    let s = cookie.to_str().ok()?;
    for part in s.split(';') {
        let p = part.trim();
        if let Some(eq) = p.find('=') {
            let (k, v) = p.split_at(eq);
            if k == name {
                return Some(v[1..].to_string());
            }
        }
    }
    None
}

fn set_session_cookie(token: &str, max_age_seconds: u64, secure: bool) -> HeaderValue {
    let secure_attr = if secure { "; Secure" } else { "" };
    HeaderValue::from_str(&format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}{}",
        SESSION_COOKIE, token, max_age_seconds, secure_attr
    ))
    .unwrap_or_else(|_| HeaderValue::from_static(""))
}

fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_str(&format!(
        "{}=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Strict; Path=/",
        SESSION_COOKIE
    ))
    .unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// Resolves the session cookie to the authenticated identity. Every protected
/// handler calls this first and fails with 401 before touching anything else.
pub async fn require_user(state: &AppState, headers: &HeaderMap) -> Result<String, AppError> {
    let token = parse_cookie(headers, SESSION_COOKIE).ok_or(AppError::Unauthenticated)?;
    state
        .sessions
        .resolve(&token)
        .await
        .ok_or(AppError::Unauthenticated)
}

fn validate_auth_request(payload: &AuthRequest) -> Result<(), AppError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::validation_failed("Email and password are required"));
    }
    Ok(())
}

async fn start_session(state: &AppState, email: &str) -> (HeaderMap, String) {
    let token = state.sessions.create(email).await;
    let mut headers = HeaderMap::new();
    headers.insert(
        "Set-Cookie",
        set_session_cookie(
            &token,
            state.config.session_ttl_seconds,
            state.config.cookie_secure,
        ),
    );
    (headers, token)
}

/// POST /api/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<AuthRequest>,
) -> Result<(HeaderMap, Json<Value>), AppError> {
    validate_auth_request(&payload)?;

    let record = state
        .credentials
        .create_user(&payload.email, &payload.password)
        .await?;
    state.storage.ensure_user_dir(&record.storage_key).await?;

    let (headers, _token) = start_session(&state, &payload.email).await;
    tracing::info!("Signup: {}", payload.email);

    Ok((
        headers,
        Json(json!({
            "message": "Signed up successfully!",
            "user": payload.email,
        })),
    ))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<AuthRequest>,
) -> Result<(HeaderMap, Json<Value>), AppError> {
    state
        .credentials
        .verify(&payload.email, &payload.password)
        .await?;

    let (headers, _token) = start_session(&state, &payload.email).await;
    tracing::info!("Login: {}", payload.email);

    Ok((
        headers,
        Json(json!({
            "message": "Logged in successfully!",
            "user": payload.email,
        })),
    ))
}

/// POST /api/logout
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(HeaderMap, Json<Value>), AppError> {
    require_user(&state, &headers).await?;

    if let Some(token) = parse_cookie(&headers, SESSION_COOKIE) {
        state.sessions.destroy(&token).await;
    }

    let mut response_headers = HeaderMap::new();
    response_headers.insert("Set-Cookie", clear_session_cookie());

    Ok((
        response_headers,
        Json(json!({ "message": "Logged out successfully!" })),
    ))
}

/// GET /api/user
pub async fn current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let email = require_user(&state, &headers).await?;
    Ok(Json(json!({ "user": email })))
}
