//! Password login
//!
//! A deliberately simple gate: one configured password, compared by SHA-256
//! digest, answered with a random session token that nothing validates.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::AppState;

/// Length of the returned session token
pub const TOKEN_LENGTH: usize = 26;

/// Holds the digest of the accepted password
#[derive(Debug, Clone, Default)]
pub struct LoginGate {
    password_digest: Option<[u8; 32]>,
}

impl LoginGate {
    /// `None` disables login: every attempt is rejected
    pub fn new(password: Option<&str>) -> Self {
        Self {
            password_digest: password.filter(|p| !p.is_empty()).map(digest),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.password_digest.is_some()
    }

    pub fn verify(&self, candidate: &str) -> bool {
        self.password_digest
            .is_some_and(|expected| digest(candidate) == expected)
    }
}

fn digest(password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

/// Random alphanumeric session token
pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub message: String,
}

impl LoginResponse {
    fn failure(status: StatusCode, message: &str) -> Response {
        let body = LoginResponse {
            success: false,
            token: None,
            message: message.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// POST /api/login
///
/// A missing or unparsable body counts as a missing password.
pub async fn login(State(state): State<AppState>, body: Option<Json<LoginRequest>>) -> Response {
    let password = body
        .and_then(|Json(req)| req.password)
        .filter(|p| !p.is_empty());

    let Some(password) = password else {
        return LoginResponse::failure(StatusCode::BAD_REQUEST, "Password required");
    };

    if !state.login.verify(&password) {
        if !state.login.is_enabled() {
            warn!("Login attempted but no password is configured");
        }
        return LoginResponse::failure(StatusCode::UNAUTHORIZED, "Invalid password");
    }

    info!("Login successful");
    Json(LoginResponse {
        success: true,
        token: Some(generate_token()),
        message: "Authentication successful".to_string(),
    })
    .into_response()
}
