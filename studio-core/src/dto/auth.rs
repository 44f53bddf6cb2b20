//! Authentication DTOs

use serde::{Deserialize, Serialize};

/// Body of the login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

/// Freshly issued account credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub message: Option<String>,
}
