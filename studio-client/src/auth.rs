//! Authentication endpoints

use crate::StudioClient;
use crate::error::{ClientError, Result};
use crate::{AUTH_TIMEOUT, Credentials};
use studio_core::domain::account::AccountInfo;
use studio_core::dto::auth::{LoginRequest, LoginResponse, RegisterResponse};
use tracing::{info, warn};

/// Outcome of registering a new account
#[derive(Debug, Clone)]
pub struct Registration {
    /// The issued credentials
    pub account: RegisterResponse,
    /// Whether the automatic login after registration succeeded
    pub logged_in: bool,
}

impl StudioClient {
    // =============================================================================
    // Account Lifecycle
    // =============================================================================

    /// Register a new account and log in with it
    ///
    /// The issued client id and secret are stored in the client even when the
    /// follow-up login fails, so the caller can persist them.
    pub async fn register(&self) -> Result<Registration> {
        let url = self.url("/api/v1/auth/register");
        let response = self.client.post(&url).timeout(AUTH_TIMEOUT).send().await?;
        let account: RegisterResponse = self.handle_response(response).await?;

        info!("Registered new account {}", account.client_id);
        self.update_credentials(Credentials {
            client_id: Some(account.client_id.clone()),
            client_secret: Some(account.client_secret.clone()),
            access_token: None,
        });

        let logged_in = match self.login(&account.client_id, &account.client_secret).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Registered but automatic login failed: {}", e);
                false
            }
        };

        Ok(Registration { account, logged_in })
    }

    /// Log in with a client id and secret
    ///
    /// On success the id, secret and access token are stored in the client.
    pub async fn login(&self, client_id: &str, client_secret: &str) -> Result<LoginResponse> {
        let client_id = client_id.trim();
        let client_secret = client_secret.trim();
        if client_id.is_empty() || client_secret.is_empty() {
            return Err(ClientError::InvalidRequest(
                "client_id and client_secret required".to_string(),
            ));
        }

        let url = self.url("/api/v1/auth/login");
        let response = self
            .client
            .post(&url)
            .timeout(AUTH_TIMEOUT)
            .json(&LoginRequest {
                client_id: client_id.to_string(),
                client_secret: client_secret.to_string(),
            })
            .send()
            .await?;

        let login: LoginResponse = self.handle_response(response).await?;
        self.update_credentials(Credentials {
            client_id: Some(client_id.to_string()),
            client_secret: Some(client_secret.to_string()),
            access_token: Some(login.access_token.clone()),
        });

        Ok(login)
    }

    /// Get details of the logged-in account
    pub async fn me(&self) -> Result<AccountInfo> {
        let url = self.url("/api/v1/auth/me");
        self.authed_json(|c| c.get(&url).timeout(AUTH_TIMEOUT)).await
    }
}
