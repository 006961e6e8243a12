//! services/api/src/adapters/identity.rs
//!
//! HTTP adapter for the external identity provider, implementing the
//! `IdentityService` port. The provider owns authentication, plan tiers, and
//! the per-user free-usage counter; this adapter only verifies tokens and
//! advances the counter through its API.

use async_trait::async_trait;
use serde::Deserialize;

use creator_studio_core::domain::{CallerContext, Plan};
use creator_studio_core::ports::{IdentityService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `IdentityService` against a Clerk-style
/// identity API.
#[derive(Clone)]
pub struct HttpIdentityAdapter {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpIdentityAdapter {
    /// Creates a new `HttpIdentityAdapter`.
    pub fn new(http: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

/// The caller as the identity API reports it.
#[derive(Deserialize)]
struct CallerRecord {
    user_id: String,
    plan: String,
    #[serde(default)]
    free_usage: u32,
}

impl CallerRecord {
    fn to_domain(self) -> CallerContext {
        CallerContext {
            user_id: self.user_id,
            plan: Plan::from_str(&self.plan),
            free_usage: self.free_usage,
        }
    }
}

//=========================================================================================
// `IdentityService` Trait Implementation
//=========================================================================================

#[async_trait]
impl IdentityService for HttpIdentityAdapter {
    async fn caller_context(&self, token: &str) -> PortResult<CallerContext> {
        let url = format!("{}/v1/sessions/verify", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let record: CallerRecord = response
                    .json()
                    .await
                    .map_err(|e| PortError::Unexpected(e.to_string()))?;
                Ok(record.to_domain())
            }
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::NOT_FOUND => Err(
                PortError::NotFound("unknown or expired session token".to_string()),
            ),
            status => Err(PortError::Unexpected(format!(
                "identity API returned {status}"
            ))),
        }
    }

    async fn increment_free_usage(&self, user_id: &str) -> PortResult<()> {
        // The provider applies the increment atomically; this call is fired
        // once per successful free-tier operation.
        let url = format!("{}/v1/users/{}/free-usage", self.base_url, user_id);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PortError::Unexpected(format!(
                "identity API returned {} while advancing usage",
                response.status()
            )));
        }
        Ok(())
    }
}
