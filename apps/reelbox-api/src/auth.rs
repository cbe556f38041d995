//! Authentication delegated to the external identity service
//!
//! Handlers take a [`CurrentUser`]; the extractor pulls the bearer token
//! and asks the configured [`IdentityProvider`] who it belongs to.

use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use reelbox_domain::OwnerId;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("missing bearer credentials")]
    MissingCredentials,

    #[error("invalid token")]
    InvalidToken,

    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}

/// Resolves a bearer token to the user it was issued for
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<OwnerId, AuthError>;
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    id: Uuid,
}

/// Identity provider backed by the auth service's `/auth/me` endpoint
#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    me_url: String,
}

impl HttpIdentityProvider {
    pub fn new(auth_service_url: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            me_url: format!("{}/auth/me", auth_service_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn resolve(&self, token: &str) -> Result<OwnerId, AuthError> {
        let response = self
            .client
            .get(&self.me_url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, "Identity service request failed");
                AuthError::Unavailable(err.to_string())
            })?;

        if response.status() != reqwest::StatusCode::OK {
            debug!(status = response.status().as_u16(), "Token rejected by identity service");
            return Err(AuthError::InvalidToken);
        }

        let me: MeResponse = response.json().await.map_err(|err| {
            warn!(error = %err, "Unexpected identity service response");
            AuthError::InvalidToken
        })?;

        Ok(OwnerId::from_uuid(me.id))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// The authenticated caller
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub OwnerId);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AuthError::MissingCredentials)?;
        let owner_id = state.identity.resolve(token).await?;
        Ok(CurrentUser(owner_id))
    }
}
