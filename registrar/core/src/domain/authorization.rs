// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Authorization Resource
//!
//! A stored OAuth2 client configuration the directory uses to obtain user
//! tokens on the agent's behalf. The directory hands the token to the agent
//! runtime under the `auth_id` key, so the id must match what the agent
//! expects.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Authorization resource model and consent URL construction

use std::fmt;
use url::Url;

use crate::domain::config::{keys, ConfigError, OAuthClientConfig};

/// Redirect target registered for Gemini Enterprise OAuth clients
pub const OAUTH_REDIRECT_URI: &str = "https://vertexaisearch.cloud.google.com/oauth-redirect";

/// Scopes requested during delegated user authorization
pub const OAUTH_SCOPES: &[&str] = &["https://www.googleapis.com/auth/userinfo.email"];

#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationResource {
    pub auth_id: String,
    pub oauth_client_id: String,
    pub oauth_client_secret: String,
    pub token_uri: String,
    /// Fully built consent URL, including client id, scopes and redirect
    pub auth_uri: String,
}

impl AuthorizationResource {
    pub fn from_oauth(oauth: &OAuthClientConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            auth_id: oauth.auth_id.clone(),
            oauth_client_id: oauth.client_id.clone(),
            oauth_client_secret: oauth.client_secret.clone(),
            token_uri: oauth.token_uri.clone(),
            auth_uri: consent_url(&oauth.auth_uri_base, &oauth.client_id)?,
        })
    }
}

impl fmt::Debug for AuthorizationResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationResource")
            .field("auth_id", &self.auth_id)
            .field("oauth_client_id", &self.oauth_client_id)
            .field("oauth_client_secret", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .field("auth_uri", &self.auth_uri)
            .finish()
    }
}

fn consent_url(base: &str, client_id: &str) -> Result<String, ConfigError> {
    let mut url = Url::parse(base).map_err(|e| ConfigError::Invalid {
        key: keys::OAUTH_AUTH_URI_BASE,
        reason: e.to_string(),
    })?;

    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", OAUTH_REDIRECT_URI)
        .append_pair("scope", &OAUTH_SCOPES.join(" "))
        .append_pair("include_granted_scopes", "true")
        .append_pair("response_type", "code")
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent");

    Ok(url.into())
}
