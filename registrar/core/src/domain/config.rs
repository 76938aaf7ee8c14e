// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Registrar Configuration
//
// Defines the deployment-scoped settings consumed by every registrar step:
// - Raw key/value settings as read from a dotenv-style file
// - The immutable, validated RegistrarConfig built from them
// - Agent profile (display name, descriptions, icon)
// - Optional OAuth client used to create the authorization resource
// - API endpoint overrides for emulators and tests
//
// The process environment is never read or mutated here; the CLI loads the
// file into a Settings map once and passes the resulting config by reference.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Setting keys understood by the registrar.
pub mod keys {
    pub const PROJECT_ID: &str = "GOOGLE_CLOUD_PROJECT";
    pub const PROJECT_NUMBER: &str = "GOOGLE_CLOUD_PROJECT_NUMBER";
    pub const REGION: &str = "GOOGLE_CLOUD_LOCATION";
    pub const DIRECTORY_LOCATION: &str = "GEMINI_ENTERPRISE_LOCATION";
    pub const APP_ID: &str = "GEMINI_ENTERPRISE_APP_ID";
    pub const BUCKET: &str = "GOOGLE_CLOUD_STORAGE_BUCKET";
    pub const MODEL: &str = "MODEL_NAME";
    pub const DISPLAY_NAME: &str = "AGENT_DISPLAY_NAME";
    pub const DESCRIPTION: &str = "AGENT_DESCRIPTION";
    pub const TOOL_DESCRIPTION: &str = "TOOL_DESCRIPTION";
    pub const ICON_URI: &str = "AGENT_ICON_URI";
    pub const ENGINE_ID: &str = "AGENT_ENGINE_ID";
    pub const OAUTH_CLIENT_ID: &str = "OAUTH_CLIENT_ID";
    pub const OAUTH_CLIENT_SECRET: &str = "OAUTH_CLIENT_SECRET";
    pub const AUTH_ID: &str = "AUTH_ID";
    pub const OAUTH_AUTH_URI_BASE: &str = "OAUTH_AUTH_URI_BASE";
    pub const OAUTH_TOKEN_URI: &str = "OAUTH_TOKEN_URI";
    pub const DISCOVERY_ENGINE_ENDPOINT: &str = "DISCOVERY_ENGINE_ENDPOINT";
    pub const RESOURCE_MANAGER_ENDPOINT: &str = "RESOURCE_MANAGER_ENDPOINT";
}

pub const DEFAULT_REGION: &str = "us-central1";
pub const DEFAULT_DIRECTORY_LOCATION: &str = "global";
pub const DEFAULT_ICON_URI: &str =
    "https://fonts.gstatic.com/s/i/short-term/release/googlesymbols/smart_toy/default/24px.svg";
pub const DEFAULT_OAUTH_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_OAUTH_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_RESOURCE_MANAGER_ENDPOINT: &str = "https://cloudresourcemanager.googleapis.com";

/// Errors raised while loading or validating settings. Never transient.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Settings file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read settings file {path}: {message}")]
    Unreadable { path: PathBuf, message: String },

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Raw settings as read from the settings file.
///
/// Values are trimmed and empty values are treated as absent, matching how
/// an unset shell variable and `KEY=` behave in a dotenv file.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: BTreeMap<String, String>,
    source: Option<PathBuf>,
}

impl Settings {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into().trim().to_string()))
            .filter(|(_, v)| !v.is_empty())
            .collect();

        Self {
            values,
            source: None,
        }
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    /// Path of the file these settings were read from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn owned(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// How the agent presents itself in the directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentProfile {
    /// Display name; also the lookup key for deregistration
    pub display_name: Option<String>,
    pub description: String,
    pub tool_description: String,
    pub icon_uri: String,
}

/// OAuth client used to create the directory authorization resource
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthClientConfig {
    pub auth_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri_base: String,
    pub token_uri: String,
}

impl fmt::Debug for OAuthClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthClientConfig")
            .field("auth_id", &self.auth_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("auth_uri_base", &self.auth_uri_base)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// Base URLs of the Google APIs the registrar talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    pub discovery_engine: String,
    pub resource_manager: String,
}

impl ApiEndpoints {
    /// Discovery Engine serves `global` from the bare host and multi-regions
    /// (`us`, `eu`) from a location-prefixed host.
    pub fn for_location(location: &str) -> Self {
        let discovery_engine = if location == DEFAULT_DIRECTORY_LOCATION {
            "https://discoveryengine.googleapis.com".to_string()
        } else {
            format!("https://{}-discoveryengine.googleapis.com", location)
        };

        Self {
            discovery_engine,
            resource_manager: DEFAULT_RESOURCE_MANAGER_ENDPOINT.to_string(),
        }
    }
}

/// Immutable registrar configuration, built once at startup
#[derive(Debug, Clone)]
pub struct RegistrarConfig {
    pub project_id: String,
    /// Known project number; resolved over the network when absent
    pub project_number: Option<String>,
    /// Region of the backing reasoning engine
    pub region: String,
    /// Location of the Gemini Enterprise app
    pub directory_location: String,
    pub app_id: Option<String>,
    pub bucket: Option<String>,
    pub model: Option<String>,
    pub agent: AgentProfile,
    pub oauth: Option<OAuthClientConfig>,
    /// Existing backing engine id or full resource path
    pub engine_id: Option<String>,
    pub endpoints: ApiEndpoints,
}

impl RegistrarConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let project_id = settings
            .owned(keys::PROJECT_ID)
            .ok_or(ConfigError::Missing(keys::PROJECT_ID))?;
        validate_segment(keys::PROJECT_ID, &project_id)?;

        let project_number = settings.owned(keys::PROJECT_NUMBER);
        if let Some(number) = &project_number {
            if !number.chars().all(|c| c.is_ascii_digit()) {
                return Err(ConfigError::Invalid {
                    key: keys::PROJECT_NUMBER,
                    reason: format!("'{}' is not numeric", number),
                });
            }
        }

        let region = settings
            .owned(keys::REGION)
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        validate_segment(keys::REGION, &region)?;

        let directory_location = settings
            .owned(keys::DIRECTORY_LOCATION)
            .unwrap_or_else(|| DEFAULT_DIRECTORY_LOCATION.to_string());
        validate_segment(keys::DIRECTORY_LOCATION, &directory_location)?;

        let app_id = settings.owned(keys::APP_ID);
        if let Some(app_id) = &app_id {
            validate_segment(keys::APP_ID, app_id)?;
        }

        let engine_id = settings.owned(keys::ENGINE_ID);
        if let Some(engine_id) = &engine_id {
            validate_engine_id(engine_id)?;
        }

        let description = settings.owned(keys::DESCRIPTION).unwrap_or_default();
        let agent = AgentProfile {
            display_name: settings.owned(keys::DISPLAY_NAME),
            tool_description: settings
                .owned(keys::TOOL_DESCRIPTION)
                .unwrap_or_else(|| description.clone()),
            description,
            icon_uri: settings
                .owned(keys::ICON_URI)
                .unwrap_or_else(|| DEFAULT_ICON_URI.to_string()),
        };

        let oauth = oauth_from_settings(settings)?;

        let mut endpoints = ApiEndpoints::for_location(&directory_location);
        if let Some(endpoint) = settings.get(keys::DISCOVERY_ENGINE_ENDPOINT) {
            endpoints.discovery_engine = endpoint.trim_end_matches('/').to_string();
        }
        if let Some(endpoint) = settings.get(keys::RESOURCE_MANAGER_ENDPOINT) {
            endpoints.resource_manager = endpoint.trim_end_matches('/').to_string();
        }

        Ok(Self {
            project_id,
            project_number,
            region,
            directory_location,
            app_id,
            bucket: settings.owned(keys::BUCKET),
            model: settings.owned(keys::MODEL),
            agent,
            oauth,
            engine_id,
            endpoints,
        })
    }

    pub fn require_app_id(&self) -> Result<&str, ConfigError> {
        self.app_id
            .as_deref()
            .ok_or(ConfigError::Missing(keys::APP_ID))
    }

    pub fn require_display_name(&self) -> Result<&str, ConfigError> {
        self.agent
            .display_name
            .as_deref()
            .ok_or(ConfigError::Missing(keys::DISPLAY_NAME))
    }

    pub fn require_engine_id(&self) -> Result<&str, ConfigError> {
        self.engine_id
            .as_deref()
            .ok_or(ConfigError::Missing(keys::ENGINE_ID))
    }

    /// Copy of this config pointing at a different backing engine
    pub fn with_engine_id(mut self, engine_id: Option<String>) -> Result<Self, ConfigError> {
        if let Some(id) = engine_id {
            validate_engine_id(&id)?;
            self.engine_id = Some(id);
        }
        Ok(self)
    }

    /// Check everything the full deploy flow needs up front
    pub fn validate_for_deploy(&self) -> Result<(), ConfigError> {
        self.require_app_id()?;
        self.require_display_name()?;
        self.require_engine_id()?;
        Ok(())
    }
}

fn oauth_from_settings(settings: &Settings) -> Result<Option<OAuthClientConfig>, ConfigError> {
    let client_id = settings.owned(keys::OAUTH_CLIENT_ID);
    let client_secret = settings.owned(keys::OAUTH_CLIENT_SECRET);

    let (client_id, client_secret) = match (client_id, client_secret) {
        (Some(id), Some(secret)) => (id, secret),
        (None, None) => return Ok(None),
        _ => {
            tracing::warn!(
                "Only one of {} / {} is set; the agent will be registered without an authorization",
                keys::OAUTH_CLIENT_ID,
                keys::OAUTH_CLIENT_SECRET
            );
            return Ok(None);
        }
    };

    let auth_id = settings
        .owned(keys::AUTH_ID)
        .ok_or(ConfigError::Missing(keys::AUTH_ID))?;
    validate_segment(keys::AUTH_ID, &auth_id)?;

    Ok(Some(OAuthClientConfig {
        auth_id,
        client_id,
        client_secret,
        auth_uri_base: settings
            .owned(keys::OAUTH_AUTH_URI_BASE)
            .unwrap_or_else(|| DEFAULT_OAUTH_AUTH_URI.to_string()),
        token_uri: settings
            .owned(keys::OAUTH_TOKEN_URI)
            .unwrap_or_else(|| DEFAULT_OAUTH_TOKEN_URI.to_string()),
    }))
}

/// Resource path segments: ASCII letters, digits, `-`, `_` and `.` only
fn validate_segment(key: &'static str, value: &str) -> Result<(), ConfigError> {
    let valid = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            key,
            reason: format!("'{}' contains characters not allowed in a resource name", value),
        })
    }
}

/// A bare engine id, or a full
/// `projects/{project}/locations/{location}/reasoningEngines/{id}` path
fn validate_engine_id(value: &str) -> Result<(), ConfigError> {
    let plain = |seg: &str| {
        !seg.is_empty() && !seg.starts_with('.') && validate_segment(keys::ENGINE_ID, seg).is_ok()
    };

    let valid = match value.split('/').collect::<Vec<_>>().as_slice() {
        [id] => plain(*id),
        ["projects", project, "locations", location, "reasoningEngines", id] => {
            plain(*project) && plain(*location) && plain(*id)
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            key: keys::ENGINE_ID,
            reason: format!(
                "'{}' is neither an engine id nor projects/*/locations/*/reasoningEngines/*",
                value
            ),
        })
    }
}
