// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Discovery Engine Directory Adapter
//
// Anti-Corruption Layer for the Gemini Enterprise (Discovery Engine) agent
// and authorization APIs. Translates domain definitions into the v1alpha
// JSON payloads and the API's resources back into AgentRecords.
//
// Every request carries a bearer token from the injected TokenProvider and
// bills quota to the configured project through X-Goog-User-Project.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::agent::{AgentDefinition, AgentRecord};
use crate::domain::authorization::AuthorizationResource;
use crate::domain::credentials::TokenProvider;
use crate::domain::directory::{AgentDirectory, DirectoryError};
use crate::domain::identity::{AppIdentity, BackingEngine};

pub const API_VERSION: &str = "v1alpha";
const USER_PROJECT_HEADER: &str = "X-Goog-User-Project";
const PAGE_SIZE: u32 = 100;

pub struct DiscoveryEngineClient {
    client: Client,
    endpoint: String,
    tokens: Arc<dyn TokenProvider>,
}

// ============================================================================
// Wire Models
// ============================================================================

#[derive(Serialize)]
pub(crate) struct AgentPayload<'a> {
    #[serde(rename = "displayName")]
    display_name: &'a str,
    description: &'a str,
    icon: IconPayload<'a>,
    adk_agent_definition: AdkAgentDefinitionPayload<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    authorization_config: Option<AuthorizationConfigPayload<'a>>,
}

#[derive(Serialize)]
struct IconPayload<'a> {
    uri: &'a str,
}

#[derive(Serialize)]
struct AdkAgentDefinitionPayload<'a> {
    tool_settings: ToolSettingsPayload<'a>,
    provisioned_reasoning_engine: ProvisionedReasoningEnginePayload<'a>,
}

#[derive(Serialize)]
struct ToolSettingsPayload<'a> {
    tool_description: &'a str,
}

#[derive(Serialize)]
struct ProvisionedReasoningEnginePayload<'a> {
    reasoning_engine: &'a str,
}

#[derive(Serialize)]
struct AuthorizationConfigPayload<'a> {
    tool_authorizations: Vec<&'a str>,
}

impl<'a> From<&'a AgentDefinition> for AgentPayload<'a> {
    fn from(definition: &'a AgentDefinition) -> Self {
        Self {
            display_name: &definition.display_name,
            description: &definition.description,
            icon: IconPayload {
                uri: &definition.icon_uri,
            },
            adk_agent_definition: AdkAgentDefinitionPayload {
                tool_settings: ToolSettingsPayload {
                    tool_description: &definition.tool_description,
                },
                provisioned_reasoning_engine: ProvisionedReasoningEnginePayload {
                    reasoning_engine: definition.backing_engine.resource_name(),
                },
            },
            authorization_config: definition
                .authorization
                .as_deref()
                .map(|path| AuthorizationConfigPayload {
                    tool_authorizations: vec![path],
                }),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthorizationPayload<'a> {
    name: String,
    server_side_oauth2: ServerSideOAuth2Payload<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ServerSideOAuth2Payload<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    authorization_uri: &'a str,
    token_uri: &'a str,
}

#[derive(Deserialize)]
struct AuthorizationResponse {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgentResource {
    name: String,
    #[serde(default, alias = "display_name")]
    display_name: String,
    #[serde(default)]
    description: String,
    #[serde(default, alias = "adk_agent_definition")]
    adk_agent_definition: Option<AdkAgentDefinitionResource>,
    #[serde(default, alias = "authorization_config")]
    authorization_config: Option<AuthorizationConfigResource>,
    #[serde(default, alias = "create_time")]
    create_time: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdkAgentDefinitionResource {
    #[serde(default, alias = "tool_settings")]
    tool_settings: Option<ToolSettingsResource>,
    #[serde(default, alias = "provisioned_reasoning_engine")]
    provisioned_reasoning_engine: Option<ProvisionedReasoningEngineResource>,
    /// Older agents carry their authorizations inside the ADK definition
    #[serde(default)]
    authorizations: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolSettingsResource {
    #[serde(default, alias = "tool_description")]
    tool_description: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProvisionedReasoningEngineResource {
    #[serde(alias = "reasoning_engine")]
    reasoning_engine: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthorizationConfigResource {
    #[serde(default, alias = "tool_authorizations")]
    tool_authorizations: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListAgentsResponse {
    #[serde(default)]
    agents: Vec<AgentResource>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl From<AgentResource> for AgentRecord {
    fn from(resource: AgentResource) -> Self {
        let (tool_description, backing_engine, legacy_authorizations) =
            match resource.adk_agent_definition {
                Some(adk) => (
                    adk.tool_settings.and_then(|t| t.tool_description),
                    adk.provisioned_reasoning_engine
                        .map(|p| BackingEngine::from_resource_name(p.reasoning_engine)),
                    adk.authorizations,
                ),
                None => (None, None, Vec::new()),
            };

        let authorization_ref = resource
            .authorization_config
            .and_then(|c| c.tool_authorizations.into_iter().next())
            .or_else(|| legacy_authorizations.into_iter().next());

        AgentRecord {
            resource_name: resource.name,
            display_name: resource.display_name,
            description: resource.description,
            tool_description,
            backing_engine,
            authorization_ref,
            create_time: resource.create_time,
        }
    }
}

// ============================================================================
// Client Implementation
// ============================================================================

impl DiscoveryEngineClient {
    pub fn new(endpoint: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .build()
            .map_err(|e| DirectoryError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            tokens,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.endpoint, API_VERSION, path)
    }

    async fn request(
        &self,
        method: Method,
        url: &str,
        identity: &AppIdentity,
    ) -> Result<RequestBuilder, DirectoryError> {
        let token = self.tokens.access_token().await?;
        tracing::debug!("{} {}", method, url);

        Ok(self
            .client
            .request(method, url)
            .bearer_auth(token)
            .header(USER_PROJECT_HEADER, &identity.project_id))
    }

    async fn send(request: RequestBuilder) -> Result<Response, DirectoryError> {
        let response = request
            .send()
            .await
            .map_err(|e| DirectoryError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Api { status, body });
        }

        Ok(response)
    }
}

#[async_trait]
impl AgentDirectory for DiscoveryEngineClient {
    async fn create_authorization(
        &self,
        identity: &AppIdentity,
        resource: &AuthorizationResource,
    ) -> Result<String, DirectoryError> {
        let path = identity.authorization_path(&resource.auth_id);
        let payload = AuthorizationPayload {
            name: path.clone(),
            server_side_oauth2: ServerSideOAuth2Payload {
                client_id: &resource.oauth_client_id,
                client_secret: &resource.oauth_client_secret,
                authorization_uri: &resource.auth_uri,
                token_uri: &resource.token_uri,
            },
        };

        let url = self.url(&identity.authorizations_path());
        let request = self
            .request(Method::POST, &url, identity)
            .await?
            .query(&[("authorizationId", resource.auth_id.as_str())])
            .json(&payload);

        let created: AuthorizationResponse = Self::send(request)
            .await?
            .json()
            .await
            .map_err(|e| DirectoryError::Decode(e.to_string()))?;

        Ok(created.name.unwrap_or(path))
    }

    async fn delete_authorization(
        &self,
        identity: &AppIdentity,
        auth_id: &str,
    ) -> Result<(), DirectoryError> {
        let url = self.url(&identity.authorization_path(auth_id));
        Self::send(self.request(Method::DELETE, &url, identity).await?).await?;
        Ok(())
    }

    async fn create_agent(
        &self,
        identity: &AppIdentity,
        definition: &AgentDefinition,
    ) -> Result<AgentRecord, DirectoryError> {
        let url = self.url(&identity.agents_path());
        let request = self
            .request(Method::POST, &url, identity)
            .await?
            .json(&AgentPayload::from(definition));

        let created: AgentResource = Self::send(request)
            .await?
            .json()
            .await
            .map_err(|e| DirectoryError::Decode(e.to_string()))?;

        Ok(created.into())
    }

    async fn list_agents(&self, identity: &AppIdentity) -> Result<Vec<AgentRecord>, DirectoryError> {
        let url = self.url(&identity.agents_path());
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .request(Method::GET, &url, identity)
                .await?
                .query(&[("pageSize", PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: ListAgentsResponse = Self::send(request)
                .await?
                .json()
                .await
                .map_err(|e| DirectoryError::Decode(e.to_string()))?;

            records.extend(page.agents.into_iter().map(AgentRecord::from));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) if page_token.as_deref() == Some(token.as_str()) => {
                    tracing::warn!("Directory repeated page token {}; stopping pagination", token);
                    break;
                }
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(records)
    }

    async fn delete_agent(
        &self,
        identity: &AppIdentity,
        resource_name: &str,
    ) -> Result<(), DirectoryError> {
        let url = self.url(resource_name);
        Self::send(self.request(Method::DELETE, &url, identity).await?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::credentials::StaticTokenProvider;
    use mockito::Matcher;
    use serde_json::json;

    fn identity() -> AppIdentity {
        AppIdentity::new("acme-prod", "123456789", "global", "support-app")
    }

    fn definition(authorization: Option<&str>) -> AgentDefinition {
        AgentDefinition {
            display_name: "Brand Aligner".into(),
            description: "Checks assets against brand guidelines".into(),
            icon_uri: "https://example.com/icon.svg".into(),
            tool_description: "Evaluates an asset".into(),
            backing_engine: BackingEngine::resolve("123456789", "us-central1", "4242"),
            authorization: authorization.map(str::to_string),
        }
    }

    fn client(server: &mockito::Server) -> DiscoveryEngineClient {
        DiscoveryEngineClient::new(server.url(), Arc::new(StaticTokenProvider::new("test-token"))).unwrap()
    }

    fn agents_url() -> String {
        format!("/{}/{}", API_VERSION, identity().agents_path())
    }

    #[test]
    fn test_payload_omits_authorization_when_absent() {
        let def = definition(None);
        let payload = serde_json::to_value(AgentPayload::from(&def)).unwrap();

        assert!(payload.get("authorization_config").is_none());
        assert_eq!(payload["displayName"], "Brand Aligner");
        assert_eq!(
            payload["adk_agent_definition"]["provisioned_reasoning_engine"]["reasoning_engine"],
            "projects/123456789/locations/us-central1/reasoningEngines/4242"
        );
        assert_eq!(payload["adk_agent_definition"]["tool_settings"]["tool_description"], "Evaluates an asset");
    }

    #[test]
    fn test_payload_escapes_interpolated_text() {
        let mut def = definition(None);
        def.display_name = "Brand \"Aligner\"\n{evil}".into();
        let rendered = serde_json::to_string(&AgentPayload::from(&def)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["displayName"], "Brand \"Aligner\"\n{evil}");
    }

    #[tokio::test]
    async fn test_create_agent_sends_authorization_config() {
        let mut server = mockito::Server::new_async().await;
        let auth_path = identity().authorization_path("brand-auth");

        let mock = server
            .mock("POST", agents_url().as_str())
            .match_header("authorization", "Bearer test-token")
            .match_header("x-goog-user-project", "acme-prod")
            .match_body(Matcher::PartialJson(json!({
                "displayName": "Brand Aligner",
                "authorization_config": { "tool_authorizations": [auth_path] }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "name": format!("{}/111", identity().agents_path()),
                    "displayName": "Brand Aligner",
                    "description": "Checks assets against brand guidelines",
                    "createTime": "2026-03-01T10:00:00.123456Z",
                    "adkAgentDefinition": {
                        "toolSettings": { "toolDescription": "Evaluates an asset" },
                        "provisionedReasoningEngine": {
                            "reasoningEngine": "projects/123456789/locations/us-central1/reasoningEngines/4242"
                        }
                    },
                    "authorizationConfig": { "toolAuthorizations": [auth_path] }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let record = client(&server)
            .create_agent(&identity(), &definition(Some(&auth_path)))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(record.agent_id(), "111");
        assert_eq!(record.authorization_ref.as_deref(), Some(auth_path.as_str()));
        assert_eq!(record.tool_description.as_deref(), Some("Evaluates an asset"));
        assert!(record.create_time.is_some());
    }

    #[tokio::test]
    async fn test_api_error_carries_raw_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", agents_url().as_str())
            .with_status(403)
            .with_body(r#"{"error":{"code":403,"status":"PERMISSION_DENIED"}}"#)
            .create_async()
            .await;

        let err = client(&server)
            .create_agent(&identity(), &definition(None))
            .await
            .unwrap_err();

        match err {
            DirectoryError::Api { status, body } => {
                assert_eq!(status, 403);
                assert!(body.contains("PERMISSION_DENIED"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_agents_follows_pages() {
        let mut server = mockito::Server::new_async().await;
        let base = identity().agents_path();

        let first = server
            .mock("GET", agents_url().as_str())
            .match_query(Matcher::Regex("^pageSize=100$".into()))
            .with_status(200)
            .with_body(
                json!({
                    "agents": [
                        { "name": format!("{base}/1"), "displayName": "Brand Aligner" },
                        { "name": format!("{base}/2"), "displayName": "Other" }
                    ],
                    "nextPageToken": "p2"
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let second = server
            .mock("GET", agents_url().as_str())
            .match_query(Matcher::UrlEncoded("pageToken".into(), "p2".into()))
            .with_status(200)
            .with_body(
                json!({
                    "agents": [
                        { "name": format!("{base}/3"), "display_name": "Brand Aligner" }
                    ]
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let records = client(&server).list_agents(&identity()).await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].display_name, "Brand Aligner");
    }

    #[tokio::test]
    async fn test_list_agents_stops_on_repeated_page_token() {
        let mut server = mockito::Server::new_async().await;
        let base = identity().agents_path();

        let _first = server
            .mock("GET", agents_url().as_str())
            .match_query(Matcher::Regex("^pageSize=100$".into()))
            .with_status(200)
            .with_body(
                json!({
                    "agents": [{ "name": format!("{base}/1"), "displayName": "Brand Aligner" }],
                    "nextPageToken": "p2"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let repeated = server
            .mock("GET", agents_url().as_str())
            .match_query(Matcher::UrlEncoded("pageToken".into(), "p2".into()))
            .with_status(200)
            .with_body(
                json!({
                    "agents": [{ "name": format!("{base}/2"), "displayName": "Other" }],
                    "nextPageToken": "p2"
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let records = client(&server).list_agents(&identity()).await.unwrap();

        repeated.assert_async().await;
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_list_agents_empty_app() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", agents_url().as_str())
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let records = client(&server).list_agents(&identity()).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_delete_agent_by_resource_name() {
        let mut server = mockito::Server::new_async().await;
        let name = format!("{}/555", identity().agents_path());
        let mock = server
            .mock("DELETE", format!("/{}/{}", API_VERSION, name).as_str())
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        client(&server).delete_agent(&identity(), &name).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_authorization() {
        let mut server = mockito::Server::new_async().await;
        let path = identity().authorization_path("brand-auth");
        let mock = server
            .mock(
                "POST",
                format!("/{}/{}", API_VERSION, identity().authorizations_path()).as_str(),
            )
            .match_query(Matcher::UrlEncoded("authorizationId".into(), "brand-auth".into()))
            .match_body(Matcher::PartialJson(json!({
                "name": path,
                "serverSideOauth2": {
                    "clientId": "client-123",
                    "clientSecret": "s3cret",
                    "tokenUri": "https://oauth2.googleapis.com/token"
                }
            })))
            .with_status(200)
            .with_body(json!({ "name": path }).to_string())
            .create_async()
            .await;

        let resource = AuthorizationResource {
            auth_id: "brand-auth".into(),
            oauth_client_id: "client-123".into(),
            oauth_client_secret: "s3cret".into(),
            token_uri: "https://oauth2.googleapis.com/token".into(),
            auth_uri: "https://accounts.google.com/o/oauth2/v2/auth?client_id=client-123".into(),
        };

        let created = client(&server)
            .create_authorization(&identity(), &resource)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(created, path);
    }

    #[tokio::test]
    async fn test_authorization_conflict_is_raw_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock(
                "POST",
                format!("/{}/{}", API_VERSION, identity().authorizations_path()).as_str(),
            )
            .match_query(Matcher::Any)
            .with_status(409)
            .with_body(r#"{"error":{"status":"ALREADY_EXISTS"}}"#)
            .create_async()
            .await;

        let resource = AuthorizationResource {
            auth_id: "brand-auth".into(),
            oauth_client_id: "c".into(),
            oauth_client_secret: "s".into(),
            token_uri: "t".into(),
            auth_uri: "a".into(),
        };

        let err = client(&server)
            .create_authorization(&identity(), &resource)
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Api { status: 409, .. }));
    }
}
