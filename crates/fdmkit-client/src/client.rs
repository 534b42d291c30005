//! reqwest-based transport for FDM appliances.

use std::sync::Arc;

use async_trait::async_trait;
use fdmkit_core::{
    ApiRequest, HttpMethod, ReconcileError, RefreshingTransport, Result, TokenRefresher, Transport,
};
use reqwest::{Client, Method, Response};
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::session::{Session, TOKEN_PATH, TokenGrant};

/// HTTP client for one appliance.
///
/// Clones share the HTTP connection pool and the session, so a token
/// refreshed through one clone is used by all of them.
#[derive(Debug, Clone)]
pub struct FdmClient {
    config: Arc<ClientConfig>,
    http: Client,
    session: Arc<RwLock<Option<Session>>>,
}

impl FdmClient {
    /// Builds a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Transport` if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ReconcileError::transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_http_client(config, http))
    }

    /// Builds a client around an existing `reqwest::Client`.
    #[must_use]
    pub fn with_http_client(config: ClientConfig, http: Client) -> Self {
        Self {
            config: Arc::new(config),
            http,
            session: Arc::new(RwLock::new(None)),
        }
    }

    /// Starts from previously obtained tokens instead of logging in.
    #[must_use]
    pub fn with_session(self, session: Session) -> Self {
        Self {
            session: Arc::new(RwLock::new(Some(session))),
            ..self
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The current tokens, if logged in.
    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// This client wrapped so expired tokens are refreshed and the request
    /// replayed once.
    #[must_use]
    pub fn refreshing(&self) -> RefreshingTransport<FdmClient, FdmClient> {
        RefreshingTransport::new(self.clone(), self.clone())
    }

    /// Obtains tokens with username and password.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Api` if the appliance rejects the
    /// credentials, or `ReconcileError::Transport` on network failure.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let session = self
            .request_token(&TokenGrant::Password { username, password })
            .await?;
        info!(server = %self.config.server, "logged in");
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    /// Exchanges the refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::AuthRefresh` if there is no refresh token or
    /// the appliance does not issue a new access token.
    pub async fn refresh(&self) -> Result<Session> {
        let refresh_token = self
            .session
            .read()
            .await
            .as_ref()
            .and_then(|s| s.refresh_token.clone())
            .ok_or_else(|| ReconcileError::auth_refresh("no refresh token available"))?;

        let mut session = self
            .request_token(&TokenGrant::RefreshToken {
                refresh_token: &refresh_token,
            })
            .await
            .map_err(|e| ReconcileError::auth_refresh(e.to_string()))?;
        if session.refresh_token.is_none() {
            session.refresh_token = Some(refresh_token);
        }
        debug!(server = %self.config.server, "access token refreshed");
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    async fn request_token(&self, grant: &TokenGrant<'_>) -> Result<Session> {
        let url = self.config.api_url(TOKEN_PATH);
        let response = self
            .http
            .post(&url)
            .json(grant)
            .send()
            .await
            .map_err(|e| transport_error(&url, &e))?;
        let body = handle_response(response).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn bearer_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
    }
}

#[async_trait]
impl Transport for FdmClient {
    async fn send_request(&self, request: &ApiRequest) -> Result<Value> {
        let url = self.config.api_url(&request.rendered_path()?);
        debug!(method = %request.method, %url, "sending request");

        let mut builder = self
            .http
            .request(to_reqwest_method(request.method), &url)
            .header("Accept", "application/json");
        if !request.query_params.is_empty() {
            builder = builder.query(&request.query_params);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = self.bearer_token().await {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(&url, &e))?;
        debug!(method = %request.method, %url, status = response.status().as_u16(), "received response");
        handle_response(response).await
    }
}

#[async_trait]
impl TokenRefresher for FdmClient {
    async fn refresh_access_token(&self) -> Result<()> {
        self.refresh().await.map(|_| ())
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn transport_error(url: &str, err: &reqwest::Error) -> ReconcileError {
    let kind = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    ReconcileError::transport(format!("{kind}: {url}: {err}"))
}

/// Maps a response to the decoded body or `ReconcileError::Api`.
///
/// Error bodies that are not JSON are kept as a JSON string. An empty
/// success body decodes to `{}`.
async fn handle_response(response: Response) -> Result<Value> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ReconcileError::transport(format!("failed to read response body: {e}")))?;

    if !status.is_success() {
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        return Err(ReconcileError::api(status.as_u16(), body));
    }

    if text.trim().is_empty() {
        return Ok(json!({}));
    }

    serde_json::from_str(&text).map_err(|e| {
        ReconcileError::transport(format!("malformed JSON in HTTP {status} response: {e}"))
    })
}
