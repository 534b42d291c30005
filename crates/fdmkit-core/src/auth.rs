//! Expired-token recovery.
//!
//! Access tokens issued by the appliance are short lived. When a call fails
//! because the token expired, [`TokenRefreshPolicy`] asks a
//! [`TokenRefresher`] for a new token and replays the call exactly once.
//! Any other failure, a failed refresh, or a failed replay is returned as is.
//!
//! [`RefreshingTransport`] applies the policy to every request of an inner
//! transport, so CRUD operations never deal with tokens themselves.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::Result;
use crate::transport::{ApiRequest, Transport};

/// Obtains a fresh access token and stores it in the connection's shared
/// credential state.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Refreshes the access token.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::AuthRefresh` (or a transport error) if no new
    /// token could be obtained.
    async fn refresh_access_token(&self) -> Result<()>;
}

#[async_trait]
impl<R: TokenRefresher + ?Sized> TokenRefresher for Arc<R> {
    async fn refresh_access_token(&self) -> Result<()> {
        (**self).refresh_access_token().await
    }
}

/// Replays an operation once after refreshing an expired access token.
#[derive(Debug, Clone)]
pub struct TokenRefreshPolicy<R> {
    refresher: R,
}

impl<R: TokenRefresher> TokenRefreshPolicy<R> {
    #[must_use]
    pub fn new(refresher: R) -> Self {
        Self { refresher }
    }

    /// Runs `f`; on an expired-token failure refreshes the token and runs `f`
    /// one more time.
    pub async fn execute<F, Fut, T>(&self, operation: &str, mut f: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match f().await {
            Err(err) if err.is_token_expired() => {
                info!(operation, "access token expired, refreshing");
                if let Err(refresh_err) = self.refresher.refresh_access_token().await {
                    warn!(operation, error = %refresh_err, "token refresh failed");
                    return Err(refresh_err);
                }
                f().await
            }
            other => other,
        }
    }
}

/// A transport whose every request goes through a [`TokenRefreshPolicy`].
#[derive(Debug, Clone)]
pub struct RefreshingTransport<T, R> {
    inner: T,
    policy: TokenRefreshPolicy<R>,
}

impl<T, R> RefreshingTransport<T, R>
where
    T: Transport,
    R: TokenRefresher,
{
    #[must_use]
    pub fn new(inner: T, refresher: R) -> Self {
        Self {
            inner,
            policy: TokenRefreshPolicy::new(refresher),
        }
    }

    /// The wrapped transport.
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T, R> Transport for RefreshingTransport<T, R>
where
    T: Transport,
    R: TokenRefresher,
{
    async fn send_request(&self, request: &ApiRequest) -> Result<Value> {
        self.policy
            .execute(&request.url_path, || self.inner.send_request(request))
            .await
    }
}
