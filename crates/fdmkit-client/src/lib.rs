//! # fdmkit-client
//!
//! HTTP [`Transport`](fdmkit_core::Transport) for Firepower Device Manager
//! appliances, built on reqwest.
//!
//! [`FdmClient`] renders operation paths against the configured server and
//! API prefix, authenticates with a bearer token, and maps non-2xx
//! responses to [`ReconcileError::Api`](fdmkit_core::ReconcileError::Api).
//! It also implements [`TokenRefresher`](fdmkit_core::TokenRefresher), so
//! [`FdmClient::refreshing`] yields a transport that survives token expiry.
//!
//! ## Example
//!
//! ```ignore
//! use fdmkit_client::{ClientConfig, FdmClient};
//! use fdmkit_core::{ResourceClient, models::NetworkObject};
//!
//! let client = FdmClient::new(ClientConfig::new("https://fdm.example.com")?.with_verify_tls(false))?;
//! client.login("admin", "secret").await?;
//!
//! let mut networks = ResourceClient::<NetworkObject, _>::new(client.refreshing());
//! networks.add(&NetworkObject::host("web", "10.0.0.1")).await?;
//! ```

mod client;
mod config;
mod session;

pub use client::FdmClient;
pub use config::{ClientConfig, DEFAULT_BASE_PATH, DEFAULT_TIMEOUT};
pub use session::{Session, TOKEN_PATH};
