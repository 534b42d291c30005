//! # fdmkit-core
//!
//! Reconciliation engine for named configuration objects behind the
//! Firepower Device Manager REST API.
//!
//! This crate decides *whether* a remote call is needed. It never performs
//! HTTP itself: every call goes through a [`Transport`], implemented by
//! `fdmkit-client` for real appliances and by in-memory fakes in tests.
//!
//! ## Overview
//!
//! - [`Reconciler`]: idempotent add, update and delete with a
//!   `config_changed` flag
//! - [`iterate_pages`] / [`find_by_name`]: lazy traversal of paginated lists
//! - [`equal_objects`]: comparison that ignores server bookkeeping fields
//! - [`TokenRefreshPolicy`]: one replay after an expired access token
//! - [`ResourceClient`] and [`models`]: typed access to common object types
//!
//! ## Example
//!
//! ```ignore
//! use fdmkit_core::prelude::*;
//! use serde_json::json;
//!
//! async fn ensure_web_host(transport: impl Transport) -> Result<bool> {
//!     let mut reconciler = Reconciler::new(transport);
//!     let desired = json!({"name": "web", "subType": "HOST", "value": "10.0.0.1", "type": "networkobject"});
//!     reconciler
//!         .ensure_present("/object/networks", into_object(desired, "data")?, &Params::new(), &Params::new())
//!         .await?;
//!     Ok(reconciler.config_changed())
//! }
//! ```

pub mod auth;
pub mod compare;
mod error;
pub mod models;
pub mod object;
pub mod operation;
pub mod paging;
pub mod reconciler;
pub mod resource;
pub mod transport;

pub use auth::{RefreshingTransport, TokenRefreshPolicy, TokenRefresher};
pub use compare::{equal_objects, objects_equal};
pub use error::{
    ApiError, DUPLICATE_NAME_MARKER, ErrorCategory, INVALID_UUID_MARKER, ReconcileError, Result,
};
pub use object::{ConfigObject, into_object};
pub use operation::{
    OperationKind, OperationRegistry, OperationSpec, ResourceOperation, run_operation,
};
pub use paging::{DEFAULT_PAGE_LIMIT, ListParams, Page, find_by_name, iterate_pages};
pub use reconciler::{DeleteOutcome, Reconciler};
pub use resource::{ConfigResource, ResourceClient};
pub use transport::{ApiRequest, HttpMethod, Params, Transport, render_path};

/// Prelude module for convenient imports.
///
/// ```ignore
/// use fdmkit_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::auth::{RefreshingTransport, TokenRefresher};
    pub use crate::error::{ErrorCategory, ReconcileError, Result};
    pub use crate::models::{
        InternalCertificate, NetworkObject, RadiusIdentitySource,
        SecurityIntelligenceNetworkPolicy,
    };
    pub use crate::object::{ConfigObject, into_object};
    pub use crate::operation::{OperationRegistry, ResourceOperation};
    pub use crate::paging::ListParams;
    pub use crate::reconciler::{DeleteOutcome, Reconciler};
    pub use crate::resource::{ConfigResource, ResourceClient};
    pub use crate::transport::{ApiRequest, HttpMethod, Params, Transport};
}
