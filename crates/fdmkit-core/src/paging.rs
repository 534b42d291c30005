//! Paginated listing.
//!
//! List endpoints take `offset`/`limit` and return one page of `items` plus
//! a total `count`. [`iterate_pages`] turns such an endpoint into a single
//! lazy stream of objects, and [`find_by_name`] is built on top of it.
//!
//! Only the current page is held in memory. Pages are fetched on demand, so
//! a consumer that stops early never triggers the remaining fetches.

use std::future::Future;

use futures_util::future::{BoxFuture, FutureExt};
use futures_util::stream::{self, Stream, TryStreamExt};
use serde_json::Value;
use tracing::debug;

use crate::error::{ReconcileError, Result};
use crate::object::{ConfigObject, object_name};
use crate::transport::{ApiRequest, Params, Transport};

/// Page size used when the caller does not ask for one. Matches the API default.
pub const DEFAULT_PAGE_LIMIT: u64 = 10;

/// Parameters of a list call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    /// Filter expression, e.g. `name:web-servers`.
    pub filter: Option<String>,
    pub sort: Option<String>,
    /// Any other query parameters passed through unchanged.
    pub extra: Params,
}

impl ListParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters filtering on an exact `name`.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self::new().with_filter(name_filter(name))
    }

    #[must_use]
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Reads `offset`, `limit`, `filter` and `sort` from a parameter object.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Validation` if `offset`/`limit` are not
    /// non-negative integers or `filter`/`sort` are not strings.
    pub fn from_object(params: &ConfigObject) -> Result<Self> {
        let uint = |key: &str| -> Result<Option<u64>> {
            match params.get(key) {
                None | Some(Value::Null) => Ok(None),
                Some(v) => v.as_u64().map(Some).ok_or_else(|| {
                    ReconcileError::validation(format!("{key} must be a non-negative integer"))
                }),
            }
        };
        let string = |key: &str| -> Result<Option<String>> {
            match params.get(key) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::String(s)) => Ok(Some(s.clone())),
                Some(_) => Err(ReconcileError::validation(format!("{key} must be a string"))),
            }
        };

        Ok(Self {
            offset: uint("offset")?,
            limit: uint("limit")?,
            filter: string("filter")?,
            sort: string("sort")?,
            extra: Params::new(),
        })
    }

    /// Query parameters for the list call.
    #[must_use]
    pub fn to_query(&self) -> Params {
        let mut query = self.extra.clone();
        if let Some(offset) = self.offset {
            query.insert("offset".to_string(), offset.to_string());
        }
        if let Some(limit) = self.limit {
            query.insert("limit".to_string(), limit.to_string());
        }
        if let Some(filter) = &self.filter {
            query.insert("filter".to_string(), filter.clone());
        }
        if let Some(sort) = &self.sort {
            query.insert("sort".to_string(), sort.clone());
        }
        query
    }

    fn page(&self, offset: u64, limit: u64) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
            ..self.clone()
        }
    }
}

/// Filter expression selecting objects by name.
#[must_use]
pub fn name_filter(name: &str) -> String {
    format!("name:{name}")
}

/// One page of a list response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<ConfigObject>,
    /// Total number of objects across all pages, as reported by the server.
    pub count: u64,
}

impl Page {
    /// Decodes a list response.
    ///
    /// Accepts both `{items, count}` and the appliance's native
    /// `{items, paging: {count, ..}}`. Without a count, the number of items
    /// on the page is used.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Transport` if `items` is missing or holds
    /// something other than objects.
    pub fn from_response(response: Value) -> Result<Self> {
        let Value::Object(mut body) = response else {
            return Err(ReconcileError::transport(
                "malformed list response: expected a JSON object",
            ));
        };

        let count = body
            .get("count")
            .and_then(Value::as_u64)
            .or_else(|| {
                body.get("paging")
                    .and_then(|p| p.get("count"))
                    .and_then(Value::as_u64)
            });

        let items = match body.remove("items") {
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(obj) => Ok(obj),
                    _ => Err(ReconcileError::transport(
                        "malformed list response: items must be objects",
                    )),
                })
                .collect::<Result<Vec<_>>>()?,
            _ => {
                return Err(ReconcileError::transport(
                    "malformed list response: missing items array",
                ));
            }
        };

        let count = count.unwrap_or(items.len() as u64);
        Ok(Self { items, count })
    }
}

struct Cursor<F> {
    fetch: F,
    params: ListParams,
    offset: u64,
    limit: u64,
    total: Option<u64>,
    page: std::vec::IntoIter<ConfigObject>,
    last_page: bool,
}

impl<F, Fut> Cursor<F>
where
    F: FnMut(ListParams) -> Fut,
    Fut: Future<Output = Result<Page>>,
{
    async fn advance(mut self) -> Result<Option<(ConfigObject, Self)>> {
        loop {
            if let Some(item) = self.page.next() {
                return Ok(Some((item, self)));
            }
            if self.last_page || self.total.is_some_and(|total| self.offset >= total) {
                return Ok(None);
            }

            debug!(offset = self.offset, limit = self.limit, "fetching page");
            let page = (self.fetch)(self.params.page(self.offset, self.limit)).await?;

            self.total = Some(page.count);
            self.last_page = (page.items.len() as u64) < self.limit;
            match self.offset.checked_add(self.limit) {
                Some(next) => self.offset = next,
                // No page can start past u64::MAX.
                None => self.last_page = true,
            }
            self.page = page.items.into_iter();
        }
    }
}

/// Iterates over every object of a paginated list endpoint.
///
/// `fetch` is called with the caller's parameters plus the current
/// `offset`/`limit`. Iteration starts at the caller's offset (default 0)
/// and the caller's limit is used as page size (default
/// [`DEFAULT_PAGE_LIMIT`]). It stops once the offset reaches the reported
/// `count`, or after a page shorter than the page size.
///
/// Errors from `fetch` end the stream immediately.
pub fn iterate_pages<F, Fut>(
    fetch: F,
    params: ListParams,
) -> impl Stream<Item = Result<ConfigObject>>
where
    F: FnMut(ListParams) -> Fut,
    Fut: Future<Output = Result<Page>>,
{
    let cursor = Cursor {
        fetch,
        offset: params.offset.unwrap_or(0),
        limit: params
            .limit
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_PAGE_LIMIT),
        params,
        total: None,
        page: Vec::new().into_iter(),
        last_page: false,
    };

    stream::try_unfold(cursor, Cursor::advance)
}

/// Finds the first object whose `name` is exactly `name`.
///
/// The server-side `name:` filter narrows the listing but is not trusted to
/// be exact, so every candidate is checked client side as well.
///
/// # Errors
///
/// Returns `ReconcileError::NotFound` if no object matches, or the first
/// error raised by `fetch`.
pub async fn find_by_name<F, Fut>(fetch: F, params: ListParams, name: &str) -> Result<ConfigObject>
where
    F: FnMut(ListParams) -> Fut,
    Fut: Future<Output = Result<Page>>,
{
    let items = iterate_pages(fetch, params.with_filter(name_filter(name)));
    futures_util::pin_mut!(items);

    while let Some(item) = items.try_next().await? {
        if object_name(&item) == Some(name) {
            return Ok(item);
        }
    }

    Err(ReconcileError::not_found(format!("object named \"{name}\"")))
}

/// A page-fetch function for the list endpoint at `url`.
pub fn page_fetcher<'a, T>(
    transport: &'a T,
    url: &'a str,
    path_params: &'a Params,
) -> impl FnMut(ListParams) -> BoxFuture<'a, Result<Page>> + 'a
where
    T: Transport + ?Sized,
{
    move |params: ListParams| {
        let request = ApiRequest::get(url)
            .with_path_params(path_params.clone())
            .with_query_params(params.to_query());
        async move {
            let response = transport.send_request(&request).await?;
            Page::from_response(response)
        }
        .boxed()
    }
}
