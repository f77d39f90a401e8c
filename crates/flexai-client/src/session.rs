//! Session context — base URL and bearer credential shared by every call.

use url::Url;

use crate::endpoint::Endpoint;
use crate::error::ApiError;

/// Immutable connection settings of one client.
///
/// Construction never fails; a malformed base URL surfaces as
/// [`ApiError::InvalidUrl`] when a request is built.
#[derive(Clone)]
pub struct SessionContext {
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl SessionContext {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Join the base URL with an endpoint's path and query items.
    ///
    /// Path segments are appended after the base path (a trailing slash on
    /// the base is ignored) and percent-encoded individually. A `.` or `..`
    /// segment is rejected rather than dropped, so an id can never point the
    /// request at a different resource.
    pub fn url_for<E: Endpoint + ?Sized>(&self, endpoint: &E) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;

        let path = endpoint.path();
        let relative = path.trim_start_matches('/');
        if let Some(segment) = relative.split('/').find(|s| *s == "." || *s == "..") {
            return Err(ApiError::InvalidUrl(format!(
                "path segment '{segment}' in {path}"
            )));
        }
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ApiError::InvalidUrl(format!("{} cannot be used as a base URL", self.base_url))
            })?;
            segments.pop_if_empty();
            segments.extend(relative.split('/'));
        }

        if let Some(items) = endpoint.query_items() {
            if !items.is_empty() {
                url.query_pairs_mut().extend_pairs(items);
            }
        }

        Ok(url)
    }
}
