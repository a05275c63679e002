//! Authentication for the REST API client

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use std::fmt;

use crate::error::{RestClientError, RestClientResult};

/// API key issued by WaveFlow Studio
///
/// The `Debug` output never contains the key itself.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

impl From<&str> for ApiKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ApiKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Authentication configuration for the client
///
/// Every endpoint authenticates with `Authorization: Bearer <api key>`.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    api_key: ApiKey,
}

impl AuthConfig {
    /// Create an auth config from an API key
    pub fn with_api_key(api_key: impl Into<ApiKey>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Get headers for this authentication configuration
    pub fn headers(&self) -> RestClientResult<HeaderMap> {
        if self.api_key.is_empty() {
            return Err(RestClientError::InvalidApiKey(
                "API key cannot be empty".to_string(),
            ));
        }

        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.api_key.as_str()))
            .map_err(|_| {
                RestClientError::InvalidApiKey(
                    "API key contains characters that cannot be sent in a header".to_string(),
                )
            })?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}
