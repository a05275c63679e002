//! Client configuration

use serde::{Deserialize, Deserializer};
use std::time::Duration;
use url::Url;

use crate::auth::ApiKey;
use crate::error::RestClientResult;

/// Public origin of the WaveFlow Studio service
pub const DEFAULT_BASE_URL: &str = "http://3.92.146.100:5000";

const DEFAULT_USER_AGENT: &str = concat!("waveflow-rest-client/", env!("CARGO_PKG_VERSION"));

/// Configuration for a [`RestClient`](crate::RestClient)
///
/// The SDK never reads configuration on its own; applications that keep
/// these settings in a file can deserialize this type directly.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub api_key: ApiKey,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Whole-request timeout. `None` keeps the transport default.
    #[serde(default, rename = "timeout_secs", deserialize_with = "timeout_from_secs")]
    pub timeout: Option<Duration>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<ApiKey>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            timeout: None,
            user_agent: default_user_agent(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Parse the base URL so that endpoint paths resolve beneath it.
    ///
    /// `http://host:5000/studio` and `http://host:5000/studio/` both
    /// resolve `user` to `http://host:5000/studio/user`.
    pub fn parsed_base_url(&self) -> RestClientResult<Url> {
        let mut url = Url::parse(self.base_url.trim())?;
        if url.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        url.set_query(None);
        url.set_fragment(None);
        Ok(url)
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn timeout_from_secs<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
}
