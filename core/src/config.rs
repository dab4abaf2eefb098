//! Client configuration and base URL resolution.

use std::fmt;

use serde::Deserialize;
use url::Url;

use crate::error::ApiError;

/// Environment variable read by `ClientOptions::from_env`.
pub const URL_ENV: &str = "FEEDSME_URL";

/// Everything `FeedsmeClient::new` accepts.
///
/// The base URL comes from, in order: `protocol` + `href` (a URL-object),
/// `url`, `uri`. Empty strings count as absent.
#[derive(Clone, Default, Deserialize)]
pub struct ClientOptions {
    pub url: Option<String>,
    pub uri: Option<String>,
    pub protocol: Option<String>,
    pub href: Option<String>,
    /// Transport handle used for every request.
    #[serde(skip)]
    pub agent: Option<ureq::Agent>,
}

impl ClientOptions {
    /// Options with `url` taken from `FEEDSME_URL`, if set.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var(URL_ENV).ok(),
            ..Self::default()
        }
    }

    pub fn agent(mut self, agent: ureq::Agent) -> Self {
        self.agent = Some(agent);
        self
    }

    pub(crate) fn resolve_base(&self) -> Result<Url, ApiError> {
        if let (Some(protocol), Some(href)) = (present(&self.protocol), present(&self.href)) {
            let mut url = parse_base(href)?;
            let scheme = protocol.trim_end_matches(':');
            if url.scheme() != scheme && url.set_scheme(scheme).is_err() {
                return Err(ApiError::InvalidUrl {
                    url: href.to_string(),
                    reason: format!("cannot use protocol {protocol}"),
                });
            }
            return Ok(url);
        }
        match present(&self.url).or_else(|| present(&self.uri)) {
            Some(raw) => parse_base(raw),
            None => Err(ApiError::MissingUrl),
        }
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("url", &self.url)
            .field("uri", &self.uri)
            .field("protocol", &self.protocol)
            .field("href", &self.href)
            .field("agent", &self.agent.is_some())
            .finish()
    }
}

impl From<&str> for ClientOptions {
    fn from(url: &str) -> Self {
        url.to_string().into()
    }
}

impl From<String> for ClientOptions {
    fn from(url: String) -> Self {
        Self {
            url: Some(url),
            ..Self::default()
        }
    }
}

impl From<&String> for ClientOptions {
    fn from(url: &String) -> Self {
        url.clone().into()
    }
}

impl From<Url> for ClientOptions {
    fn from(url: Url) -> Self {
        Self {
            protocol: Some(format!("{}:", url.scheme())),
            href: Some(url.into()),
            ..Self::default()
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn parse_base(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw).map_err(|e| ApiError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidUrl {
            url: raw.to_string(),
            reason: "not a base URL".to_string(),
        });
    }
    Ok(url)
}
