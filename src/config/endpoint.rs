// ABOUTME: Management endpoint template for per-host engine addresses.
// ABOUTME: Substitutes a host address into e.g. "tcp://{host}:2375".

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Placeholder replaced by the host address.
pub const HOST_PLACEHOLDER: &str = "{host}";

/// Default Docker Engine plain-TCP endpoint.
pub const DEFAULT_ENDPOINT: &str = "tcp://{host}:2375";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseEndpointError {
    #[error("endpoint template cannot be empty")]
    Empty,

    #[error("endpoint template must contain {{host}}")]
    MissingPlaceholder,
}

/// URL template for a host's engine API.
///
/// Rendering does no validation of the host address; a bad address only
/// shows up when the transport tries to connect.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct EndpointTemplate(String);

impl EndpointTemplate {
    pub fn parse(s: &str) -> Result<Self, ParseEndpointError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseEndpointError::Empty);
        }
        if !s.contains(HOST_PLACEHOLDER) {
            return Err(ParseEndpointError::MissingPlaceholder);
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Endpoint URL for `host`, with `tcp://` spelled as `http://`.
    pub fn render(&self, host: &str) -> String {
        let url = self.0.replace(HOST_PLACEHOLDER, host);
        match url.strip_prefix("tcp://") {
            Some(rest) => format!("http://{}", rest),
            None => url,
        }
    }
}

impl Default for EndpointTemplate {
    fn default() -> Self {
        Self(DEFAULT_ENDPOINT.to_string())
    }
}

impl TryFrom<String> for EndpointTemplate {
    type Error = ParseEndpointError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl fmt::Display for EndpointTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
