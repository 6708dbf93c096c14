use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid proxy url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("proxy url '{0}' has no host")]
    MissingHost(String),
}

/// Outbound proxy applied to both HTTP and HTTPS egress.
///
/// A single URL backs both protocols so the configuration can never be
/// half-applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    url: String,
}

impl ProxyConfig {
    /// Build a proxy configuration from an optional user-supplied string.
    ///
    /// Absent or blank input means no proxy. A string that cannot be turned
    /// into a proxy URL is logged and also treated as no proxy.
    pub fn build(raw: Option<&str>) -> Option<Self> {
        let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;

        match Self::parse(raw) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Ignoring proxy configuration: {}", e);
                None
            }
        }
    }

    fn parse(raw: &str) -> Result<Self, ProxyError> {
        let url = if raw.starts_with("http://") || raw.starts_with("https://") {
            raw.to_string()
        } else {
            format!("http://{}", raw)
        };

        let parsed = url::Url::parse(&url).map_err(|source| ProxyError::InvalidUrl {
            url: url.clone(),
            source,
        })?;
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(ProxyError::MissingHost(url));
        }

        Ok(Self { url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn http(&self) -> &str {
        &self.url
    }

    pub fn https(&self) -> &str {
        &self.url
    }
}
