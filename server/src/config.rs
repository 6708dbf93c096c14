use domain::ProxyConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_ADDR: &str = "0.0.0.0:5001";
pub const DEFAULT_YTDLP: &str = "yt-dlp";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid YT2TEXT_ADDR '{value}': {source}")]
    InvalidAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Process configuration, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    /// yt-dlp executable used for comment extraction
    pub ytdlp: PathBuf,
    /// Proxy used when a request does not name one
    pub default_proxy: Option<ProxyConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let addr_value = var("YT2TEXT_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_value
            .trim()
            .parse()
            .map_err(|source| ConfigError::InvalidAddr {
                value: addr_value.clone(),
                source,
            })?;

        Ok(Self {
            addr,
            ytdlp: var("YT2TEXT_YTDLP")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_YTDLP)),
            default_proxy: ProxyConfig::build(var("YT2TEXT_DEFAULT_PROXY").as_deref()),
        })
    }
}
