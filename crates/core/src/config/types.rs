use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub media_server: MediaServerConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub catchup: CatchupConfig,
    #[serde(default)]
    pub intro_skip: IntroSkipConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8280
}

/// Host media server connection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaServerConfig {
    /// Base URL of the media server (e.g., "http://localhost:8096")
    pub url: String,
    /// API key used for all host API calls
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// Media-info extraction options
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExtractConfig {
    /// Maximum number of items probed or captured concurrently.
    /// Resizable at runtime through the settings endpoint.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Use the image-capture refresh path for items without a primary image.
    #[serde(default)]
    pub enable_capture: bool,

    /// Mark each extraction as exclusive towards the host's own extractors.
    #[serde(default)]
    pub exclusive: bool,

    /// Restrict scheduled batch fetches to lightweight (shortcut) references.
    #[serde(default = "default_true")]
    pub lightweight_only: bool,

    /// Library ids eligible for extraction. Empty means all libraries.
    #[serde(default)]
    pub library_scope: Vec<String>,
}

fn default_max_concurrent() -> usize {
    1
}

fn default_true() -> bool {
    true
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            enable_capture: false,
            exclusive: false,
            lightweight_only: default_true(),
            library_scope: Vec::new(),
        }
    }
}

/// Catch-up mode options
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatchupConfig {
    /// React to item-added and favorite events by enqueuing extraction work.
    #[serde(default)]
    pub enabled: bool,
}

/// Intro/credits analysis options
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IntroSkipConfig {
    /// Feed eligible episodes into the analysis queue.
    #[serde(default)]
    pub enabled: bool,

    /// Library path prefixes eligible for analysis. Empty means all.
    #[serde(default)]
    pub library_scope: Vec<String>,

    /// User ids the session monitor acts for. Empty means all.
    #[serde(default)]
    pub user_scope: Vec<String>,

    /// Upper bound for a detected intro, in seconds.
    #[serde(default = "default_max_intro_secs")]
    pub max_intro_secs: u32,

    /// Upper bound for detected credits, in seconds.
    #[serde(default = "default_max_credits_secs")]
    pub max_credits_secs: u32,
}

fn default_max_intro_secs() -> u32 {
    150
}

fn default_max_credits_secs() -> u32 {
    360
}

impl Default for IntroSkipConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            library_scope: Vec::new(),
            user_scope: Vec::new(),
            max_intro_secs: default_max_intro_secs(),
            max_credits_secs: default_max_credits_secs(),
        }
    }
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub media_server: SanitizedMediaServerConfig,
    pub extract: ExtractConfig,
    pub catchup: CatchupConfig,
    pub intro_skip: IntroSkipConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedMediaServerConfig {
    pub url: String,
    pub api_key: String,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            media_server: SanitizedMediaServerConfig {
                url: config.media_server.url.clone(),
                api_key: "***".to_string(),
                timeout_secs: config.media_server.timeout_secs,
            },
            extract: config.extract.clone(),
            catchup: config.catchup.clone(),
            intro_skip: config.intro_skip.clone(),
        }
    }
}
