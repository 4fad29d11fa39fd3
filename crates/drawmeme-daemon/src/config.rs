//! Configuration file management.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Complete daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// RPC server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Data and upload locations.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Mock deployment settings.
    #[serde(default)]
    pub launch: LaunchConfig,
    /// Feed sizes.
    #[serde(default)]
    pub feed: FeedConfig,
    /// Chat-bot links.
    #[serde(default)]
    pub bot: BotConfig,
    /// Advanced settings.
    #[serde(default)]
    pub advanced: AdvancedConfig,
}

/// RPC server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Unix socket path. Empty = $data_dir/drawmeme.sock.
    #[serde(default)]
    pub socket_path: String,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory. Empty = platform default.
    #[serde(default)]
    pub data_dir: String,
    /// Where uploaded images are written. Empty = $data_dir/uploads.
    #[serde(default)]
    pub uploads_dir: String,
    /// Largest accepted image in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

/// Mock deployment configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Simulated deployment latency.
    #[serde(default = "default_deploy_delay_ms")]
    pub deploy_delay_ms: u64,
    /// Prefix of generated deployment links.
    #[serde(default = "default_link_base")]
    pub link_base: String,
}

/// Feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Used when `recent_tokens` gets no usable limit.
    #[serde(default = "default_recent_limit")]
    pub recent_default_limit: usize,
    /// Tokens shown in the bot gallery.
    #[serde(default = "default_gallery_size")]
    pub gallery_size: usize,
}

/// Bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Web app opened by the "Play" buttons.
    #[serde(default = "default_webapp_url")]
    pub webapp_url: String,
    /// Announcement channel.
    #[serde(default = "default_channel_url")]
    pub channel_url: String,
    /// Link behind the "Buy $DRAWYOURMEME" button.
    #[serde(default = "default_token_link")]
    pub token_link: String,
}

/// Advanced configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedConfig {
    /// Log level: "debug" | "info" | "warn" | "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default value functions

fn default_max_upload_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_deploy_delay_ms() -> u64 {
    1000
}

fn default_link_base() -> String {
    "https://pump.fun/token".to_string()
}

fn default_recent_limit() -> usize {
    3
}

fn default_gallery_size() -> usize {
    5
}

fn default_webapp_url() -> String {
    "https://localhost:5000".to_string()
}

fn default_channel_url() -> String {
    "https://t.me/drawyourmeme".to_string()
}

fn default_token_link() -> String {
    "https://pump.fun/coin/7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: String::new(),
            uploads_dir: String::new(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            deploy_delay_ms: default_deploy_delay_ms(),
            link_base: default_link_base(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            recent_default_limit: default_recent_limit(),
            gallery_size: default_gallery_size(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            webapp_url: default_webapp_url(),
            channel_url: default_channel_url(),
            token_link: default_token_link(),
        }
    }
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl FeedConfig {
    /// Limit used when a `recent_tokens` call gives none. A configured
    /// zero falls back to the registry default so the feed never empties.
    pub fn recent_limit(&self) -> usize {
        if self.recent_default_limit == 0 {
            drawmeme_types::DEFAULT_RECENT_LIMIT
        } else {
            self.recent_default_limit
        }
    }
}

impl DaemonConfig {
    /// Load configuration from the default config file location.
    ///
    /// Falls back to defaults if file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: DaemonConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> PathBuf {
        if self.storage.data_dir.is_empty() {
            Self::default_data_dir()
        } else {
            PathBuf::from(&self.storage.data_dir)
        }
    }

    /// Get the uploads directory path.
    pub fn uploads_dir(&self) -> PathBuf {
        if self.storage.uploads_dir.is_empty() {
            self.data_dir().join("uploads")
        } else {
            PathBuf::from(&self.storage.uploads_dir)
        }
    }

    /// Get the RPC socket path.
    pub fn socket_path(&self) -> PathBuf {
        if self.server.socket_path.is_empty() {
            self.data_dir().join("drawmeme.sock")
        } else {
            PathBuf::from(&self.server.socket_path)
        }
    }

    /// Get the config file path.
    fn config_path() -> PathBuf {
        Self::default_data_dir().join("config.toml")
    }

    /// Default data directory, overridable with `DRAWMEME_DATA_DIR`.
    fn default_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("DRAWMEME_DATA_DIR") {
            return PathBuf::from(dir);
        }
        std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".drawmeme"))
            .unwrap_or_else(|_| PathBuf::from("/tmp/drawmeme"))
    }
}
