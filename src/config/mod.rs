use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const APP_NAME: &str = "marquee";

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root URL of the theatre lookup service
    pub base_url: String,

    /// Give up on a lookup after this many seconds; unset means wait forever
    pub request_timeout_secs: Option<u64>,

    /// How often the interactive UI polls for input and finished requests
    pub tick_rate_ms: u64,

    /// Log file used while the interactive UI owns the terminal
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5555".to_string(),
            request_timeout_secs: None,
            tick_rate_ms: 100,
            log_file: None,
        }
    }
}

impl Config {
    /// Initialize configuration from the config file and the environment
    pub async fn init() -> Result<Self> {
        debug!("Initializing configuration");

        let mut config = match Self::load_from_file().await? {
            Some(config) => config,
            None => Self::default(),
        };

        config.load_from_env();
        Ok(config)
    }

    /// Candidate configuration files, highest priority first:
    /// 1. ./.marquee.json
    /// 2. ./marquee.json
    /// 3. $CONFIG_DIR/marquee/marquee.json
    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(format!("./.{}.json", APP_NAME)),
            PathBuf::from(format!("./{}.json", APP_NAME)),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(APP_NAME).join(format!("{}.json", APP_NAME)));
        }

        paths
    }

    /// Load the first configuration file that exists
    pub async fn load_from_file() -> Result<Option<Self>> {
        for path in Self::config_paths() {
            if path.exists() {
                return Self::load_from_path(&path).await.map(Some);
            }
        }
        Ok(None)
    }

    /// Load configuration from a JSON file; missing keys keep their defaults
    pub async fn load_from_path(path: &Path) -> Result<Self> {
        debug!("Loading configuration from: {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Load configuration from environment variables
    pub fn load_from_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(base_url) = var("MARQUEE_BASE_URL") {
            self.base_url = base_url;
        }

        if let Some(timeout) = var("MARQUEE_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => self.request_timeout_secs = Some(secs),
                Err(_) => debug!("Ignoring MARQUEE_TIMEOUT_SECS={:?}", timeout),
            }
        }

        if let Some(tick_rate) = var("MARQUEE_TICK_RATE_MS") {
            match tick_rate.parse() {
                Ok(ms) => self.tick_rate_ms = ms,
                Err(_) => debug!("Ignoring MARQUEE_TICK_RATE_MS={:?}", tick_rate),
            }
        }

        if let Some(log_file) = var("MARQUEE_LOG_FILE") {
            self.log_file = Some(PathBuf::from(log_file));
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    /// Where the interactive UI writes its log
    pub fn log_path(&self) -> PathBuf {
        if let Some(path) = &self.log_file {
            return path.clone();
        }

        dirs::cache_dir()
            .map(|dir| dir.join(APP_NAME))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(format!("{}.log", APP_NAME))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "base_url must start with http:// or https:// (got {:?})",
                self.base_url
            ));
        }

        if self.tick_rate_ms == 0 {
            return Err(anyhow::anyhow!("tick_rate_ms must be greater than 0"));
        }

        if self.request_timeout_secs == Some(0) {
            return Err(anyhow::anyhow!("request_timeout_secs must be greater than 0"));
        }

        Ok(())
    }
}
