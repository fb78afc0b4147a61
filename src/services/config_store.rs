// Configuration Storage Service
// Handles config file read/write, version backup and environment overrides

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::providers::{DEFAULT_COMPLETION_URL, DEFAULT_MODEL};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,
    /// Stored key; environment variables take precedence.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            server: ServerConfig::default(),
            provider: ProviderConfig::default(),
            proxy: None,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
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

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Ask for `response_format: json_object`.
    #[serde(default = "default_true")]
    pub json_mode: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            json_mode: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProxyConfig {
    pub enabled: bool,
    pub http: Option<String>,
    pub https: Option<String>,
}

fn default_version() -> String { "1.0.0".to_string() }
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3000 }
fn default_base_url() -> String { DEFAULT_COMPLETION_URL.to_string() }
fn default_model() -> String { DEFAULT_MODEL.to_string() }
fn default_max_tokens() -> u32 { 2048 }
fn default_temperature() -> f64 { 0.7 }
fn default_timeout_secs() -> u64 { 80 }
fn default_true() -> bool { true }

impl AppConfig {
    /// Overlay `WRITING_TOOLS_*` environment variables onto the loaded file.
    pub fn apply_env_overrides(&mut self) {
        if let Some(host) = env_value("WRITING_TOOLS_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_value("WRITING_TOOLS_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(url) = env_value("WRITING_TOOLS_API_URL") {
            self.provider.base_url = url;
        }
        if let Some(model) = env_value("WRITING_TOOLS_MODEL") {
            self.provider.model = model;
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("writing-tools"))
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Ensure config directory exists
    pub fn ensure_dir(&self) -> Result<(), String> {
        fs::create_dir_all(&self.config_dir)
            .map_err(|e| format!("Failed to create config dir: {}", e))
    }

    /// Load configuration from file, defaults when the file is absent
    pub fn load(&self) -> Result<AppConfig, String> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig) -> Result<(), String> {
        self.ensure_dir()?;

        if self.config_file.exists() {
            self.create_backup()?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(&self.config_file, content)
            .map_err(|e| format!("Failed to write config: {}", e))
    }

    fn backup_dir(&self) -> PathBuf {
        self.config_dir.join("backups")
    }

    fn create_backup(&self) -> Result<(), String> {
        let backup_dir = self.backup_dir();
        fs::create_dir_all(&backup_dir)
            .map_err(|e| format!("Failed to create backup dir: {}", e))?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S_%3f");
        let backup_file = backup_dir.join(format!("config_{}.json", timestamp));

        fs::copy(&self.config_file, &backup_file)
            .map_err(|e| format!("Failed to create backup: {}", e))?;

        self.cleanup_old_backups(&backup_dir, 10)
    }

    /// Remove old backups, keeping only the most recent N
    fn cleanup_old_backups(&self, backup_dir: &Path, keep: usize) -> Result<(), String> {
        let mut entries: Vec<_> = fs::read_dir(backup_dir)
            .map_err(|e| format!("Failed to read backup dir: {}", e))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "json"))
            .collect();

        if entries.len() <= keep {
            return Ok(());
        }

        // Timestamped names sort oldest first
        entries.sort_by_key(|e| e.file_name());

        let remove_count = entries.len() - keep;
        for entry in entries.iter().take(remove_count) {
            let _ = fs::remove_file(entry.path());
        }

        Ok(())
    }

    pub fn set_api_key(&self, key: &str) -> Result<(), String> {
        let mut config = self.load()?;
        config.api_key = Some(key.to_string());
        self.save(&config)
    }

    pub fn delete_api_key(&self) -> Result<(), String> {
        let mut config = self.load()?;
        config.api_key = None;
        self.save(&config)
    }
}
