pub mod error;

pub use error::*;

use cosmic_api::{ClientConfig, PollConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const CONFIG_PATH_ENV: &str = "COSMIC_CONFIG_PATH";
pub const API_URL_ENV: &str = "COSMIC_API_URL";
pub const API_KEY_ENV: &str = "COSMIC_API_KEY";
pub const SECRET_KEY_ENV: &str = "COSMIC_SECRET_KEY";
pub const TIMEOUT_ENV: &str = "COSMIC_TIMEOUT";

/// `cosmic.yaml` から読み込むクライアント設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CosmicConfig {
    pub api_url: String,
    pub api_key: String,
    pub secret_key: String,

    /// 非同期ジョブの待機上限（秒）
    pub timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub http_timeout_secs: u64,
    pub verify_ssl: bool,
    pub async_mode: bool,
}

impl Default for CosmicConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            secret_key: String::new(),
            timeout_secs: 300,
            poll_interval_secs: 2,
            http_timeout_secs: 60,
            verify_ssl: true,
            async_mode: true,
        }
    }
}

impl CosmicConfig {
    /// 設定ファイルを探して読み込み、環境変数で上書きして検証する
    ///
    /// ファイルが無くても、環境変数で URL とキーが揃っていればエラーにしない。
    pub fn load() -> Result<Self> {
        let mut config = match find_config_file() {
            Ok(path) => Self::from_file(&path)?,
            Err(ConfigError::ConfigFileNotFound) => {
                debug!("設定ファイルなし、環境変数のみを使用");
                Self::default()
            }
            Err(e) => return Err(e),
        };

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        debug!("設定ファイルを読み込みました: {}", path.display());
        Ok(config)
    }

    fn from_yaml(content: &str) -> std::result::Result<Self, String> {
        // 空ファイルはデフォルト設定として扱う
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    /// `COSMIC_*` 環境変数でファイルの値を上書き
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            self.api_url = url;
        }
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            self.api_key = key;
        }
        if let Ok(secret) = std::env::var(SECRET_KEY_ENV) {
            self.secret_key = secret;
        }
        if let Ok(timeout) = std::env::var(TIMEOUT_ENV) {
            self.timeout_secs = timeout
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    name: TIMEOUT_ENV,
                    value: timeout.clone(),
                })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::MissingField("api_url", API_URL_ENV));
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingField("api_key", API_KEY_ENV));
        }
        if self.secret_key.trim().is_empty() {
            return Err(ConfigError::MissingField("secret_key", SECRET_KEY_ENV));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "poll_interval_secs",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig::new(
            Duration::from_secs(self.poll_interval_secs),
            Duration::from_secs(self.timeout_secs),
        )
    }

    pub fn to_client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(&self.api_url, &self.api_key, &self.secret_key);
        config.poll = self.poll_config();
        config.http_timeout = Duration::from_secs(self.http_timeout_secs);
        config.verify_ssl = self.verify_ssl;
        config.async_mode = self.async_mode;
        config
    }
}

/// Cosmic の設定ディレクトリ (`~/.config/cosmic`) を取得
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("cosmic"))
}

/// 設定ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 COSMIC_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: cosmic.yaml, .cosmic.yaml
/// 3. ~/.config/cosmic/config.yaml (グローバル設定)
pub fn find_config_file() -> Result<PathBuf> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        debug!("{} のファイルが存在しません: {}", CONFIG_PATH_ENV, path.display());
    }

    // 2. カレントディレクトリで検索
    let current_dir = std::env::current_dir()?;
    for filename in ["cosmic.yaml", ".cosmic.yaml"] {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    // 3. グローバル設定
    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join("config.yaml");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}
