use crate::error::{MomentError, Result};
use crate::session::SessionConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    /// 長辺の最大ピクセル数（これを超える画像は縮小して保存）
    pub max_image_size: u32,
    pub timeout_seconds: u64,
    /// 共有前に真正性チェックを行うか
    pub verify_authenticity: bool,
    /// ローカルプールのファイル（省略時は ~/.local/share/moment-exchange/pool.json）
    pub store_path: Option<PathBuf>,
    pub session: SessionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!("設定を読み込みました: {}", config_path.display());
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| MomentError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("moment-exchange").join("config.json"))
    }

    /// プールファイルのパス（設定値 → データディレクトリの順）
    pub fn pool_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.store_path {
            return Ok(path.clone());
        }
        let data = dirs::data_dir()
            .ok_or_else(|| MomentError::Config("データディレクトリが見つかりません".into()))?;
        Ok(data.join("moment-exchange").join("pool.json"))
    }

    fn default_config() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.0-flash".into(),
            api_base: "https://generativelanguage.googleapis.com/v1beta/models".into(),
            max_image_size: 1080,
            timeout_seconds: 30,
            verify_authenticity: false,
            store_path: None,
            session: SessionConfig::default(),
        }
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.api_key.clone().ok_or(MomentError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }
}
