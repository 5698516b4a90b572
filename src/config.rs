use crate::error::{Result, SlideVisualError};
use serde::{Deserialize, Serialize};
use slide_visual_common::{GenerationSettings, PartialColorPalette};
use std::path::{Path, PathBuf};

/// APIキーの環境変数名（設定ファイルより優先）
pub const API_KEY_ENV: &str = "KIE_AI_API_KEY";

pub const DEFAULT_API_BASE: &str = "https://api.kie.ai/v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    /// "WxH"
    pub size: String,
    pub quality: String,
    /// 画像生成の同時実行数
    pub max_concurrency: usize,
    pub timeout_seconds: u64,
    pub colors: PartialColorPalette,
    pub max_infographics: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        let settings = GenerationSettings::default();
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.into(),
            model: settings.model,
            size: settings.size,
            quality: settings.quality,
            max_concurrency: 3,
            timeout_seconds: 120,
            colors: PartialColorPalette::default(),
            max_infographics: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// 指定パスから読み込む（無ければ既定値）
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| SlideVisualError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("slide-visual").join("config.json"))
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(SlideVisualError::MissingApiKey)
    }

    pub fn has_api_key(&self) -> bool {
        self.get_api_key().is_ok()
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    /// 生成設定（モデル・サイズ・品質）
    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            model: self.model.clone(),
            size: self.size.clone(),
            quality: self.quality.clone(),
        }
    }
}
