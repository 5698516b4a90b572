//! 生成結果キャッシュモジュール
//!
//! リクエスト内容（モデル・サイズ・品質・プロンプト）のハッシュをキーに
//! 保存済み画像を記録し、同じ内容の再生成をスキップする。
//! 画像の控えは `.generation-images/<key>.<ext>` に置き、投影片番号の出力ファイルとは分ける。

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

const CACHE_FILE_NAME: &str = ".generation-cache.json";
const IMAGE_DIR_NAME: &str = ".generation-images";

/// キャッシュファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationCache {
    /// バージョン（互換性チェック用）
    version: u32,
    /// リクエストハッシュ → 生成記録
    entries: HashMap<String, CacheEntry>,
}

/// キャッシュエントリ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub slide_index: usize,
    /// 出力ディレクトリからの相対パス
    pub image_file: String,
    pub created_at: DateTime<Utc>,
}

impl GenerationCache {
    const CURRENT_VERSION: u32 = 1;

    pub fn cache_path(dir: &Path) -> PathBuf {
        dir.join(CACHE_FILE_NAME)
    }

    /// キャッシュファイルを読み込み（無い・壊れている場合は空）
    pub fn load(dir: &Path) -> Self {
        let cache_path = Self::cache_path(dir);
        if !cache_path.exists() {
            return Self::default();
        }

        let file = match File::open(&cache_path) {
            Ok(f) => f,
            Err(_) => return Self::default(),
        };

        match serde_json::from_reader::<_, GenerationCache>(BufReader::new(file)) {
            Ok(cache) if cache.version == Self::CURRENT_VERSION => cache,
            Ok(_) => {
                log::warn!("キャッシュバージョン不一致、再生成します");
                Self::default()
            }
            Err(e) => {
                log::warn!("キャッシュ読み込み失敗: {}", e);
                Self::default()
            }
        }
    }

    /// キャッシュファイルを保存
    pub fn save(&self, dir: &Path) -> Result<()> {
        let file = File::create(Self::cache_path(dir))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn image_dir(dir: &Path) -> PathBuf {
        dir.join(IMAGE_DIR_NAME)
    }

    /// キャッシュファイルと画像の控えを削除。どちらも無ければ false
    pub fn clear(dir: &Path) -> Result<bool> {
        let cache_path = Self::cache_path(dir);
        let image_dir = Self::image_dir(dir);
        let mut removed = false;

        if cache_path.exists() {
            std::fs::remove_file(cache_path)?;
            removed = true;
        }
        if image_dir.exists() {
            std::fs::remove_dir_all(image_dir)?;
            removed = true;
        }
        Ok(removed)
    }

    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// 画像ファイルが残っているエントリだけを返す
    pub fn lookup(&self, key: &str, dir: &Path) -> Option<PathBuf> {
        let path = dir.join(&self.get(key)?.image_file);
        path.exists().then_some(path)
    }

    /// 生成済み画像をキー名で控えに複製して登録する
    ///
    /// 控えはキーごとに別ファイルなので、後の実行で投影片の出力が
    /// 上書きされても別のプロンプトの画像を返すことはない。
    pub fn store(&mut self, dir: &Path, key: String, slide_index: usize, image: &Path) -> Result<PathBuf> {
        let extension = image.extension().and_then(|e| e.to_str()).unwrap_or("png");
        let file_name = format!("{}.{}", key, extension);

        let image_dir = Self::image_dir(dir);
        std::fs::create_dir_all(&image_dir)?;
        let stored = image_dir.join(&file_name);
        std::fs::copy(image, &stored)?;

        self.insert(key, slide_index, format!("{}/{}", IMAGE_DIR_NAME, file_name));
        Ok(stored)
    }

    pub fn insert(&mut self, key: String, slide_index: usize, image_file: String) {
        self.entries.insert(
            key,
            CacheEntry {
                slide_index,
                image_file,
                created_at: Utc::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for GenerationCache {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: HashMap::new(),
        }
    }
}
