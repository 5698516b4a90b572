//! インフォグラフィック画像生成
//!
//! 決策のうち生成対象だけを外部APIに投げ、画像を出力ディレクトリに保存する。
//! 同時実行数はセマフォで制限し、1枚の失敗は他の投影片に影響しない。

pub mod cache;
pub mod kie_ai;

pub use cache::GenerationCache;
pub use kie_ai::KieAiClient;

use crate::error::{Result, SlideVisualError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use slide_visual_common::{Decision, DecisionSummary, GenerationSettings};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// 画像生成APIへのリクエスト
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    /// "WxH"
    pub size: String,
    pub quality: String,
}

impl ImageRequest {
    /// 生成対象の決策からリクエストを作る（生成対象でなければ None）
    ///
    /// 戦略に無い項目は `fallback` の値を使う。
    pub fn from_decision(decision: &Decision, fallback: &GenerationSettings) -> Option<Self> {
        if !decision.needs_generation() {
            return None;
        }
        let params = decision.params.as_ref()?;
        let strategy = &decision.strategy;

        Some(Self {
            model: strategy.model.clone().unwrap_or_else(|| fallback.model.clone()),
            prompt: params.prompt(),
            size: strategy.size.clone().unwrap_or_else(|| fallback.size.clone()),
            quality: strategy.quality.clone().unwrap_or_else(|| fallback.quality.clone()),
        })
    }

    /// キャッシュキー（モデル・サイズ・品質・プロンプトのSHA-256）
    pub fn cache_key(&self) -> String {
        let mut hasher = Sha256::new();
        for part in [&self.model, &self.size, &self.quality, &self.prompt] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }
}

/// 生成された画像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOutput {
    pub bytes: Vec<u8>,
    /// 拡張子（"png" など）
    pub extension: String,
}

impl ImageOutput {
    /// バイト列から形式を判定する（判定できなければ png）
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let extension = image::guess_format(&bytes)
            .ok()
            .and_then(|format| format.extensions_str().first().copied())
            .unwrap_or("png")
            .to_string();

        Self { bytes, extension }
    }
}

/// 画像生成バックエンド
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: &ImageRequest) -> Result<ImageOutput>;
}

/// 投影片ごとの処理状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Success,
    Skipped,
    Error,
}

/// 投影片1枚分の生成結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideResult {
    pub slide_index: usize,
    pub title: String,
    pub status: GenerationStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cached: bool,
}

impl SlideResult {
    fn skipped(decision: &Decision) -> Self {
        Self {
            slide_index: decision.slide_index,
            title: decision.title.clone(),
            status: GenerationStatus::Skipped,
            image_path: None,
            error: None,
            cached: false,
        }
    }

    fn success(decision: &Decision, path: PathBuf, cached: bool) -> Self {
        Self {
            status: GenerationStatus::Success,
            image_path: Some(path),
            cached,
            ..Self::skipped(decision)
        }
    }

    fn failure(decision: &Decision, message: String) -> Self {
        Self {
            status: GenerationStatus::Error,
            error: Some(message),
            ..Self::skipped(decision)
        }
    }
}

/// 実行結果のレポート（report.json）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub generated_at: DateTime<Utc>,
    pub results: Vec<SlideResult>,
    pub summary: DecisionSummary,
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl GenerationReport {
    pub fn new(results: Vec<SlideResult>, summary: DecisionSummary) -> Self {
        let count = |status: GenerationStatus| results.iter().filter(|r| r.status == status).count();
        let (processed, failed, skipped) = (
            count(GenerationStatus::Success),
            count(GenerationStatus::Error),
            count(GenerationStatus::Skipped),
        );

        Self {
            generated_at: Utc::now(),
            results,
            summary,
            processed,
            failed,
            skipped,
        }
    }

    /// 生成対象が無いときのレポート（全件 skipped、APIは使わない）
    pub fn all_skipped(decisions: &[Decision], summary: DecisionSummary) -> Self {
        Self::new(decisions.iter().map(SlideResult::skipped).collect(), summary)
    }

    pub fn save(&self, output_dir: &Path) -> Result<PathBuf> {
        let path = output_dir.join(REPORT_FILE_NAME);
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }
}

pub const REPORT_FILE_NAME: &str = "report.json";

/// 生成実行のオプション
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub output_dir: PathBuf,
    pub settings: GenerationSettings,
    pub max_concurrency: usize,
    /// 1枚あたりの上限時間
    pub timeout: Duration,
    pub use_cache: bool,
    pub show_progress: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./workspace"),
            settings: GenerationSettings::default(),
            max_concurrency: 3,
            timeout: Duration::from_secs(120),
            use_cache: false,
            show_progress: false,
        }
    }
}

/// 出力画像のファイル名（slide01-infographic.png 形式、番号は1始まり）
pub fn image_file_name(slide_index: usize, extension: &str) -> String {
    format!("slide{:02}-infographic.{}", slide_index + 1, extension)
}

/// 決策一覧に従って画像を生成する
///
/// 結果は決策と同じ順序で返す。生成対象外は skipped、
/// API・保存の失敗やタイムアウトはその投影片だけ error になる。
pub async fn run_generation(
    decisions: &[Decision],
    generator: Arc<dyn ImageGenerator>,
    options: &RunOptions,
) -> Result<Vec<SlideResult>> {
    std::fs::create_dir_all(&options.output_dir)?;

    let mut cache = if options.use_cache {
        GenerationCache::load(&options.output_dir)
    } else {
        GenerationCache::default()
    };

    let mut results: Vec<Option<SlideResult>> = vec![None; decisions.len()];
    let mut pending = Vec::new();

    for (position, decision) in decisions.iter().enumerate() {
        let Some(request) = ImageRequest::from_decision(decision, &options.settings) else {
            results[position] = Some(SlideResult::skipped(decision));
            continue;
        };

        let key = request.cache_key();
        if options.use_cache {
            if let Some(stored) = cache.lookup(&key, &options.output_dir) {
                match restore_cached(&stored, &options.output_dir, decision.slide_index) {
                    Ok(path) => {
                        log::debug!("キャッシュヒット: 投影片 {}", decision.slide_index);
                        results[position] = Some(SlideResult::success(decision, path, true));
                        continue;
                    }
                    Err(e) => log::warn!("キャッシュ画像の復元に失敗、再生成します: {}", e),
                }
            }
        }

        pending.push((position, key, request));
    }

    let progress = if options.show_progress && !pending.is_empty() {
        let bar = ProgressBar::new(pending.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(bar)
    } else {
        None
    };

    let semaphore = Arc::new(Semaphore::new(options.max_concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for (position, key, request) in pending {
        let semaphore = Arc::clone(&semaphore);
        let generator = Arc::clone(&generator);
        let timeout = options.timeout;
        let output_dir = options.output_dir.clone();
        let slide_index = decisions[position].slide_index;

        tasks.spawn(async move {
            let outcome =
                generate_one(generator, semaphore, &request, timeout, &output_dir, slide_index).await;
            (position, key, outcome)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (position, key, outcome) = match joined {
            Ok(done) => done,
            Err(e) => {
                log::warn!("生成タスクが中断されました: {}", e);
                continue;
            }
        };
        let decision = &decisions[position];

        let result = match outcome {
            Ok(path) => {
                if options.use_cache {
                    if let Err(e) = cache.store(&options.output_dir, key, decision.slide_index, &path) {
                        log::warn!("キャッシュ保存に失敗: {}", e);
                    }
                }
                SlideResult::success(decision, path, false)
            }
            Err(e) => {
                log::warn!("投影片 {} の生成に失敗: {}", decision.slide_index + 1, e);
                SlideResult::failure(decision, e.to_string())
            }
        };

        if let Some(bar) = &progress {
            bar.inc(1);
        }
        results[position] = Some(result);
    }

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    if options.use_cache {
        cache.save(&options.output_dir)?;
    }

    Ok(results
        .into_iter()
        .zip(decisions)
        .map(|(result, decision)| {
            result.unwrap_or_else(|| SlideResult::failure(decision, "生成タスクが中断されました".into()))
        })
        .collect())
}

/// キャッシュの控えを投影片の出力ファイルへ複製する
fn restore_cached(stored: &Path, output_dir: &Path, slide_index: usize) -> Result<PathBuf> {
    let extension = stored.extension().and_then(|e| e.to_str()).unwrap_or("png");
    let path = output_dir.join(image_file_name(slide_index, extension));
    std::fs::copy(stored, &path)?;
    Ok(path)
}

async fn generate_one(
    generator: Arc<dyn ImageGenerator>,
    semaphore: Arc<Semaphore>,
    request: &ImageRequest,
    timeout: Duration,
    output_dir: &Path,
    slide_index: usize,
) -> Result<PathBuf> {
    let _permit = semaphore
        .acquire_owned()
        .await
        .map_err(|e| SlideVisualError::ApiCall(e.to_string()))?;

    let output = tokio::time::timeout(timeout, generator.generate(request))
        .await
        .map_err(|_| SlideVisualError::Timeout(timeout.as_secs()))??;

    let path = output_dir.join(image_file_name(slide_index, &output.extension));
    tokio::fs::write(&path, &output.bytes).await?;
    Ok(path)
}
