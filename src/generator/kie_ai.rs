//! Kie.ai 画像生成クライアント
//!
//! `POST {api_base}/images/generate` に `{model, prompt, size, quality}` を送り、
//! 返ってきたURLから画像をダウンロードする（base64で返る場合はそのままデコード）。

use super::{ImageGenerator, ImageOutput, ImageRequest};
use crate::config::Config;
use crate::error::{Result, SlideVisualError};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct KieAiClient {
    client: Client,
    api_key: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    b64_json: Option<String>,
}

/// レスポンスから取り出した画像の所在
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ImagePayload {
    Url(String),
    Inline(Vec<u8>),
}

impl KieAiClient {
    pub fn new(api_key: String, api_base: &str, timeout_seconds: u64) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(SlideVisualError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.get_api_key()?, &config.api_base, config.timeout_seconds)
    }

    async fn request_image(&self, request: &ImageRequest) -> Result<ImagePayload> {
        let url = format!("{}/images/generate", self.api_base);
        log::debug!("画像生成リクエスト: model={} size={}", request.model, request.size);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SlideVisualError::ApiCall(format!("{} - {}", status, body)));
        }

        parse_response(&body)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(SlideVisualError::Download(format!("{} ({})", url, response.status())));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ImageGenerator for KieAiClient {
    async fn generate(&self, request: &ImageRequest) -> Result<ImageOutput> {
        let bytes = match self.request_image(request).await? {
            ImagePayload::Url(url) => self.download(&url).await?,
            ImagePayload::Inline(bytes) => bytes,
        };

        if bytes.is_empty() {
            return Err(SlideVisualError::Download("空の画像データ".into()));
        }

        Ok(ImageOutput::from_bytes(bytes))
    }
}

/// 生成APIのレスポンス本文を解釈する
///
/// `image_url` → `data[0].url` → `data[0].b64_json` の順に探す。
pub(crate) fn parse_response(body: &str) -> Result<ImagePayload> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| SlideVisualError::ApiParse(e.to_string()))?;

    if let Some(url) = response.image_url.filter(|u| !u.is_empty()) {
        return Ok(ImagePayload::Url(url));
    }

    let first = response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| SlideVisualError::ApiParse("画像URLがありません".into()))?;

    if let Some(url) = first.url.filter(|u| !u.is_empty()) {
        return Ok(ImagePayload::Url(url));
    }

    match first.b64_json {
        Some(encoded) => base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map(ImagePayload::Inline)
            .map_err(|e| SlideVisualError::ApiParse(format!("base64デコード失敗: {}", e))),
        None => Err(SlideVisualError::ApiParse("画像URLがありません".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_image_url() {
        let payload = parse_response(r#"{"image_url": "https://cdn.example/a.png"}"#).unwrap();
        assert_eq!(payload, ImagePayload::Url("https://cdn.example/a.png".into()));
    }

    #[test]
    fn test_parse_data_url() {
        let payload = parse_response(r#"{"data": [{"url": "https://cdn.example/b.png"}]}"#).unwrap();
        assert_eq!(payload, ImagePayload::Url("https://cdn.example/b.png".into()));
    }

    #[test]
    fn test_parse_inline_base64() {
        // "hello"
        let payload = parse_response(r#"{"data": [{"b64_json": "aGVsbG8="}]}"#).unwrap();
        assert_eq!(payload, ImagePayload::Inline(b"hello".to_vec()));
    }

    #[test]
    fn test_parse_missing_image() {
        let err = parse_response(r#"{"data": []}"#).unwrap_err();
        assert!(matches!(err, SlideVisualError::ApiParse(_)));

        let err = parse_response("not json").unwrap_err();
        assert!(matches!(err, SlideVisualError::ApiParse(_)));
    }

    #[test]
    fn test_empty_key_rejected() {
        let err = KieAiClient::new("  ".into(), "https://api.kie.ai/v1", 10).unwrap_err();
        assert!(matches!(err, SlideVisualError::MissingApiKey));
    }
}
