//! Gemini API連携
//!
//! generateContent をJSONレスポンスモードで呼び出し、
//! 先頭候補のテキストを返す

use crate::capture::CapturedImage;
use crate::config::Config;
use crate::error::{MomentError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

/// Gemini APIレスポンス
#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // APIキーは出さない
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(api_key: String, model: &str, api_base: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MomentError::ApiCall(format!("HTTPクライアント作成失敗: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            endpoint: format!("{}/{}:generateContent", api_base.trim_end_matches('/'), model),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.get_api_key()?,
            &config.model,
            &config.api_base,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// テキストのみのプロンプト
    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        self.call(vec![Part::Text { text: prompt.to_string() }]).await
    }

    /// プロンプト + 画像1枚
    pub async fn generate_with_image(&self, prompt: &str, image: &CapturedImage) -> Result<String> {
        let parts = vec![
            Part::Text { text: prompt.to_string() },
            Part::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type().to_string(),
                    data: image.base64_payload().to_string(),
                },
            },
        ];
        self.call(parts).await
    }

    async fn call(&self, parts: Vec<Part>) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| MomentError::ApiCall(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            return Err(MomentError::ApiCall(format!("API error {}: {}", status, preview)));
        }

        let payload: GeminiResponse = response
            .json()
            .await
            .map_err(|e| MomentError::ApiParse(e.to_string()))?;

        first_text(payload)
    }
}

fn first_text(payload: GeminiResponse) -> Result<String> {
    payload
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| MomentError::ApiParse("Empty response".into()))
}
