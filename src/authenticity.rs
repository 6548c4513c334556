//! 撮影写真の真正性チェック
//!
//! 判定は助言のみ。チェッカーが壊れていてもユーザーを止めないよう、
//! エラー時は `Verdict::bypassed()` を返す。

use crate::capture::CapturedImage;
use crate::gemini::GeminiClient;
use async_trait::async_trait;
use moment_exchange_common::{build_authenticity_prompt, parse_verdict_response, Verdict};

#[async_trait]
pub trait AuthenticityChecker: Send + Sync {
    async fn check(&self, image: &CapturedImage) -> Verdict;
}

#[derive(Debug, Clone)]
pub struct GeminiAuthenticityChecker {
    client: GeminiClient,
}

impl GeminiAuthenticityChecker {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthenticityChecker for GeminiAuthenticityChecker {
    async fn check(&self, image: &CapturedImage) -> Verdict {
        let prompt = build_authenticity_prompt();

        let verdict = match self.client.generate_with_image(&prompt, image).await {
            Ok(text) => parse_verdict_response(&text).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match verdict {
            Ok(v) => {
                tracing::debug!("真正性判定: real={} ({})", v.is_real, v.reason);
                v
            }
            Err(reason) => {
                tracing::warn!("真正性チェックをスキップ: {}", reason);
                Verdict::bypassed()
            }
        }
    }
}
