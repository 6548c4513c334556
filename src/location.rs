//! 逆ジオコーディング
//!
//! 座標を英語 + 繁体字の都市/国名に変換する。
//! 失敗してもエラーは返さず、固定の「不明」値にフォールバックする。

use crate::gemini::GeminiClient;
use async_trait::async_trait;
use moment_exchange_common::{build_location_prompt, parse_place_response, PlaceName};

#[async_trait]
pub trait LocationResolver: Send + Sync {
    /// 座標から地名を解決する。失敗時は `PlaceName::unknown()`
    async fn resolve(&self, latitude: f64, longitude: f64) -> PlaceName;
}

/// Gemini による逆ジオコーディング
#[derive(Debug, Clone)]
pub struct GeminiLocationResolver {
    client: GeminiClient,
}

impl GeminiLocationResolver {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LocationResolver for GeminiLocationResolver {
    async fn resolve(&self, latitude: f64, longitude: f64) -> PlaceName {
        let prompt = build_location_prompt(latitude, longitude);

        let place = match self.client.generate_text(&prompt).await {
            Ok(text) => parse_place_response(&text).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        place.unwrap_or_else(|reason| {
            tracing::warn!("地名の解決に失敗 ({}, {}): {}", latitude, longitude, reason);
            PlaceName::unknown()
        })
    }
}

/// 常に同じ地名を返すリゾルバ（オフライン動作用）
#[derive(Debug, Clone)]
pub struct FixedLocationResolver {
    place: PlaceName,
}

impl FixedLocationResolver {
    pub fn new(place: PlaceName) -> Self {
        Self { place }
    }

    pub fn unknown() -> Self {
        Self::new(PlaceName::unknown())
    }
}

#[async_trait]
impl LocationResolver for FixedLocationResolver {
    async fn resolve(&self, _latitude: f64, _longitude: f64) -> PlaceName {
        self.place.clone()
    }
}
