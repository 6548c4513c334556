//! 瞬間（Moment）関連の型定義
//!
//! CLIとセッションコアで共有される型:
//! - PlaceName: 逆ジオコーディング結果（英語 + ローカライズ名）
//! - Location: PlaceName + 座標
//! - Moment: プールに共有される写真1枚分のレコード
//! - Verdict: 真正性チェック結果

use crate::i18n::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// リアクションとして選べる絵文字
pub const REACTIONS: &[&str] = &["❤️", "😮", "🌏", "✨", "🔥"];

/// 逆ジオコーディングの結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceName {
    pub city: String,
    pub country: String,
    #[serde(alias = "city_zh")]
    pub city_localized: String,
    #[serde(alias = "country_zh")]
    pub country_localized: String,
}

impl PlaceName {
    /// 解決失敗時の固定値
    pub fn unknown() -> Self {
        Self {
            city: "Unknown City".into(),
            country: "Unknown Country".into(),
            city_localized: "未知城市".into(),
            country_localized: "未知國家".into(),
        }
    }
}

/// 位置情報（作成後は不変）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub city: String,
    pub country: String,
    #[serde(alias = "city_zh")]
    pub city_localized: String,
    #[serde(alias = "country_zh")]
    pub country_localized: String,
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng")]
    pub longitude: f64,
}

impl Location {
    pub fn from_place(place: PlaceName, latitude: f64, longitude: f64) -> Self {
        Self {
            city: place.city,
            country: place.country,
            city_localized: place.city_localized,
            country_localized: place.country_localized,
            latitude,
            longitude,
        }
    }

    /// 位置情報が拒否された・取得できなかった場合の番兵値
    pub fn global() -> Self {
        Self {
            city: "Unknown".into(),
            country: "Earth".into(),
            city_localized: "未知".into(),
            country_localized: "地球".into(),
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    pub fn city_name(&self, lang: Language) -> &str {
        match lang {
            Language::En => &self.city,
            Language::Zh => &self.city_localized,
        }
    }

    pub fn country_name(&self, lang: Language) -> &str {
        match lang {
            Language::En => &self.country,
            Language::Zh => &self.country_localized,
        }
    }
}

/// プールに共有される1件の瞬間
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Moment {
    /// 保存したストアが採番する一意ID
    pub id: String,

    /// Data URL（ローカル）またはネットワークアドレス（リモート）
    pub image_url: String,

    pub location: Location,

    /// ISO-8601
    pub timestamp: String,

    #[serde(default)]
    pub caption: String,

    #[serde(default)]
    pub reactions: BTreeMap<String, u32>,
}

impl Moment {
    /// リアクションを1つ加算し、加算後の件数を返す
    pub fn add_reaction(&mut self, symbol: &str) -> u32 {
        let count = self.reactions.entry(symbol.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn reaction_total(&self) -> u32 {
        self.reactions.values().sum()
    }
}

/// 真正性チェック結果（助言のみ）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    #[serde(alias = "is_real")]
    pub is_real: bool,
    #[serde(default)]
    pub reason: String,
}

impl Verdict {
    /// チェッカー障害時の既定値（ユーザーを止めない）
    pub fn bypassed() -> Self {
        Self {
            is_real: true,
            reason: "bypassed".into(),
        }
    }
}
