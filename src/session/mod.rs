//! 撮影 → 交換セッション
//!
//! 画面遷移: Landing → Capturing → Uploading → Swiping → Summary
//!
//! - Session: 1回分のセッション状態（テスト対象となる唯一のオブジェクト）
//! - controller: 遷移と外部呼び出しの順序付け
//! - navigator: 横ドラッグ → 「次へ」/「キャンセル」の解釈
//! - progress: ステータスメッセージのチャネル
//! - deadline: 外部呼び出しのタイムアウト

pub mod controller;
pub mod deadline;
pub mod navigator;
pub mod progress;
pub mod summary;

pub use controller::{CaptureSessionController, UploadOutcome};
pub use deadline::with_deadline;
pub use navigator::{AdvanceResult, DragRelease, NavigatorConfig, SwipeNavigator};
pub use progress::{ProgressEvent, ProgressSink};
pub use summary::SessionSummary;

use crate::capture::CapturedImage;
use moment_exchange_common::{Language, Location, Moment};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Landing,
    Capturing,
    Uploading,
    Swiping,
    Summary,
}

/// 表示中カードのドラッグ状態
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DragState {
    pub start_x: Option<f64>,
    /// カードの横方向オフセット(px)
    pub offset: f64,
    /// 退場アニメーション中
    pub is_exiting: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    pub screen: Screen,
    pub self_photo: Option<CapturedImage>,
    pub self_location: Option<Location>,
    /// 自分が今回作成した瞬間のID
    pub self_id: Option<String>,
    /// 閲覧用プール（自分の瞬間は含まない）
    pub pool: Vec<Moment>,
    pub cursor: usize,
    pub drag: DragState,
    /// 画面に出すステータス/エラーメッセージ
    pub status: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// 次のセッションに持ち越さない状態を捨てて Landing へ
    pub(crate) fn reset_to_landing(&mut self) {
        self.screen = Screen::Landing;
        self.self_id = None;
        self.pool.clear();
        self.cursor = 0;
        self.drag = DragState::default();
    }
}

/// プールが空だったときの振る舞い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyPoolPolicy {
    /// そのままサマリーへ
    #[default]
    Summary,
    /// ダミーの瞬間で埋めてスワイプへ
    Placeholder,
    /// メッセージを見せてから Landing へ戻る
    Bounce,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// 1回の閲覧で見せる最大件数
    pub max_pool_size: usize,
    pub status_pacing_ms: u64,
    /// 失敗メッセージを見せてから Landing に戻るまでの待ち
    pub failure_delay_ms: u64,
    pub resolve_timeout_ms: u64,
    pub verify_timeout_ms: u64,
    pub sync_timeout_ms: u64,
    pub empty_pool_policy: EmptyPoolPolicy,
    pub language: Language,
    pub navigator: NavigatorConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_pool_size: 10,
            status_pacing_ms: 1000,
            failure_delay_ms: 3000,
            resolve_timeout_ms: 5000,
            verify_timeout_ms: 5000,
            sync_timeout_ms: 15000,
            empty_pool_policy: EmptyPoolPolicy::default(),
            language: Language::default(),
            navigator: NavigatorConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn status_pacing(&self) -> Duration {
        Duration::from_millis(self.status_pacing_ms)
    }

    pub fn failure_delay(&self) -> Duration {
        Duration::from_millis(self.failure_delay_ms)
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }

    pub fn verify_timeout(&self) -> Duration {
        Duration::from_millis(self.verify_timeout_ms)
    }

    pub fn sync_timeout(&self) -> Duration {
        Duration::from_millis(self.sync_timeout_ms)
    }
}
