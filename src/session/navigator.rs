//! スワイプナビゲーター
//!
//! 表示中カードの横ドラッグを「次へ進む」か「元に戻す」に変換する。
//! 描画はしない。`Session::drag` の値だけを更新する。

use super::Session;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// これ以下（左方向）まで引いて離すと次へ進む
    pub dismiss_threshold: f64,
    /// 右方向ドラッグの追従率
    pub reverse_damping: f64,
    pub exit_duration_ms: u64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            dismiss_threshold: -120.0,
            reverse_damping: 0.2,
            exit_duration_ms: 400,
        }
    }
}

impl NavigatorConfig {
    pub fn exit_duration(&self) -> Duration {
        Duration::from_millis(self.exit_duration_ms)
    }
}

/// ドラッグを離したときの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragRelease {
    Commit,
    SnapBack,
    /// 退場中・ドラッグ未開始
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceResult {
    /// 次のカードへ（新しいカーソル）
    Next(usize),
    /// 最後のカードだった
    Exhausted,
}

#[derive(Debug, Clone, Default)]
pub struct SwipeNavigator {
    config: NavigatorConfig,
}

impl SwipeNavigator {
    pub fn new(config: NavigatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn on_drag_start(&self, session: &mut Session, x: f64) {
        if session.drag.is_exiting {
            return;
        }
        session.drag.start_x = Some(x);
    }

    pub fn on_drag_move(&self, session: &mut Session, x: f64) {
        if session.drag.is_exiting {
            return;
        }
        let Some(start) = session.drag.start_x else {
            return;
        };

        let delta = x - start;
        session.drag.offset = if delta < 0.0 {
            delta
        } else {
            delta * self.config.reverse_damping
        };
    }

    pub fn on_drag_end(&self, session: &mut Session) -> DragRelease {
        if session.drag.is_exiting {
            return DragRelease::Ignored;
        }
        if session.drag.start_x.take().is_none() {
            return DragRelease::Ignored;
        }

        if session.drag.offset <= self.config.dismiss_threshold {
            DragRelease::Commit
        } else {
            session.drag.offset = 0.0;
            DragRelease::SnapBack
        }
    }

    /// 退場開始。既に退場中なら false（二重送り防止）
    pub fn begin_advance(&self, session: &mut Session) -> bool {
        if session.drag.is_exiting {
            return false;
        }
        session.drag.is_exiting = true;
        session.drag.start_x = None;
        true
    }

    /// 退場完了。`begin_advance` していなければ None
    pub fn complete_advance(&self, session: &mut Session) -> Option<AdvanceResult> {
        if !session.drag.is_exiting {
            return None;
        }
        session.drag.offset = 0.0;
        session.drag.is_exiting = false;

        if session.cursor + 1 < session.pool.len() {
            session.cursor += 1;
            Some(AdvanceResult::Next(session.cursor))
        } else {
            Some(AdvanceResult::Exhausted)
        }
    }

    /// カードの不透明度（退場中は 0）
    pub fn card_opacity(&self, session: &Session) -> f64 {
        if session.drag.is_exiting {
            return 0.0;
        }
        (1.0 - session.drag.offset.abs() / 400.0).max(0.1)
    }

    /// カードの回転角（度）
    pub fn card_rotation(&self, session: &Session) -> f64 {
        session.drag.offset * 0.03
    }
}
