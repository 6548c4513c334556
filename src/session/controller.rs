//! 撮影セッションコントローラ
//!
//! 画面状態の唯一の持ち主。外部呼び出し（地名解決・真正性チェック・プール同期）を
//! 決まった順序で実行し、失敗時は必ず Landing に戻す。

use super::navigator::{AdvanceResult, DragRelease, SwipeNavigator};
use super::progress::{ProgressEvent, ProgressSink};
use super::summary::SessionSummary;
use super::{with_deadline, EmptyPoolPolicy, Screen, Session, SessionConfig};
use crate::authenticity::AuthenticityChecker;
use crate::capture::{CaptureDevice, CapturedImage, DeviceGuard};
use crate::error::{MomentError, Result};
use crate::location::LocationResolver;
use crate::store::{placeholder_moments, PoolStore};
use moment_exchange_common::{Location, Moment, PlaceName, Verdict};
use std::sync::Arc;

/// アップロードパイプラインの結末
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// スワイプ画面へ（件数）
    Swiping { count: usize },
    /// プールが空でサマリーへ直行
    Summary,
    /// プールが空でメッセージ後に Landing へ
    Bounced,
    /// 失敗して Landing へ
    Failed { reason: String },
}

pub struct CaptureSessionController {
    session: Session,
    config: SessionConfig,
    navigator: SwipeNavigator,
    store: Arc<dyn PoolStore>,
    resolver: Arc<dyn LocationResolver>,
    checker: Option<Arc<dyn AuthenticityChecker>>,
    progress: ProgressSink,
}

impl CaptureSessionController {
    pub fn new(
        store: Arc<dyn PoolStore>,
        resolver: Arc<dyn LocationResolver>,
        config: SessionConfig,
    ) -> Self {
        Self {
            session: Session::new(),
            navigator: SwipeNavigator::new(config.navigator.clone()),
            config,
            store,
            resolver,
            checker: None,
            progress: ProgressSink::disabled(),
        }
    }

    pub fn with_checker(mut self, checker: Arc<dyn AuthenticityChecker>) -> Self {
        self.checker = Some(checker);
        self
    }

    pub fn with_progress(mut self, progress: ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn screen(&self) -> Screen {
        self.session.screen
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // =============================================
    // 位置情報
    // =============================================

    /// 座標から自分の地名を解決する（起動後に非同期で呼ぶ想定）
    pub async fn locate(&mut self, latitude: f64, longitude: f64) -> &Location {
        let place = with_deadline(
            self.config.resolve_timeout(),
            self.resolver.resolve(latitude, longitude),
        )
        .await
        .unwrap_or_else(|| {
            tracing::warn!("地名の解決がタイムアウト ({}, {})", latitude, longitude);
            PlaceName::unknown()
        });

        self.session
            .self_location
            .insert(Location::from_place(place, latitude, longitude))
    }

    /// 位置情報が拒否された
    pub fn locate_denied(&mut self) {
        self.session.self_location = Some(Location::global());
    }

    // =============================================
    // 撮影
    // =============================================

    pub fn begin_capture(&mut self) -> Result<()> {
        self.expect_screen(&[Screen::Landing], "begin_capture")?;
        self.session.status = None;
        self.session.screen = Screen::Capturing;
        Ok(())
    }

    pub fn cancel_capture(&mut self) -> Result<()> {
        self.expect_screen(&[Screen::Capturing], "cancel_capture")?;
        self.session.screen = Screen::Landing;
        Ok(())
    }

    /// デバイスから1枚撮って共有する
    ///
    /// デバイスは撮影・キャンセル・エラーのどの経路でも解放される。
    /// キャンセル時は `Ok(None)`。
    pub async fn capture_from<D: CaptureDevice + ?Sized>(
        &mut self,
        device: &mut D,
    ) -> Result<Option<UploadOutcome>> {
        if self.session.screen == Screen::Landing {
            self.begin_capture()?;
        }
        self.expect_screen(&[Screen::Capturing], "capture_from")?;

        let captured = {
            let guard = DeviceGuard::open(device);
            guard.and_then(|mut g| g.capture())
        };

        match captured {
            Ok(Some(image)) => self.submit_capture(image).await.map(Some),
            Ok(None) => {
                self.cancel_capture()?;
                Ok(None)
            }
            Err(e) => {
                tracing::warn!("撮影に失敗: {}", e);
                self.session.screen = Screen::Landing;
                Err(e)
            }
        }
    }

    /// 撮影画像を受け取りアップロードパイプラインを実行する
    ///
    /// Landing / Capturing 以外では受け付けない（パイプラインの多重起動防止）。
    /// パイプライン内の失敗はエラーとしては返さず `UploadOutcome::Failed` になる。
    pub async fn submit_capture(&mut self, image: CapturedImage) -> Result<UploadOutcome> {
        self.expect_screen(&[Screen::Landing, Screen::Capturing], "submit_capture")?;

        // 新しい撮影の開始
        self.session.reset_to_landing();
        self.session.self_photo = Some(image.clone());
        self.session.screen = Screen::Uploading;

        let outcome = match self.run_pipeline(&image).await {
            Ok(pool) => self.enter_browsing(pool).await,
            Err(e) => self.fail(e).await,
        };
        Ok(outcome)
    }

    async fn run_pipeline(&mut self, image: &CapturedImage) -> Result<Vec<Moment>> {
        let msgs = self.config.language.messages();

        // 1. 位置（ネットワーク待ちはしない）
        self.set_status(msgs.loading_stamping);
        let location = self
            .session
            .self_location
            .clone()
            .unwrap_or_else(Location::global);
        tracing::debug!("位置: {}, {}", location.city, location.country);
        self.pace().await;

        // 2. 真正性チェック（助言のみ）
        if let Some(checker) = self.checker.clone() {
            self.set_status(msgs.loading_finalizing);
            let verdict = with_deadline(self.config.verify_timeout(), checker.check(image))
                .await
                .unwrap_or_else(|| {
                    tracing::warn!("真正性チェックがタイムアウト");
                    Verdict::bypassed()
                });
            if !verdict.is_real {
                tracing::warn!("真正性チェックで疑わしい判定: {}", verdict.reason);
                self.progress.emit(ProgressEvent::Warning(format!(
                    "{} ({})",
                    msgs.suspicious_capture, verdict.reason
                )));
            }
            self.pace().await;
        }

        // 3. 保存と同期
        self.set_status(msgs.loading_searching);
        let store = Arc::clone(&self.store);
        let synced = with_deadline(
            self.config.sync_timeout(),
            store.save_and_sync(image, &location, &self.progress),
        )
        .await;
        let synced = match synced {
            Some(result) => Some(result?),
            None => {
                tracing::warn!("プール同期がタイムアウト、空のプールとして扱います");
                None
            }
        };
        self.pace().await;

        // 4. 自分の瞬間を除外して上限で切る
        self.set_status(msgs.loading_connecting);
        let pool = match synced {
            Some(result) => {
                let self_id = result.self_id;
                let pool: Vec<Moment> = result
                    .pool
                    .into_iter()
                    .filter(|m| m.id != self_id)
                    .take(self.config.max_pool_size)
                    .collect();
                tracing::debug!("保存完了 id={} / プール {}件", self_id, pool.len());
                self.session.self_id = Some(self_id);
                pool
            }
            None => Vec::new(),
        };
        self.pace().await;

        Ok(pool)
    }

    async fn enter_browsing(&mut self, pool: Vec<Moment>) -> UploadOutcome {
        let msgs = self.config.language.messages();

        if !pool.is_empty() {
            return self.start_swiping(pool, false);
        }

        match self.config.empty_pool_policy {
            EmptyPoolPolicy::Summary => {
                self.session.status = None;
                self.session.screen = Screen::Summary;
                self.progress.emit(ProgressEvent::Finished(Screen::Summary));
                UploadOutcome::Summary
            }
            EmptyPoolPolicy::Placeholder => {
                let now = chrono::Utc::now().to_rfc3339();
                self.start_swiping(placeholder_moments(&now), true)
            }
            EmptyPoolPolicy::Bounce => {
                self.set_status(msgs.no_moments);
                tokio::time::sleep(self.config.failure_delay()).await;
                self.session.reset_to_landing();
                self.progress.emit(ProgressEvent::Finished(Screen::Landing));
                UploadOutcome::Bounced
            }
        }
    }

    fn start_swiping(&mut self, pool: Vec<Moment>, quiet: bool) -> UploadOutcome {
        let count = pool.len();
        self.session.pool = pool;
        self.session.cursor = 0;
        self.session.drag = Default::default();
        self.session.status = if quiet {
            None
        } else {
            Some(self.config.language.messages().low_moments(count))
        };
        self.session.screen = Screen::Swiping;
        self.progress.emit(ProgressEvent::Finished(Screen::Swiping));
        UploadOutcome::Swiping { count }
    }

    async fn fail(&mut self, error: MomentError) -> UploadOutcome {
        tracing::error!("アップロード失敗: {}", error);

        let reason = format!("{}: {}", self.config.language.messages().upload_failed, error);
        self.session.status = Some(reason.clone());
        self.session.pool.clear();
        self.progress.emit(ProgressEvent::Failed(reason.clone()));

        // エラーを読める時間を置いてから戻す
        tokio::time::sleep(self.config.failure_delay()).await;
        self.session.reset_to_landing();
        UploadOutcome::Failed { reason }
    }

    // =============================================
    // スワイプ
    // =============================================

    /// 表示中のカード
    pub fn current(&self) -> Option<&Moment> {
        if self.session.screen != Screen::Swiping {
            return None;
        }
        self.session.pool.get(self.session.cursor)
    }

    pub fn drag_start(&mut self, x: f64) {
        if self.session.screen == Screen::Swiping {
            self.navigator.on_drag_start(&mut self.session, x);
        }
    }

    pub fn drag_move(&mut self, x: f64) {
        if self.session.screen == Screen::Swiping {
            self.navigator.on_drag_move(&mut self.session, x);
        }
    }

    /// 閾値を越えていれば `advance` と同じ経路で次へ進む
    pub async fn drag_end(&mut self) -> DragRelease {
        if self.session.screen != Screen::Swiping {
            return DragRelease::Ignored;
        }
        let release = self.navigator.on_drag_end(&mut self.session);
        if release == DragRelease::Commit {
            self.advance().await;
        }
        release
    }

    /// 退場アニメーションを待って次のカードへ。退場中の呼び出しは何もしない
    pub async fn advance(&mut self) -> Option<AdvanceResult> {
        if !self.begin_advance() {
            return None;
        }
        tokio::time::sleep(self.navigator.config().exit_duration()).await;
        self.complete_advance()
    }

    /// 「次へ」ボタン
    pub async fn next(&mut self) -> Option<AdvanceResult> {
        self.advance().await
    }

    /// 退場開始（アニメーションを自前で回すホスト向け）
    pub fn begin_advance(&mut self) -> bool {
        self.session.screen == Screen::Swiping && self.navigator.begin_advance(&mut self.session)
    }

    /// 退場完了。最後のカードだった場合は Summary へ
    pub fn complete_advance(&mut self) -> Option<AdvanceResult> {
        let result = self.navigator.complete_advance(&mut self.session)?;
        if result == AdvanceResult::Exhausted {
            self.session.status = None;
            self.session.screen = Screen::Summary;
        }
        Some(result)
    }

    /// 表示中のカードにリアクション
    pub fn react(&mut self, symbol: &str) -> Option<u32> {
        if self.session.screen != Screen::Swiping {
            return None;
        }
        let cursor = self.session.cursor;
        self.session
            .pool
            .get_mut(cursor)
            .map(|m| m.add_reaction(symbol))
    }

    // =============================================
    // サマリー
    // =============================================

    pub fn summary(&self) -> Option<SessionSummary> {
        if self.session.screen != Screen::Summary {
            return None;
        }
        Some(SessionSummary::from_session(&self.session, self.config.language))
    }

    /// もう一度最初から
    pub fn restart(&mut self) -> Result<()> {
        self.expect_screen(&[Screen::Summary], "restart")?;
        self.session.reset_to_landing();
        self.session.status = None;
        Ok(())
    }

    fn expect_screen(&self, allowed: &[Screen], action: &'static str) -> Result<()> {
        if allowed.contains(&self.session.screen) {
            Ok(())
        } else {
            Err(MomentError::InvalidTransition {
                from: self.session.screen,
                action,
            })
        }
    }

    fn set_status(&mut self, message: &str) {
        self.session.status = Some(message.to_string());
        self.progress.emit(ProgressEvent::Status(message.to_string()));
    }

    async fn pace(&self) {
        let pacing = self.config.status_pacing();
        if !pacing.is_zero() {
            tokio::time::sleep(pacing).await;
        }
    }
}
