//! セッションフローテスト
//!
//! モックのストア/地名解決/真正性チェックで
//! Landing → Uploading → Swiping → Summary の遷移を検証

use async_trait::async_trait;
use moment_exchange::authenticity::AuthenticityChecker;
use moment_exchange::capture::{CaptureDevice, CapturedImage};
use moment_exchange::error::{MomentError, Result};
use moment_exchange::location::{FixedLocationResolver, LocationResolver};
use moment_exchange::session::{
    AdvanceResult, CaptureSessionController, DragRelease, EmptyPoolPolicy, ProgressEvent,
    ProgressSink, Screen, SessionConfig, UploadOutcome,
};
use moment_exchange::store::{LocalPoolStore, PoolStore, SyncResult};
use moment_exchange_common::{Language, Location, Moment, PlaceName, Verdict};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

// =============================================
// モック
// =============================================

const SELF_ID: &str = "self-0001";

struct MockStore {
    others: Vec<Moment>,
    failure: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockStore {
    fn returning(others: Vec<Moment>) -> Self {
        Self {
            others,
            failure: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::returning(Vec::new())
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::returning(moments(3))
        }
    }
}

#[async_trait]
impl PoolStore for MockStore {
    async fn save_and_sync(
        &self,
        image: &CapturedImage,
        location: &Location,
        _progress: &ProgressSink,
    ) -> Result<SyncResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.failure {
            return Err(MomentError::Store(message.clone()));
        }

        // 自分の瞬間も混ぜて返す（コントローラ側で除外されること）
        let mut pool = vec![Moment {
            id: SELF_ID.into(),
            image_url: image.data_url().to_string(),
            location: location.clone(),
            timestamp: "2026-01-18T10:00:00Z".into(),
            caption: String::new(),
            reactions: Default::default(),
        }];
        pool.extend(self.others.iter().cloned());

        Ok(SyncResult {
            pool,
            self_id: SELF_ID.into(),
        })
    }
}

struct SlowResolver;

#[async_trait]
impl LocationResolver for SlowResolver {
    async fn resolve(&self, _latitude: f64, _longitude: f64) -> PlaceName {
        tokio::time::sleep(Duration::from_secs(60)).await;
        PlaceName {
            city: "Too Late".into(),
            country: "Nowhere".into(),
            city_localized: String::new(),
            country_localized: String::new(),
        }
    }
}

struct FixedChecker {
    verdict: Verdict,
    delay: Option<Duration>,
    called: AtomicBool,
}

#[async_trait]
impl AuthenticityChecker for FixedChecker {
    async fn check(&self, _image: &CapturedImage) -> Verdict {
        self.called.store(true, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.verdict.clone()
    }
}

#[derive(Default)]
struct MockDevice {
    image: Option<CapturedImage>,
    fail_capture: bool,
    opened: usize,
    released: usize,
}

impl CaptureDevice for MockDevice {
    fn open(&mut self) -> Result<()> {
        self.opened += 1;
        Ok(())
    }

    fn capture(&mut self) -> Result<Option<CapturedImage>> {
        if self.fail_capture {
            return Err(MomentError::Capture("camera busy".into()));
        }
        Ok(self.image.clone())
    }

    fn release(&mut self) {
        self.released += 1;
    }
}

// =============================================
// ヘルパー
// =============================================

fn test_image() -> CapturedImage {
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([200, 120, 40]));
    let mut buffer = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut buffer), image::ImageFormat::Png)
        .unwrap();
    CapturedImage::from_bytes(&buffer, 1080).unwrap()
}

fn moment(id: &str, city: &str, country: &str) -> Moment {
    Moment {
        id: id.into(),
        image_url: format!("https://example.com/{}.jpg", id),
        location: Location::from_place(
            PlaceName {
                city: city.into(),
                country: country.into(),
                city_localized: city.into(),
                country_localized: country.into(),
            },
            0.0,
            0.0,
        ),
        timestamp: "2026-01-18T09:30:00Z".into(),
        caption: String::new(),
        reactions: Default::default(),
    }
}

fn moments(n: usize) -> Vec<Moment> {
    (0..n)
        .map(|i| moment(&format!("m{}", i), &format!("City{}", i), &format!("Country{}", i)))
        .collect()
}

fn config() -> SessionConfig {
    SessionConfig {
        language: Language::En,
        ..SessionConfig::default()
    }
}

fn controller_with(store: Arc<dyn PoolStore>, config: SessionConfig) -> CaptureSessionController {
    CaptureSessionController::new(store, Arc::new(FixedLocationResolver::unknown()), config)
}

fn controller(store: MockStore) -> CaptureSessionController {
    controller_with(Arc::new(store), config())
}

// =============================================
// 基本シナリオ
// =============================================

/// 3件のプール → 3回進めると Summary
#[tokio::test(start_paused = true)]
async fn test_three_moments_then_summary() {
    let mut ctrl = controller(MockStore::returning(moments(3)));

    let outcome = ctrl.submit_capture(test_image()).await.unwrap();
    assert_eq!(outcome, UploadOutcome::Swiping { count: 3 });
    assert_eq!(ctrl.screen(), Screen::Swiping);
    assert_eq!(ctrl.session().cursor, 0);

    assert_eq!(ctrl.next().await, Some(AdvanceResult::Next(1)));
    assert_eq!(ctrl.next().await, Some(AdvanceResult::Next(2)));
    assert_eq!(ctrl.screen(), Screen::Swiping);
    assert_eq!(ctrl.next().await, Some(AdvanceResult::Exhausted));
    assert_eq!(ctrl.screen(), Screen::Summary);

    let summary = ctrl.summary().unwrap();
    assert_eq!(summary.people, 3);
    assert_eq!(summary.countries, 3);
}

/// 空のプール → そのまま Summary
#[tokio::test(start_paused = true)]
async fn test_empty_pool_goes_to_summary() {
    let mut ctrl = controller(MockStore::returning(Vec::new()));

    let outcome = ctrl.submit_capture(test_image()).await.unwrap();
    assert_eq!(outcome, UploadOutcome::Summary);
    assert_eq!(ctrl.screen(), Screen::Summary);
    assert!(ctrl.session().pool.is_empty());
    assert!(ctrl.session().self_photo.is_some());
}

/// 同期失敗 → エラー表示 → 一定時間後に Landing
#[tokio::test(start_paused = true)]
async fn test_sync_failure_returns_to_landing() {
    let mut cfg = config();
    cfg.status_pacing_ms = 0;
    cfg.failure_delay_ms = 3000;
    let (sink, mut events) = ProgressSink::channel();
    let mut ctrl =
        controller_with(Arc::new(MockStore::failing("network error")), cfg).with_progress(sink);

    let started = Instant::now();
    let outcome = ctrl.submit_capture(test_image()).await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(3000));
    assert_eq!(ctrl.screen(), Screen::Landing);
    assert!(ctrl.session().pool.is_empty());
    assert!(ctrl.session().self_photo.is_some());

    match outcome {
        UploadOutcome::Failed { reason } => {
            assert!(reason.contains("network error"));
        }
        other => panic!("Expected Failed, got {:?}", other),
    }
    let status = ctrl.session().status.clone().unwrap();
    assert!(status.contains("network error"));

    let mut failed = false;
    while let Ok(event) = events.try_recv() {
        if let ProgressEvent::Failed(message) = event {
            assert!(message.contains("network error"));
            failed = true;
        }
    }
    assert!(failed);
}

/// ドラッグ 500 → 350 で閾値を越えて次へ
#[tokio::test(start_paused = true)]
async fn test_drag_past_threshold_advances() {
    let mut ctrl = controller(MockStore::returning(moments(2)));
    ctrl.submit_capture(test_image()).await.unwrap();

    ctrl.drag_start(500.0);
    ctrl.drag_move(350.0);
    assert_eq!(ctrl.session().drag.offset, -150.0);

    assert_eq!(ctrl.drag_end().await, DragRelease::Commit);
    assert_eq!(ctrl.session().cursor, 1);
    assert_eq!(ctrl.session().drag.offset, 0.0);
    assert!(!ctrl.session().drag.is_exiting);

    // 最後のカード
    ctrl.drag_start(500.0);
    ctrl.drag_move(350.0);
    assert_eq!(ctrl.drag_end().await, DragRelease::Commit);
    assert_eq!(ctrl.screen(), Screen::Summary);
}

// =============================================
// 不変条件
// =============================================

/// 自分の瞬間はプールに入らない
#[tokio::test(start_paused = true)]
async fn test_self_moment_is_excluded() {
    let mut ctrl = controller(MockStore::returning(moments(2)));
    ctrl.submit_capture(test_image()).await.unwrap();

    assert_eq!(ctrl.session().self_id.as_deref(), Some(SELF_ID));
    assert_eq!(ctrl.session().pool.len(), 2);
    assert!(ctrl.session().pool.iter().all(|m| m.id != SELF_ID));
    assert_eq!(ctrl.current().unwrap().id, "m0");
}

/// 上限を超えるプールは切り詰める
#[tokio::test(start_paused = true)]
async fn test_pool_is_truncated() {
    let mut cfg = config();
    cfg.max_pool_size = 4;
    let mut ctrl = controller_with(Arc::new(MockStore::returning(moments(9))), cfg);

    let outcome = ctrl.submit_capture(test_image()).await.unwrap();
    assert_eq!(outcome, UploadOutcome::Swiping { count: 4 });
    assert_eq!(ctrl.session().pool.len(), 4);
}

/// ドラッグとボタンは同じ遷移
#[tokio::test(start_paused = true)]
async fn test_drag_and_button_are_equivalent() {
    let mut by_drag = controller(MockStore::returning(moments(3)));
    let mut by_button = controller(MockStore::returning(moments(3)));
    by_drag.submit_capture(test_image()).await.unwrap();
    by_button.submit_capture(test_image()).await.unwrap();

    by_drag.drag_start(400.0);
    by_drag.drag_move(200.0);
    by_drag.drag_end().await;
    by_button.next().await;

    assert_eq!(by_drag.session().cursor, by_button.session().cursor);
    assert_eq!(by_drag.session().drag, by_button.session().drag);
    assert_eq!(by_drag.screen(), by_button.screen());
}

/// 閾値未満は元の位置に戻る
#[tokio::test(start_paused = true)]
async fn test_short_drag_snaps_back() {
    let mut ctrl = controller(MockStore::returning(moments(3)));
    ctrl.submit_capture(test_image()).await.unwrap();

    ctrl.drag_start(500.0);
    ctrl.drag_move(420.0);
    assert_eq!(ctrl.drag_end().await, DragRelease::SnapBack);
    assert_eq!(ctrl.session().cursor, 0);
    assert_eq!(ctrl.session().drag.offset, 0.0);

    // 右方向は減衰
    ctrl.drag_start(100.0);
    ctrl.drag_move(300.0);
    assert!(ctrl.session().drag.offset > 0.0);
    assert!(ctrl.session().drag.offset < 200.0);
    assert_eq!(ctrl.drag_end().await, DragRelease::SnapBack);
    assert_eq!(ctrl.session().cursor, 0);
}

/// 退場中の2回目の advance は無視される
#[tokio::test(start_paused = true)]
async fn test_advance_while_exiting_is_ignored() {
    let mut ctrl = controller(MockStore::returning(moments(3)));
    ctrl.submit_capture(test_image()).await.unwrap();

    assert!(ctrl.begin_advance());
    assert!(!ctrl.begin_advance());
    assert!(ctrl.session().drag.is_exiting);

    assert_eq!(ctrl.complete_advance(), Some(AdvanceResult::Next(1)));
    assert_eq!(ctrl.complete_advance(), None);
    assert_eq!(ctrl.session().cursor, 1);
}

/// スワイプ以外ではナビゲーションは何もしない
#[tokio::test(start_paused = true)]
async fn test_navigation_outside_swiping_is_noop() {
    let mut ctrl = controller(MockStore::returning(moments(3)));

    ctrl.drag_start(500.0);
    ctrl.drag_move(100.0);
    assert_eq!(ctrl.drag_end().await, DragRelease::Ignored);
    assert_eq!(ctrl.next().await, None);
    assert_eq!(ctrl.react("❤️"), None);
    assert!(ctrl.current().is_none());
    assert_eq!(ctrl.screen(), Screen::Landing);
}

/// 不正な遷移はエラー
#[tokio::test(start_paused = true)]
async fn test_invalid_transitions() {
    let mut ctrl = controller(MockStore::returning(moments(1)));

    assert!(matches!(
        ctrl.cancel_capture(),
        Err(MomentError::InvalidTransition { from: Screen::Landing, .. })
    ));
    assert!(ctrl.restart().is_err());

    ctrl.submit_capture(test_image()).await.unwrap();
    assert_eq!(ctrl.screen(), Screen::Swiping);

    // スワイプ中の再アップロードは受け付けない
    let result = ctrl.submit_capture(test_image()).await;
    assert!(matches!(
        result,
        Err(MomentError::InvalidTransition { from: Screen::Swiping, .. })
    ));
    assert!(ctrl.begin_capture().is_err());
}

/// Summary から restart で Landing、自分の写真は残る
#[tokio::test(start_paused = true)]
async fn test_restart_from_summary() {
    let mut ctrl = controller(MockStore::returning(moments(1)));
    ctrl.submit_capture(test_image()).await.unwrap();
    ctrl.next().await;
    assert_eq!(ctrl.screen(), Screen::Summary);

    ctrl.restart().unwrap();
    assert_eq!(ctrl.screen(), Screen::Landing);
    assert!(ctrl.session().pool.is_empty());
    assert!(ctrl.session().self_id.is_none());
    assert!(ctrl.session().self_photo.is_some());

    ctrl.begin_capture().unwrap();
    assert_eq!(ctrl.screen(), Screen::Capturing);
}

/// リアクションは表示中のカードに付く
#[tokio::test(start_paused = true)]
async fn test_react_counts_on_current_card() {
    let mut ctrl = controller(MockStore::returning(moments(2)));
    ctrl.submit_capture(test_image()).await.unwrap();

    assert_eq!(ctrl.react("🔥"), Some(1));
    assert_eq!(ctrl.react("🔥"), Some(2));
    ctrl.next().await;
    assert_eq!(ctrl.react("🔥"), Some(1));
    assert_eq!(ctrl.session().pool[0].reactions.get("🔥"), Some(&2));
}

// =============================================
// 空プールのポリシー
// =============================================

#[tokio::test(start_paused = true)]
async fn test_empty_pool_placeholder_policy() {
    let mut cfg = config();
    cfg.empty_pool_policy = EmptyPoolPolicy::Placeholder;
    let mut ctrl = controller_with(Arc::new(MockStore::returning(Vec::new())), cfg);

    let outcome = ctrl.submit_capture(test_image()).await.unwrap();
    assert!(matches!(
        outcome,
        UploadOutcome::Swiping { count } if count > 0
    ));
    assert_eq!(ctrl.screen(), Screen::Swiping);
    assert!(ctrl.session().status.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_empty_pool_bounce_policy() {
    let mut cfg = config();
    cfg.empty_pool_policy = EmptyPoolPolicy::Bounce;
    cfg.status_pacing_ms = 0;
    let mut ctrl = controller_with(Arc::new(MockStore::returning(Vec::new())), cfg);

    let started = Instant::now();
    let outcome = ctrl.submit_capture(test_image()).await.unwrap();

    assert_eq!(outcome, UploadOutcome::Bounced);
    assert!(started.elapsed() >= Duration::from_millis(3000));
    assert_eq!(ctrl.screen(), Screen::Landing);
    assert_eq!(
        ctrl.session().status.as_deref(),
        Some(Language::En.messages().no_moments)
    );
}

// =============================================
// 外部呼び出し
// =============================================

/// 地名解決のタイムアウトは不明扱い
#[tokio::test(start_paused = true)]
async fn test_resolver_timeout_falls_back() {
    let mut ctrl = CaptureSessionController::new(
        Arc::new(MockStore::returning(moments(1))),
        Arc::new(SlowResolver),
        config(),
    );

    let location = ctrl.locate(35.68, 139.76).await.clone();
    assert_eq!(location.city, PlaceName::unknown().city);
    assert_eq!(location.latitude, 35.68);
    assert_eq!(location.longitude, 139.76);
}

/// 位置情報なしは地球
#[tokio::test(start_paused = true)]
async fn test_location_denied_is_global() {
    let mut ctrl = controller(MockStore::returning(Vec::new()));
    ctrl.locate_denied();
    ctrl.submit_capture(test_image()).await.unwrap();

    let summary = ctrl.summary().unwrap();
    assert_eq!(summary.self_location, Location::global());
}

/// 疑わしい判定は警告のみで続行
#[tokio::test(start_paused = true)]
async fn test_suspicious_verdict_is_advisory() {
    let checker = Arc::new(FixedChecker {
        verdict: Verdict {
            is_real: false,
            reason: "screenshot".into(),
        },
        delay: None,
        called: AtomicBool::new(false),
    });
    let (sink, mut events) = ProgressSink::channel();
    let mut ctrl = controller(MockStore::returning(moments(2)))
        .with_checker(checker.clone())
        .with_progress(sink);

    ctrl.submit_capture(test_image()).await.unwrap();
    assert!(checker.called.load(Ordering::SeqCst));
    assert_eq!(ctrl.screen(), Screen::Swiping);

    let mut warned = false;
    while let Ok(event) = events.try_recv() {
        if let ProgressEvent::Warning(message) = event {
            assert!(message.contains("screenshot"));
            warned = true;
        }
    }
    assert!(warned);
}

/// 真正性チェックのタイムアウトは素通り
#[tokio::test(start_paused = true)]
async fn test_checker_timeout_is_bypassed() {
    let checker = Arc::new(FixedChecker {
        verdict: Verdict {
            is_real: false,
            reason: "never seen".into(),
        },
        delay: Some(Duration::from_secs(60)),
        called: AtomicBool::new(false),
    });
    let mut ctrl = controller(MockStore::returning(moments(1))).with_checker(checker);

    let outcome = ctrl.submit_capture(test_image()).await.unwrap();
    assert_eq!(outcome, UploadOutcome::Swiping { count: 1 });
}

/// 同期のタイムアウトは空プール扱い
#[tokio::test(start_paused = true)]
async fn test_sync_timeout_is_empty_pool() {
    let store = Arc::new(MockStore::slow(Duration::from_secs(120)));
    let mut ctrl = controller_with(store.clone(), config());

    let outcome = ctrl.submit_capture(test_image()).await.unwrap();
    assert_eq!(outcome, UploadOutcome::Summary);
    assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    assert!(ctrl.session().self_id.is_none());
}

/// ステータスは決まった順に流れる
#[tokio::test(start_paused = true)]
async fn test_status_sequence() {
    let (sink, mut events) = ProgressSink::channel();
    let mut ctrl = controller(MockStore::returning(moments(1))).with_progress(sink);
    ctrl.submit_capture(test_image()).await.unwrap();

    let msgs = Language::En.messages();
    let mut statuses = Vec::new();
    let mut finished = None;
    while let Ok(event) = events.try_recv() {
        match event {
            ProgressEvent::Status(message) => statuses.push(message),
            ProgressEvent::Finished(screen) => finished = Some(screen),
            _ => {}
        }
    }
    assert_eq!(
        statuses,
        vec![
            msgs.loading_stamping.to_string(),
            msgs.loading_searching.to_string(),
            msgs.loading_connecting.to_string(),
        ]
    );
    assert_eq!(finished, Some(Screen::Swiping));
}

// =============================================
// 撮影デバイス
// =============================================

#[tokio::test(start_paused = true)]
async fn test_device_released_after_capture() {
    let mut device = MockDevice {
        image: Some(test_image()),
        ..Default::default()
    };
    let mut ctrl = controller(MockStore::returning(moments(1)));

    let outcome = ctrl.capture_from(&mut device).await.unwrap();
    assert!(outcome.is_some());
    assert_eq!(device.opened, 1);
    assert_eq!(device.released, 1);
    assert_eq!(ctrl.screen(), Screen::Swiping);
}

#[tokio::test(start_paused = true)]
async fn test_device_released_on_cancel() {
    let mut device = MockDevice::default();
    let mut ctrl = controller(MockStore::returning(moments(1)));

    let outcome = ctrl.capture_from(&mut device).await.unwrap();
    assert!(outcome.is_none());
    assert_eq!(device.released, 1);
    assert_eq!(ctrl.screen(), Screen::Landing);
}

#[tokio::test(start_paused = true)]
async fn test_device_released_on_error() {
    let mut device = MockDevice {
        fail_capture: true,
        ..Default::default()
    };
    let mut ctrl = controller(MockStore::returning(moments(1)));

    let result = ctrl.capture_from(&mut device).await;
    assert!(matches!(result, Err(MomentError::Capture(_))));
    assert_eq!(device.released, 1);
    assert_eq!(ctrl.screen(), Screen::Landing);
}

// =============================================
// ローカルストアとの結合
// =============================================

/// 2回目のセッションでは1回目の瞬間が見える
#[tokio::test(start_paused = true)]
async fn test_local_store_second_session_sees_first() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pool.json");

    let mut first = controller_with(Arc::new(LocalPoolStore::open(&path)), config());
    first.locate_denied();
    let outcome = first.submit_capture(test_image()).await.unwrap();
    assert_eq!(outcome, UploadOutcome::Summary);
    let first_id = first.session().self_id.clone().unwrap();

    let mut second = controller_with(Arc::new(LocalPoolStore::open(&path)), config());
    let outcome = second.submit_capture(test_image()).await.unwrap();
    assert_eq!(outcome, UploadOutcome::Swiping { count: 1 });
    assert_eq!(second.current().unwrap().id, first_id);
    assert_ne!(second.session().self_id.as_deref(), Some(first_id.as_str()));
}
