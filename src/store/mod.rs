//! 瞬間プールのストア
//!
//! 保存と同時にプールの最新スナップショットを返す `save_and_sync` が唯一の契約。
//! プールは全ユーザー共有で、書き込みの整合性はストア側に任せる。

mod local;
mod placeholder;

pub use local::{LocalPoolStore, Retention};
pub use placeholder::placeholder_moments;

use crate::capture::CapturedImage;
use crate::error::Result;
use crate::session::ProgressSink;
use async_trait::async_trait;
use moment_exchange_common::{Location, Moment};

/// `save_and_sync` の結果
#[derive(Debug, Clone, PartialEq)]
pub struct SyncResult {
    /// 他ユーザーの瞬間（新しい順）
    pub pool: Vec<Moment>,
    /// 今回保存した瞬間のID
    pub self_id: String,
}

#[async_trait]
pub trait PoolStore: Send + Sync {
    /// 瞬間を保存し、自分以外のプールを返す
    ///
    /// 設定不備・ネットワーク・保存失敗はエラー（呼び出し側で失敗経路へ）
    async fn save_and_sync(
        &self,
        image: &CapturedImage,
        location: &Location,
        progress: &ProgressSink,
    ) -> Result<SyncResult>;
}
