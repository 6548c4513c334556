use std::future::Future;
use std::time::Duration;

/// `limit` 以内に終わった場合のみ結果を返す。`Duration::ZERO` は無制限
pub async fn with_deadline<F: Future>(limit: Duration, fut: F) -> Option<F::Output> {
    if limit.is_zero() {
        return Some(fut.await);
    }
    tokio::time::timeout(limit, fut).await.ok()
}
