//! ローカルプールストア
//!
//! プール全体を1つのJSONファイルに保存する（パス省略時はメモリのみ）。
//! 保持ポリシー: 最新N件 + 最古M件を残し、その間を捨てる。

use super::{PoolStore, SyncResult};
use crate::capture::CapturedImage;
use crate::error::{MomentError, Result};
use crate::session::ProgressSink;
use async_trait::async_trait;
use moment_exchange_common::{Location, Moment};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// プールファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PoolFile {
    /// バージョン（互換性チェック用）
    version: u32,
    /// 新しい順
    moments: Vec<Moment>,
}

impl PoolFile {
    const CURRENT_VERSION: u32 = 1;

    fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("プールファイルを開けません ({}): {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_reader::<_, PoolFile>(BufReader::new(file)) {
            Ok(pool) if pool.version == Self::CURRENT_VERSION => pool,
            Ok(pool) => {
                tracing::warn!("プールバージョン不一致 ({})、空のプールから開始します", pool.version);
                Self::default()
            }
            Err(e) => {
                tracing::warn!("プールファイルが壊れています ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// 一時ファイルに書いて fsync してから置き換える
    fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = tmp_path_for(path);
        let result = File::create(&tmp_path)
            .map_err(Into::into)
            .and_then(|file| self.write_to(file))
            .and_then(|file| {
                file.sync_all()?;
                drop(file);
                std::fs::rename(&tmp_path, path)?;
                Ok(())
            });

        if result.is_err() {
            let _ = std::fs::remove_file(&tmp_path);
        }
        result
    }

    /// バッファを明示的に flush し、書き込みエラーを取りこぼさない
    fn write_to<W: Write>(&self, writer: W) -> Result<W> {
        let mut writer = BufWriter::new(writer);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        writer.into_inner().map_err(|e| e.into_error().into())
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

impl Default for PoolFile {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            moments: Vec::new(),
        }
    }
}

/// 保持ポリシー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retention {
    pub keep_latest: usize,
    pub keep_oldest: usize,
}

impl Default for Retention {
    fn default() -> Self {
        Self {
            keep_latest: 10,
            keep_oldest: 5,
        }
    }
}

impl Retention {
    /// 新しい順のリストに適用する
    pub fn apply(&self, moments: &mut Vec<Moment>) {
        let cap = self.keep_latest + self.keep_oldest;
        if moments.len() <= cap {
            return;
        }
        let evicted = moments.len() - cap;
        moments.drain(self.keep_latest..self.keep_latest + evicted);
        tracing::debug!("保持ポリシーで {} 件を破棄", evicted);
    }
}

pub struct LocalPoolStore {
    path: Option<PathBuf>,
    pool: Mutex<PoolFile>,
    retention: Retention,
    exchange_limit: usize,
    sequence: AtomicU64,
}

impl LocalPoolStore {
    /// ファイルに永続化するストア
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let pool = PoolFile::load(&path);
        tracing::debug!("プールを読み込み: {} ({}件)", path.display(), pool.moments.len());
        Self::with_pool(Some(path), pool)
    }

    /// 永続化しないストア
    pub fn in_memory() -> Self {
        Self::with_pool(None, PoolFile::default())
    }

    fn with_pool(path: Option<PathBuf>, pool: PoolFile) -> Self {
        Self {
            path,
            pool: Mutex::new(pool),
            retention: Retention::default(),
            exchange_limit: 30,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn with_retention(mut self, retention: Retention) -> Self {
        self.retention = retention;
        self
    }

    /// 1回の同期で返す最大件数
    pub fn with_exchange_limit(mut self, limit: usize) -> Self {
        self.exchange_limit = limit;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// プール全体（新しい順）
    pub async fn moments(&self) -> Vec<Moment> {
        self.pool.lock().await.moments.clone()
    }

    pub async fn len(&self) -> usize {
        self.pool.lock().await.moments.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn next_id(&self, image: &CapturedImage, timestamp: &str, taken: &[Moment]) -> String {
        loop {
            let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
            let mut hasher = Sha256::new();
            hasher.update(image.base64_payload().as_bytes());
            hasher.update(timestamp.as_bytes());
            hasher.update(seq.to_le_bytes());
            let id = hex::encode(&hasher.finalize()[..6]);
            if !taken.iter().any(|m| m.id == id) {
                return id;
            }
        }
    }
}

#[async_trait]
impl PoolStore for LocalPoolStore {
    async fn save_and_sync(
        &self,
        image: &CapturedImage,
        location: &Location,
        progress: &ProgressSink,
    ) -> Result<SyncResult> {
        let mut pool = self.pool.lock().await;

        let timestamp = chrono::Utc::now().to_rfc3339();
        let id = self.next_id(image, &timestamp, &pool.moments);

        let moment = Moment {
            id: id.clone(),
            image_url: image.data_url().to_string(),
            location: location.clone(),
            timestamp,
            caption: String::new(),
            reactions: Default::default(),
        };

        let mut updated = pool.moments.clone();
        updated.insert(0, moment);
        self.retention.apply(&mut updated);

        if let Some(path) = &self.path {
            progress.detail(format!("Saving to {}", path.display()));
            let file = PoolFile {
                moments: updated.clone(),
                ..PoolFile::default()
            };
            let target = path.clone();
            tokio::task::spawn_blocking(move || file.save(&target))
                .await
                .map_err(|e| MomentError::Store(format!("保存タスクが異常終了: {}", e)))?
                .map_err(|e| MomentError::Store(format!("{}: {}", path.display(), e)))?;
        }
        // 書き込みに成功してからメモリに反映
        pool.moments = updated;

        let others: Vec<Moment> = pool
            .moments
            .iter()
            .filter(|m| m.id != id)
            .take(self.exchange_limit)
            .cloned()
            .collect();
        progress.detail(format!("{} moments in the pool", others.len()));

        Ok(SyncResult {
            pool: others,
            self_id: id,
        })
    }
}
