//! 進捗チャネル
//!
//! パイプラインは表示タイミングを知らない。ステータスはイベントとして流し、
//! 最後に Finished / Failed で終端する。

use super::Screen;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// パイプラインの段階表示
    Status(String),
    /// ストアなど協調先からの補足
    Detail(String),
    /// 処理は続行する警告
    Warning(String),
    Failed(String),
    Finished(Screen),
}

/// 送信側。受信側がいなくても送信は失敗扱いにしない
#[derive(Debug, Clone, Default)]
pub struct ProgressSink {
    tx: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl ProgressSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }

    pub fn detail(&self, message: impl Into<String>) {
        self.emit(ProgressEvent::Detail(message.into()));
    }
}
