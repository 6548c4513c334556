use crate::session::Screen;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MomentError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`moment-exchange config --set-api-key YOUR_KEY` または GEMINI_API_KEY で設定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("ストアエラー: {0}")]
    Store(String),

    #[error("撮影デバイスエラー: {0}")]
    Capture(String),

    #[error("{from:?} では {action} を実行できません")]
    InvalidTransition { from: Screen, action: &'static str },

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] moment_exchange_common::Error),
}

pub type Result<T> = std::result::Result<T, MomentError>;
