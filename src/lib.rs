//! Moment Exchange
//!
//! 写真を撮って位置情報を付け、共有プールに送り、
//! 他の人の瞬間をスワイプで眺めてサマリーで終わるセッションのコア。

pub mod authenticity;
pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod gemini;
pub mod location;
pub mod session;
pub mod store;

pub use error::{MomentError, Result};
pub use moment_exchange_common::{Language, Location, Moment, PlaceName, Verdict};
