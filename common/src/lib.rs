//! Moment Exchange Common Library
//!
//! CLIとセッションコアで共有される型とユーティリティ

pub mod types;
pub mod error;
pub mod i18n;
pub mod parser;
pub mod prompts;

pub use types::{Location, Moment, PlaceName, Verdict, REACTIONS};
pub use error::{Error, Result};
pub use i18n::{Language, Messages};
pub use parser::{extract_json, parse_place_response, parse_verdict_response};
pub use prompts::{build_location_prompt, build_authenticity_prompt};
