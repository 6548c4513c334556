//! APIレスポンスパーサー
//!
//! Gemini APIのレスポンスからJSONを抽出し、
//! 逆ジオコーディング結果・真正性判定をパースする

use crate::error::{Error, Result};
use crate::types::{PlaceName, Verdict};

/// APIレスポンスからJSON部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 生の {...} オブジェクト
/// 3. エラー
///
/// # Examples
/// ```
/// use moment_exchange_common::extract_json;
///
/// let response = "Result: {\"city\": \"Taipei\"}";
/// let json = extract_json(response).unwrap();
/// assert_eq!(json, "{\"city\": \"Taipei\"}");
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    // ```json ... ``` ブロックを探す
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    // 生の {...} を探す
    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end >= start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(Error::Parse("JSONが見つかりません".into()))
}

/// 逆ジオコーディングのレスポンスをパース
pub fn parse_place_response(response: &str) -> Result<PlaceName> {
    let json_str = extract_json(response)?;
    let place: PlaceName = serde_json::from_str(json_str.trim())
        .map_err(|e| Error::Parse(format!("地名 JSONパースエラー: {}", e)))?;
    Ok(place)
}

/// 真正性チェックのレスポンスをパース
pub fn parse_verdict_response(response: &str) -> Result<Verdict> {
    let json_str = extract_json(response)?;
    let verdict: Verdict = serde_json::from_str(json_str.trim())
        .map_err(|e| Error::Parse(format!("判定 JSONパースエラー: {}", e)))?;
    Ok(verdict)
}
