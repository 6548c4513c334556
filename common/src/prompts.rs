//! プロンプト生成モジュール
//!
//! - build_location_prompt: 座標 → 都市/国名（英語 + 繁体字）
//! - build_authenticity_prompt: 撮影写真の真正性判定

/// 逆ジオコーディング用プロンプト生成
///
/// # Arguments
/// * `latitude` / `longitude` - 撮影地点の座標
pub fn build_location_prompt(latitude: f64, longitude: f64) -> String {
    format!(
        r#"Identify the approximate City and Country for these coordinates: Lat {latitude}, Lng {longitude}.
Return the names in both English and Traditional Chinese (Taiwan variant).

Output ONLY a JSON object exactly in this format:
{{"city": "...", "country": "...", "city_zh": "...", "country_zh": "..."}}"#
    )
}

/// 真正性判定用プロンプト生成
///
/// スクリーンショット、画面の再撮影、ストックフォト、AI生成画像を「非真正」とする
pub fn build_authenticity_prompt() -> String {
    r#"You are reviewing a photo that a user claims to have just taken with their own camera.
Decide whether it is a genuine, first-hand capture.

Treat the following as NOT real:
- screenshots or photos of a screen
- stock photos or images with watermarks
- AI-generated or heavily edited images

Output ONLY a JSON object exactly in this format:
{"isReal": true, "reason": "short explanation"}"#
        .to_string()
}
