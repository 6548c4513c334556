use super::Session;
use crate::capture::CapturedImage;
use moment_exchange_common::{Language, Location, Moment};
use std::collections::HashSet;

/// サマリー画面の表示内容
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub self_photo: Option<CapturedImage>,
    pub self_location: Location,
    /// 先頭の瞬間（「最遠の連結」欄）
    pub featured: Option<Moment>,
    pub people: usize,
    pub countries: usize,
    pub message: String,
}

impl SessionSummary {
    pub fn from_session(session: &Session, lang: Language) -> Self {
        let countries: HashSet<&str> = session
            .pool
            .iter()
            .map(|m| m.location.country.as_str())
            .collect();
        let people = session.pool.len();

        Self {
            self_photo: session.self_photo.clone(),
            self_location: session.self_location.clone().unwrap_or_else(Location::global),
            featured: session.pool.first().cloned(),
            people,
            countries: countries.len(),
            message: lang.messages().connection_message(people, countries.len()),
        }
    }
}
