//! 表示メッセージ（英語 / 繁体字中国語）

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Zh,
}

impl Language {
    pub fn messages(self) -> &'static Messages {
        match self {
            Language::En => &EN,
            Language::Zh => &ZH,
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "zh" | "zh-tw" | "chinese" => Ok(Language::Zh),
            _ => Err(format!("Unknown language: {}. Use en or zh", s)),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::En => write!(f, "en"),
            Language::Zh => write!(f, "zh"),
        }
    }
}

/// 画面・ステータス表示用の文言
#[derive(Debug)]
pub struct Messages {
    pub title: &'static str,
    pub tagline: &'static str,
    pub loading_stamping: &'static str,
    pub loading_searching: &'static str,
    pub loading_connecting: &'static str,
    pub loading_finalizing: &'static str,
    pub suspicious_capture: &'static str,
    pub upload_failed: &'static str,
    pub no_moments: &'static str,
    pub summary_title: &'static str,
    pub summary_desc: &'static str,
    pub you_shared: &'static str,
    pub most_distant: &'static str,
    pub next: &'static str,
    pub finish_journey: &'static str,
    pub come_back: &'static str,
    low_moments: fn(usize) -> String,
    connection: fn(usize, usize) -> String,
}

impl Messages {
    /// プール件数の案内
    pub fn low_moments(&self, count: usize) -> String {
        (self.low_moments)(count)
    }

    /// サマリー画面の接続メッセージ
    pub fn connection_message(&self, people: usize, countries: usize) -> String {
        (self.connection)(people, countries)
    }
}

static EN: Messages = Messages {
    title: "WorldSwap",
    tagline: "100% Real Moments. No fakes. No stock photos.",
    loading_stamping: "Stamping location...",
    loading_searching: "Accessing the world pool...",
    loading_connecting: "Fetching real moments...",
    loading_finalizing: "Verifying authenticity...",
    suspicious_capture: "This capture looks unusual, sharing anyway.",
    upload_failed: "Upload failed",
    no_moments: "The world is quiet right now. You are the first to share today!",
    summary_title: "Connection Summary",
    summary_desc: "The real people and places you connected with.",
    you_shared: "You Shared",
    most_distant: "Most Distant",
    next: "NEXT",
    finish_journey: "Finish Journey",
    come_back: "Share another moment",
    low_moments: en_low_moments,
    connection: en_connection,
};

fn en_low_moments(n: usize) -> String {
    format!("Found {} other real moments in the pool.", n)
}

fn en_connection(n: usize, c: usize) -> String {
    if n == 0 {
        "You are the first explorer today. Your moment is now waiting for the next person.".to_string()
    } else {
        format!("You connected with {} real people across {} countries.", n, c)
    }
}

static ZH: Messages = Messages {
    title: "視界交換",
    tagline: "把你眼前的視界，和世界上的陌生人交換",
    loading_stamping: "正在標記位置...",
    loading_searching: "正在訪問全球照片池...",
    loading_connecting: "獲取真實瞬間中...",
    loading_finalizing: "驗證真實性...",
    suspicious_capture: "這張照片看起來不尋常，仍然繼續分享。",
    upload_failed: "上傳失敗",
    no_moments: "目前世界上沒有其他人的瞬間. 你是今天的第一位探索者。",
    summary_title: "交換總結",
    summary_desc: "你今天在世界上建立的真實連結。",
    you_shared: "你分享的瞬間",
    most_distant: "最遠的連結",
    next: "下一個",
    finish_journey: "結束旅程",
    come_back: "再次分享瞬間",
    low_moments: zh_low_moments,
    connection: zh_connection,
};

fn zh_low_moments(n: usize) -> String {
    format!("目前池中僅有 {} 個其他真實瞬間。", n)
}

fn zh_connection(n: usize, c: usize) -> String {
    if n == 0 {
        "目前池中沒有其他瞬間。你是今天的第一位探索者，你的照片已為下一位用戶準備就緒。".to_string()
    } else {
        format!("你今天與來自 {} 個國家的 {} 位真實用戶建立了連結。", c, n)
    }
}
