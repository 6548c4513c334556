use clap::{Parser, Subcommand};
use moment_exchange_common::Language;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "moment-exchange")]
#[command(about = "写真で世界の誰かと瞬間を交換する", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 表示言語 (en/zh)
    #[arg(long, global = true)]
    pub lang: Option<Language>,

    /// プールファイル（省略時は設定値）
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真を共有して他の人の瞬間を眺める
    Share {
        /// 写真ファイルのパス
        #[arg(required = true)]
        photo: PathBuf,

        /// 撮影地点の緯度（省略時はEXIFのGPS）
        #[arg(long, allow_hyphen_values = true, requires = "lng")]
        lat: Option<f64>,

        /// 撮影地点の経度
        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lng: Option<f64>,

        /// 共有前に真正性チェックを行う
        #[arg(long)]
        verify: bool,

        /// Gemini を使わずに実行（地名は不明扱い）
        #[arg(long)]
        offline: bool,
    },

    /// ローカルプールの一覧
    Pool {
        /// 表示件数
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// 座標から地名を解決
    Locate {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },

    /// 写真の真正性をチェック
    Verify {
        /// 写真ファイルのパス
        #[arg(required = true)]
        photo: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_share_with_negative_coordinates() {
        let cli = Cli::parse_from([
            "moment-exchange",
            "share",
            "me.jpg",
            "--lat",
            "-33.86",
            "--lng",
            "151.2",
            "--lang",
            "en",
        ]);
        assert_eq!(cli.lang, Some(Language::En));
        match cli.command {
            Commands::Share { photo, lat, lng, verify, offline } => {
                assert_eq!(photo, PathBuf::from("me.jpg"));
                assert_eq!(lat, Some(-33.86));
                assert_eq!(lng, Some(151.2));
                assert!(!verify);
                assert!(!offline);
            }
            _ => panic!("Expected Share"),
        }
    }

    #[test]
    fn test_lat_requires_lng() {
        let result = Cli::try_parse_from(["moment-exchange", "share", "me.jpg", "--lat", "10"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_pool_default_limit() {
        let cli = Cli::parse_from(["moment-exchange", "pool"]);
        assert!(matches!(cli.command, Commands::Pool { limit: 20 }));
    }
}
