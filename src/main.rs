use anyhow::{bail, Context};
use clap::Parser;
use indicatif::ProgressBar;
use moment_exchange::authenticity::{AuthenticityChecker, GeminiAuthenticityChecker};
use moment_exchange::capture::{CapturedImage, FileCapture};
use moment_exchange::cli::{Cli, Commands};
use moment_exchange::config::Config;
use moment_exchange::error::MomentError;
use moment_exchange::gemini::GeminiClient;
use moment_exchange::location::{FixedLocationResolver, GeminiLocationResolver, LocationResolver};
use moment_exchange::session::{
    CaptureSessionController, ProgressEvent, ProgressSink, Screen, SessionSummary, UploadOutcome,
};
use moment_exchange::store::LocalPoolStore;
use moment_exchange_common::{Language, Moment, REACTIONS};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load()?;
    if let Some(lang) = cli.lang {
        config.session.language = lang;
    }
    if let Some(store) = &cli.store {
        config.store_path = Some(store.clone());
    }
    let lang = config.session.language;
    let msgs = lang.messages();

    match cli.command {
        Commands::Share { photo, lat, lng, verify, offline } => {
            println!("📸 {} - {}\n", msgs.title, msgs.tagline);

            let pool_path = config.pool_path()?;
            let store = Arc::new(
                LocalPoolStore::open(&pool_path).with_exchange_limit(config.session.max_pool_size),
            );

            let client = if offline {
                None
            } else {
                match GeminiClient::from_config(&config) {
                    Ok(client) => Some(client),
                    Err(MomentError::MissingApiKey) => {
                        println!("⚠ APIキー未設定のためオフラインで続行します");
                        None
                    }
                    Err(e) => return Err(e.into()),
                }
            };

            let resolver: Arc<dyn LocationResolver> = match &client {
                Some(client) => Arc::new(GeminiLocationResolver::new(client.clone())),
                None => Arc::new(FixedLocationResolver::unknown()),
            };
            let checker: Option<Arc<dyn AuthenticityChecker>> = match client {
                Some(client) if verify || config.verify_authenticity => {
                    Some(Arc::new(GeminiAuthenticityChecker::new(client)))
                }
                _ => None,
            };

            let (sink, mut events) = ProgressSink::channel();
            let mut controller =
                CaptureSessionController::new(store, resolver, config.session.clone())
                    .with_progress(sink);
            if let Some(checker) = checker {
                controller = controller.with_checker(checker);
            }

            // 1. 位置
            println!("[1/3] 位置を解決中...");
            let mut device = FileCapture::new(&photo, config.max_image_size);
            let coords = match (lat, lng) {
                (Some(lat), Some(lng)) => Some((lat, lng)),
                _ => device.gps(),
            };
            match coords {
                Some((lat, lng)) => {
                    let location = controller.locate(lat, lng).await;
                    println!(
                        "✔ {}, {} ({:.4}, {:.4})\n",
                        location.city_name(lang),
                        location.country_name(lang),
                        lat,
                        lng
                    );
                }
                None => {
                    controller.locate_denied();
                    println!("✔ 位置情報なし\n");
                }
            }

            // 2. 共有
            println!("[2/3] 共有中...");
            let spinner = ProgressBar::new_spinner();
            spinner.enable_steady_tick(Duration::from_millis(100));
            let bar = spinner.clone();
            let verbose = cli.verbose;
            let printer = tokio::spawn(async move {
                while let Some(event) = events.recv().await {
                    match event {
                        ProgressEvent::Status(message) => bar.set_message(message),
                        ProgressEvent::Detail(message) if verbose => {
                            bar.println(format!("  {}", message))
                        }
                        ProgressEvent::Detail(_) => {}
                        ProgressEvent::Warning(message) => bar.println(format!("⚠ {}", message)),
                        ProgressEvent::Failed(message) => bar.println(format!("✖ {}", message)),
                        ProgressEvent::Finished(_) => {}
                    }
                }
            });

            let outcome = controller
                .capture_from(&mut device)
                .await
                .with_context(|| format!("写真を読み込めません: {}", photo.display()))?;
            spinner.finish_and_clear();

            match outcome {
                None => {
                    println!("キャンセルしました");
                    printer.abort();
                    return Ok(());
                }
                Some(UploadOutcome::Failed { reason }) => {
                    printer.abort();
                    bail!(reason);
                }
                Some(UploadOutcome::Bounced) => {
                    println!("{}", msgs.no_moments);
                    printer.abort();
                    return Ok(());
                }
                Some(UploadOutcome::Swiping { count }) => {
                    println!("✔ {}\n", msgs.low_moments(count))
                }
                Some(UploadOutcome::Summary) => println!("✔ {}\n", msgs.no_moments),
            }

            // 3. 交換
            if controller.screen() == Screen::Swiping {
                println!("[3/3] 交換");
            }
            while controller.screen() == Screen::Swiping {
                let Some(current) = controller.current().cloned() else {
                    break;
                };
                let total = controller.session().pool.len();
                let index = controller.session().cursor + 1;
                print_card(&current, index, total, lang);

                let mut items = vec![if index == total { msgs.finish_journey } else { msgs.next }];
                items.extend(REACTIONS.iter().copied());

                let choice = dialoguer::Select::new()
                    .items(&items)
                    .default(0)
                    .interact()?;

                if choice == 0 {
                    controller.next().await;
                } else if let Some(count) = controller.react(REACTIONS[choice - 1]) {
                    println!("  {} ×{}", REACTIONS[choice - 1], count);
                }
            }

            if let Some(summary) = controller.summary() {
                print_summary(&summary, lang);
            }
            printer.abort();
        }

        Commands::Pool { limit } => {
            let pool_path = config.pool_path()?;
            let store = LocalPoolStore::open(&pool_path);
            let moments = store.moments().await;

            println!("プール: {} ({}件)", pool_path.display(), moments.len());
            for moment in moments.iter().take(limit) {
                println!(
                    "  {}  {}  {}, {}  {}",
                    moment.id,
                    format_time(&moment.timestamp),
                    moment.location.city_name(lang),
                    moment.location.country_name(lang),
                    moment.reaction_total()
                );
            }
        }

        Commands::Locate { lat, lng } => {
            let resolver = GeminiLocationResolver::new(GeminiClient::from_config(&config)?);
            let place = resolver.resolve(lat, lng).await;
            println!("{}, {}", place.city, place.country);
            println!("{}, {}", place.city_localized, place.country_localized);
        }

        Commands::Verify { photo } => {
            let image = CapturedImage::from_path(&photo, config.max_image_size)?;
            let checker = GeminiAuthenticityChecker::new(GeminiClient::from_config(&config)?);
            let verdict = checker.check(&image).await;
            let mark = if verdict.is_real { "✔" } else { "✖" };
            println!("{} real={} {}", mark, verdict.is_real, verdict.reason);
        }

        Commands::Config { set_api_key, show } => {
            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  最大画像サイズ: {}px", config.max_image_size);
                println!("  プール: {}", config.pool_path()?.display());
                println!("  閲覧上限: {}件", config.session.max_pool_size);
                println!("  空プール時: {:?}", config.session.empty_pool_policy);
                println!("  言語: {}", config.session.language);
                let key_status = if config.get_api_key().is_ok() {
                    "設定済み"
                } else {
                    "未設定"
                };
                println!("  APIキー: {}", key_status);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn format_time(timestamp: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.with_timezone(&chrono::Local).format("%H:%M").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

fn print_card(moment: &Moment, index: usize, total: usize, lang: Language) {
    println!(
        "\n📍 {}  {} • {}/{}  {}",
        moment.location.city_name(lang),
        moment.location.country_name(lang),
        index,
        total,
        format_time(&moment.timestamp)
    );
    if moment.image_url.starts_with("data:") {
        println!("   (inline image, {} bytes)", moment.image_url.len());
    } else {
        println!("   {}", moment.image_url);
    }
    if !moment.caption.is_empty() {
        println!("   \"{}\"", moment.caption);
    }
}

fn print_summary(summary: &SessionSummary, lang: Language) {
    let msgs = lang.messages();
    println!("\n== {} ==", msgs.summary_title);
    println!("{}\n", msgs.summary_desc);
    println!(
        "  {}: {}, {}",
        msgs.you_shared,
        summary.self_location.city_name(lang),
        summary.self_location.country_name(lang)
    );
    if let Some(featured) = &summary.featured {
        println!(
            "  {}: {}, {}",
            msgs.most_distant,
            featured.location.city_name(lang),
            featured.location.country_name(lang)
        );
    }
    println!("\n{}", summary.message);
    println!("\n{}", msgs.come_back);
}
