use clap::Parser;
use exam_buddy::app::App;
use exam_buddy::cli::Cli;
use exam_buddy::config::ConfigManager;
use exam_buddy::error::{AppError, Result};
use exam_buddy::notify::HeadlessNotifier;
use exam_buddy::page::Page;
use exam_buddy::types::Config;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

/// Granularity of the wait loop while the page is open
const POLL_INTERVAL_MS: u64 = 100;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    cli.validate().map_err(AppError::Other)?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(cli.log_file.as_deref())?;
    tracing::info!("=== Exam Buddy page runner starting ===");
    tracing::info!("Page: {}", cli.file);

    let config = load_config(&cli);
    let html = fs::read_to_string(&cli.file)?;

    let notifier = Arc::new(HeadlessNotifier::new(
        cli.permission_state().map_err(AppError::Other)?,
        Some(cli.request_answer()),
    ));
    let page = Page::from_html(&html, notifier);

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let app = App::boot(page.clone(), config, rng);

    for selector in &cli.clicks {
        tracing::info!("Clicking {}", selector);
        page.click(selector)?;
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        tracing::info!("Ctrl-C received, unloading page");
        r.store(false, Ordering::SeqCst);
    })
    .map_err(|e| AppError::Other(format!("Failed to set Ctrl-C handler: {}", e)))?;

    wait_for(Duration::from_secs(cli.duration), &running).await;

    app.shutdown();

    let output = page.with_document(|doc| doc.to_html());
    match &cli.output {
        Some(path) => {
            fs::write(path, output)?;
            tracing::info!("Wrote resulting page to {}", path);
        }
        None => println!("{}", output),
    }

    tracing::info!("Exam Buddy page runner shutting down");
    Ok(())
}

fn load_config(cli: &Cli) -> Config {
    let manager = match &cli.config {
        Some(path) => Ok(ConfigManager::at_path(path)),
        None => ConfigManager::new(),
    };

    let config = manager
        .and_then(|m| m.load_config())
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}. Using defaults.", e);
            Config::default()
        });
    tracing::debug!(
        "Config loaded: quote_interval_ms={}, reminder_interval_ms={}, start_reminders_on_grant={}",
        config.quote_interval_ms,
        config.reminder_interval_ms,
        config.start_reminders_on_grant
    );

    config
}

async fn wait_for(duration: Duration, running: &AtomicBool) {
    let deadline = Instant::now() + duration;
    let poll = Duration::from_millis(POLL_INTERVAL_MS);

    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        tokio::time::sleep(poll.min(deadline - now)).await;
    }
}

struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

fn init_logging(log_file: Option<&str>) -> Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("exam_buddy=info"));

    let Some(log_file) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_timer(LocalTime)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let path = Path::new(log_file);
    let file_name = path
        .file_name()
        .ok_or_else(|| AppError::Other(format!("Invalid log file path: {}", log_file)))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(LocalTime)
        .with_ansi(false)
        .with_writer(writer)
        .init();

    Ok(Some(guard))
}
