pub mod models;
pub mod services;
pub mod api;

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use api::{build_router, AppState};
use services::{AppConfig, CompletionService, ConfigStore, ProviderClient};

static PROCESS_START: OnceLock<Instant> = OnceLock::new();
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const LOG_PREFIX: &str = "writing-tools_";
const LOGS_TO_KEEP: usize = 30;

fn startup_elapsed_ms() -> u128 {
    PROCESS_START
        .get()
        .map(|t| t.elapsed().as_millis())
        .unwrap_or(0)
}

fn env_flag(key: &str) -> bool {
    matches!(
        std::env::var(key).as_deref(),
        Ok("1") | Ok("true") | Ok("TRUE")
    )
}

/// Initialize logging with a timestamped log file per session plus console output.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if env_flag("WRITING_TOOLS_DISABLE_FILE_LOG") {
        init_console_logging_with(env_filter);
        info!("File logging disabled via WRITING_TOOLS_DISABLE_FILE_LOG");
        return;
    }

    let logs_dir = match std::env::var("WRITING_TOOLS_LOG_DIR") {
        Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
        _ => get_logs_dir(),
    };

    if let Err(e) = fs::create_dir_all(&logs_dir) {
        eprintln!("Failed to create logs directory: {}", e);
        init_console_logging_with(env_filter);
        info!("Falling back to console-only logging (log dir not writable)");
        return;
    }

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let log_filename = format!("{}{}.log", LOG_PREFIX, timestamp);

    // One file per session; writes go through the non-blocking worker.
    let file_appender = rolling::never(&logs_dir, &log_filename);
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(file_guard);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(cfg!(debug_assertions))
        .with_target(true);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    info!("=== Writing Tools Started ===");
    info!("Log file: {}", logs_dir.join(&log_filename).display());
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Cleanup off the startup path
    std::thread::spawn(move || {
        cleanup_old_logs(&logs_dir, LOGS_TO_KEEP);
    });
}

/// Console-only logging on stderr, for the offline tools.
pub fn init_console_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    init_console_logging_with(env_filter);
}

fn init_console_logging_with(env_filter: EnvFilter) {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(cfg!(debug_assertions))
        .with_target(true);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init();
}

fn get_logs_dir() -> PathBuf {
    #[cfg(debug_assertions)]
    {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("logs")
    }

    #[cfg(not(debug_assertions))]
    {
        if let Some(data_dir) = dirs::data_local_dir() {
            return data_dir.join("writing-tools").join("logs");
        }
        PathBuf::from("logs")
    }
}

fn cleanup_old_logs(logs_dir: &Path, keep: usize) {
    let mut entries: Vec<_> = match fs::read_dir(logs_dir) {
        Ok(rd) => rd.filter_map(|e| e.ok()).collect(),
        Err(_) => return,
    };

    entries.retain(|e| {
        let name = e.file_name().to_string_lossy().to_string();
        name.starts_with(LOG_PREFIX) && name.ends_with(".log")
    });

    if entries.len() <= keep {
        return;
    }

    entries.sort_by_key(|e| {
        e.metadata()
            .and_then(|m| m.modified())
            .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
    });

    let remove_count = entries.len().saturating_sub(keep);
    for entry in entries.into_iter().take(remove_count) {
        let _ = fs::remove_file(entry.path());
    }
}

/// Command-line overrides for the server.
#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    pub config_dir: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

pub fn config_store(config_dir: Option<PathBuf>) -> anyhow::Result<ConfigStore> {
    let dir = config_dir
        .or_else(ConfigStore::default_config_dir)
        .context("no config directory available; pass --config <dir>")?;
    Ok(ConfigStore::new(dir))
}

/// Effective configuration: file, then environment, then command line.
pub fn load_config(options: &ServerOptions) -> anyhow::Result<AppConfig> {
    let store = config_store(options.config_dir.clone())?;
    let mut config = store.load().map_err(anyhow::Error::msg)?;
    config.apply_env_overrides();
    if let Some(host) = &options.host {
        config.server.host = host.clone();
    }
    if let Some(port) = options.port {
        config.server.port = port;
    }
    Ok(config)
}

/// Completion client for the config, `None` when no API key is set.
pub fn build_completer(config: &AppConfig) -> anyhow::Result<Option<Arc<dyn CompletionService>>> {
    let client = ProviderClient::from_config(config).context("failed to build completion client")?;
    Ok(client.map(|c| Arc::new(c) as Arc<dyn CompletionService>))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("=== Writing Tools Shutting Down ===");
}

pub async fn run(options: ServerOptions) -> anyhow::Result<()> {
    PROCESS_START.get_or_init(Instant::now);

    let logging_t0 = Instant::now();
    init_logging();
    info!(
        startup_ms = startup_elapsed_ms(),
        logging_ms = logging_t0.elapsed().as_millis(),
        "logging.initialized"
    );

    let config = load_config(&options)?;
    let completer = build_completer(&config)?;
    match &completer {
        Some(c) => info!("[SERVER] completion model: {}", c.label()),
        None => warn!("[SERVER] no API key configured, every tool uses its local fallback"),
    }

    let app = build_router(AppState::new(completer));
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(startup_ms = startup_elapsed_ms(), addr = %addr, "server.listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("=== Writing Tools Exited ===");
    Ok(())
}
