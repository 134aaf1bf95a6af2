use anyhow::Result;
use clap::Parser;
use reviewd::clients::{GitLabClient, JiraClient};
use reviewd::config::ReviewdConfig;
use reviewd::notify::SmtpNotifier;
use reviewd::rest;
use reviewd::review::{Aggregator, EventProcessor};
use reviewd::AppContext;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "reviewd",
    about = "reviewd — AI merge-request review daemon",
    version
)]
struct Args {
    /// Path to a TOML config file (default: ./reviewd.toml when present)
    #[arg(long, env = "REVIEWD_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// HTTP port for the webhook server
    #[arg(long, env = "REVIEWD_PORT")]
    port: Option<u16>,

    /// Bind address (default: 127.0.0.1; use 0.0.0.0 to accept external webhooks)
    #[arg(long, env = "REVIEWD_BIND")]
    bind_address: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "REVIEWD_LOG")]
    log: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "REVIEWD_LOG_FILE")]
    log_file: Option<std::path::PathBuf>,

    /// Log format: "pretty" (default) or "json"
    #[arg(long, env = "REVIEWD_LOG_FORMAT")]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ReviewdConfig::load(
        args.config.as_deref(),
        args.port,
        args.bind_address,
        args.log,
        args.log_file,
        args.log_format,
    )?;

    let _guard = setup_logging(&config.log, config.log_file.as_deref(), &config.log_format);
    info!("reviewd v{} starting", env!("CARGO_PKG_VERSION"));

    let issue_tracker = Arc::new(JiraClient::new(&config.jira));
    let code_host = Arc::new(GitLabClient::new(&config.gitlab));
    let notifier = Arc::new(SmtpNotifier::new(&config.notify));
    let processor = EventProcessor::new(
        Aggregator::default_set(),
        issue_tracker,
        code_host,
        notifier,
    );

    let ctx = Arc::new(AppContext::new(config, processor));
    rest::serve(ctx).await
}

/// Initialize the tracing subscriber.
/// If `log_file` is set, logs go to both stdout and a daily-rolling file.
/// Returns a `WorkerGuard` that must stay alive for the process lifetime.
///
/// If the log directory cannot be created, falls back to stdout-only logging
/// with a warning — never panics.
fn setup_logging(
    log_level: &str,
    log_file: Option<&std::path::Path>,
    log_format: &str,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let use_json = log_format == "json";

    if let Some(path) = log_file {
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let filename = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("reviewd.log"));

        // Ensure the directory exists before tracing-appender tries to open it.
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!(
                "warn: could not create log directory '{}': {e} — falling back to stdout",
                dir.display()
            );
            if use_json {
                tracing_subscriber::fmt().json().with_env_filter(log_level).init();
            } else {
                tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
            }
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        if use_json {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().json())
                .with(fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().compact())
                .with(fmt::layer().with_writer(non_blocking))
                .init();
        }

        Some(guard)
    } else if use_json {
        tracing_subscriber::fmt().json().with_env_filter(log_level).init();
        None
    } else {
        tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
        None
    }
}
