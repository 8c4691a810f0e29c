use anyhow::Result;
use butikd::rest::admin::AdminToken;
use butikd::{config::StoreConfig, rest, storage::Storage, AppContext};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "butikd",
    about = "Butik Host — storefront backend daemon",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// REST API port
    #[arg(long, env = "BUTIKD_PORT")]
    port: Option<u16>,

    /// Data directory for config, admin token, and SQLite database
    #[arg(long, env = "BUTIKD_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "BUTIKD_LOG")]
    log: Option<String>,

    /// Bind address (default: 127.0.0.1; use 0.0.0.0 for LAN access)
    #[arg(long, env = "BUTIKD_BIND")]
    bind_address: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "BUTIKD_LOG_FILE")]
    log_file: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the storefront daemon (default when no subcommand given).
    Serve,
    /// Print the admin bearer token for this data dir.
    Token,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| StoreConfig::default().data_dir);
    let mut config = StoreConfig::load(&data_dir)?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(log) = args.log {
        config.log = log;
    }
    if let Some(bind) = args.bind_address {
        config.bind_address = bind;
    }
    if let Some(log_file) = args.log_file {
        config.log_file = Some(log_file);
    }

    match args.command.unwrap_or(Command::Serve) {
        Command::Token => {
            let token = AdminToken::load_or_generate(&config)?;
            println!("{}", token.reveal());
            Ok(())
        }
        Command::Serve => {
            let _guard = setup_logging(&config.log, config.log_file.as_deref());
            serve(config).await
        }
    }
}

async fn serve(config: StoreConfig) -> Result<()> {
    info!("butikd {} starting", env!("CARGO_PKG_VERSION"));

    let storage = Arc::new(Storage::new(&config.data_dir).await?);
    let admin = AdminToken::load_or_generate(&config)?;
    let ctx = Arc::new(AppContext::new(Arc::new(config), storage, admin));

    info!("data dir: {}", ctx.config.data_dir.display());
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
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    if let Some(path) = log_file {
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let filename = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("butikd.log"));

        // Ensure the directory exists before tracing-appender tries to open it.
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!(
                "warn: could not create log directory '{}': {e} — falling back to stdout",
                dir.display()
            );
            tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        tracing_subscriber::registry()
            .with(EnvFilter::new(log_level))
            .with(fmt::layer().compact())
            .with(fmt::layer().with_writer(non_blocking))
            .init();

        Some(guard)
    } else {
        tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
        None
    }
}
