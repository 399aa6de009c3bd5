use color_eyre::eyre::{Result, eyre};
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;

mod client;
mod ui;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const USAGE: &str = "\
lucky-wheel: spin the prize wheel from your terminal

Usage: lucky-wheel [options]

Options:
  --server-url <url>   Wheel server base URL (default http://localhost:8000/wheel)
  --silent             Disable tick and win sounds
  --poll-secs <n>      Wheel version poll interval in seconds (default 15)
  --spin-ms <n>        Fixed spin duration instead of the randomized one
  --help               Show this message
";

fn init_logging() {
    // Terminal output belongs to the TUI; logs go to a daily file.
    let (writer, guard) = tracing_appender::non_blocking(rolling::daily("logs", "lucky-wheel.log"));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    let _ = LOG_GUARD.set(guard);
}

fn parse_args() -> Result<Option<client::AppConfig>> {
    let mut config = client::AppConfig::default();
    let mut server_url_seen = false;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print!("{USAGE}");
                return Ok(None);
            }
            "--server-url" => {
                if server_url_seen {
                    return Err(eyre!("--server-url given twice"));
                }
                server_url_seen = true;
                config.server_url = args
                    .next()
                    .ok_or_else(|| eyre!("--server-url needs a value"))?;
            }
            "--silent" => config.silent = true,
            "--poll-secs" => {
                let raw = args
                    .next()
                    .ok_or_else(|| eyre!("--poll-secs needs a value"))?;
                config.poll_secs = raw
                    .parse()
                    .map_err(|_| eyre!("--poll-secs: not a number: {raw}"))?;
            }
            "--spin-ms" => {
                let raw = args.next().ok_or_else(|| eyre!("--spin-ms needs a value"))?;
                config.spin_ms = Some(
                    raw.parse()
                        .map_err(|_| eyre!("--spin-ms: not a number: {raw}"))?,
                );
            }
            other => return Err(eyre!("unknown argument {other:?}; try --help")),
        }
    }
    Ok(Some(config))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging();
    match parse_args()? {
        Some(config) => client::run_app(config).await,
        None => Ok(()),
    }
}
