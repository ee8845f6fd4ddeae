use anyhow::{anyhow, Result};
use std::io;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// 0 = info, 1 = debug with hyper noise suppressed, 2+ = trace.
/// `RUST_LOG` wins unless quiet.
fn build_filter(verbose_level: u8, quiet: bool) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }
    let default = match verbose_level {
        0 => "info",
        1 => "debug,hyper::proto::h1=warn,hyper::client::pool=warn,reqwest=info",
        _ => "trace",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

pub fn init_logging_with_file(verbose_level: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let filter = build_filter(verbose_level, quiet);

    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stdout().is_terminal());

    let registry = Registry::default().with(filter);

    let Some(log_path) = log_file else {
        if json {
            registry
                .with(fmt::layer().json().with_timer(ChronoUtc::rfc_3339()).with_writer(io::stderr))
                .init();
        } else {
            registry
                .with(fmt::layer().with_timer(ChronoUtc::rfc_3339()).with_writer(io::stderr))
                .init();
        }
        return Ok(());
    };

    let log_dir = log_path
        .parent()
        .ok_or_else(|| anyhow!("Log file path has no parent directory"))?;
    std::fs::create_dir_all(log_dir)?;

    // trakt-sync.log rotates into trakt-sync.YYYY-MM-DD
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Invalid log filename"))?;
    let prefix = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name);

    let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, prefix);

    if json {
        registry
            .with(fmt::layer().json().with_timer(ChronoUtc::rfc_3339()).with_writer(appender))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .with_writer(appender),
            )
            .init();
    }

    Ok(())
}
