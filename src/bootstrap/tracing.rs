//! Tracing configuration
//!
//! Installs the global subscriber: env filter, stderr and file fmt layers,
//! and a Sentry layer when `SENTRY_DSN` is set.
//!
//! ## Behavior
//!
//! - **Development**: debug level for the launchpad crates
//! - **Production**: info level
//! - **RUST_LOG**: overrides the defaults entirely

use std::{fs, io, path::Path, sync::OnceLock};

use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    fmt, fmt::writer::MakeWriter, prelude::*, registry, registry::LookupSpan, EnvFilter, Layer,
};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static SENTRY_GUARD: OnceLock<sentry::ClientInitGuard> = OnceLock::new();

const LOG_FILE_NAME: &str = "launchpad.log";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

fn is_development() -> bool {
    cfg!(debug_assertions)
}

/// Default filter directives when RUST_LOG is not set.
fn build_filter_directives(is_dev: bool) -> Vec<String> {
    let app_level = if is_dev { "debug" } else { "info" };
    let mut directives = vec!["info".to_string()];
    for target in ["launchpad", "launchpad_lib", "lp_app", "lp_infra"] {
        directives.push(format!("{target}={app_level}"));
    }
    // Connection pool chatter drowns out the probe logs.
    directives.push("reqwest=warn".to_string());
    directives.push("hyper_util=warn".to_string());
    directives
}

/// Initialize the tracing subscriber.
///
/// Call once from `main`, before the shell is wired. File logging goes to
/// `logs_dir`; when that directory cannot be created only stderr is used.
///
/// # Errors
///
/// Returns `Err` if a global subscriber is already registered.
pub fn init_tracing_subscriber(logs_dir: &Path) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(build_filter_directives(is_development()).join(",")));

    let file_layer = match build_file_writer(logs_dir) {
        Ok(writer) => Some(fmt_layer(writer, false)),
        Err(err) => {
            eprintln!("Failed to initialize file logging, falling back to stderr: {err}");
            None
        }
    };

    // stdout carries driver replies, so console logs go to stderr.
    registry()
        .with(env_filter)
        .with(sentry_layer())
        .with(fmt_layer(io::stderr, cfg!(not(test))))
        .with(file_layer)
        .try_init()?;

    Ok(())
}

/// "2026-01-15 10:30:45.123 INFO file.rs:42 target: message"
fn fmt_layer<S, W>(writer: W, ansi: bool) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .with_timer(fmt::time::ChronoUtc::new(TIMESTAMP_FORMAT.to_string()))
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_ansi(ansi)
        .with_writer(writer)
}

/// Sentry reporting, only when `SENTRY_DSN` is set. The client guard lives
/// in a static for the rest of the process.
fn sentry_layer<S>() -> Option<sentry_tracing::SentryLayer<S>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let dsn = std::env::var("SENTRY_DSN").ok()?;
    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            traces_sample_rate: 1.0,
            ..Default::default()
        },
    ));
    if SENTRY_GUARD.set(guard).is_err() {
        eprintln!("Sentry guard already initialized");
    }
    Some(sentry_tracing::layer())
}

fn build_file_writer(logs_dir: &Path) -> anyhow::Result<NonBlocking> {
    fs::create_dir_all(logs_dir)?;

    let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    LOG_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Tracing log guard already initialized"))?;

    Ok(non_blocking)
}
