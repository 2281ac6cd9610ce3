use anyhow::Context;
use launchpad_lib::bootstrap::{init_tracing_subscriber, load_or_default, wire_shell, ConfigSource};
use launchpad_lib::run_driver;
use lp_infra::AppPaths;
use tokio::io::BufReader;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let (config, source) = load_or_default()?;
    let paths = AppPaths::resolve(config.storage.data_dir.clone())
        .context("Failed to resolve application directories")?;

    if let Err(err) = init_tracing_subscriber(&paths.logs_dir) {
        eprintln!("Failed to initialize tracing: {err}");
    }

    match &source {
        ConfigSource::File(path) => info!(path = %path.display(), "configuration loaded"),
        ConfigSource::Missing(path) => {
            warn!(path = %path.display(), "config file not found, using defaults")
        }
        ConfigSource::BuiltIn => warn!("no config location available, using defaults"),
    }

    let wired = wire_shell(&config, paths)?;
    match wired.shell.start().await {
        Some(user) => info!(user = %user.id, "session restored"),
        None => info!("starting signed out"),
    }

    let result = run_driver(&wired, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await;
    if let Err(err) = &result {
        error!(error = %err, "driver stopped");
    }

    wired.shell.shutdown();
    info!("launchpad exiting");
    result
}
