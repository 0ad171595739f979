#![cfg(not(tarpaulin_include))]

use prepstory::app;
use prepstory::config::{self, Settings};

/// Main entry point for the web application
///
/// Applies `.env`, starts the logger, reads `PREPSTORY_*` settings and then
/// serves the shell until the process is stopped. Log level comes from
/// `RUST_LOG` (environment or `.env`), default `info`.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_file = config::load_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Some(path) = env_file {
        log::debug!("loaded environment from {}", path.display());
    }

    let settings = Settings::from_env();
    log::info!(
        "records in {}, accounts in {}",
        settings.data_file.display(),
        settings.users_file.display()
    );

    app::run(settings).await
}
