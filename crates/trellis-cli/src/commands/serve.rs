use crate::cli::ServeArgs;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use trellis_config::TrellisConfig;
use trellis_web::{AppState, Directory, InMemoryDirectory};

pub async fn execute(mut config: TrellisConfig, args: ServeArgs) -> Result<()> {
    if let Some(host) = args.host {
        config.server.bind_address = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(data) = args.data {
        config.server.data_file = Some(data);
    }

    let directory = load_directory(&config)?;
    let state = AppState::with_directory(directory)
        .compose_timeout(Duration::from_secs(config.server.request_timeout_seconds));
    info!(screens = ?state.composers.screen_ids(), "Composers registered");

    trellis_web::start_server(&config.server, state).await?;
    Ok(())
}

fn load_directory(config: &TrellisConfig) -> Result<Arc<dyn Directory>> {
    match &config.server.data_file {
        Some(path) => {
            let directory = InMemoryDirectory::from_json_file(path)
                .with_context(|| format!("failed to load directory from {}", path.display()))?;
            info!(path = %path.display(), "Loaded directory");
            Ok(Arc::new(directory))
        }
        None => {
            info!("No data file configured, serving the sample directory");
            Ok(Arc::new(InMemoryDirectory::sample()))
        }
    }
}
