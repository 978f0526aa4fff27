use std::path::PathBuf;

use anyhow::Result;
use aqmap::{App, AqMapConfig, logging, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => AqMapConfig::load_from_path(Some(PathBuf::from(path)))?,
        None => AqMapConfig::load()?,
    };
    logging::init(&config.logging)?;

    let app = App::from_config(&config)?;
    if config.satellite.probe_on_startup {
        app.overlay.probe().await;
    }

    web::run(&config.server, app.dashboard).await
}
