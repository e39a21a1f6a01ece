use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use gallery_core::CredentialProvider;
use gallery_core::batch::Uploader;
use gallery_core::config::Config;
use gallery_core::drive::DriveClient;
use gallery_core::youtube::YouTubeClient;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod page;
mod routes;

use routes::AppState;

// Every selected file is held in memory while the batch runs; the form page
// warns about this. The limit bounds a whole multipart submission.
const MAX_BODY_BYTES: usize = 1024 * 1024 * 1024;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load().context("load configuration")?;
    tracing::debug!(doctor = ?config.doctor(), "effective configuration");

    let auth = Arc::new(CredentialProvider::new(&config).context("authentication failed")?);
    auth.authenticate().await.context("authentication failed")?;
    tracing::info!("authenticated with Google");

    let youtube = YouTubeClient::new(auth.clone())?;
    let drive = DriveClient::new(auth)?;
    let uploader = Uploader::new(
        Arc::new(youtube),
        Arc::new(drive),
        config.scratch_dir.clone(),
    );
    let state = Arc::new(AppState {
        uploader: Arc::new(uploader),
    });

    let app = Router::new()
        .route("/", get(routes::index))
        .route("/upload", post(routes::upload))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
