use anyhow::Context;
use ocr_summary::{
    api,
    config::{self, Config},
    logging,
    processing::DocumentService,
};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_dotenv();
    let config = Config::from_env().context("Failed to load config from environment")?;
    logging::init_tracing(&config.log_file);
    config.log_summary();

    let service =
        DocumentService::new(&config).context("Failed to initialize service clients")?;
    let app = api::create_router(Arc::new(service), config.max_upload_bytes);

    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.server_port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.server_port))?;
    tracing::info!("Backend running at http://localhost:{}", config.server_port);

    axum::serve(listener, app).await.context("Server error")
}
