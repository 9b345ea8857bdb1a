use anyhow::Result;
use mcp_crop_advisor::{Config, CropAdvisor};
use rmcp::ServiceExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mcp_crop_advisor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        "Starting MCP crop advisor (backend: {}, charts: {})",
        config.backend_url,
        config.charts_enabled
    );

    let advisor = CropAdvisor::new(&config)?;

    let startup = advisor.clone();
    tokio::spawn(async move {
        let outcome = startup.on_page_load().await;
        if outcome.view.is_error() {
            tracing::warn!("Initial weather load did not complete");
        } else {
            tracing::info!("Initial weather loaded");
        }
    });

    let server = advisor.serve(rmcp::transport::stdio()).await?;
    server.waiting().await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
