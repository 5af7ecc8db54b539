mod configuration;
mod error;
mod routes;
mod state;
#[cfg(test)]
mod test_support;

use configuration::{AgentMode, Settings};
use state::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let settings = Settings::new()?;

    if !settings.provider.has_api_key() {
        match settings.agent.mode {
            AgentMode::Agent => {
                tracing::error!(
                    "No API key configured; set VINOD_PROVIDER__API_KEY or GEMINI_API_KEY, or run with VINOD_AGENT__MODE=keyword"
                );
                std::process::exit(1);
            }
            AgentMode::Keyword => {
                tracing::warn!("No API key configured; keyword mode does not need one");
            }
        }
    }

    let addr = settings.server.socket_addr()?;
    let mode = settings.agent.mode;
    let state = AppState::from_settings(settings)?;

    // Create router with CORS support
    let app = routes::configure(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {} in {} mode", listener.local_addr()?, mode.as_str());
    axum::serve(listener, app).await?;
    Ok(())
}
