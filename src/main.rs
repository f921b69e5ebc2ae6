mod config;
mod errors;
mod models;
mod server;
mod state;
mod validation;

use crate::state::AppState;

#[tokio::main]
async fn main() {
    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("lattice pricer starting");

    let cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = serve(cfg).await {
        tracing::error!("server error: {e}");
        std::process::exit(1);
    }
}

async fn serve(cfg: config::AppConfig) -> errors::EngineResult<()> {
    let addr = cfg.bind_addr();
    tracing::info!(
        max_steps = cfg.max_steps,
        static_dir = %cfg.static_dir.display(),
        "configuration loaded"
    );

    let app = server::router(AppState::new(cfg));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("server listening on {addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
