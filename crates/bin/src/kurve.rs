//! Kurve - trail arena game server binary

use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Kurve Game Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = server::Config::load()?;
    info!("Loaded configuration");
    info!("  Port: {}", config.server.port);
    info!("  Board: {}x{}", config.board.width, config.board.height);
    info!("  Tick rate: {}/s", config.server.tick_rate);
    info!("  Players per room: {}-{}", config.room.min_players, config.room.max_players);

    server::run(config).await?;

    Ok(())
}
