use tracing_subscriber::EnvFilter;
use typo_royale::prelude::*;

#[tokio::main]
async fn main() -> Result<(), TypoRoyaleError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(bind_addr = %config.bind_addr, "starting Typo Royale");

    let server = TypoRoyaleServer::builder().config(config).build().await?;
    server.run().await
}
