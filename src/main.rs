use roundup::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting events roundup");

    // Load configuration
    let config = startup::load_config()?;

    // Fetch, render and publish
    startup::run(config).await
}
