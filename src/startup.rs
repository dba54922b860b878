use crate::components::airtable::AirtableClient;
use crate::components::images::CardRenderer;
use crate::components::instagram::{DryRunPublisher, InstagramPublisher, SocialPublisher};
use crate::components::poster::{PostReport, Poster, PosterOptions};
use crate::config::Config;
use crate::error::{Error, RoundupResult};
use crate::shutdown;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Wire the Airtable source, card renderer and publisher together
pub fn build_poster(config: &Config) -> RoundupResult<Poster> {
    let source = AirtableClient::new(&config.airtable_api_key, &config.airtable_base_id)?;
    let renderer = CardRenderer::new(&config.settings.font_dir, config.settings.brand.clone());

    let publisher: Box<dyn SocialPublisher> = if config.dry_run {
        info!("Dry run enabled, nothing will be published");
        Box::new(DryRunPublisher::new())
    } else {
        Box::new(InstagramPublisher::new(
            config.instagram()?,
            &config.image_base_path,
        )?)
    };

    Ok(Poster::new(
        Box::new(source),
        Box::new(renderer),
        publisher,
        PosterOptions::from_config(config)?,
    ))
}

/// Post the roundup once, stopping between batches on a termination signal
pub async fn run(config: Config) -> miette::Result<()> {
    let token = CancellationToken::new();
    let poster = build_poster(&config)?.with_shutdown(token.clone());

    let signal_token = token.clone();
    let signals = tokio::spawn(async move {
        shutdown::handle_signals(signal_token).await;
    });

    let result = poster.post().await;

    // Release the signal handler
    token.cancel();
    if let Err(e) = signals.await {
        warn!("Signal handler task failed: {:?}", e);
    }

    match result {
        Ok(report) => {
            log_report(&report);
            Ok(())
        }
        Err(e) => {
            error!("Roundup failed: {}", e);
            Err(e.into())
        }
    }
}

fn log_report(report: &PostReport) {
    for batch in &report.batches {
        info!(
            "Batch {}: media {} ({} images)",
            batch.number,
            batch.media_id,
            batch.image_paths.len()
        );
    }
    if report.interrupted {
        warn!(
            "Stopped early after {} batches",
            report.batches_processed()
        );
    } else {
        info!("Done, {} batches processed", report.batches_processed());
    }
}
