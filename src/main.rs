use book_search::{BookSearchDemo, ElasticsearchBooks, Index, Settings};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("book_search=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting book search demo");

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load settings: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Using search engine at {} (index '{}')",
        settings.base_url(),
        settings.index_name
    );
    let index: Index = Arc::new(ElasticsearchBooks::from_settings(&settings));

    let demo = BookSearchDemo::new(index, settings);
    if let Err(e) = demo.run().await {
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}
