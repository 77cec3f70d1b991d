mod config;
mod errors;
mod models;
mod resume;
mod routes;
mod spelling;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::spelling::{DictionaryCorrector, SpellingCorrector};
use crate::state::AppState;
use crate::store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    // Load the backing document; a missing or corrupt file starts empty
    let store = Arc::new(Store::open(&config.data_file));
    info!("Document store ready at {}", store.path().display());

    let speller = build_speller(&config)?;

    let state = AppState {
        store,
        speller,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Uses the configured dictionary file if set, otherwise the bundled word list.
fn build_speller(config: &Config) -> Result<Arc<dyn SpellingCorrector>> {
    let corrector = match &config.spelling_dictionary {
        Some(path) => DictionaryCorrector::from_file(path)?,
        None => DictionaryCorrector::bundled(),
    };

    if corrector.is_empty() {
        warn!("Spelling dictionary is empty; text will be returned unchanged");
    }
    Ok(Arc::new(corrector))
}
