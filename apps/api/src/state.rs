use std::sync::Arc;

use crate::config::Config;
use crate::spelling::SpellingCorrector;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Single owner of the in-memory document; all collections go through it.
    pub store: Arc<Store>,
    /// Pluggable corrector. Default: DictionaryCorrector.
    pub speller: Arc<dyn SpellingCorrector>,
    pub config: Config,
}
