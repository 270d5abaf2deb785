use std::sync::Arc;

use crate::blog::BlogGateway;
use crate::config::Config;
use crate::optimizer::OptimizerClient;
use crate::tenant::render::ShellAssets;
use crate::tenant::store::ProfileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub blog: BlogGateway,
    /// Pluggable profile store. Default: PgProfileStore.
    pub profiles: Arc<dyn ProfileStore>,
    /// `None` when OPENAI_API_KEY is not set.
    pub optimizer: Option<OptimizerClient>,
    pub shell_assets: ShellAssets,
}
