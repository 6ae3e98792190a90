use std::sync::Arc;

use crate::config::Config;
use crate::handlers::HandlerRegistry;
use crate::modules::Modules;
use crate::observability::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<HandlerRegistry>,
    pub shared_secret: Arc<str>,
    pub modules: Modules,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(
        config: Config,
        registry: HandlerRegistry,
        shared_secret: impl Into<Arc<str>>,
        modules: Modules,
    ) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            shared_secret: shared_secret.into(),
            modules,
            metrics: Arc::new(Metrics::new()),
        }
    }
}
