use crate::config::Settings;
use crate::snapshot::SnapshotCollector;
use std::sync::Arc;

/// État partagé d'Axum : construit une fois au démarrage, jamais muté.
pub struct AppState<C> {
    pub collector: Arc<SnapshotCollector<C>>,
    pub settings: Arc<Settings>,
}

// derive(Clone) exigerait C: Clone
impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            collector: Arc::clone(&self.collector),
            settings: Arc::clone(&self.settings),
        }
    }
}

impl<C> AppState<C> {
    pub fn new(collector: SnapshotCollector<C>, settings: Settings) -> Self {
        Self {
            collector: Arc::new(collector),
            settings: Arc::new(settings),
        }
    }
}
