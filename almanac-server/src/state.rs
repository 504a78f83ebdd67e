//! Shared application state for the almanac server.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use almanac::core::context::ContextStore;
use almanac::io::fetch::Fetcher;
use almanac::pipeline::Pipeline;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::info;

/// Fetcher shared across request handlers.
pub type SharedFetcher = Arc<dyn Fetcher + Send + Sync>;

/// Shared state accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Configured field whitelist, labels and default output format.
    pub pipeline: Arc<Pipeline>,
    /// Upstream almanac source.
    pub fetcher: SharedFetcher,
    /// Buffered chat messages per user.
    contexts: Arc<Mutex<ContextStore>>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, fetcher: SharedFetcher, context_expiry: TimeDelta) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            fetcher,
            contexts: Arc::new(Mutex::new(ContextStore::new(context_expiry))),
        }
    }

    /// Lock the message buffer after dropping users idle past the expiry.
    pub fn contexts(&self, now: DateTime<Utc>) -> MutexGuard<'_, ContextStore> {
        let mut store = self
            .contexts
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for user_id in store.sweep(now) {
            info!(%user_id, "expired buffered messages");
        }
        store
    }
}
