use std::sync::Arc;

use crate::auth::SessionStore;
use crate::store::{CollectionLocks, DataStore};

/// Shared application state: the persistence seam, the session seam, and
/// the per-collection write locks. Handlers hold no state of their own.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub locks: Arc<CollectionLocks>,
}

impl AppState {
    pub fn new(store: Arc<dyn DataStore>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            sessions,
            locks: Arc::new(CollectionLocks::default()),
        }
    }
}
