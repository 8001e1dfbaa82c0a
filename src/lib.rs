pub mod config;
pub mod registry;
pub mod server;
pub mod store;

use std::sync::Arc;

use crate::registry::TokenRegistry;
use crate::store::KvStore;

// ========================================
// ENGINE
// ========================================

/// Shared state handed to every request handler. Cheap to clone (all fields
/// are Arcs); built once in main before the server accepts requests and
/// never mutated afterwards.
#[derive(Clone)]
pub struct PushEngine {
    pub registry: Arc<TokenRegistry>,
    pub store: Arc<dyn KvStore>,
}

impl PushEngine {
    pub fn new(registry: Arc<TokenRegistry>, store: Arc<dyn KvStore>) -> Self {
        Self { registry, store }
    }
}
