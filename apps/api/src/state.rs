use std::sync::Arc;

use crate::auth::JwtVerifier;
use crate::backend::Backend;
use crate::cache::QueryCache;
use crate::storage::ObjectStorage;
use crate::tailoring::Tailor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub cache: QueryCache,
    pub storage: ObjectStorage,
    pub jwt: JwtVerifier,
    /// Remote resume tailoring function.
    pub tailor: Arc<dyn Tailor>,
}
