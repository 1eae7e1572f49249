use anyhow::Context;
use bookgraph_core::{JwtManager, Settings, Stores};
use std::sync::Arc;

use crate::auth::IdentityVerifier;
use crate::service::OperationRouter;

/// Shared handles built once at startup. Cloning is cheap; every clone points
/// at the same stores.
#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub router: Arc<OperationRouter>,
    pub identity: Arc<IdentityVerifier>,
}

impl AppState {
    /// State backed by fresh in-memory collections.
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        Self::with_stores(settings, Stores::in_memory())
    }

    pub fn with_stores(settings: &Settings, stores: Stores) -> anyhow::Result<Self> {
        let jwt = Arc::new(
            JwtManager::new(&settings.auth).context("failed to initialise token signing")?,
        );
        let router = Arc::new(OperationRouter::new(stores.clone(), jwt.clone()));
        let identity = Arc::new(IdentityVerifier::new(jwt, stores.accounts.clone()));

        Ok(Self {
            stores,
            router,
            identity,
        })
    }
}
