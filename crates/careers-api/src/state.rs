//! Application state.

use std::sync::Arc;

use tracing::{info, warn};

use careers_firestore::FirestoreClient;

use crate::auth::{FirebaseVerifier, IdentityVerifier};
use crate::config::{ApiConfig, StoreBackend};
use crate::services::ApplicationAggregator;
use crate::store::{CareerStore, FirestoreStore, MemoryStore};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub store: Arc<dyn CareerStore>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub aggregator: ApplicationAggregator,
}

impl AppState {
    /// Connect the configured store and identity verifier.
    ///
    /// An unreachable store is logged, not fatal; requests fail until it
    /// comes back.
    pub async fn open(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let project_id = config
            .firebase_project_id
            .clone()
            .ok_or("FIREBASE_PROJECT_ID or GCP_PROJECT_ID must be set to verify ID tokens")?;
        let verifier = FirebaseVerifier::new(project_id, config.jwks_url.clone())?;

        let store: Arc<dyn CareerStore> = match config.store_backend {
            StoreBackend::Firestore => {
                let client = FirestoreClient::from_env().await?;
                Arc::new(FirestoreStore::new(
                    client,
                    config.careers_collection.clone(),
                    config.applications_collection.clone(),
                ))
            }
            StoreBackend::Memory => {
                warn!("Using in-memory store; data is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        match store.ping().await {
            Ok(()) => info!("Connected to {} store", store.backend()),
            Err(e) => warn!("Store ping failed, continuing: {}", e),
        }

        Ok(Self::with_components(config, store, Arc::new(verifier)))
    }

    /// Assemble state from ready-made parts.
    pub fn with_components(
        config: ApiConfig,
        store: Arc<dyn CareerStore>,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Self {
        let aggregator = ApplicationAggregator::new(Arc::clone(&store), config.dangling_policy);
        Self {
            config: Arc::new(config),
            store,
            verifier,
            aggregator,
        }
    }

    /// Release the store once the server has stopped taking requests.
    pub async fn close(&self) {
        self.store.close().await;
        info!("Application state closed");
    }
}
