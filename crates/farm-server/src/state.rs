use std::sync::Arc;

use farm_ledger::{
    FeedStock, FeedStockLedger, Flock, FlockRegistry, Medicine, MedicineLedger, StoreFlockRegistry,
};
use farm_store::{DocumentStore, InMemoryStore, JsonFileStore};

use crate::auth::{AllowAllAuth, AuthProvider, StaticTokenAuth};
use crate::config::{AuthConfig, ServerConfig, StorageConfig};
use crate::error::ServerResult;

/// Shared handler state. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<FeedStockLedger>,
    pub medicine: Arc<MedicineLedger>,
    pub flocks: Arc<dyn FlockRegistry>,
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    /// Volatile state with open authentication.
    pub fn in_memory() -> Self {
        let flocks: Arc<dyn FlockRegistry> = Arc::new(StoreFlockRegistry::in_memory());
        Self {
            feed: Arc::new(FeedStockLedger::in_memory()),
            medicine: Arc::new(MedicineLedger::new(
                Arc::new(InMemoryStore::<Medicine>::new()),
                flocks.clone(),
            )),
            flocks,
            auth: Arc::new(AllowAllAuth),
        }
    }

    pub fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        let (feed_store, medicine_store, flock_store): (
            Arc<dyn DocumentStore<FeedStock>>,
            Arc<dyn DocumentStore<Medicine>>,
            Arc<dyn DocumentStore<Flock>>,
        ) = match &config.storage {
            StorageConfig::Memory => (
                Arc::new(InMemoryStore::<FeedStock>::new()),
                Arc::new(InMemoryStore::<Medicine>::new()),
                Arc::new(InMemoryStore::<Flock>::new()),
            ),
            StorageConfig::Json { dir } => {
                tracing::info!(dir = %dir.display(), "using JSON file storage");
                (
                    Arc::new(JsonFileStore::<FeedStock>::open(dir)?),
                    Arc::new(JsonFileStore::<Medicine>::open(dir)?),
                    Arc::new(JsonFileStore::<Flock>::open(dir)?),
                )
            }
        };

        let auth: Arc<dyn AuthProvider> = match &config.auth {
            AuthConfig::AllowAll => Arc::new(AllowAllAuth),
            AuthConfig::Tokens { tokens } => {
                Arc::new(StaticTokenAuth::new(tokens.iter().cloned()))
            }
        };

        let flocks: Arc<dyn FlockRegistry> = Arc::new(StoreFlockRegistry::new(flock_store));
        let medicine = MedicineLedger::new(medicine_store, flocks.clone())
            .with_empty_list_not_found(config.medicine.empty_list_not_found);

        Ok(Self {
            feed: Arc::new(FeedStockLedger::new(feed_store)),
            medicine: Arc::new(medicine),
            flocks,
            auth,
        })
    }

    pub fn with_auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = auth;
        self
    }
}
