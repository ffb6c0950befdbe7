use std::sync::Arc;

use log::warn;
use treasury_core::{
    config::Config,
    error::TreasuryResult,
    helpers::fetch::UpstreamClient,
    providers::Providers,
    storage::handler::{KvRestStore, SaveStore, SledStore, UnconfiguredStore},
};

pub struct ServerState {
    providers: Providers,
    save_store: Arc<dyn SaveStore>,
}

impl From<(Providers, Arc<dyn SaveStore>)> for ServerState {
    fn from(states: (Providers, Arc<dyn SaveStore>)) -> Self {
        let (providers, save_store) = states;
        Self {
            providers,
            save_store,
        }
    }
}

impl ServerState {
    /// The remote KV store wins over a local sled path when both are set.
    pub fn from_config(config: &Config) -> TreasuryResult<Self> {
        let providers = Providers::from_config(config)?;

        let save_store: Arc<dyn SaveStore> = match (&config.kv, &config.save_db_path) {
            (Some(kv), _) => Arc::new(KvRestStore::new(UpstreamClient::new()?, kv.clone())),
            (None, Some(path)) => Arc::new(SledStore::open(path)?),
            (None, None) => {
                warn!("No save store configured, /api/save will answer 500");
                Arc::new(UnconfiguredStore)
            }
        };

        Ok(Self::from((providers, save_store)))
    }

    pub fn providers(&self) -> &Providers {
        &self.providers
    }

    pub fn save_store(&self) -> &dyn SaveStore {
        self.save_store.as_ref()
    }
}
