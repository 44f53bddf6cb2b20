//! Command session
//!
//! Opens the stores and builds an API client seeded with the saved
//! credentials. Credentials the client picks up while a command runs (a new
//! login, a refreshed token) are written back by [`Session::persist`].

use anyhow::Result;
use std::sync::Arc;
use studio_client::{Credentials, StudioClient};
use studio_poller::{BatchPollConfig, BatchPoller, SinglePoller};
use tracing::debug;

use crate::config::Config;
use crate::store::{CharacterStore, CredentialStore, GalleryStore};

pub struct Session {
    pub config: Config,
    pub client: StudioClient,
    pub credentials: CredentialStore,
    pub characters: CharacterStore,
    pub gallery: GalleryStore,
    loaded: Credentials,
}

impl Session {
    pub fn open(config: &Config) -> Self {
        let credentials = CredentialStore::new(&config.data_dir);
        let loaded = credentials.load();
        let client = StudioClient::new(&config.api_url).with_credentials(loaded.clone());

        Self {
            config: config.clone(),
            client,
            credentials,
            characters: CharacterStore::new(&config.data_dir),
            gallery: GalleryStore::new(&config.data_dir),
            loaded,
        }
    }

    /// Saves credentials that changed during the command
    pub fn persist(&self) -> Result<()> {
        let current = self.client.credentials();
        if current == self.loaded || current.is_empty() {
            return Ok(());
        }

        debug!("Saving updated credentials to {}", self.credentials.path().display());
        self.credentials.save(current)?;
        Ok(())
    }

    /// Batch poller backed by this session's client
    pub fn batch_poller(&self, config: BatchPollConfig) -> BatchPoller {
        let client = Arc::new(self.client.clone());
        BatchPoller::new(config, client.clone(), client)
    }

    pub fn single_poller(&self) -> SinglePoller {
        let client = Arc::new(self.client.clone());
        SinglePoller::new(self.config.single.clone(), client.clone(), client)
    }
}
