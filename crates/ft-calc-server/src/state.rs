use std::sync::Arc;

use anyhow::Result;
use ft_calc_core::catalog::{self, Catalog};
use ft_calc_core::tokens::TokenCounter;

use crate::config::Config;

/// Shared, read-only for the life of the process.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub counter: Arc<TokenCounter>,
}

impl AppState {
    pub fn new(catalog: Catalog, counter: TokenCounter) -> Self {
        Self {
            catalog: Arc::new(catalog),
            counter: Arc::new(counter),
        }
    }

    /// Load the catalog and pick the token counting strategy once.
    pub fn from_config(config: &Config) -> Result<Self> {
        let catalog = match &config.catalog_path {
            Some(path) => catalog::load_catalog(path)?,
            None => catalog::load_bundled_catalog()?,
        };
        let counter =
            TokenCounter::from_credential(config.openai_api_key.clone(), &config.openai_base_url)?;
        Ok(Self::new(catalog, counter))
    }
}
