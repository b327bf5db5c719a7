use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, Result};

/// Per-model rates from models.toml, all in USD per one million tokens.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelPricing {
    pub name: String,
    pub description: String,
    pub input: f64,
    pub cached_input: f64,
    pub output: f64,
    pub training: f64,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    model: BTreeMap<String, ModelPricing>,
}

/// Immutable model table, keyed by model id. Built once and shared read-only.
#[derive(Debug, Clone)]
pub struct Catalog {
    models: BTreeMap<String, ModelPricing>,
}

impl Catalog {
    pub fn get(&self, id: &str) -> Option<&ModelPricing> {
        self.models.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.models.contains_key(id)
    }

    /// Models in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelPricing)> {
        self.models.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn ids(&self) -> Vec<&str> {
        self.models.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Load a catalog from a models.toml file.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path).map_err(|e| CalcError::Io(e.to_string()))?;
    parse_catalog(&content)
}

/// Parse and validate a catalog from a TOML string.
pub fn parse_catalog(toml_str: &str) -> Result<Catalog> {
    let file: CatalogFile =
        toml::from_str(toml_str).map_err(|e| CalcError::Catalog(format!("bad models.toml: {e}")))?;
    if file.model.is_empty() {
        return Err(CalcError::Catalog("no models defined".into()));
    }
    for (id, m) in &file.model {
        validate(id, m)?;
    }
    Ok(Catalog { models: file.model })
}

/// Load the bundled models.toml from the data/ directory.
pub fn load_bundled_catalog() -> Result<Catalog> {
    let toml_str = include_str!("../../../data/models.toml");
    parse_catalog(toml_str)
}

fn validate(id: &str, m: &ModelPricing) -> Result<()> {
    let rates = [
        ("input", m.input),
        ("cached_input", m.cached_input),
        ("output", m.output),
        ("training", m.training),
    ];
    for (field, rate) in rates {
        if !rate.is_finite() || rate < 0.0 {
            return Err(CalcError::Catalog(format!(
                "{id}: {field} must be a non-negative number, got {rate}"
            )));
        }
    }
    if m.cached_input > m.input {
        return Err(CalcError::Catalog(format!(
            "{id}: cached_input ({}) exceeds input ({})",
            m.cached_input, m.input
        )));
    }
    Ok(())
}
