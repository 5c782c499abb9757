use crate::data;
use crate::types::{DatasetKind, FeatureTable, LoadError};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

// One attempt, no retries; transport and HTTP-status failures both surface
// as LoadError::Network
pub fn fetch_bytes(url: &str) -> Result<Vec<u8>, LoadError> {
    println!("Downloading {}...", url);
    let network = |source: reqwest::Error| LoadError::Network {
        url: url.to_string(),
        source,
    };
    let response = reqwest::blocking::get(url)
        .map_err(network)?
        .error_for_status()
        .map_err(network)?;
    let bytes = response.bytes().map_err(network)?;
    Ok(bytes.to_vec())
}

// Memoizes loaded tables by source URL so repeated interactions do not
// re-fetch. Eviction is the caller's call: invalidate one URL or clear
// everything. No TTL, no size bound.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<String, FeatureTable>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(
        &mut self,
        url: &str,
        kind: DatasetKind,
    ) -> Result<&FeatureTable, LoadError> {
        match self.entries.entry(url.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let bytes = fetch_bytes(url)?;
                let table = data::load_dataset(&bytes, kind)?;
                Ok(entry.insert(table))
            }
        }
    }

    pub fn get(&self, url: &str) -> Option<&FeatureTable> {
        self.entries.get(url)
    }

    pub fn insert(&mut self, url: &str, table: FeatureTable) {
        self.entries.insert(url.to_string(), table);
    }

    // Drops one entry; true if it was present
    pub fn invalidate(&mut self, url: &str) -> bool {
        self.entries.remove(url).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
