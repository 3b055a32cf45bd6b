use std::sync::Arc;

use dashmap::DashMap;

use crate::model::{CompiledDataset, DatasetKey, FinancialYear};

/// Keyed store of compiled datasets. At most one dataset exists per key;
/// replacement swaps the whole value under the key's shard lock, so a
/// reader holds either the previous dataset or the new one, never a mix.
/// Callers pass keys explicitly; there is no ambient state.
#[derive(Debug, Default)]
pub struct DatasetStore {
    datasets: DashMap<DatasetKey, Arc<CompiledDataset>>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the dataset under its key, returning the superseded one.
    pub fn replace(&self, dataset: CompiledDataset) -> Option<Arc<CompiledDataset>> {
        self.datasets.insert(dataset.key.clone(), Arc::new(dataset))
    }

    /// Snapshot read: the returned dataset is immutable and unaffected by
    /// later replacements.
    pub fn get(&self, key: &DatasetKey) -> Option<Arc<CompiledDataset>> {
        self.datasets.get(key).map(|entry| Arc::clone(entry.value()))
    }

    pub fn remove(&self, key: &DatasetKey) -> Option<Arc<CompiledDataset>> {
        self.datasets.remove(key).map(|(_, dataset)| dataset)
    }

    /// Keys currently compiled for one project and financial year.
    pub fn keys_for(&self, project: &str, financial_year: FinancialYear) -> Vec<DatasetKey> {
        self.datasets
            .iter()
            .filter(|entry| {
                entry.key().project == project && entry.key().financial_year == financial_year
            })
            .map(|entry| entry.key().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}
