//! Model registry
//!
//! Each indexable record type is registered once, at startup, against a
//! small stable [`ModelId`] together with the [`RecordSource`] that loads its
//! records. The id is packed into every posting's row key, so it must never
//! change for a type once postings exist.

use fuzzdex_core::error::{Error, Result};
use fuzzdex_core::record::{Indexable, RecordSource};
use fuzzdex_core::types::ModelId;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Default)]
struct Registrations {
    by_id: FxHashMap<ModelId, Arc<dyn RecordSource>>,
    by_name: FxHashMap<String, ModelId>,
}

/// Thread-safe `ModelId` <-> record type mapping
#[derive(Default)]
pub struct ModelRegistry {
    inner: RwLock<Registrations>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `source` under `model_id`
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateModel`] if the id or the type name is already taken.
    pub fn register(&self, model_id: ModelId, source: Arc<dyn RecordSource>) -> Result<()> {
        let name = source.type_name().to_string();
        let mut inner = self.inner.write();
        if let Some(existing) = inner.by_id.get(&model_id) {
            return Err(Error::DuplicateModel(format!(
                "{} is already registered to '{}'",
                model_id,
                existing.type_name()
            )));
        }
        if let Some(existing) = inner.by_name.get(&name) {
            return Err(Error::DuplicateModel(format!(
                "'{}' is already registered as {}",
                name, existing
            )));
        }
        debug!(model_id = model_id.0, type_name = %name, "registered model");
        inner.by_name.insert(name, model_id);
        inner.by_id.insert(model_id, source);
        Ok(())
    }

    /// Model id of a registered type name
    pub fn model_id(&self, type_name: &str) -> Result<ModelId> {
        self.inner
            .read()
            .by_name
            .get(type_name)
            .copied()
            .ok_or_else(|| Error::UnregisteredModel(type_name.to_string()))
    }

    /// Model id of a record's type
    pub fn model_id_of(&self, record: &dyn Indexable) -> Result<ModelId> {
        self.model_id(record.type_name())
    }

    /// Record source registered under `model_id`
    pub fn source(&self, model_id: ModelId) -> Result<Arc<dyn RecordSource>> {
        self.inner
            .read()
            .by_id
            .get(&model_id)
            .cloned()
            .ok_or(Error::UnknownModelId(model_id))
    }

    /// Load one record through its source
    pub fn load(&self, model_id: ModelId, record_id: u64) -> Result<Option<Arc<dyn Indexable>>> {
        Ok(self.source(model_id)?.load(record_id))
    }

    /// Registered ids, ascending
    pub fn model_ids(&self) -> Vec<ModelId> {
        let mut ids: Vec<ModelId> = self.inner.read().by_id.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        let mut names: Vec<(&ModelId, &String)> =
            inner.by_name.iter().map(|(name, id)| (id, name)).collect();
        names.sort();
        f.debug_struct("ModelRegistry").field("models", &names).finish()
    }
}
