//! Runs field callbacks against configured fields and the value store

use std::sync::{Mutex, MutexGuard};

use anyhow::anyhow;
use serde_json::Value;
use thiserror::Error;

use crate::{
    config::ResolverConfig,
    fields::{
        Field, FieldConfig, FieldRegistry, FieldType,
        price::PriceField,
        render::{OptionRow, RenderRequest},
        soundcloud::SoundCloudField,
    },
    resolver::{Resolve, TrackResolver},
    storage::{
        error::StorageError,
        operations::{EntityId, FieldStore},
    },
};

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("field '{0}' is not configured")]
    UnknownField(String),

    #[error("no implementation registered for field type {0}")]
    UnsupportedType(FieldType),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Registry with every built-in field type, resolving tracks through `resolver`
pub fn builtin_registry(resolver: Box<dyn Resolve>) -> FieldRegistry {
    let mut registry = FieldRegistry::new();
    registry.register(FieldType::Price, Box::new(PriceField));
    registry.register(FieldType::SoundCloud, Box::new(SoundCloudField::new(resolver)));
    registry
}

/// Plays the host framework: owns field configs, implementations and storage.
///
/// Shared by reference between threads. Only the store is locked, field
/// callbacks run outside the lock.
pub struct FieldHost {
    store: Mutex<FieldStore>,
    registry: FieldRegistry,
    fields: Vec<FieldConfig>,
}

impl FieldHost {
    pub fn new(store: FieldStore, registry: FieldRegistry, fields: Vec<FieldConfig>) -> Self {
        Self {
            store: Mutex::new(store),
            registry,
            fields,
        }
    }

    pub fn with_resolver_config(
        store: FieldStore,
        resolver: ResolverConfig,
        fields: Vec<FieldConfig>,
    ) -> Self {
        let registry = builtin_registry(Box::new(TrackResolver::new(resolver)));
        Self::new(store, registry, fields)
    }

    pub fn fields(&self) -> &[FieldConfig] {
        &self.fields
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub(crate) fn store(&self) -> Result<MutexGuard<'_, FieldStore>, FieldError> {
        self.store.lock().map_err(|e| {
            log::error!("could not access field store under lock: {e}");
            FieldError::Storage(StorageError::Internal(anyhow!("field store lock poisoned")))
        })
    }

    fn lookup(&self, key: &str) -> Result<(&FieldConfig, &dyn Field), FieldError> {
        let config = self
            .fields
            .iter()
            .find(|f| f.key == key)
            .ok_or_else(|| FieldError::UnknownField(key.to_string()))?;
        let field = self
            .registry
            .get(config.field_type())
            .ok_or(FieldError::UnsupportedType(config.field_type()))?;
        Ok((config, field))
    }

    pub fn render_options(&self, key: &str) -> Result<Vec<OptionRow>, FieldError> {
        let (config, field) = self.lookup(key)?;
        Ok(field.render_options(&config.key, config))
    }

    pub fn render_field(&self, entity: EntityId, key: &str) -> Result<RenderRequest, FieldError> {
        let (config, field) = self.lookup(key)?;
        let value = field.get_value(&*self.store()?, entity, config)?;
        Ok(field.render_field(config, &value))
    }

    /// Runs the save callback and persists what it returns.
    ///
    /// The store is locked only for the write, not while the callback runs.
    pub fn save(&self, entity: EntityId, key: &str, raw: &str) -> Result<Value, FieldError> {
        let (config, field) = self.lookup(key)?;
        let value = field.update_value(entity, config, raw);
        self.store()?.put_value(entity, key, &value)?;
        Ok(value)
    }

    pub fn load(&self, entity: EntityId, key: &str) -> Result<Value, FieldError> {
        let (config, field) = self.lookup(key)?;
        Ok(field.get_value(&*self.store()?, entity, config)?)
    }

    pub fn api_value(&self, entity: EntityId, key: &str) -> Result<Value, FieldError> {
        let (config, field) = self.lookup(key)?;
        let value = field.get_value(&*self.store()?, entity, config)?;
        Ok(field.format_value_for_api(value, config))
    }

    /// every stored value of `entity` that belongs to a configured field
    pub fn values(&self, entity: EntityId) -> Result<Vec<(String, Value)>, FieldError> {
        Ok(self
            .store()?
            .list_values(entity)?
            .into_iter()
            .filter(|(key, _)| self.fields.iter().any(|f| &f.key == key))
            .collect())
    }

    /// forgets the stored value, returns whether there was one
    pub fn clear(&self, entity: EntityId, key: &str) -> Result<bool, FieldError> {
        self.lookup(key)?;
        Ok(self.store()?.delete_value(entity, key)?)
    }

    /// save time of the stored value, if any
    pub fn updated_at(&self, entity: EntityId, key: &str) -> Result<Option<i64>, FieldError> {
        self.lookup(key)?;
        Ok(self
            .store()?
            .get_value(entity, key)?
            .map(|stored| stored.updated_at))
    }
}
