//! Field types pluggable into entity forms.
//!
//! Every field type implements [`Field`], a small set of callbacks the host runs
//! at fixed points: rendering options, rendering the input, saving, loading and
//! formatting for API consumers. Implementations are looked up by [`FieldType`]
//! in a [`FieldRegistry`].

use std::{collections::HashMap, fmt::Display};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::{
    error::StorageError,
    operations::{EntityId, FieldStore},
};

pub mod price;
pub mod render;
pub mod soundcloud;

use render::{OptionRow, RenderRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Price,
    #[serde(rename = "soundcloud")]
    SoundCloud,
}

impl Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Price => write!(f, "price"),
            FieldType::SoundCloud => write!(f, "soundcloud"),
        }
    }
}

/// Per-type configuration of a field, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldOptions {
    Price {
        #[serde(default)]
        symbol: String,
    },
    #[serde(rename = "soundcloud")]
    SoundCloud {},
}

impl FieldOptions {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldOptions::Price { .. } => FieldType::Price,
            FieldOptions::SoundCloud {} => FieldType::SoundCloud,
        }
    }
}

/// A configured field instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub options: FieldOptions,
}

impl FieldConfig {
    pub fn field_type(&self) -> FieldType {
        self.options.field_type()
    }
}

pub trait Field: Send + Sync {
    /// machine name, no spaces
    fn name(&self) -> &'static str;

    /// label shown on edit screens
    fn title(&self) -> &'static str;

    /// Rows for the field's own settings. `key` is the stable field key
    /// the submitted options are saved under.
    fn render_options(&self, key: &str, field: &FieldConfig) -> Vec<OptionRow>;

    fn render_field(&self, field: &FieldConfig, value: &Value) -> RenderRequest;

    /// Turns a freshly submitted raw value into the value to persist.
    fn update_value(&self, entity: EntityId, field: &FieldConfig, value: &str) -> Value;

    /// Stored value for `entity`, `null` when nothing was saved.
    fn get_value(
        &self,
        store: &FieldStore,
        entity: EntityId,
        field: &FieldConfig,
    ) -> Result<Value, StorageError> {
        Ok(store
            .get_value(entity, &field.key)?
            .map(|stored| stored.value)
            .unwrap_or(Value::Null))
    }

    /// Shape handed to API consumers.
    fn format_value_for_api(&self, value: Value, field: &FieldConfig) -> Value;
}

/// Field implementations by type
#[derive(Default)]
pub struct FieldRegistry {
    fields: HashMap<FieldType, Box<dyn Field>>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, field_type: FieldType, field: Box<dyn Field>) {
        if self.fields.insert(field_type, field).is_some() {
            log::warn!("field type {field_type} registered twice, keeping the latest");
        }
    }

    pub fn get(&self, field_type: FieldType) -> Option<&dyn Field> {
        self.fields.get(&field_type).map(|f| f.as_ref())
    }

    /// registered types, sorted by name
    pub fn field_types(&self) -> Vec<FieldType> {
        let mut types = self.fields.keys().copied().collect::<Vec<_>>();
        types.sort_by_key(|t| t.to_string());
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::track::ResolutionOutcome,
        fields::{price::PriceField, soundcloud::SoundCloudField},
        resolver::Resolve,
    };

    struct NeverResolves;

    impl Resolve for NeverResolves {
        fn resolve(&self, _url: &str) -> ResolutionOutcome {
            ResolutionOutcome::NotFound
        }
    }

    #[test]
    fn test_registry_lookup_by_type() {
        let mut registry = FieldRegistry::new();
        registry.register(FieldType::Price, Box::new(PriceField));
        registry.register(
            FieldType::SoundCloud,
            Box::new(SoundCloudField::new(Box::new(NeverResolves))),
        );

        assert_eq!(registry.get(FieldType::Price).map(|f| f.name()), Some("price"));
        assert_eq!(
            registry.get(FieldType::SoundCloud).map(|f| f.title()),
            Some("SoundCloud")
        );
        assert_eq!(
            registry.field_types(),
            vec![FieldType::Price, FieldType::SoundCloud]
        );
    }

    #[test]
    fn test_missing_type_is_none() {
        let registry = FieldRegistry::new();
        assert!(registry.get(FieldType::Price).is_none());
    }

    #[test]
    fn test_field_config_json_shape() -> anyhow::Result<()> {
        let field = FieldConfig {
            key: "field_price".to_string(),
            label: "Price".to_string(),
            options: FieldOptions::Price {
                symbol: "€".to_string(),
            },
        };

        let value = serde_json::to_value(&field)?;
        assert_eq!(
            value,
            serde_json::json!({"key": "field_price", "label": "Price", "type": "price", "symbol": "€"})
        );
        assert_eq!(serde_json::from_value::<FieldConfig>(value)?, field);
        assert_eq!(field.field_type(), FieldType::Price);

        Ok(())
    }
}
