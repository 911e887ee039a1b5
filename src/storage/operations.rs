use std::time::SystemTime;

use rusqlite::{OptionalExtension, params};
use serde_json::Value;

use crate::{
    config,
    storage::{
        db::{self, SecondsSinceUnix, system_time_to_i64},
        error::StorageError,
        schema::{columns, tables},
    },
};

use columns::*;
use tables::*;

/// Identifier of the content record (post) a value is attached to
pub type EntityId = i64;

/// A value as persisted for one entity and field
#[derive(Debug, Clone, PartialEq)]
pub struct StoredValue {
    pub value: Value,
    pub updated_at: SecondsSinceUnix,
}

/// Persists field values keyed by entity and field key.
///
/// The empty value (`null`) is stored as SQL `NULL`, everything else as JSON text.
pub struct FieldStore {
    pub(crate) db: rusqlite::Connection,
}

impl FieldStore {
    /// when called, opens a data base connection
    pub fn new(db_config: &config::Database) -> Result<Self, StorageError> {
        let db = db::open(db_config)?;
        Ok(Self::from_existing_conn(db))
    }

    pub fn from_existing_conn(db: rusqlite::Connection) -> Self {
        Self { db }
    }

    /// Inserts or replaces the value of `field_key` for `entity`
    pub fn put_value(
        &mut self,
        entity: EntityId,
        field_key: &str,
        value: &Value,
    ) -> Result<(), StorageError> {
        self.put_value_at(entity, field_key, value, SystemTime::now())
    }

    fn put_value_at(
        &mut self,
        entity: EntityId,
        field_key: &str,
        value: &Value,
        time: SystemTime,
    ) -> Result<(), StorageError> {
        let time_secs = system_time_to_i64(time).map_err(StorageError::Internal)?;
        let encoded = match value {
            Value::Null => None,
            other => Some(serde_json::to_string(other)?),
        };

        self.db.execute(
            &format!(
                "INSERT INTO {FIELD_VALUES} ({ENTITY_ID}, {FIELD_KEY}, {VALUE}, {UPDATED_AT})
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT ({ENTITY_ID}, {FIELD_KEY})
                 DO UPDATE SET {VALUE} = excluded.{VALUE}, {UPDATED_AT} = excluded.{UPDATED_AT}"
            ),
            params![entity, field_key, encoded, time_secs],
        )?;

        log::debug!("stored {field_key} for entity {entity}");
        Ok(())
    }

    /// Returns the stored value, or `None` if nothing was ever saved
    pub fn get_value(
        &self,
        entity: EntityId,
        field_key: &str,
    ) -> Result<Option<StoredValue>, StorageError> {
        let row = self
            .db
            .query_row(
                &format!(
                    "SELECT {VALUE}, {UPDATED_AT} FROM {FIELD_VALUES}
                     WHERE {ENTITY_ID} = ?1 AND {FIELD_KEY} = ?2"
                ),
                params![entity, field_key],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, SecondsSinceUnix>(1)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(encoded, updated_at)| {
            let value = match encoded {
                Some(text) => serde_json::from_str(&text)?,
                None => Value::Null,
            };
            Ok::<_, StorageError>(StoredValue { value, updated_at })
        })
        .transpose()
    }

    /// All values stored for `entity`, ordered by field key
    pub fn list_values(&self, entity: EntityId) -> Result<Vec<(String, Value)>, StorageError> {
        let mut stmt = self.db.prepare(&format!(
            "SELECT {FIELD_KEY}, {VALUE} FROM {FIELD_VALUES}
             WHERE {ENTITY_ID} = ?1 ORDER BY {FIELD_KEY}"
        ))?;

        let rows = stmt
            .query_map(params![entity], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(key, encoded)| {
                let value = match encoded {
                    Some(text) => serde_json::from_str(&text)?,
                    None => Value::Null,
                };
                Ok::<_, StorageError>((key, value))
            })
            .collect()
    }

    /// Removes the value, returns whether anything was stored
    pub fn delete_value(&mut self, entity: EntityId, field_key: &str) -> Result<bool, StorageError> {
        let removed = self.db.execute(
            &format!("DELETE FROM {FIELD_VALUES} WHERE {ENTITY_ID} = ?1 AND {FIELD_KEY} = ?2"),
            params![entity, field_key],
        )?;
        Ok(removed > 0)
    }
}
