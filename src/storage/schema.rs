use rusqlite::Connection;

pub mod tables {
    pub const FIELD_VALUES: &str = "field_values";

    #[cfg(test)]
    pub const ALL_TABLES: &[&str] = &[FIELD_VALUES];
}

pub mod columns {
    pub const ENTITY_ID: &str = "entity_id";
    pub const FIELD_KEY: &str = "field_key";
    pub const VALUE: &str = "value";
    pub const UPDATED_AT: &str = "updated_at";
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS field_values (
    entity_id INTEGER NOT NULL,
    field_key TEXT NOT NULL,
    value TEXT,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (entity_id, field_key)
);
"#;

pub fn init(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA)
}
