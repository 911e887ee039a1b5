//! Structured render requests handed back to the host instead of markup

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextInput {
    pub id: String,
    pub name: String,
    pub class: String,
    pub value: String,
}

/// One row of a field's option screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionRow {
    pub label: String,
    pub input: TextInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPreview {
    pub title: String,
    pub permalink_url: String,
    pub artwork_url: Option<String>,
    /// `mm:ss`
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum RenderRequest {
    /// symbol shown in front of the input
    Price { symbol: String, input: TextInput },
    Track {
        input: TextInput,
        preview: Option<TrackPreview>,
        error: Option<String>,
    },
}

/// form name of a field's submitted value
pub fn input_name(key: &str) -> String {
    format!("fields[{key}]")
}

/// form name of one of a field's options
pub fn option_name(key: &str, option: &str) -> String {
    format!("fields[{key}][{option}]")
}
