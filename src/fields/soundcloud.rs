use serde_json::Value;

use crate::{
    domain::track::{ResolutionOutcome, TrackMetadata},
    fields::{
        Field, FieldConfig,
        render::{OptionRow, RenderRequest, TextInput, TrackPreview, input_name},
    },
    resolver::Resolve,
    storage::operations::EntityId,
};

/// Stores the resolved metadata of a SoundCloud track instead of its URL
pub struct SoundCloudField {
    resolver: Box<dyn Resolve>,
}

impl SoundCloudField {
    pub fn new(resolver: Box<dyn Resolve>) -> Self {
        Self { resolver }
    }
}

/// Formats a duration as `mm:ss`.
///
/// Minutes are rounded, seconds are the truncated remainder, so e.g. 150 s
/// shows as `03:30`.
pub fn format_duration(duration_ms: u64) -> String {
    let total_seconds = duration_ms / 1000;
    let minutes = (total_seconds as f64 / 60.0).round() as u64;
    let seconds = total_seconds % 60;
    format!("{minutes:02}:{seconds:02}")
}

pub fn invalid_kind_message(kind: &str) -> String {
    format!("This is a link to a {kind}, not a single track!")
}

fn preview(track: &TrackMetadata) -> TrackPreview {
    TrackPreview {
        title: track.title.clone(),
        permalink_url: track.permalink_url.clone(),
        artwork_url: track.artwork_url.clone(),
        duration: format_duration(track.duration_ms),
    }
}

impl Field for SoundCloudField {
    fn name(&self) -> &'static str {
        "soundcloud"
    }

    fn title(&self) -> &'static str {
        "SoundCloud"
    }

    fn render_options(&self, _key: &str, _field: &FieldConfig) -> Vec<OptionRow> {
        Vec::new()
    }

    fn render_field(&self, field: &FieldConfig, value: &Value) -> RenderRequest {
        let name = input_name(&field.key);
        let mut input = TextInput {
            id: name.clone(),
            name,
            class: self.name().to_string(),
            value: String::new(),
        };

        match ResolutionOutcome::from_stored(value) {
            ResolutionOutcome::Resolved(track) => {
                input.value = track.permalink_url.clone();
                RenderRequest::Track {
                    input,
                    preview: Some(preview(&track)),
                    error: None,
                }
            }
            ResolutionOutcome::InvalidKind { kind, record } => {
                input.value = record
                    .get("permalink_url")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                RenderRequest::Track {
                    input,
                    preview: None,
                    error: Some(invalid_kind_message(&kind)),
                }
            }
            ResolutionOutcome::NotFound => RenderRequest::Track {
                input,
                preview: None,
                error: None,
            },
        }
    }

    fn update_value(&self, entity: EntityId, field: &FieldConfig, value: &str) -> Value {
        if value.trim().is_empty() {
            return Value::Null;
        }

        let outcome = self.resolver.resolve(value);
        match &outcome {
            ResolutionOutcome::Resolved(track) => {
                log::info!("entity {entity}: {} resolved to \"{}\"", field.key, track.title)
            }
            ResolutionOutcome::NotFound => {
                log::info!("entity {entity}: {} could not be resolved", field.key)
            }
            ResolutionOutcome::InvalidKind { kind, .. } => {
                log::info!("entity {entity}: {} points to a {kind}", field.key)
            }
        }
        outcome.into_stored()
    }

    fn format_value_for_api(&self, value: Value, _field: &FieldConfig) -> Value {
        value
    }
}
