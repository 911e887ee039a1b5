use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const TRACK_KIND: &str = "track";

/// Metadata of a single track, as returned by the resolution service.
///
/// The full record is kept as received so that it can be persisted
/// without lossy re-encoding; the typed fields are the ones renderers read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct TrackMetadata {
    pub kind: String,
    pub title: String,
    pub permalink_url: String,
    pub artwork_url: Option<String>,
    pub duration_ms: u64,
    record: Map<String, Value>,
}

/// The subset of the record we actually read
#[derive(Deserialize)]
struct KnownFields {
    kind: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    permalink_url: Option<String>,
    #[serde(default)]
    artwork_url: Option<String>,
    #[serde(default)]
    duration: Option<u64>,
}

impl TrackMetadata {
    pub fn record(&self) -> &Map<String, Value> {
        &self.record
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.record)
    }
}

impl TryFrom<Map<String, Value>> for TrackMetadata {
    type Error = serde_json::Error;

    fn try_from(record: Map<String, Value>) -> Result<Self, Self::Error> {
        let known: KnownFields = serde_json::from_value(Value::Object(record.clone()))?;
        Ok(Self {
            kind: known.kind,
            title: known.title.unwrap_or_default(),
            permalink_url: known.permalink_url.unwrap_or_default(),
            artwork_url: known.artwork_url,
            duration_ms: known.duration.unwrap_or(0),
            record,
        })
    }
}

impl From<TrackMetadata> for Map<String, Value> {
    fn from(track: TrackMetadata) -> Self {
        track.record
    }
}

/// Result of resolving a user-supplied URL.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    Resolved(TrackMetadata),
    /// nothing usable came back; persisted as the empty value
    NotFound,
    /// resolved, but to something that is not a single track
    InvalidKind {
        kind: String,
        record: Map<String, Value>,
    },
}

impl ResolutionOutcome {
    /// Classifies a parsed record by its `kind` tag.
    pub fn from_record(record: Map<String, Value>) -> Result<Self, serde_json::Error> {
        match record.get("kind").and_then(Value::as_str) {
            Some(TRACK_KIND) => Ok(Self::Resolved(TrackMetadata::try_from(record)?)),
            Some(kind) => Ok(Self::InvalidKind {
                kind: kind.to_string(),
                record,
            }),
            None => Ok(Self::InvalidKind {
                kind: "unknown".to_string(),
                record,
            }),
        }
    }

    /// The value persisted for this outcome.
    pub fn into_stored(self) -> Value {
        match self {
            Self::Resolved(track) => track.into_value(),
            Self::NotFound => Value::Null,
            Self::InvalidKind { record, .. } => Value::Object(record),
        }
    }

    /// Reads back a persisted value. Empty values read as `NotFound`.
    pub fn from_stored(value: &Value) -> Self {
        match value {
            Value::Object(record) => {
                Self::from_record(record.clone()).unwrap_or(Self::NotFound)
            }
            _ => Self::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_track_record_resolves() -> anyhow::Result<()> {
        let record = as_map(json!({
            "kind": "track",
            "id": 13158665,
            "title": "Munching at Tiannas house",
            "permalink_url": "https://soundcloud.com/user2835985/munching-at-tiannas-house",
            "artwork_url": null,
            "duration": 125000,
            "user": {"username": "Alex"}
        }));

        let outcome = ResolutionOutcome::from_record(record.clone())?;
        let ResolutionOutcome::Resolved(track) = outcome else {
            panic!("expected resolved track");
        };

        assert_eq!(track.kind, "track");
        assert_eq!(track.title, "Munching at Tiannas house");
        assert_eq!(track.artwork_url, None);
        assert_eq!(track.duration_ms, 125000);
        assert_eq!(track.record(), &record);

        Ok(())
    }

    #[test]
    fn test_non_track_kind_keeps_record() -> anyhow::Result<()> {
        let record = as_map(json!({"kind": "playlist", "title": "Mix", "tracks": []}));

        let outcome = ResolutionOutcome::from_record(record.clone())?;

        assert_eq!(
            outcome,
            ResolutionOutcome::InvalidKind {
                kind: "playlist".to_string(),
                record: record.clone(),
            }
        );
        assert_eq!(outcome.into_stored(), Value::Object(record));

        Ok(())
    }

    #[test]
    fn test_missing_kind_is_unknown() -> anyhow::Result<()> {
        let outcome = ResolutionOutcome::from_record(as_map(json!({"title": "?"})))?;
        assert!(matches!(outcome, ResolutionOutcome::InvalidKind { kind, .. } if kind == "unknown"));
        Ok(())
    }

    #[test]
    fn test_serde_round_trip_is_lossless() -> anyhow::Result<()> {
        let raw = json!({
            "kind": "track",
            "title": "t",
            "permalink_url": "https://soundcloud.com/a/t",
            "extra": {"nested": [1, 2, 3]}
        });

        let track: TrackMetadata = serde_json::from_value(raw.clone())?;
        assert_eq!(serde_json::to_value(&track)?, raw);

        Ok(())
    }

    #[test]
    fn test_from_stored_empty_is_not_found() {
        assert_eq!(ResolutionOutcome::from_stored(&Value::Null), ResolutionOutcome::NotFound);
        assert_eq!(
            ResolutionOutcome::from_stored(&json!("")),
            ResolutionOutcome::NotFound
        );
        assert_eq!(ResolutionOutcome::NotFound.into_stored(), Value::Null);
    }
}
