//! Resolution of user-entered SoundCloud URLs into track metadata

use std::sync::Arc;

use log::{debug, warn};
use serde_json::Value;
use thiserror::Error;

use crate::{config::ResolverConfig, domain::track::ResolutionOutcome};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("resolution service unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("resolution service answered with status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Turns a raw URL into a [`ResolutionOutcome`].
///
/// Implementations never fail: every unrecoverable problem degrades to
/// [`ResolutionOutcome::NotFound`].
pub trait Resolve: Send + Sync {
    fn resolve(&self, url: &str) -> ResolutionOutcome;
}

impl<T: Resolve + ?Sized> Resolve for Arc<T> {
    fn resolve(&self, url: &str) -> ResolutionOutcome {
        self.as_ref().resolve(url)
    }
}

/// Builds the lookup URL for `url`, the client id is appended as configured
pub fn resolve_endpoint(config: &ResolverConfig, url: &str) -> String {
    format!(
        "{}?url={}&client_id={}",
        config.base_url,
        urlencoding::encode(url),
        config.client_id
    )
}

/// Blocking client for the remote resolution endpoint.
///
/// One round trip per call, no retries, no caching.
pub struct TrackResolver {
    config: ResolverConfig,
    http_client: ureq::Agent,
}

impl TrackResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            http_client: ureq::AgentBuilder::new().build(),
        }
    }

    /// Same as [`Resolve::resolve`], but reports why nothing was found
    pub fn try_resolve(&self, url: &str) -> Result<ResolutionOutcome, ResolveError> {
        let endpoint = resolve_endpoint(&self.config, url);
        debug!("resolving {url} via {}", self.config.base_url);

        let response = match self.http_client.get(&endpoint).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(404, _)) => return Ok(ResolutionOutcome::NotFound),
            Err(ureq::Error::Status(code, _)) => return Err(ResolveError::Status(code)),
            Err(ureq::Error::Transport(transport)) => {
                return Err(ResolveError::RemoteUnavailable(transport.to_string()));
            }
        };

        let body = response
            .into_string()
            .map_err(|e| ResolveError::RemoteUnavailable(format!("failed to read body: {e}")))?;

        match serde_json::from_str::<Value>(&body) {
            Ok(Value::Object(record)) => ResolutionOutcome::from_record(record)
                .map_err(|e| ResolveError::Malformed(format!("unexpected track shape: {e}"))),
            Ok(other) => Err(ResolveError::Malformed(format!(
                "expected a JSON object, got {other}"
            ))),
            Err(e) => Err(ResolveError::Malformed(format!("invalid JSON: {e}"))),
        }
    }
}

impl Resolve for TrackResolver {
    fn resolve(&self, url: &str) -> ResolutionOutcome {
        match self.try_resolve(url) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("could not resolve {url}, storing empty value: {e}");
                ResolutionOutcome::NotFound
            }
        }
    }
}
