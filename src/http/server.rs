use log::info;
use rouille::{Request, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    config::HttpConfig,
    host::FieldHost,
    http::error::ApiError,
    storage::operations::EntityId,
};

pub struct HttpServer {
    host: Arc<FieldHost>,
    pub config: HttpConfig,
}

/// Body of a save request
#[derive(Serialize, Deserialize)]
struct SaveRequest {
    value: String,
}

impl HttpServer {
    pub fn new(host: FieldHost, config: HttpConfig) -> Self {
        Self {
            host: Arc::new(host),
            config,
        }
    }

    pub fn run(self) {
        let addr = format!("{}:{}", self.config.bind_addr, self.config.port);
        rouille::start_server(addr, move |request| self.handle_request(request));
    }

    fn handle_request(&self, request: &Request) -> Response {
        Self::log_request(request);

        let result = rouille::router!(request,
            (GET) (/fields) => {
                self.handle_list_fields()
            },
            (GET) (/fields/{key: String}/options) => {
                self.handle_options(&key)
            },
            (GET) (/entities/{id: String}/fields/{key: String}) => {
                self.handle_load(&id, &key)
            },
            (POST) (/entities/{id: String}/fields/{key: String}) => {
                self.handle_save(request, &id, &key)
            },
            (GET) (/entities/{id: String}/fields/{key: String}/api) => {
                self.handle_api(&id, &key)
            },
            (GET) (/entities/{id: String}/fields/{key: String}/render) => {
                self.handle_render(&id, &key)
            },
            _ => Ok(Response::empty_404())
        );

        let response = result.unwrap_or_else(ApiError::into_response);
        info!("Response: {} {}", request.method(), response.status_code);
        response
    }

    fn log_request(request: &Request) {
        info!("{} {}", request.method(), request.url());
    }

    fn parse_entity(id: &str) -> Result<EntityId, ApiError> {
        id.parse::<EntityId>()
            .map_err(|_| ApiError::BadRequest(format!("invalid entity id {id}")))
    }

    fn handle_list_fields(&self) -> Result<Response, ApiError> {
        Ok(Response::json(&self.host.fields()))
    }

    fn handle_options(&self, key: &str) -> Result<Response, ApiError> {
        let rows = self.host.render_options(key)?;
        Ok(Response::json(&rows))
    }

    fn handle_load(&self, id: &str, key: &str) -> Result<Response, ApiError> {
        let entity = Self::parse_entity(id)?;
        let value = self.host.load(entity, key)?;
        Ok(Response::json(&value))
    }

    /// resolves / normalizes the submitted value, responds with what got persisted
    fn handle_save(&self, request: &Request, id: &str, key: &str) -> Result<Response, ApiError> {
        let entity = Self::parse_entity(id)?;
        let body: SaveRequest = rouille::input::json_input(request)
            .map_err(|e| ApiError::BadRequest(format!("invalid body: {e}")))?;

        let value = self.host.save(entity, key, &body.value)?;
        Ok(Response::json(&value))
    }

    fn handle_api(&self, id: &str, key: &str) -> Result<Response, ApiError> {
        let entity = Self::parse_entity(id)?;
        let value = self.host.api_value(entity, key)?;
        Ok(Response::json(&value))
    }

    fn handle_render(&self, id: &str, key: &str) -> Result<Response, ApiError> {
        let entity = Self::parse_entity(id)?;
        let request = self.host.render_field(entity, key)?;
        Ok(Response::json(&request))
    }
}

#[cfg(test)]
pub fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: rouille::Response,
) -> anyhow::Result<T> {
    Ok(serde_json::from_reader(
        response.data.into_reader_and_size().0,
    )?)
}
