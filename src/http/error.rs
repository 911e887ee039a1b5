use rouille::Response;

use crate::{host::FieldError, storage::error::StorageError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl From<FieldError> for ApiError {
    fn from(err: FieldError) -> Self {
        match err {
            FieldError::UnknownField(key) => ApiError::NotFound(format!("field {key} not found")),

            FieldError::UnsupportedType(field_type) => {
                log::error!("no implementation for configured field type {field_type}");
                ApiError::Internal("internal server error".into())
            }

            FieldError::Storage(e) => ApiError::from(e),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        log::error!("storage failure: {err}");
        ApiError::Internal("internal server error".into())
    }
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::BadRequest(_) => 400,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) | ApiError::Internal(msg) => {
                Response::text(msg).with_status_code(status)
            }
        }
    }
}
