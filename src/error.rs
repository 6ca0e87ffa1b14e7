use std::collections::HashMap;

use serde_json::json;
use thiserror::Error;

use crate::router::Response;
use crate::schemas::{ErrorDetail, ValidationError};

pub const NOT_FOUND_DETAIL: &str = "Prato não encontrado";

/// Everything a dish handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{}", NOT_FOUND_DETAIL)]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 422,
            ApiError::NotFound => 404,
            ApiError::Database(_) => 500,
        }
    }
}

impl From<ApiError> for Response {
    fn from(err: ApiError) -> Self {
        let status = err.status_code();
        match err {
            ApiError::Validation(e) => {
                log::debug!("Rejected request: {}", e);
                Response::json(json!({ "detail": [e] }), status, HashMap::new())
            }
            ApiError::NotFound => Response::json(
                ErrorDetail {
                    detail: NOT_FOUND_DETAIL.to_string(),
                },
                status,
                HashMap::new(),
            ),
            ApiError::Database(e) => {
                log::error!("Database error: {}", e);
                Response::internal_error()
            }
        }
    }
}
