//! HTTP error type and its JSON rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tertulia_core::ModelError;
use tertulia_graph::GraphError;
use tertulia_ingest::IngestError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("La base de datos no está disponible.")]
    Unavailable,

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("{0}")]
    BadRequest(String),

    #[error("El archivo supera el tamaño máximo permitido.")]
    PayloadTooLarge,

    /// Database failure. Only `message` reaches the client.
    #[error("{message}")]
    Database {
        message: String,
        #[source]
        source: GraphError,
    },
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Wrap a graph error behind a generic client-facing message.
    pub fn database(message: impl Into<String>, source: GraphError) -> Self {
        Self::Database {
            message: message.into(),
            source,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Model(ModelError::UnknownEntity(_)) => StatusCode::NOT_FOUND,
            Self::Model(_) | Self::Ingest(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Unavailable | Self::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Database { message, source } => {
                tracing::error!(error = %source, "{message}");
            }
            Self::Unavailable => {
                tracing::warn!("Request refused: database unavailable");
            }
            _ => {
                tracing::debug!(status = status.as_u16(), error = %self, "Rejected request");
            }
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
