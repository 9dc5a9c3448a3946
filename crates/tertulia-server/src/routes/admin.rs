//! CSV bulk upload.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// `POST /admin/subir-csv`: multipart upload, field `file`.
///
/// Answers 200 with the per-row load report once the file was recognized
/// and parsed, even when individual rows failed.
pub async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    let loader = state.loader()?;

    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(upload_error)?;

        let report = loader.load(&filename, &bytes).await?;
        return Ok(Json(json!({
            "message": format!("{} cargado correctamente", report.file),
            "report": report,
        })));
    }

    Err(ApiError::BadRequest("No se envió ningún archivo".into()))
}

fn upload_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::PayloadTooLarge;
    }
    tracing::debug!(error = %e.body_text(), "Unreadable multipart body");
    ApiError::BadRequest("No se pudo leer el archivo enviado.".into())
}
