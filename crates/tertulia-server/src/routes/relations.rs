//! Relationship creation.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tertulia_core::RelationKind;

use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RelateRequest {
    pub from: Option<String>,
    #[serde(default)]
    pub to: Vec<String>,
}

/// `POST /relaciones/{tipo}`: one source, many targets. Unmatched endpoints are skipped.
pub async fn create_relations(
    State(state): State<AppState>,
    Path(tipo): Path<String>,
    body: std::result::Result<Json<RelateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let graph = state.graph()?;

    let incomplete = || ApiError::BadRequest("Datos incompletos para crear la relación.".into());
    let Ok(Json(request)) = body else {
        return Err(incomplete());
    };
    let from = request
        .from
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(incomplete)?;
    if request.to.is_empty() {
        return Err(incomplete());
    }
    let kind = RelationKind::from_name(&tipo)?;

    let linked = graph
        .relate(kind, &from, &request.to)
        .await
        .map_err(|e| ApiError::database("Error interno al crear las relaciones.", e))?;
    if linked < request.to.len() as i64 {
        tracing::info!(
            relation = %kind,
            requested = request.to.len(),
            linked,
            "Some relationship endpoints were not found"
        );
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Relaciones creadas exitosamente." })),
    ))
}
