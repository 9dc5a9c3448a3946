//! Generic CRUD handlers for the four node labels.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Map, Value};
use tertulia_core::{Label, Properties};
use tertulia_graph::mutations::UpdateOutcome;
use tertulia_graph::Record;

use crate::error::{ApiError, Result};
use crate::state::AppState;

pub async fn list_entities(
    State(state): State<AppState>,
    Path(plural): Path<String>,
) -> Result<Json<Vec<Record>>> {
    let graph = state.graph()?;
    let label = Label::from_plural(&plural)?;

    let nodes = graph
        .list_nodes(label)
        .await
        .map_err(|e| ApiError::database(format!("Error interno al obtener {plural}"), e))?;
    Ok(Json(nodes))
}

pub async fn create_entity(
    State(state): State<AppState>,
    Path(plural): Path<String>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let graph = state.graph()?;
    let label = Label::from_plural(&plural)?;
    let object = payload(body, "No se proporcionaron datos.")?;
    let props = Properties::from_json(label, &object)?;

    graph
        .create_node(&props)
        .await
        .map_err(|e| ApiError::database(format!("Error interno al agregar {label}"), e))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": format!("{label} agregado correctamente.") })),
    ))
}

pub async fn update_entity(
    State(state): State<AppState>,
    Path((plural, identifier)): Path<(String, String)>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>> {
    let graph = state.graph()?;
    let label = Label::from_plural(&plural)?;
    let object = payload(body, "No se proporcionaron datos para actualizar.")?;
    let props = Properties::from_json(label, &object)?;

    let outcome = graph
        .update_node(&identifier, props)
        .await
        .map_err(|e| ApiError::database(format!("Error interno al actualizar {label}"), e))?;
    if let UpdateOutcome::Applied { matched: 0 } = outcome {
        tracing::info!(%label, identifier = %identifier, "Update matched nothing");
    }

    Ok(Json(json!({
        "message": format!("{label} '{identifier}' actualizado correctamente.")
    })))
}

/// A non-empty JSON object, or a 400 with `missing`.
fn payload(
    body: std::result::Result<Json<Value>, JsonRejection>,
    missing: &str,
) -> Result<Map<String, Value>> {
    match body {
        Ok(Json(Value::Object(object))) if !object.is_empty() => Ok(object),
        _ => Err(ApiError::BadRequest(missing.to_string())),
    }
}
