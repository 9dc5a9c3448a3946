//! Fixed analytics reports.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tertulia_graph::queries::{
    BookRead, ClubMember, MultiClubMember, PopularBook, RecommendedReader,
};

use crate::error::{ApiError, Result};
use crate::state::AppState;

const QUERY_FAILED: &str = "Error al procesar la consulta.";

#[derive(Debug, Deserialize)]
pub struct PersonaQuery {
    pub persona: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClubQuery {
    pub club: Option<String>,
}

fn required(value: Option<String>, message: &str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(message.to_string()))
}

pub async fn books_read(
    State(state): State<AppState>,
    Query(query): Query<PersonaQuery>,
) -> Result<Json<Vec<BookRead>>> {
    let graph = state.graph()?;
    let persona = required(query.persona, "El nombre de la persona es requerido.")?;
    let books = graph
        .books_read_by(&persona)
        .await
        .map_err(|e| ApiError::database(QUERY_FAILED, e))?;
    Ok(Json(books))
}

pub async fn club_members(
    State(state): State<AppState>,
    Query(query): Query<ClubQuery>,
) -> Result<Json<Vec<ClubMember>>> {
    let graph = state.graph()?;
    let club = required(query.club, "El nombre del club es requerido.")?;
    let members = graph
        .club_members(&club)
        .await
        .map_err(|e| ApiError::database(QUERY_FAILED, e))?;
    Ok(Json(members))
}

pub async fn recommended_readers(
    State(state): State<AppState>,
) -> Result<Json<Vec<RecommendedReader>>> {
    let rows = state
        .graph()?
        .recommended_readers()
        .await
        .map_err(|e| ApiError::database(QUERY_FAILED, e))?;
    Ok(Json(rows))
}

pub async fn multi_club_members(
    State(state): State<AppState>,
) -> Result<Json<Vec<MultiClubMember>>> {
    let rows = state
        .graph()?
        .multi_club_members()
        .await
        .map_err(|e| ApiError::database(QUERY_FAILED, e))?;
    Ok(Json(rows))
}

pub async fn popular_books(State(state): State<AppState>) -> Result<Json<Vec<PopularBook>>> {
    let rows = state
        .graph()?
        .popular_books()
        .await
        .map_err(|e| ApiError::database(QUERY_FAILED, e))?;
    Ok(Json(rows))
}
