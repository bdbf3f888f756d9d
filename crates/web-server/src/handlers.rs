use crate::{AppState, error::AppError};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use core_types::{Pagination, Person, PersonFilter, PersonPayload};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    name: Option<String>,
    gender: Option<String>,
    country: Option<String>,
    #[serde(default = "default_page")]
    page: i64,
    #[serde(default = "default_size")]
    size: i64,
}
fn default_page() -> i64 { 1 }
fn default_size() -> i64 { 10 }

/// Ids are positive integers; anything else is a client error.
fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::BadRequest("Invalid ID".to_string()))
}

fn parse_body(
    payload: Result<Json<PersonPayload>, JsonRejection>,
) -> Result<PersonPayload, AppError> {
    payload
        .map(|Json(person)| person)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// # GET /people
/// Lists persons, filtered by `name`, `gender` and `country`, paginated by `page` and `size`.
pub async fn list_persons(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Person>>, AppError> {
    let Query(params) = params.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let filter = PersonFilter::new(params.name, params.gender, params.country);
    let page = Pagination::new(params.page, params.size);

    let persons = state.service.list(filter, page).await?;
    Ok(Json(persons))
}

/// # GET /people/:id
pub async fn get_person(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Person>, AppError> {
    let id = parse_id(&id)?;
    let person = state.service.get(id).await?;
    Ok(Json(person))
}

/// # POST /people
/// Only `first_name` is required; gender, age and country are inferred from it.
pub async fn create_person(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PersonPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Person>), AppError> {
    let person = parse_body(payload)?;
    let created = state.service.create(person).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// # PUT /people/:id
/// Replaces every writable field and re-runs the enrichment.
pub async fn update_person(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PersonPayload>, JsonRejection>,
) -> Result<Json<Person>, AppError> {
    let id = parse_id(&id)?;
    let person = parse_body(payload)?;
    let updated = state.service.update(id, person).await?;
    Ok(Json(updated))
}

/// # DELETE /people/:id
pub async fn delete_person(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
