use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use shared::{
    CreateEntryRequest, EntryListResponse, EntryTableRequest, ErrorResponse, RecordRemainingRequest,
    SortDirection, SortField,
};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::domain::{EntryError, EntryService, EntryTableService};

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub entry_service: EntryService,
    pub entry_table_service: EntryTableService,
}

impl AppState {
    pub fn new(entry_service: EntryService, entry_table_service: EntryTableService) -> Self {
        Self {
            entry_service,
            entry_table_service,
        }
    }
}

fn error_response(err: EntryError) -> Response {
    let status = match &err {
        EntryError::Validation { .. } => StatusCode::BAD_REQUEST,
        EntryError::NotFound(_) => StatusCode::NOT_FOUND,
        EntryError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    let body = ErrorResponse {
        error: err.to_string(),
        field: err.field().map(str::to_string),
    };
    (status, Json(body)).into_response()
}

/// 400 for a query string that does not describe a valid table request,
/// naming the offending parameter when it can be pinned down
fn query_rejection_response(uri: &Uri, rejection: QueryRejection) -> Response {
    warn!("Rejected entry table query {:?}: {}", uri.query(), rejection.body_text());

    let body = match invalid_query_parameter(uri) {
        Some((field, expected)) => ErrorResponse {
            error: format!("Invalid {}: expected one of {}", field, expected.join(", ")),
            field: Some(field.to_string()),
        },
        None => ErrorResponse {
            error: rejection.body_text(),
            field: None,
        },
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn invalid_query_parameter(uri: &Uri) -> Option<(&'static str, Vec<String>)> {
    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(uri).ok()?;

    let sort_names: Vec<String> = SortField::ALL.iter().map(|f| f.to_string()).collect();
    if let Some(sort) = params.get("sort") {
        if !sort_names.contains(sort) {
            return Some(("sort", sort_names));
        }
    }

    let direction_names: Vec<String> = SortDirection::ALL.iter().map(|d| d.to_string()).collect();
    if let Some(direction) = params.get("direction") {
        if !direction_names.contains(direction) {
            return Some(("direction", direction_names));
        }
    }
    None
}

/// Axum handler function for POST /api/entries
pub async fn create_entry(
    State(state): State<AppState>,
    Json(request): Json<CreateEntryRequest>,
) -> Response {
    info!("POST /api/entries - request: {:?}", request);

    match state.entry_service.create_entry(request).await {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler function for PUT /api/entries/:id/remaining
pub async fn record_remaining(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RecordRemainingRequest>,
) -> Response {
    info!("PUT /api/entries/{}/remaining - {:?}", id, request);

    match state
        .entry_service
        .record_remaining(&id, request.remaining_weight)
        .await
    {
        Ok(entry) => (StatusCode::OK, Json(entry)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler function for GET /api/entries
pub async fn get_entry_table(
    State(state): State<AppState>,
    uri: Uri,
    query: Result<Query<EntryTableRequest>, QueryRejection>,
) -> Response {
    let request = match query {
        Ok(Query(request)) => request,
        Err(rejection) => return query_rejection_response(&uri, rejection),
    };
    info!("GET /api/entries - query: {:?}", request);

    match state.entry_service.list_entries().await {
        Ok(entries) => {
            let table = state.entry_table_service.build_table(&entries, &request);
            (StatusCode::OK, Json(table)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// Axum handler function for GET /api/entries/pending
pub async fn list_pending(State(state): State<AppState>) -> Response {
    match state.entry_service.list_pending().await {
        Ok(entries) => (StatusCode::OK, Json(EntryListResponse { entries })).into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler function for GET /api/entries/surplus
pub async fn list_surplus(State(state): State<AppState>) -> Response {
    match state.entry_service.list_completed_with_surplus().await {
        Ok(entries) => (StatusCode::OK, Json(EntryListResponse { entries })).into_response(),
        Err(e) => error_response(e),
    }
}
