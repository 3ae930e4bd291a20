// 🌐 JSON API - read-only view endpoints + selection control over an EnergyStore
//
// Every response is wrapped in `ApiResponse { success, data, error }`.
// Views that have no data answer 200 with `null` / `[]`, never an error.

use crate::dataset::Year;
use crate::store::EnergyStore;
use crate::views::ViewName;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: EnergyStore,
}

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message.into()),
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::failure(message))).into_response()
}

/// Current selection plus what it resolves to
#[derive(Debug, Serialize, Deserialize)]
pub struct SelectionResponse {
    pub country_code: String,
    pub year: Year,
    /// Display name, None when the code is not in the dependency source
    pub country_name: Option<String>,
    pub available_years: Vec<Year>,
}

/// POST /api/selection body; absent fields stay unchanged
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SelectionUpdate {
    pub country_code: Option<String>,
    pub year: Option<Year>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/status - Load status, dataset version and selection
async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.store.snapshot_status()))
}

/// GET /api/countries - Country picker entries
async fn get_countries(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.store.countries()))
}

fn selection_response(store: &EnergyStore) -> SelectionResponse {
    let selection = store.selection();
    SelectionResponse {
        country_name: store.selected_country().map(|c| c.name),
        available_years: store.available_years(),
        country_code: selection.country_code,
        year: selection.year,
    }
}

/// GET /api/selection - Current selection
async fn get_selection(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(selection_response(&state.store)))
}

/// POST /api/selection - Change country and/or year
async fn update_selection(
    State(state): State<AppState>,
    Json(update): Json<SelectionUpdate>,
) -> Response {
    let year_range = state.store.year_range();

    if let Some(year) = update.year {
        if !year_range.contains(year) {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("year {} outside {}..={}", year, year_range.min, year_range.max),
            );
        }
    }
    if let Some(code) = update.country_code.as_deref() {
        if code.trim().is_empty() {
            return error_response(StatusCode::BAD_REQUEST, "country_code must not be empty");
        }
    }

    let selection = state
        .store
        .update_selection(update.country_code.as_deref(), update.year);
    debug!(?selection, "selection updated");

    (StatusCode::OK, Json(ApiResponse::ok(selection_response(&state.store)))).into_response()
}

/// GET /api/views/:name - One projected view for the current selection
async fn get_view(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let view = match name.parse::<ViewName>() {
        Ok(view) => view,
        Err(message) => return error_response(StatusCode::NOT_FOUND, message),
    };

    match state.store.view_json(view) {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::ok(data))).into_response(),
        Err(e) => {
            error!(view = view.as_str(), error = %e, "failed to serialize view");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

// ============================================================================
// Router
// ============================================================================

/// `/api` routes over a store, with permissive CORS and request tracing
pub fn router(store: EnergyStore) -> Router {
    let state = AppState { store };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/status", get(get_status))
        .route("/countries", get(get_countries))
        .route("/selection", get(get_selection).post(update_selection))
        .route("/views/:name", get(get_view))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// TESTS
// ============================================================================
