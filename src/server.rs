use std::sync::Arc;
use axum::{routing::{get, post}, Router, Json};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tower_http::cors::{CorsLayer, Any};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use crate::browser::{Browser, Filter, LoadReport};
use crate::error::PokedexError;
use crate::model::EntityDetail;
use crate::view::{DetailView, ViewRecorder, ViewSnapshot};

#[derive(Clone)]
pub struct AppState {
    pub browser: Arc<Browser>,
    pub view: Arc<ViewRecorder>,
}

#[derive(Deserialize)]
pub struct FilterRequest {
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    /// False when the query was too short to run.
    pub accepted: bool,
    pub results: Vec<EntityDetail>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(e: PokedexError) -> ApiError {
    let status = match e {
        PokedexError::Network(_) => StatusCode::BAD_GATEWAY,
        PokedexError::MalformedPayload { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let msg = format!("{e}");
    warn!(%msg, code=%status.as_u16(), "request failed");
    (status, Json(ErrorResponse { status: "error".into(), error: msg }))
}

async fn load_more(State(state): State<AppState>) -> Result<Json<LoadReport>, ApiError> {
    state.browser.load_more().await.map(Json).map_err(api_error)
}

async fn filter(State(state): State<AppState>, Json(req): Json<FilterRequest>) -> Result<Json<LoadReport>, ApiError> {
    let filter = Filter::parse(req.category.as_deref());
    info!(?filter, "filter requested");
    state.browser.filter_by_type(filter).await.map(Json).map_err(api_error)
}

async fn reset(State(state): State<AppState>) -> Result<Json<LoadReport>, ApiError> {
    state.browser.reset().await.map(Json).map_err(api_error)
}

async fn search(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> Result<Json<SearchResponse>, ApiError> {
    let found = state.browser.search(&query.q).map_err(api_error)?;
    Ok(Json(SearchResponse { accepted: found.is_some(), results: found.unwrap_or_default() }))
}

fn found(detail: Option<DetailView>) -> Result<Json<DetailView>, ApiError> {
    detail.map(Json).ok_or_else(|| {
        (StatusCode::NOT_FOUND, Json(ErrorResponse { status: "error".into(), error: "entity not loaded".into() }))
    })
}

async fn detail(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<DetailView>, ApiError> {
    found(state.browser.open_detail(&id).await.map_err(api_error)?)
}

async fn next(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<DetailView>, ApiError> {
    found(state.browser.next_entity(&id).await.map_err(api_error)?)
}

async fn previous(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<DetailView>, ApiError> {
    found(state.browser.previous_entity(&id).await.map_err(api_error)?)
}

async fn view(State(state): State<AppState>) -> Json<ViewSnapshot> {
    Json(state.view.snapshot())
}

pub fn router(browser: Arc<Browser>, view_recorder: Arc<ViewRecorder>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers(Any);
    Router::new()
        .route("/v1/more", post(load_more))
        .route("/v1/filter", post(filter))
        .route("/v1/reset", post(reset))
        .route("/v1/search", get(search))
        .route("/v1/detail/:id", post(detail))
        .route("/v1/detail/:id/next", post(next))
        .route("/v1/detail/:id/previous", post(previous))
        .route("/v1/view", get(view))
        .with_state(AppState { browser, view: view_recorder })
        .layer(cors)
}
