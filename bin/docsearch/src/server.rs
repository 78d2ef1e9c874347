//! Static file server with search endpoints

use std::{path::Path, sync::Arc};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use docsearch_client::{
    ClientError, SearchClient, SearchResultArea, SearchState, group_results, query_from_path,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Server state shared by the search handlers.
#[derive(Clone)]
pub struct ServerState {
    /// Client for the background search worker.
    pub client: SearchClient,
    /// Priority pages per result area.
    pub priority_limit: usize,
}

/// Create the server router.
pub fn create_router(root: &Path, state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/api/search", get(search_handler))
        .route("/api/related", get(related_handler))
        .fallback_service(ServeDir::new(root))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Query parameters of `/api/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Query parameters of `/api/related`.
#[derive(Debug, Deserialize)]
pub struct RelatedParams {
    pub path: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse<'a> {
    query: &'a str,
    state: SearchState,
    areas: Vec<SearchResultArea<'a>>,
}

/// Search handler: grouped results for `q`.
async fn search_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    respond(&state, &params.q).await
}

/// Related pages handler: grouped results for the words of an unmatched path.
async fn related_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<RelatedParams>,
) -> Result<Response, ApiError> {
    respond(&state, &query_from_path(&params.path)).await
}

async fn respond(state: &ServerState, query: &str) -> Result<Response, ApiError> {
    let results = state.client.search(query).await?;
    let areas = group_results(&results.results, state.priority_limit);

    Ok(Json(SearchResponse {
        query: &results.query,
        state: SearchState::of(Some(&results)),
        areas,
    })
    .into_response())
}

/// A search failure rendered as a JSON error body.
pub struct ApiError(ClientError);

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "Search request failed");
        let body = serde_json::json!({ "error": self.0.to_string() });
        (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
    }
}
