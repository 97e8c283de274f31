use axum::{
    routing::{get, post},
    Router,
    extract::{rejection::QueryRejection, Query, State},
    response::IntoResponse,
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use chrono::Utc;
use tracing::{info, warn};

use crate::aggregate::DEFAULT_TOP_N;
use crate::api::models::{
    FetchResponse, PreviewQuery, SearchQuery, SearchResponse, TopStatesQuery, UniqueTitlesResponse,
};
use crate::api::response::{self, Reply};
use crate::report::{ChartSeries, TablePreview, DEFAULT_PREVIEW_ROWS};
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/catalog/fetch", post(fetch_handler))
        .route("/api/states/top", get(top_states_handler))
        .route("/api/states/unique-titles", get(unique_titles_handler))
        .route("/api/titles/search", get(search_handler))
        .route("/api/newspapers/preview", get(preview_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

fn bad_query<T>(rejection: QueryRejection) -> Reply<T> {
    warn!(error = %rejection.body_text(), "rejected query string");
    response::error(rejection.status(), rejection.body_text())
}

async fn fetch_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut session = state.session.lock().await;
    let backend = session.cache().backend().to_string();

    match session.fetch().await {
        Ok(outcome) => {
            info!(records = outcome.records, cached = outcome.cache_error.is_none(), "catalog refreshed");
            response::success(FetchResponse {
                records: outcome.records,
                cache_key: outcome.cache_key,
                cache_backend: backend,
                cached: outcome.cache_error.is_none(),
                cache_error: outcome.cache_error.map(|e| e.to_string()),
                fetched_at: Utc::now(),
            })
        }
        Err(err) => {
            warn!(error = %err, "catalog fetch failed");
            response::failure(err)
        }
    }
}

async fn top_states_handler(
    State(state): State<AppState>,
    query: Result<Query<TopStatesQuery>, QueryRejection>,
) -> impl IntoResponse {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return bad_query::<ChartSeries>(rejection),
    };
    let n = query.n.unwrap_or(DEFAULT_TOP_N);
    let mut session = state.session.lock().await;
    response::from_result(session.chart(n).await)
}

async fn unique_titles_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut session = state.session.lock().await;
    let result = session
        .unique_titles_per_state()
        .await
        .map(|states| UniqueTitlesResponse { states });
    response::from_result(result)
}

async fn search_handler(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> impl IntoResponse {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return bad_query::<SearchResponse>(rejection),
    };
    let mut session = state.session.lock().await;
    let result = session.find_title(&query.q).await.map(|states| {
        info!(query = %query.q, matches = states.len(), "title search");
        SearchResponse {
            query: query.q.clone(),
            matches: states.len(),
            states,
        }
    });
    response::from_result(result)
}

async fn preview_handler(
    State(state): State<AppState>,
    query: Result<Query<PreviewQuery>, QueryRejection>,
) -> impl IntoResponse {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return bad_query::<TablePreview>(rejection),
    };
    let rows = query.rows.unwrap_or(DEFAULT_PREVIEW_ROWS);
    let mut session = state.session.lock().await;
    response::from_result(session.preview(rows).await)
}
