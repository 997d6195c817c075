use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use axum_extra::extract::WithRejection;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{
        ImportRequest, ImportSummary, ListSnapshot, Movie, MovieForm, SortRequest, ViewQuery,
    },
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/movies", get(list_movies).post(add_movie))
        .route("/movies/import", post(import_movies))
        .route("/movies/{id}", put(edit_movie).delete(remove_movie))
        .route("/movies/{id}/toggle", post(toggle_watched))
        .route("/state", get(list_state))
        .route("/state/sort", put(set_sort))
        .with_state(state)
}

pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ViewQuery>,
) -> Json<Vec<Movie>> {
    Json(state.movies.view(&q).await)
}

pub async fn list_state(State(state): State<Arc<AppState>>) -> Json<ListSnapshot> {
    Json(state.movies.snapshot().await)
}

pub async fn set_sort(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(req), _): WithRejection<Json<SortRequest>, AppError>,
) -> Json<ListSnapshot> {
    state.movies.set_sort_by(req.sort_by).await;
    Json(state.movies.snapshot().await)
}

pub async fn add_movie(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(form), _): WithRejection<Json<MovieForm>, AppError>,
) -> AppResult<StatusCode> {
    state.movies.add(&form).await?;
    Ok(StatusCode::CREATED)
}

pub async fn edit_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    WithRejection(Json(form), _): WithRejection<Json<MovieForm>, AppError>,
) -> AppResult<StatusCode> {
    state.movies.edit(id, &form).await?;
    Ok(StatusCode::OK)
}

pub async fn remove_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.movies.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_watched(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.movies.toggle_watched(id).await?;
    Ok(StatusCode::OK)
}

pub async fn import_movies(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(req), _): WithRejection<Json<ImportRequest>, AppError>,
) -> AppResult<Json<ImportSummary>> {
    let summary = state.movies.import_from_api(&req.url).await?;
    Ok(Json(summary))
}
