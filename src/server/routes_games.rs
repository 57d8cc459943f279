use crate::catalog::NewGame;
use crate::server::error::AppError;
use crate::server::AppContext;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use psperf_common::{ConsoleVariant, Platform};
use psperf_db::models::{ConsolePerformance, GameRecord};
use serde::Deserialize;

pub fn game_routes() -> Router<AppContext> {
    Router::new()
        .route("/random-games", get(random_games))
        .route("/search", get(search))
        .route("/games", post(create_game))
        .route("/games/:id", get(get_game))
        .route("/games/:id/performance", post(update_performance))
}

fn parse_console(raw: Option<&str>) -> Result<Option<Platform>, AppError> {
    Ok(Platform::parse_filter(raw.unwrap_or_default())?)
}

#[derive(Deserialize)]
struct RandomGamesQuery {
    page: Option<u32>,
    count: Option<u32>,
    console: Option<String>,
}

async fn random_games(
    State(ctx): State<AppContext>,
    params: Result<Query<RandomGamesQuery>, QueryRejection>,
) -> Result<Json<Vec<GameRecord>>, AppError> {
    let Query(params) = params?;
    let filter = parse_console(params.console.as_deref())?;
    let page = params.page.unwrap_or(1);
    let count = params.count.unwrap_or(ctx.config.catalog.page_size);

    let games = ctx.catalog.random_games(page, count, filter).await?;
    Ok(Json(games.as_ref().clone()))
}

#[derive(Deserialize)]
struct SearchQuery {
    q: Option<String>,
    console: Option<String>,
}

async fn search(
    State(ctx): State<AppContext>,
    params: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<GameRecord>>, AppError> {
    let Query(params) = params?;
    let query = params
        .q
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Missing search query"))?;
    let filter = parse_console(params.console.as_deref())?;

    let games = ctx.catalog.search(&query, filter).await?;
    Ok(Json(games))
}

async fn get_game(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<GameRecord>, AppError> {
    Ok(Json(ctx.catalog.get_game(&id)?))
}

async fn create_game(
    State(ctx): State<AppContext>,
    payload: Result<Json<NewGame>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(new) = payload?;
    let game = ctx.catalog.create_game(new)?;
    Ok((StatusCode::CREATED, Json(game)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PerformanceUpdate {
    console_type: String,
    console_performance: ConsolePerformance,
}

async fn update_performance(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    payload: Result<Json<PerformanceUpdate>, JsonRejection>,
) -> Result<Json<GameRecord>, AppError> {
    let Json(update) = payload?;
    let variant: ConsoleVariant = update.console_type.parse()?;
    let game = ctx
        .catalog
        .update_performance(&id, variant, update.console_performance)?;
    Ok(Json(game))
}
