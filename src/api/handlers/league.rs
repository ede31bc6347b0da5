use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::api::{state::AppState, types::*};
use crate::services::LeagueSample;

/// GET /league/percentiles?category=skater|goalie
pub async fn get_league_percentiles(
    State(state): State<AppState>,
    Query(params): Query<PercentileParams>,
) -> std::result::Result<Json<LeagueSample>, (StatusCode, String)> {
    let category = params.category()?;
    let sample = state.league.league_sample(category).await?;
    Ok(Json(LeagueSample::clone(&sample)))
}

/// GET /teams
pub async fn get_teams(State(state): State<AppState>) -> Json<TeamsResponse> {
    Json(TeamsResponse {
        teams: state.league.teams().await,
    })
}

/// GET /standings
pub async fn get_standings(
    State(state): State<AppState>,
) -> std::result::Result<Json<StandingsResponse>, (StatusCode, String)> {
    let standings = state.league.standings().await?;
    Ok(Json(StandingsResponse { standings }))
}
