use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::debug;

use crate::analytics::Page;
use crate::api::{state::AppState, types::*};
use crate::domain::PlayerRecord;
use crate::services::{PlayerCard, PlayerDetail};

/// GET /players?q=&page=&limit=&position=&team=&sort_by=&sort_order=&stats_scope=
pub async fn list_players(
    State(state): State<AppState>,
    Query(params): Query<PlayersParams>,
) -> std::result::Result<Json<Page<PlayerRecord>>, (StatusCode, String)> {
    let (scope, query) = params.into_query()?;
    let page = state.league.players(scope, &query).await?;
    debug!(
        scope = %scope,
        total = page.total,
        returned = page.data.len(),
        "player query"
    );
    Ok(Json(page))
}

/// GET /players/:id
pub async fn get_player(
    State(state): State<AppState>,
    Path(player_id): Path<u64>,
) -> std::result::Result<Json<PlayerResponse>, (StatusCode, String)> {
    let player = state.league.player(player_id).await?;
    Ok(Json(PlayerResponse { player }))
}

/// GET /players/:id/detail
pub async fn get_player_detail(
    State(state): State<AppState>,
    Path(player_id): Path<u64>,
) -> std::result::Result<Json<PlayerDetail>, (StatusCode, String)> {
    Ok(Json(state.league.player_detail(player_id).await?))
}

/// GET /players/:id/card
pub async fn get_player_card(
    State(state): State<AppState>,
    Path(player_id): Path<u64>,
) -> std::result::Result<Json<PlayerCard>, (StatusCode, String)> {
    let card = state.league.player_card(player_id).await?;
    Ok(Json(PlayerCard::clone(&card)))
}
