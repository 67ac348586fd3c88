use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::scoreboard::{
        AddTeamRequest, AwardPointsRequest, ConfirmRequest, GameResultResponse,
        ScoreboardResponse, SelectTeamRequest,
    },
    error::AppError,
    state::SharedState,
};

/// Routes driving the scoreboard: setup, scoring, undo, resets and results.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/scoreboard", get(get_scoreboard))
        .route("/setup/teams", post(add_team))
        .route("/game/start", post(start_game))
        .route("/game/select", post(select_team))
        .route("/game/award", post(award_points))
        .route("/game/undo", post(undo))
        .route("/game/reset-scores", post(reset_scores))
        .route("/game/reset", post(reset_game))
        .route("/game/finish", post(finish_game))
}

/// Return the current scoreboard.
#[utoipa::path(
    get,
    path = "/scoreboard",
    tag = "scoreboard",
    responses((status = 200, description = "Current scoreboard", body = ScoreboardResponse))
)]
pub async fn get_scoreboard(State(state): State<SharedState>) -> Json<ScoreboardResponse> {
    Json(state.view().await.into())
}

/// Stage a team name before the game starts.
#[utoipa::path(
    post,
    path = "/setup/teams",
    tag = "setup",
    request_body = AddTeamRequest,
    responses(
        (status = 200, description = "Team staged (blank names are ignored)", body = ScoreboardResponse),
        (status = 409, description = "A game is already running")
    )
)]
pub async fn add_team(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<AddTeamRequest>>,
) -> Result<Json<ScoreboardResponse>, AppError> {
    let view = state
        .with_scoreboard(|service| service.add_staged_team(&payload.name))
        .await?;
    Ok(Json(view.into()))
}

/// Start the game with the staged teams.
#[utoipa::path(
    post,
    path = "/game/start",
    tag = "game",
    responses(
        (status = 200, description = "Game started", body = ScoreboardResponse),
        (status = 409, description = "Fewer than two teams staged, or a game is already running")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
) -> Result<Json<ScoreboardResponse>, AppError> {
    let view = state.with_scoreboard(|service| service.start_game()).await?;
    Ok(Json(view.into()))
}

/// Arm a team for the next award.
#[utoipa::path(
    post,
    path = "/game/select",
    tag = "game",
    request_body = SelectTeamRequest,
    responses(
        (status = 200, description = "Team selected (out-of-range indices are ignored unless strict)", body = ScoreboardResponse),
        (status = 400, description = "Index out of range with strict selection enabled"),
        (status = 409, description = "No game is running")
    )
)]
pub async fn select_team(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<SelectTeamRequest>>,
) -> Result<Json<ScoreboardResponse>, AppError> {
    let view = state
        .with_scoreboard(|service| service.select_team(payload.index))
        .await?;
    Ok(Json(view.into()))
}

/// Award points to the selected team.
#[utoipa::path(
    post,
    path = "/game/award",
    tag = "game",
    request_body = AwardPointsRequest,
    responses(
        (status = 200, description = "Points awarded", body = ScoreboardResponse),
        (status = 400, description = "Point value not allowed"),
        (status = 409, description = "No team selected, no game running, or the score would overflow")
    )
)]
pub async fn award_points(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<AwardPointsRequest>>,
) -> Result<Json<ScoreboardResponse>, AppError> {
    let view = state
        .with_scoreboard(|service| service.award_points(payload.points))
        .await?;
    Ok(Json(view.into()))
}

/// Revert the most recent award.
#[utoipa::path(
    post,
    path = "/game/undo",
    tag = "game",
    responses(
        (status = 200, description = "Award reverted", body = ScoreboardResponse),
        (status = 409, description = "Nothing to undo")
    )
)]
pub async fn undo(State(state): State<SharedState>) -> Result<Json<ScoreboardResponse>, AppError> {
    let view = state.with_scoreboard(|service| service.undo()).await?;
    Ok(Json(view.into()))
}

/// Zero every score, keeping the teams.
#[utoipa::path(
    post,
    path = "/game/reset-scores",
    tag = "game",
    request_body = ConfirmRequest,
    responses(
        (status = 200, description = "Scores reset", body = ScoreboardResponse),
        (status = 400, description = "Reset not confirmed"),
        (status = 409, description = "No game is running")
    )
)]
pub async fn reset_scores(
    State(state): State<SharedState>,
    Valid(Json(_confirm)): Valid<Json<ConfirmRequest>>,
) -> Result<Json<ScoreboardResponse>, AppError> {
    let view = state
        .with_scoreboard(|service| service.reset_scores())
        .await?;
    Ok(Json(view.into()))
}

/// Drop the game entirely and return to setup.
#[utoipa::path(
    post,
    path = "/game/reset",
    tag = "game",
    request_body = ConfirmRequest,
    responses(
        (status = 200, description = "Game reset", body = ScoreboardResponse),
        (status = 400, description = "Reset not confirmed")
    )
)]
pub async fn reset_game(
    State(state): State<SharedState>,
    Valid(Json(_confirm)): Valid<Json<ConfirmRequest>>,
) -> Result<Json<ScoreboardResponse>, AppError> {
    let view = state.with_scoreboard(|service| service.reset_game()).await?;
    Ok(Json(view.into()))
}

/// Compute the final standings without changing the game.
#[utoipa::path(
    post,
    path = "/game/finish",
    tag = "game",
    responses(
        (status = 200, description = "Final standings", body = GameResultResponse),
        (status = 409, description = "No game is running")
    )
)]
pub async fn finish_game(
    State(state): State<SharedState>,
) -> Result<Json<GameResultResponse>, AppError> {
    let results = state.with_scoreboard(|service| service.finish_game()).await?;
    Ok(Json(results.into()))
}
