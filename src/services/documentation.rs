use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the scoreboard server.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::scoreboard::get_scoreboard,
        crate::routes::scoreboard::add_team,
        crate::routes::scoreboard::start_game,
        crate::routes::scoreboard::select_team,
        crate::routes::scoreboard::award_points,
        crate::routes::scoreboard::undo,
        crate::routes::scoreboard::reset_scores,
        crate::routes::scoreboard::reset_game,
        crate::routes::scoreboard::finish_game,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::scoreboard::VisiblePhase,
            crate::dto::scoreboard::TeamScore,
            crate::dto::scoreboard::LastAwardSummary,
            crate::dto::scoreboard::ActionLogItem,
            crate::dto::scoreboard::ScoreboardResponse,
            crate::dto::scoreboard::AddTeamRequest,
            crate::dto::scoreboard::SelectTeamRequest,
            crate::dto::scoreboard::AwardPointsRequest,
            crate::dto::scoreboard::ConfirmRequest,
            crate::dto::scoreboard::StandingItem,
            crate::dto::scoreboard::GameResultResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "scoreboard", description = "Read the current scoreboard"),
        (name = "setup", description = "Team roster before the game starts"),
        (name = "game", description = "Scoring, undo, resets and final standings"),
    )
)]
pub struct ApiDoc;
