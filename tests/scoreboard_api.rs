use std::{
    net::SocketAddr,
    path::PathBuf,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::Context;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use team_scoreboard::{
    dao::{
        kv_store::{FileStore, KeyValueStore, MemoryStore},
        scoreboard_repository::ScoreboardRepository,
    },
    routes,
    services::scoreboard_service::ScoreboardService,
    state::{AppState, state_machine::ScoreboardRules},
};
use tokio::net::TcpListener;

struct TestServer {
    base: String,
    client: Client,
}

impl TestServer {
    async fn start(store: Arc<dyn KeyValueStore>) -> anyhow::Result<Self> {
        let service = ScoreboardService::with_rules(
            ScoreboardRepository::new(store),
            ScoreboardRules::default(),
            false,
        );
        let app = routes::router(AppState::new(service));

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .context("binding test listener")?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move { axum::serve(listener, app).await });

        Ok(Self {
            base: format!("http://{addr}"),
            client: Client::new(),
        })
    }

    async fn get(&self, path: &str) -> anyhow::Result<(StatusCode, Value)> {
        let response = self.client.get(format!("{}{path}", self.base)).send().await?;
        Ok((response.status(), response.json().await?))
    }

    async fn post(&self, path: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
        let mut request = self.client.post(format!("{}{path}", self.base));
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        Ok((status, serde_json::from_str(&text).unwrap_or(Value::String(text))))
    }
}

fn scratch_store_path() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir()
        .join(format!("scoreboard-api-{}-{nanos}", std::process::id()))
        .join("store.json")
}

#[tokio::test]
async fn full_game_over_http() -> anyhow::Result<()> {
    let server = TestServer::start(Arc::new(MemoryStore::new())).await?;

    let (status, body) = server.get("/scoreboard").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "setup");
    assert_eq!(body["point_values"], json!([10, 20, 30, 50]));

    server.post("/setup/teams", Some(json!({"name": " A "}))).await?;
    let (status, body) = server.post("/game/start", None).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap_or_default().contains("2"));

    server.post("/setup/teams", Some(json!({"name": "   "}))).await?;
    let (_, body) = server.post("/setup/teams", Some(json!({"name": "B"}))).await?;
    assert_eq!(body["staged_teams"], json!(["A", "B"]));

    let (status, body) = server.post("/game/start", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "active");
    assert_eq!(body["teams"][0]["score"], 0);
    assert_eq!(body["staged_teams"], json!([]));

    let (status, _) = server.post("/game/award", Some(json!({"points": 20}))).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    server.post("/game/select", Some(json!({"index": 0}))).await?;
    let (_, body) = server.post("/game/award", Some(json!({"points": 20}))).await?;
    assert_eq!(body["selected_team"], Value::Null);
    assert_eq!(body["last_award"], json!({"team_name": "A", "points": 20}));

    server.post("/game/select", Some(json!({"index": 1}))).await?;
    let (_, body) = server.post("/game/award", Some(json!({"points": 10}))).await?;
    assert_eq!(body["award_count"], 2);
    assert_eq!(body["action_log"][0]["team_name"], "B");
    assert_eq!(body["action_log"][1]["team_name"], "A");

    let (status, body) = server.post("/game/finish", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["standings"],
        json!([
            {"rank": 1, "name": "A", "score": 20},
            {"rank": 2, "name": "B", "score": 10}
        ])
    );

    Ok(())
}

#[tokio::test]
async fn undo_and_resets_over_http() -> anyhow::Result<()> {
    let server = TestServer::start(Arc::new(MemoryStore::new())).await?;
    server.post("/setup/teams", Some(json!({"name": "A"}))).await?;
    server.post("/setup/teams", Some(json!({"name": "B"}))).await?;
    server.post("/game/start", None).await?;

    let (status, _) = server.post("/game/undo", None).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    server.post("/game/select", Some(json!({"index": 1}))).await?;
    let (_, body) = server.post("/game/award", Some(json!({"points": 50}))).await?;
    assert_eq!(body["can_undo"], true);

    let (status, body) = server.post("/game/undo", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["teams"][1]["score"], 0);
    assert_eq!(body["last_award"], Value::Null);
    assert_eq!(body["can_undo"], false);
    assert_eq!(body["action_log"], json!([]));

    server.post("/game/select", Some(json!({"index": 0}))).await?;
    let (status, _) = server.post("/game/award", Some(json!({"points": 7}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server.post("/game/select", Some(json!({"index": 9}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selected_team"], 0);
    let (status, body) = server.post("/game/select", Some(json!({"index": -1}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selected_team"], 0);

    server.post("/game/award", Some(json!({"points": 30}))).await?;
    let (status, _) = server
        .post("/game/reset-scores", Some(json!({"confirm": false})))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server
        .post("/game/reset-scores", Some(json!({"confirm": true})))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "active");
    assert_eq!(body["teams"][0]["score"], 0);
    assert_eq!(body["award_count"], 0);

    let (status, body) = server
        .post("/game/reset", Some(json!({"confirm": true})))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "setup");
    assert_eq!(body["teams"], json!([]));

    let (status, _) = server.post("/game/finish", None).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    Ok(())
}

#[tokio::test]
async fn file_store_survives_restart() -> anyhow::Result<()> {
    let path = scratch_store_path();

    {
        let server = TestServer::start(Arc::new(FileStore::open(&path))).await?;
        server.post("/setup/teams", Some(json!({"name": "Red"}))).await?;
        server.post("/setup/teams", Some(json!({"name": "Blue"}))).await?;
        server.post("/game/start", None).await?;
        server.post("/game/select", Some(json!({"index": 1}))).await?;
        server.post("/game/award", Some(json!({"points": 30}))).await?;

        let (_, health) = server.get("/healthcheck").await?;
        assert_eq!(health["status"], "ok");
    }

    let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(raw["teams"], "[\"Red\",\"Blue\"]");
    assert_eq!(raw["scores"], "[0,30]");
    assert_eq!(raw["scoreIndex"], "1");
    assert_eq!(raw["lastScore"], "30");
    assert_eq!(raw["lastScoreTeam"], "\"Blue\"");

    let server = TestServer::start(Arc::new(FileStore::open(&path))).await?;
    let (_, body) = server.get("/scoreboard").await?;
    assert_eq!(body["phase"], "active");
    assert_eq!(body["teams"][1]["score"], 30);
    assert_eq!(body["can_undo"], true);

    let (_, body) = server.post("/game/undo", None).await?;
    assert_eq!(body["teams"][1]["score"], 0);

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
    Ok(())
}
