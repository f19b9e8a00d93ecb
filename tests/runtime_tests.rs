//! Runtime tests on tokio's paused clock

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use color_attack::engine::{plan, GameEvent, Phase};
use color_attack::runtime::{
    EventMessage, GameRuntime, InMemoryScoreService, RuntimeConfig, RuntimeHandle, Services,
    SilentAudio, SnapshotMessage,
};
use color_attack::types::GameMode;

fn spawn(mode: GameMode, score: Arc<InMemoryScoreService>) -> RuntimeHandle {
    let config = RuntimeConfig {
        seed: 7,
        ..RuntimeConfig::default()
    };
    let services = Services::new(score, Arc::new(SilentAudio::default()));
    GameRuntime::spawn_mode(mode, services, &config)
}

async fn answer(handle: &RuntimeHandle, correct: bool) {
    let snap = handle.snapshot().await.unwrap();
    for action in plan(&snap.prompt.rule, &snap.grid_colors, &snap.grid_shapes, correct) {
        handle.tap(action).await.unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn test_chaos_game_plays_to_game_over() {
    let score = Arc::new(InMemoryScoreService::new());
    let handle = spawn(GameMode::Chaos, score.clone());
    let mut events = handle.subscribe_events();
    handle.start().await.unwrap();

    // Two right, then let the clock take every life
    for _ in 0..2 {
        answer(&handle, true).await;
        sleep(Duration::from_millis(300)).await;
    }
    assert_eq!(handle.snapshot().await.unwrap().score, 40);

    sleep(Duration::from_secs(60)).await;
    let snap = handle.snapshot().await.unwrap();
    assert!(snap.is_game_over);
    assert_eq!(snap.phase, Phase::GameOver);
    assert_eq!(snap.lives_current, 0);
    assert_eq!(snap.round, 7);

    let mut finished = 0;
    let mut game_over = None;
    while let Ok(event) = events.try_recv() {
        match event {
            GameEvent::RoundFinished(_) => finished += 1,
            GameEvent::GameOver { score, .. } => game_over = Some(score),
            _ => {}
        }
    }
    assert_eq!(finished, 7);
    assert_eq!(game_over, Some(40));
    assert_eq!(
        score.submissions(),
        vec![("com.example.ColorAttack.Chaos".to_string(), 40)]
    );
    assert_eq!(handle.best_score().await.unwrap(), 40);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_late_tap_is_ignored() {
    let handle = spawn(GameMode::Classic, Arc::new(InMemoryScoreService::new()));
    handle.start().await.unwrap();
    answer(&handle, true).await;

    // Still in the transition pause
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.phase, Phase::RoundTransition);
    let tap = plan(&snap.prompt.rule, &snap.grid_colors, &snap.grid_shapes, true)[0];
    assert!(!handle.tap(tap).await.unwrap());
    assert_eq!(handle.snapshot().await.unwrap().score, 10);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_stream_serializes() {
    let handle = spawn(GameMode::Rapid, Arc::new(InMemoryScoreService::new()));
    handle.start().await.unwrap();
    sleep(Duration::from_millis(600)).await;

    let snap = handle.latest();
    let line = SnapshotMessage::from(&snap).to_line().unwrap();
    let value: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(value["type"], "snapshot");
    assert_eq!(value["mode"], "rapid");
    assert_eq!(value["remaining_game_ms"], 29_500);
    assert!(value.get("lives").is_none());

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_event_stream_serializes() {
    let handle = spawn(GameMode::Classic, Arc::new(InMemoryScoreService::new()));
    let mut events = handle.subscribe_events();
    handle.start().await.unwrap();
    answer(&handle, true).await;
    handle.snapshot().await.unwrap();

    let mut lines = Vec::new();
    while let Ok(event) = events.try_recv() {
        lines.push(EventMessage::from(&event).to_line().unwrap());
    }
    let values: Vec<serde_json::Value> = lines
        .iter()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(values.len(), 3);
    assert_eq!(values[0]["type"], "session_started");
    assert_eq!(values[0]["session"], 1);
    assert_eq!(values[1]["type"], "round_started");
    assert_eq!(values[1]["round"], 1);
    assert_eq!(values[2]["type"], "round_finished");
    assert_eq!(values[2]["score_delta"], 10);
    assert_eq!(values[2]["correct"], true);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_handles_share_one_engine() {
    let handle = spawn(GameMode::Classic, Arc::new(InMemoryScoreService::new()));
    let other = handle.clone();
    handle.start().await.unwrap();
    answer(&other, true).await;

    assert_eq!(handle.snapshot().await.unwrap().score, 10);
    other.shutdown().await.unwrap();
    assert!(handle.snapshot().await.is_err());
}
