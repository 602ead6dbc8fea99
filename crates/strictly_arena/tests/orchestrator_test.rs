//! Tests for the console match loop.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use strictly_arena::{
    DbError, GameEvent, MatchResult, OraclePlayer, Orchestrator, Player, PlayerChoice, RandomOracle, ResultRecorder,
};
use strictly_othello::{Board, Color, Difficulty, GameMode, Outcome, Position, TurnController};
use tokio::sync::mpsc;

fn at(x: usize, y: usize) -> Position {
    Position::new(x, y).unwrap()
}

/// Plays a fixed list of choices, then fails.
struct ScriptedPlayer {
    name: String,
    script: VecDeque<PlayerChoice>,
}

impl ScriptedPlayer {
    fn boxed(name: &str, script: Vec<PlayerChoice>) -> Box<dyn Player> {
        Box::new(Self {
            name: name.to_string(),
            script: script.into(),
        })
    }
}

#[async_trait::async_trait]
impl Player for ScriptedPlayer {
    async fn choose_move(&mut self, _controller: &TurnController) -> anyhow::Result<PlayerChoice> {
        self.script
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("Script exhausted"))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Default)]
struct CapturingRecorder {
    results: Mutex<Vec<MatchResult>>,
}

impl ResultRecorder for CapturingRecorder {
    fn record(&self, result: &MatchResult) -> Result<(), DbError> {
        self.results.lock().unwrap().push(result.clone());
        Ok(())
    }
}

fn drain(rx: &mut mpsc::UnboundedReceiver<GameEvent>) -> Vec<GameEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn last_move_board() -> TurnController {
    let text = "
        BBBBBBBB
        BBBBBBBB
        BBBBBBBB
        BBBBBBBB
        BBBBBBBB
        BBBBBBBB
        BBBBBBBB
        BBBBBBW.";
    let board: Board = text.parse().unwrap();
    TurnController::with_board(board, Color::Black, GameMode::Local)
}

#[tokio::test]
async fn test_rejected_move_reprompts_then_game_ends() {
    let (events, mut rx) = mpsc::unbounded_channel();
    let recorder = Arc::new(CapturingRecorder::default());
    let black = ScriptedPlayer::boxed(
        "alice (Black)",
        vec![PlayerChoice::Place(at(0, 0)), PlayerChoice::Place(at(7, 7))],
    );
    let white = ScriptedPlayer::boxed("alice (White)", vec![]);

    let mut orchestrator = Orchestrator::new(last_move_board(), black, white, events, recorder.clone(), "alice");
    let outcome = orchestrator.run().await.unwrap();
    assert_eq!(outcome, Some(Outcome::Winner(Color::Black)));

    let events = drain(&mut rx);
    assert!(matches!(events.first(), Some(GameEvent::BoardChanged { .. })));
    assert!(matches!(events.get(1), Some(GameEvent::Notice(_))));
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::MoveMade { flipped: 1, .. }
    )));
    match events.last() {
        Some(GameEvent::GameOver { outcome, score, winner }) => {
            assert_eq!(*outcome, Outcome::Winner(Color::Black));
            assert_eq!(score.black, 64);
            assert_eq!(winner.as_deref(), Some("alice (Black)"));
        }
        other => panic!("expected GameOver, got {:?}", other),
    }

    let results = recorder.results.lock().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(*results[0].mode(), GameMode::Local);
    assert_eq!(*results[0].moves(), 1);
    assert_eq!(*results[0].local_player(), None);
}

#[tokio::test]
async fn test_quit_ends_without_recording() {
    let (events, mut rx) = mpsc::unbounded_channel();
    let recorder = Arc::new(CapturingRecorder::default());
    let black = ScriptedPlayer::boxed("alice (Black)", vec![PlayerChoice::Place(at(2, 3))]);
    let white = ScriptedPlayer::boxed("alice (White)", vec![PlayerChoice::Quit]);

    let controller = TurnController::new(GameMode::Local);
    let mut orchestrator = Orchestrator::new(controller, black, white, events, recorder.clone(), "alice");

    assert_eq!(orchestrator.run().await.unwrap(), None);
    assert_eq!(orchestrator.controller().history().len(), 1);
    assert!(recorder.results.lock().unwrap().is_empty());
    assert!(
        drain(&mut rx)
            .iter()
            .all(|e| !matches!(e, GameEvent::GameOver { .. }))
    );
}

#[tokio::test]
async fn test_player_failure_propagates() {
    let (events, _rx) = mpsc::unbounded_channel();
    let recorder = Arc::new(CapturingRecorder::default());
    let black = ScriptedPlayer::boxed("alice (Black)", vec![]);
    let white = ScriptedPlayer::boxed("alice (White)", vec![]);

    let controller = TurnController::new(GameMode::Local);
    let mut orchestrator = Orchestrator::new(controller, black, white, events, recorder.clone(), "alice");

    assert!(orchestrator.run().await.is_err());
    assert!(recorder.results.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_random_players_finish_a_game() {
    let (events, _rx) = mpsc::unbounded_channel();
    let recorder = Arc::new(CapturingRecorder::default());
    let oracle = Arc::new(RandomOracle);
    let black = Box::new(OraclePlayer::new("alice", oracle.clone(), Difficulty::Easy, events.clone()));
    let white = Box::new(OraclePlayer::new("AI", oracle, Difficulty::Easy, events.clone()));

    let controller = TurnController::against_oracle(Color::Black);
    let mut orchestrator = Orchestrator::new(controller, black, white, events, recorder.clone(), "alice");

    let outcome = orchestrator.run().await.unwrap().unwrap();
    assert!(orchestrator.controller().is_over());
    assert!(orchestrator.controller().history().len() <= 60);

    let results = recorder.results.lock().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(*results[0].outcome(), outcome);
    assert_eq!(results[0].local_player().as_deref(), Some("alice"));
    assert_eq!(*results[0].local_color(), Some(Color::Black));
}
