//! Live provider tests. Run with `--features api` and a key in the environment.

use strictly_arena::{
    ArenaConfig, Consultation, LlmClient, LlmOracle, MoveOracle, choose_move, oracle_from_config,
};
use strictly_othello::{Color, Difficulty, GameMode, TurnController};

fn setup() -> ArenaConfig {
    let _ = dotenvy::dotenv();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("strictly_arena=debug"))
        .with_test_writer()
        .try_init();
    ArenaConfig::default()
}

fn opening() -> Consultation {
    let controller = TurnController::new(GameMode::AgainstOracle);
    Consultation::new(controller.board().clone(), Color::Black, controller.legal_moves(), Difficulty::Hard)
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_provider_replies_with_text() {
    let config = setup();
    let llm = config.create_llm_config().expect("provider key must be set");
    let client = LlmClient::new(llm);

    let reply = client
        .generate("", "Reply with exactly: MOVE: 3, 2")
        .await
        .expect("provider call failed");
    assert!(!reply.trim().is_empty());
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_llm_oracle_suggests_legal_move() {
    let config = setup();
    let llm = config.create_llm_config().expect("provider key must be set");
    let oracle = LlmOracle::new(LlmClient::new(llm));

    let consultation = opening();
    match oracle.suggest(&consultation).await {
        Ok(pos) => assert!(consultation.legal.contains(&pos)),
        Err(e) => tracing::warn!(error = %e, "Oracle reply unusable"),
    }
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_configured_oracle_always_yields_legal_move() {
    let config = setup();
    let oracle = oracle_from_config(&config);
    let consultation = opening();

    let pos = choose_move(oracle.as_ref(), &consultation, config.oracle_timeout()).await.unwrap();
    assert!(consultation.legal.contains(&pos));
}
