//! Strictly Arena - Unified CLI
//!
//! Othello at the console: two local players, an online opponent through a
//! coordinator, or the oracle.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use strictly_arena::{
    ArenaConfig, Cli, Command, GameEvent, GameRepository, HumanPlayer, MatchCoordinator, OnlineEnd, OnlineMatch,
    OraclePlayer, Orchestrator, Player, ResultRecorder, SessionRelay, TcpTransport, oracle_from_config,
    spawn_renderer, spawn_stdin_reader,
};
use strictly_othello::{Color, GameMode, TurnController};
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,strictly_arena=debug,strictly_othello=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ArenaConfig::load_or_default(&cli.config)?;

    match cli.command {
        Command::Server { host, port } => run_server(config.with_server(host, port)).await,
        Command::Local => run_local(config).await,
        Command::Online { host, port, user_id } => {
            let config = config.with_server(host, port);
            let config = match user_id {
                Some(user_id) => config.with_user_id(user_id),
                None => config,
            };
            run_online(config).await
        }
        Command::Ai {
            difficulty,
            human_color,
        } => {
            let difficulty = difficulty.unwrap_or(*config.difficulty());
            run_ai(config, difficulty, human_color).await
        }
        Command::Stats { user_id, limit } => {
            let name = user_id.unwrap_or_else(|| config.user_id().clone());
            run_stats(config, name, limit)
        }
    }
}

/// Opens the results database; matches are still playable without it.
fn open_recorder(config: &ArenaConfig) -> Arc<dyn ResultRecorder> {
    match GameRepository::open(config.db_path().clone()) {
        Ok(repo) => Arc::new(repo),
        Err(e) => {
            warn!(error = %e, "Results database unavailable, matches will not be recorded");
            Arc::new(strictly_arena::NullRecorder)
        }
    }
}

/// Run the match coordinator
#[instrument(skip_all, fields(host = %config.server_host(), port = config.server_port()))]
async fn run_server(config: ArenaConfig) -> Result<()> {
    let coordinator = MatchCoordinator::bind(config.server_host(), *config.server_port()).await?;
    info!(addr = %coordinator.local_addr()?, "Coordinator ready");
    coordinator.run().await?;
    Ok(())
}

/// Two humans sharing this console
#[instrument(skip_all)]
async fn run_local(config: ArenaConfig) -> Result<()> {
    let (events, rx) = mpsc::unbounded_channel();
    let renderer = spawn_renderer(rx);
    let input = spawn_stdin_reader();

    let black = HumanPlayer::new(format!("{} (Black)", config.user_id()), Arc::clone(&input), events.clone());
    let white = HumanPlayer::new(format!("{} (White)", config.user_id()), input, events.clone());

    let mut orchestrator = Orchestrator::new(
        TurnController::new(GameMode::Local),
        Box::new(black),
        Box::new(white),
        events,
        open_recorder(&config),
        config.user_id().clone(),
    );
    let result = orchestrator.run().await;
    drop(orchestrator);
    let _ = renderer.await;
    result.map(|_| ())
}

/// One human against the oracle
#[instrument(skip(config))]
async fn run_ai(config: ArenaConfig, difficulty: strictly_othello::Difficulty, human_color: Color) -> Result<()> {
    let (events, rx) = mpsc::unbounded_channel();
    let renderer = spawn_renderer(rx);
    let input = spawn_stdin_reader();

    let human: Box<dyn Player> = Box::new(HumanPlayer::new(config.user_id().clone(), input, events.clone()));
    let oracle: Box<dyn Player> = Box::new(
        OraclePlayer::new("AI", oracle_from_config(&config), difficulty, events.clone())
            .with_timeout(config.oracle_timeout()),
    );
    let (black, white) = match human_color {
        Color::Black => (human, oracle),
        Color::White => (oracle, human),
    };

    let mut orchestrator = Orchestrator::new(
        TurnController::against_oracle(human_color),
        black,
        white,
        events,
        open_recorder(&config),
        config.user_id().clone(),
    );
    let result = orchestrator.run().await;
    drop(orchestrator);
    let _ = renderer.await;
    result.map(|_| ())
}

/// Play through a coordinator
#[instrument(skip_all, fields(user_id = %config.user_id()))]
async fn run_online(config: ArenaConfig) -> Result<()> {
    let (events, rx) = mpsc::unbounded_channel();
    let renderer = spawn_renderer(rx);

    let end = match TcpTransport::connect(config.server_host(), *config.server_port()).await {
        Ok(transport) => match SessionRelay::connect(transport, config.user_id()).await {
            Ok(relay) => {
                let mut online = OnlineMatch::new(relay, spawn_stdin_reader(), events.clone(), open_recorder(&config));
                online.run().await?
            }
            Err(e) => OnlineEnd::ConnectionLost(e.to_string()),
        },
        Err(e) => OnlineEnd::ConnectionLost(e.message),
    };

    if let OnlineEnd::ConnectionLost(reason) = &end {
        let _ = events.send(GameEvent::Notice(format!("Could not continue online play: {}", reason)));
    }
    info!(?end, "Online session ended");
    drop(events);
    let _ = renderer.await;
    Ok(())
}

/// Print recorded results for a profile
#[instrument(skip(config))]
fn run_stats(config: ArenaConfig, name: String, limit: i64) -> Result<()> {
    let repo = GameRepository::open(config.db_path().clone())?;

    match repo.get_user_by_name(&name)? {
        Some(user) => println!(
            "{}: {} wins, {} losses, {} draws ({:.1}% won)",
            user.display_name(),
            user.wins(),
            user.losses(),
            user.draws(),
            user.win_rate()
        ),
        None => println!("{}: no recorded online or oracle matches", name),
    }

    for record in repo.recent_records(&name, limit)? {
        println!(
            "{}  {} vs {}  {}-{}  winner: {}  ({}, {} moves)",
            record.played_at(),
            record.black_player(),
            record.white_player(),
            record.black_score(),
            record.white_score(),
            record.winner().as_deref().unwrap_or("draw"),
            record.mode(),
            record.moves()
        );
    }
    Ok(())
}
