use std::path::PathBuf;

use clap::Parser;
use scribble::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Multiplayer drawing-and-guessing game server.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    bind: String,
    /// Word list, one word per line (built-in list when omitted)
    #[arg(short, long)]
    words: Option<PathBuf>,
    /// Time units per drawing round
    #[arg(long, default_value_t = 60)]
    round_time: u32,
    /// Time units the drawer has to pick a word
    #[arg(long, default_value_t = 15)]
    selection_time: u32,
    /// Points for a correct guess
    #[arg(long, default_value_t = 100)]
    points: u32,
}

#[tokio::main]
async fn main() -> Result<(), ScribbleError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "scribble=info,scribble_room=info,scribble_transport=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = GameConfig {
        round_time: args.round_time,
        selection_time: args.selection_time,
        points_per_guess: args.points,
        ..GameConfig::default()
    };
    if let Some(path) = &args.words {
        config.words = words::load_words(path)?;
        tracing::info!(path = %path.display(), count = config.words.len(), "loaded word list");
    }

    let server = ScribbleServer::builder()
        .bind(&args.bind)
        .game_config(config)
        .build()
        .await?;

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
            Ok(())
        }
    }
}
