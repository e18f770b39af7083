//! Development round feed.
//!
//! Runs back-to-back rounds for every table and pushes them to subscribers.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin roundfeed-server
//! cargo run --bin roundfeed-server -- --port 3000 --table coin-toss --table aviator
//! ```

use std::sync::Arc;

use clap::Parser;
use roundfeed_server::{app::build_app, scheduler::TableConfig};
use roundfeed_shared::{logger::setup_logger, round::GameType, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "roundfeed-server")]
#[command(about = "Development round feed pushing game rounds over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Seconds during which bets may be placed
    #[arg(long, default_value = "15")]
    placement_secs: i64,

    /// Seconds a round lasts, placement included
    #[arg(long, default_value = "30")]
    total_secs: i64,

    /// Game type to run a table for (repeatable, default: all)
    #[arg(short = 't', long = "table")]
    tables: Vec<GameType>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    let game_types = if args.tables.is_empty() {
        GameType::ALL.to_vec()
    } else {
        args.tables
    };
    let tables: Vec<TableConfig> = game_types
        .into_iter()
        .map(|game_type| TableConfig::for_game(game_type, args.placement_secs, args.total_secs))
        .collect();

    if let Some(Err(e)) = tables.first().map(TableConfig::validate) {
        tracing::error!("Invalid round durations: {}", e);
        std::process::exit(1);
    }

    let app = build_app(tables, Arc::new(SystemClock));
    let round_loops = app.scheduler.spawn(&app.tables);

    let result = app.server.run(args.host, args.port).await;
    round_loops.iter().for_each(|handle| handle.abort());

    if let Err(e) = result {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
