//! Terminal client for the roundfeed round feed.
//!
//! Attaches game views to namespaces and prints their countdowns. Views of the
//! same namespace share a single WebSocket connection.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin roundfeed-client -- --watch coin-toss --watch aviator
//! cargo run --bin roundfeed-client -- -u ws://127.0.0.1:3000/ws
//! ```

use std::time::Duration;

use clap::Parser;

use roundfeed_client::session::{ClientConfig, run_client};
use roundfeed_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "roundfeed-client")]
#[command(about = "Watch live game rounds over a shared WebSocket connection pool", long_about = None)]
struct Args {
    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Namespace to watch on start (repeatable)
    #[arg(short = 'w', long = "watch")]
    watch: Vec<String>,

    /// Countdown recomputation period in milliseconds
    #[arg(long, default_value_t = 1000)]
    tick_millis: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let config = ClientConfig {
        url: args.url,
        watch: args.watch,
        tick: Duration::from_millis(args.tick_millis.max(1)),
    };

    // Run the client
    if let Err(e) = run_client(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
