//! Interactive client session: a REPL that attaches and detaches game views.

use std::{collections::HashMap, sync::Arc, time::Duration};

use roundfeed_shared::{
    round::RoundId,
    time::{Clock, SystemClock},
};
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};

use crate::{
    clock::Phase,
    command::{ReplCommand, parse_command},
    error::ClientError,
    formatter::StatusFormatter,
    pool::{ConnectionPool, Namespace},
    ticker::{DEFAULT_TICK, Snapshot},
    ui::{PROMPT, redisplay_prompt},
    view::GameView,
};

/// Client session configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint of the round feed
    pub url: String,
    /// Namespaces to watch on start
    pub watch: Vec<String>,
    /// Recomputation period of each view's clock
    pub tick: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8080/ws".to_string(),
            watch: Vec::new(),
            tick: DEFAULT_TICK,
        }
    }
}

/// A view plus the task that prints its phase changes.
struct WatchedView {
    view: GameView,
    announcer: JoinHandle<()>,
}

impl Drop for WatchedView {
    fn drop(&mut self) {
        self.announcer.abort();
    }
}

struct Session {
    config: ClientConfig,
    pool: Arc<ConnectionPool>,
    clock: Arc<dyn Clock>,
    views: HashMap<Namespace, Vec<WatchedView>>,
}

impl Session {
    fn watch(&mut self, namespace: Namespace) {
        let view = GameView::attach(
            &self.pool,
            &namespace,
            &self.config.url,
            self.clock.clone(),
            self.config.tick,
        );
        let announcer = tokio::spawn(announce(namespace.clone(), view.subscribe()));
        self.views
            .entry(namespace.clone())
            .or_default()
            .push(WatchedView { view, announcer });
        print!(
            "{}",
            StatusFormatter::format_watching(&namespace, self.pool.ref_count(&namespace))
        );
    }

    fn unwatch(&mut self, namespace: &Namespace) {
        let Some(views) = self.views.get_mut(namespace) else {
            println!("\nnot watching {}", namespace);
            return;
        };
        drop(views.pop());
        if views.is_empty() {
            self.views.remove(namespace);
        }
        print!(
            "{}",
            StatusFormatter::format_unwatched(namespace, self.pool.ref_count(namespace))
        );
    }

    fn status(&self) {
        if self.views.is_empty() {
            println!("\n(No views)");
            return;
        }
        let mut namespaces: Vec<&Namespace> = self.views.keys().collect();
        namespaces.sort();
        println!();
        for namespace in namespaces {
            for watched in &self.views[namespace] {
                println!("{}", watched.view.render());
            }
        }
    }

    /// Returns `false` when the session should end.
    fn handle(&mut self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Watch(namespace) => self.watch(namespace),
            ReplCommand::Unwatch(namespace) => self.unwatch(&namespace),
            ReplCommand::Status => self.status(),
            ReplCommand::Pool => print!("{}", StatusFormatter::format_pool(&self.pool.namespaces())),
            ReplCommand::Help => print!("{}", StatusFormatter::format_help()),
            ReplCommand::Quit => return false,
        }
        true
    }
}

/// Print a line whenever a view's round or phase changes.
async fn announce(namespace: Namespace, mut snapshots: watch::Receiver<Option<Snapshot>>) {
    let mut last: Option<(RoundId, Phase)> = None;

    while snapshots.changed().await.is_ok() {
        let Some(snapshot) = snapshots.borrow_and_update().clone() else {
            continue;
        };
        let key = (snapshot.round.id.clone(), snapshot.state.phase());
        if last.as_ref() == Some(&key) {
            continue;
        }

        let new_round = last
            .as_ref()
            .is_none_or(|(round_id, _)| *round_id != snapshot.round.id);
        if new_round {
            print!(
                "{}",
                StatusFormatter::format_round_started(&namespace, &snapshot)
            );
        }
        println!(
            "\n{}",
            StatusFormatter::format_status(&namespace, Some(&snapshot))
        );
        redisplay_prompt();
        last = Some(key);
    }
}

/// Run the interactive client until the user quits.
pub async fn run_client(config: ClientConfig) -> Result<(), ClientError> {
    let initial: Vec<Namespace> = config
        .watch
        .iter()
        .map(Namespace::new)
        .collect::<Result<_, _>>()?;

    let mut session = Session {
        config,
        pool: Arc::new(ConnectionPool::websocket()),
        clock: Arc::new(SystemClock),
        views: HashMap::new(),
    };

    println!(
        "\nConnected views share one socket per namespace. Type 'help' for commands. Press Ctrl+C to exit.\n"
    );
    for namespace in initial {
        session.watch(namespace);
    }

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    while let Some(line) = input_rx.recv().await {
        match parse_command(&line) {
            Ok(command) => {
                if !session.handle(command) {
                    break;
                }
            }
            Err(message) => println!("\n{}", message),
        }
    }

    // Detach every view so the pool sends its close frames
    session.views.clear();
    tokio::time::sleep(Duration::from_millis(100)).await;
    tracing::info!("Client session ended");

    Ok(())
}
