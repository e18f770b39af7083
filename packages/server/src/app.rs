//! Composition root of the feed server.

use std::sync::Arc;

use roundfeed_shared::time::Clock;

use crate::{
    infrastructure::{repository::InMemoryRoundRepository, round_pusher::BroadcastRoundPusher},
    scheduler::{RoundScheduler, TableConfig},
    ui::{Server, state::AppState},
    usecase::{EndRoundUseCase, GetRoundUseCase, StartRoundUseCase},
};

/// Everything the binary needs to run: the HTTP server and the round loops.
pub struct App {
    pub server: Server,
    pub scheduler: Arc<RoundScheduler>,
    pub tables: Vec<TableConfig>,
}

/// Wire dependencies in order: repository, pusher, use cases, state, server.
pub fn build_app(tables: Vec<TableConfig>, clock: Arc<dyn Clock>) -> App {
    // 1. Repository (in-memory)
    let repository = Arc::new(InMemoryRoundRepository::new());

    // 2. RoundPusher (broadcast channels)
    let pusher = Arc::new(BroadcastRoundPusher::new());

    // 3. UseCases
    let start_round = Arc::new(StartRoundUseCase::new(
        repository.clone(),
        pusher.clone(),
        clock,
    ));
    let end_round = Arc::new(EndRoundUseCase::new(pusher.clone()));
    let get_round = Arc::new(GetRoundUseCase::new(repository));

    // 4. AppState and server
    let state = Arc::new(AppState {
        get_round_usecase: get_round,
        pusher,
        tables: tables.clone(),
    });

    App {
        server: Server::new(state),
        scheduler: Arc::new(RoundScheduler::new(start_round, end_round)),
        tables,
    }
}
