//! Cancellable once-per-period recomputation of a round's clock state.
//!
//! A [`RoundTicker`] runs at most one timer task. Watching a new round cancels
//! the previous task first, and dropping the ticker cancels whatever is left,
//! so no timer outlives its owner or computes against a superseded record.

use std::{
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use roundfeed_shared::{round::RoundRecord, time::Clock};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::clock::{ClockState, derive_state};

pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Clock state together with the round it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub round: RoundRecord,
    pub state: ClockState,
}

pub struct RoundTicker {
    clock: Arc<dyn Clock>,
    period: Duration,
    snapshots: watch::Sender<Option<Snapshot>>,
    generation: Arc<AtomicU64>,
    round: Mutex<Option<RoundRecord>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl RoundTicker {
    pub fn new(clock: Arc<dyn Clock>, period: Duration) -> Self {
        let (snapshots, _) = watch::channel(None);
        Self {
            clock,
            period,
            snapshots,
            generation: Arc::new(AtomicU64::new(0)),
            round: Mutex::new(None),
            task: Mutex::new(None),
        }
    }

    fn task(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start ticking for `record`, replacing any round being watched.
    ///
    /// The first state is computed immediately. Must be called from within a
    /// tokio runtime.
    pub fn watch_round(&self, record: RoundRecord) {
        let mut task = self.task();
        self.restart(&mut task, record);
    }

    /// Like [`watch_round`](Self::watch_round), unless `record` is the round
    /// already being watched. The comparison and the restart happen under one
    /// lock, so concurrent callers start a given round at most once.
    ///
    /// Returns `true` when the ticker was restarted.
    pub fn watch_new_round(&self, record: RoundRecord) -> bool {
        let mut task = self.task();
        if self
            .current_round()
            .is_some_and(|current| current.id == record.id)
        {
            return false;
        }
        self.restart(&mut task, record);
        true
    }

    fn restart(&self, task: &mut Option<JoinHandle<()>>, record: RoundRecord) {
        if let Some(handle) = task.take() {
            handle.abort();
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        *self.round.lock().unwrap_or_else(PoisonError::into_inner) = Some(record.clone());
        tracing::debug!("Ticking round {} ({})", record.id, record.game_type);

        *task = Some(tokio::spawn(run_ticks(
            record,
            self.clock.clone(),
            self.period,
            self.snapshots.clone(),
            self.generation.clone(),
            generation,
        )));
    }

    /// Cancel the running timer, if any. The last snapshot stays readable.
    pub fn stop(&self) {
        let mut task = self.task();
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = task.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Snapshot>> {
        self.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.snapshots.borrow().clone()
    }

    pub fn current_state(&self) -> Option<ClockState> {
        self.snapshots
            .borrow()
            .as_ref()
            .map(|snapshot| snapshot.state)
    }

    pub fn current_round(&self) -> Option<RoundRecord> {
        self.round
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Drop for RoundTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_ticks(
    record: RoundRecord,
    clock: Arc<dyn Clock>,
    period: Duration,
    snapshots: watch::Sender<Option<Snapshot>>,
    current_generation: Arc<AtomicU64>,
    generation: u64,
) {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        let state = derive_state(&record, clock.now_millis());

        // A replaced or stopped ticker must not overwrite the newer state
        let published = snapshots.send_if_modified(|current| {
            if current_generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *current = Some(Snapshot {
                round: record.clone(),
                state,
            });
            true
        });

        if !published || state.is_game_over {
            break;
        }
    }
    tracing::debug!("Stopped ticking round {}", record.id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundfeed_shared::{
        round::{GameType, RoundId},
        time::ManualClock,
    };

    const T: i64 = 1_700_000_000_000;

    fn record(id: &str, placement: i64, total: i64) -> RoundRecord {
        RoundRecord {
            id: RoundId::new(id),
            game_type: GameType::CoinToss,
            started_at: T,
            placement_duration_secs: placement,
            total_duration_secs: total,
        }
    }

    async fn next_state(rx: &mut watch::Receiver<Option<Snapshot>>) -> Snapshot {
        rx.changed().await.unwrap();
        rx.borrow_and_update().clone().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_recomputes_every_period() {
        // テスト項目: 1秒ごとに残り時間が再計算される
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(T));
        let ticker = RoundTicker::new(clock.clone(), DEFAULT_TICK);
        let mut rx = ticker.subscribe();

        // when (操作):
        ticker.watch_round(record("r-1", 3, 5));
        let first = next_state(&mut rx).await;
        clock.advance(1000);
        let second = next_state(&mut rx).await;

        // then (期待する結果):
        assert_eq!(first.state.place_time_left.raw, 3);
        assert_eq!(second.state.place_time_left.raw, 2);
        assert_eq!(second.state.game_time_left.raw, 4);
        assert_eq!(second.round.id, RoundId::new("r-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_stops_after_game_over() {
        // テスト項目: ゲーム終了状態を発行した後にタイマーが停止する
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(T));
        let ticker = RoundTicker::new(clock.clone(), DEFAULT_TICK);
        let mut rx = ticker.subscribe();
        ticker.watch_round(record("r-1", 1, 2));

        // when (操作):
        let mut last = next_state(&mut rx).await;
        while !last.state.is_game_over {
            clock.advance(1000);
            last = next_state(&mut rx).await;
        }
        tokio::task::yield_now().await;

        // then (期待する結果):
        assert!(last.state.is_game_over);
        assert!(!ticker.is_running());
        assert_eq!(ticker.current_state(), Some(last.state));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watching_new_round_replaces_previous_timer() {
        // テスト項目: 新しいラウンドを監視すると古いタイマーは破棄される
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(T));
        let ticker = RoundTicker::new(clock.clone(), DEFAULT_TICK);
        let mut rx = ticker.subscribe();
        ticker.watch_round(record("r-1", 30, 90));
        next_state(&mut rx).await;

        // when (操作):
        ticker.watch_round(record("r-2", 10, 20));
        let replaced = next_state(&mut rx).await;
        clock.advance(1000);
        let following = next_state(&mut rx).await;

        // then (期待する結果):
        assert_eq!(replaced.round.id, RoundId::new("r-2"));
        assert_eq!(replaced.state.place_time_left.raw, 10);
        assert_eq!(following.round.id, RoundId::new("r-2"));
        assert_eq!(following.state.place_time_left.raw, 9);
        assert_eq!(ticker.current_round().unwrap().id, RoundId::new("r-2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_new_round_skips_current_round() {
        // テスト項目: 監視中と同じラウンド ID では再起動せず、別の ID なら再起動する
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(T));
        let ticker = RoundTicker::new(clock, DEFAULT_TICK);
        let mut rx = ticker.subscribe();

        // when (操作):
        let first = ticker.watch_new_round(record("r-1", 30, 90));
        next_state(&mut rx).await;
        let repeated = ticker.watch_new_round(record("r-1", 30, 90));
        let other = ticker.watch_new_round(record("r-2", 10, 20));

        // then (期待する結果):
        assert!(first);
        assert!(!repeated);
        assert!(other);
        assert_eq!(ticker.current_round().unwrap().id, RoundId::new("r-2"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_watch_new_round_starts_once() {
        // テスト項目: 同じラウンドを複数タスクから同時に渡しても再起動は1回だけ
        // given (前提条件):
        let ticker = Arc::new(RoundTicker::new(
            Arc::new(ManualClock::new(T)),
            DEFAULT_TICK,
        ));

        // when (操作):
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let ticker = ticker.clone();
                tokio::spawn(async move { ticker.watch_new_round(record("r-1", 30, 90)) })
            })
            .collect();
        let mut started = 0;
        for handle in handles {
            if handle.await.unwrap() {
                started += 1;
            }
        }

        // then (期待する結果):
        assert_eq!(started, 1);
        assert!(ticker.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_timer() {
        // テスト項目: stop 後は状態が更新されない
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(T));
        let ticker = RoundTicker::new(clock.clone(), DEFAULT_TICK);
        let mut rx = ticker.subscribe();
        ticker.watch_round(record("r-1", 30, 90));
        next_state(&mut rx).await;

        // when (操作):
        ticker.stop();
        clock.advance(5000);
        let result = time::timeout(Duration::from_secs(5), rx.changed()).await;

        // then (期待する結果):
        assert!(result.is_err());
        assert!(!ticker.is_running());
        assert_eq!(ticker.current_state().unwrap().place_time_left.raw, 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_ends_timer() {
        // テスト項目: ticker を破棄するとタイマーも終了する
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(T));
        let ticker = RoundTicker::new(clock, DEFAULT_TICK);
        let mut rx = ticker.subscribe();
        ticker.watch_round(record("r-1", 30, 90));
        next_state(&mut rx).await;

        // when (操作):
        drop(ticker);
        let result = rx.changed().await;

        // then (期待する結果):
        assert!(result.is_err());
    }
}
