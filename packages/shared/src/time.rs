//! Wall-clock access for round timing.
//!
//! All timestamps are Unix epoch milliseconds in UTC, the unit round records
//! carry their start time in.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};

/// Source of "now" for countdowns and round stamping
pub trait Clock: Send + Sync {
    /// Current Unix timestamp (milliseconds)
    fn now_millis(&self) -> i64;
}

/// Reads the host's wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        now_millis()
    }
}

/// Always reports the same instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    at: i64,
}

impl FixedClock {
    pub fn new(at_millis: i64) -> Self {
        Self { at: at_millis }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.at
    }
}

/// Clock that only moves when told to.
///
/// Shared behind an `Arc` so a test can advance it while a ticker reads it.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(start_millis),
        }
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Get current Unix timestamp (milliseconds)
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert Unix timestamp (milliseconds) to RFC 3339 format in UTC
///
/// Out-of-range timestamps are rendered as the raw millisecond value.
pub fn timestamp_to_rfc3339(timestamp_millis: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(timestamp_millis) {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => timestamp_millis.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_reads_current_time() {
        // テスト項目: SystemClock はミリ秒単位の現在時刻を返し、後の読み取りが前より小さくならない
        // given (前提条件):
        const JAN_2020_MILLIS: i64 = 1_577_836_800_000;
        let clock = SystemClock;

        // when (操作):
        let first = clock.now_millis();
        let second = clock.now_millis();

        // then (期待する結果):
        assert!(first > JAN_2020_MILLIS);
        assert!(second >= first);
    }

    #[test]
    fn test_fixed_clock_never_moves() {
        // テスト項目: FixedClock はラウンド開始時刻のような固定の瞬間を返し続ける
        // given (前提条件):
        let round_start = 1_700_000_000_000;
        let clock = FixedClock::new(round_start);

        // when (操作):
        let readings = [clock.now_millis(), clock.now_millis(), clock.now_millis()];

        // then (期待する結果):
        assert_eq!(readings, [round_start; 3]);
    }

    #[test]
    fn test_manual_clock_advances_and_sets() {
        // テスト項目: ManualClock が advance / set で時刻を変更できる
        // given (前提条件):
        let clock = ManualClock::new(1_000);

        // when (操作):
        clock.advance(2_500);
        let advanced = clock.now_millis();
        clock.set(42);

        // then (期待する結果):
        assert_eq!(advanced, 3_500);
        assert_eq!(clock.now_millis(), 42);
    }

    #[test]
    fn test_timestamp_to_rfc3339_format() {
        // テスト項目: タイムスタンプが UTC の RFC 3339 形式に変換される
        // given (前提条件):
        // 2023-01-01 00:00:00.123 UTC
        let timestamp = 1672531200123;

        // when (操作):
        let result = timestamp_to_rfc3339(timestamp);

        // then (期待する結果):
        assert_eq!(result, "2023-01-01T00:00:00.123Z");
    }
}
