//! Round countdown derivation.
//!
//! Everything here is a pure function of a [`RoundRecord`] and the current
//! time. Callers recompute once per tick; nothing is cached between calls.

use std::fmt;

use roundfeed_shared::round::{GameType, RoundRecord};

/// Shown instead of a countdown when the phase has no meaningful number.
pub const COUNTDOWN_PLACEHOLDER: &str = "--";

/// Remaining seconds split for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeLeft {
    pub minutes: i64,
    pub seconds: i64,
    pub raw: i64,
}

impl TimeLeft {
    /// Negative input clamps to zero.
    pub fn from_secs(raw: i64) -> Self {
        let raw = raw.max(0);
        Self {
            minutes: raw / 60,
            seconds: raw % 60,
            raw,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.raw == 0
    }
}

impl fmt::Display for TimeLeft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.minutes, self.seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// `now` is before the round start
    Scheduled,
    PlacementOpen,
    /// Placement closed, round still resolving
    PlacementClosed,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLabel {
    BettingOpen,
    BettingClosed,
    GameOver,
}

impl StatusLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusLabel::BettingOpen => "Betting Open",
            StatusLabel::BettingClosed => "Betting Closed",
            StatusLabel::GameOver => "Game Over",
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Countdowns and flags for one instant of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockState {
    pub place_time_left: TimeLeft,
    pub game_time_left: TimeLeft,
    pub is_place_over: bool,
    pub is_game_over: bool,
    pub has_started: bool,
}

impl ClockState {
    pub fn phase(&self) -> Phase {
        if self.is_game_over {
            Phase::GameOver
        } else if self.is_place_over {
            Phase::PlacementClosed
        } else if !self.has_started {
            Phase::Scheduled
        } else {
            Phase::PlacementOpen
        }
    }

    pub fn status(&self) -> StatusLabel {
        if !self.is_place_over {
            StatusLabel::BettingOpen
        } else if !self.is_game_over {
            StatusLabel::BettingClosed
        } else {
            StatusLabel::GameOver
        }
    }
}

/// Derive the clock state of `record` at `now_millis`.
///
/// Elapsed time is counted in whole seconds and never goes below zero, so a
/// round that has not started yet shows its full durations. A record that
/// fails [`RoundRecord::validate`] is reported as over with zero countdowns.
pub fn derive_state(record: &RoundRecord, now_millis: i64) -> ClockState {
    let elapsed_millis = now_millis.saturating_sub(record.started_at);
    let has_started = elapsed_millis >= 0;

    if !record.is_well_formed() {
        return ClockState {
            place_time_left: TimeLeft::default(),
            game_time_left: TimeLeft::default(),
            is_place_over: true,
            is_game_over: true,
            has_started,
        };
    }

    let elapsed = elapsed_millis.div_euclid(1000).max(0);
    let place_time_left =
        TimeLeft::from_secs(record.placement_duration_secs.saturating_sub(elapsed));
    let game_time_left = TimeLeft::from_secs(record.total_duration_secs.saturating_sub(elapsed));

    ClockState {
        place_time_left,
        game_time_left,
        is_place_over: place_time_left.is_zero(),
        is_game_over: game_time_left.is_zero(),
        has_started,
    }
}

/// What a game screen shows for the round right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownDisplay {
    pub label: StatusLabel,
    pub text: String,
}

/// Pick the primary countdown for the current phase.
///
/// The placement countdown leads until placement closes, then the game
/// countdown, except for game types that hide their resolution countdown.
pub fn display(state: &ClockState, game_type: GameType) -> CountdownDisplay {
    let text = if !state.is_place_over {
        state.place_time_left.to_string()
    } else if !game_type.has_resolution_countdown() {
        COUNTDOWN_PLACEHOLDER.to_string()
    } else {
        state.game_time_left.to_string()
    };

    CountdownDisplay {
        label: state.status(),
        text,
    }
}
