//! Round records as published by the round feed.
//!
//! A record is created server-side once per round and is read-only everywhere
//! else. A new round replaces the previous record wholesale.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Game variants that run timed rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameType {
    CoinToss,
    Slot,
    Jackpot,
    SevenUpDown,
    Aviator,
    Dice,
    MiniMutualFund,
}

impl GameType {
    pub const ALL: [GameType; 7] = [
        GameType::CoinToss,
        GameType::Slot,
        GameType::Jackpot,
        GameType::SevenUpDown,
        GameType::Aviator,
        GameType::Dice,
        GameType::MiniMutualFund,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::CoinToss => "coin-toss",
            GameType::Slot => "slot",
            GameType::Jackpot => "jackpot",
            GameType::SevenUpDown => "seven-up-down",
            GameType::Aviator => "aviator",
            GameType::Dice => "dice",
            GameType::MiniMutualFund => "mini-mutual-fund",
        }
    }

    /// Whether the resolution phase shows a numeric countdown.
    ///
    /// Aviator rounds resolve when the multiplier crashes, so the remaining
    /// game time is not shown to players.
    pub fn has_resolution_countdown(&self) -> bool {
        !matches!(self, GameType::Aviator)
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameType {
    type Err = RoundRecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameType::ALL
            .into_iter()
            .find(|game_type| game_type.as_str() == s)
            .ok_or_else(|| RoundRecordError::UnknownGameType(s.to_string()))
    }
}

/// Round identifier assigned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundId(String);

impl RoundId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundRecordError {
    #[error("Unknown game type '{0}'")]
    UnknownGameType(String),

    #[error("Duration must be positive (placement: {placement}s, total: {total}s)")]
    NonPositiveDuration { placement: i64, total: i64 },

    #[error("Placement window ({placement}s) exceeds round duration ({total}s)")]
    PlacementExceedsTotal { placement: i64, total: i64 },
}

/// The temporal parameters of one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub id: RoundId,
    pub game_type: GameType,
    /// Unix timestamp of the round start (milliseconds)
    pub started_at: i64,
    /// Length of the window during which bets may be placed
    pub placement_duration_secs: i64,
    /// Length of the whole round, placement included
    pub total_duration_secs: i64,
}

impl RoundRecord {
    pub fn validate(&self) -> Result<(), RoundRecordError> {
        let placement = self.placement_duration_secs;
        let total = self.total_duration_secs;
        if placement <= 0 || total <= 0 {
            return Err(RoundRecordError::NonPositiveDuration { placement, total });
        }
        if placement > total {
            return Err(RoundRecordError::PlacementExceedsTotal { placement, total });
        }
        Ok(())
    }

    pub fn is_well_formed(&self) -> bool {
        self.validate().is_ok()
    }

    /// Unix timestamp (milliseconds) at which the placement window closes
    pub fn placement_closes_at(&self) -> i64 {
        self.started_at
            .saturating_add(self.placement_duration_secs.saturating_mul(1000))
    }

    /// Unix timestamp (milliseconds) at which the round is over
    pub fn ends_at(&self) -> i64 {
        self.started_at
            .saturating_add(self.total_duration_secs.saturating_mul(1000))
    }
}
