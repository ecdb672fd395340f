use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

/// The three markets tracked per game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    /// Moneyline (head-to-head winner).
    H2h,
    /// Point spread.
    Spreads,
    /// Game total (over/under).
    Totals,
}

impl Market {
    pub const ALL: [Market; 3] = [Market::H2h, Market::Spreads, Market::Totals];

    pub fn as_str(&self) -> &'static str {
        match self {
            Market::H2h => "h2h",
            Market::Spreads => "spreads",
            Market::Totals => "totals",
        }
    }

    pub fn from_api_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "h2h" | "moneyline" => Some(Market::H2h),
            "spreads" => Some(Market::Spreads),
            "totals" => Some(Market::Totals),
            _ => None,
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// OddsSnapshot
// ---------------------------------------------------------------------------

/// An immutable point-in-time quote from one bookmaker.
///
/// The integrating store enforces at most one row per
/// (game, bookmaker, market, side, minute) via `snapshot_time_rounded`;
/// the analytics core treats snapshots as read-only input. `is_closing`
/// is flipped exactly once, when the event starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsSnapshot {
    pub game_id: i64,
    pub sport_key: String,
    pub bookmaker: String,
    pub market: Market,
    /// Team name for h2h/spreads, `over`/`under` for totals.
    pub side: String,
    pub line: Option<f64>,
    /// American odds; never zero in valid data.
    pub odds: i32,
    pub implied_prob: f64,
    pub no_vig_prob: f64,
    pub commence_time: DateTime<Utc>,
    pub snapshot_time: DateTime<Utc>,
    pub snapshot_time_rounded: DateTime<Utc>,
    pub is_closing: bool,
}

impl OddsSnapshot {
    /// Truncate a capture timestamp to the minute used as the dedup key.
    pub fn round_to_minute(ts: DateTime<Utc>) -> DateTime<Utc> {
        ts.with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(ts)
    }

    /// The uniqueness key the store deduplicates on.
    pub fn dedup_key(&self) -> (i64, &str, Market, &str, DateTime<Utc>) {
        (
            self.game_id,
            self.bookmaker.as_str(),
            self.market,
            self.side.as_str(),
            self.snapshot_time_rounded,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
