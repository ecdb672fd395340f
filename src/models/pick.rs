use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::Market;

// ---------------------------------------------------------------------------
// ConfidenceTier
// ---------------------------------------------------------------------------

/// Confidence tiers assigned to generated picks. `Filtered` is terminal:
/// a filtered candidate is discarded, never emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
    Filtered,
}

impl ConfidenceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "high",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::Low => "low",
            ConfidenceTier::Filtered => "filtered",
        }
    }

    /// Rank for ordering checks: higher number = stronger tier.
    pub fn rank(&self) -> u8 {
        match self {
            ConfidenceTier::High => 3,
            ConfidenceTier::Medium => 2,
            ConfidenceTier::Low => 1,
            ConfidenceTier::Filtered => 0,
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PickOutcome
// ---------------------------------------------------------------------------

/// Settlement outcome for a pick or parlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickOutcome {
    Win,
    Loss,
    Push,
    Pending,
}

impl PickOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            PickOutcome::Win => "win",
            PickOutcome::Loss => "loss",
            PickOutcome::Push => "push",
            PickOutcome::Pending => "pending",
        }
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self, PickOutcome::Pending)
    }
}

impl fmt::Display for PickOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ProbSource
// ---------------------------------------------------------------------------

/// Where the fair probability on a pick came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbSource {
    /// Weighted market consensus across books.
    Consensus,
    /// External probability source (e.g. a trained team-strength model).
    Model,
}

impl fmt::Display for ProbSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbSource::Consensus => write!(f, "consensus"),
            ProbSource::Model => write!(f, "model"),
        }
    }
}

// ---------------------------------------------------------------------------
// LegKey
// ---------------------------------------------------------------------------

/// Typed view of a parlay leg for correlation and compatibility checks.
/// Any pick-like record exposes exactly these four fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegKey<'a> {
    pub game_id: i64,
    pub sport_key: &'a str,
    pub market: Market,
    pub side: &'a str,
}

// ---------------------------------------------------------------------------
// Pick
// ---------------------------------------------------------------------------

/// A generated betting recommendation. Created by the daily generation
/// pass; settlement and closing-line capture mutate `outcome`,
/// `profit_loss` and the CLV fields afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pick {
    pub id: Uuid,
    pub game_id: i64,
    pub sport_key: String,
    /// Start of the generation day (UTC midnight).
    pub pick_date: DateTime<Utc>,
    /// Calendar day component of `pick_date`; part of the uniqueness key.
    pub pick_day: NaiveDate,
    pub market: Market,
    pub side: String,
    pub line: Option<f64>,
    pub odds_american: i32,
    pub best_book: String,
    pub fair_prob: f64,
    pub prob_source: ProbSource,
    pub implied_prob: f64,
    pub ev_pct: f64,
    pub edge: f64,
    pub composite_score: f64,
    pub confidence_tier: ConfidenceTier,
    /// Serialized `SignalBreakdown` captured at generation time.
    pub signals: serde_json::Value,
    /// Serialized `DataQuality` captured at generation time.
    pub data_quality: serde_json::Value,
    pub suggested_kelly_fraction: f64,
    pub issued_at: DateTime<Utc>,
    pub outcome: PickOutcome,
    /// Profit in stake units once settled.
    pub profit_loss: Option<f64>,
    /// Closing consensus probability minus the probability implied by the
    /// odds taken at pick time.
    pub market_clv: Option<f64>,
    /// Same, against the closing no-vig price at the book the pick used.
    pub book_clv: Option<f64>,
    pub closing_odds_american: Option<i32>,
    pub closing_snapshot_time: Option<DateTime<Utc>>,
}

impl Pick {
    /// Uniqueness key: one pick per (game, market, side, day).
    pub fn merge_key(&self) -> (i64, Market, &str, NaiveDate) {
        (self.game_id, self.market, self.side.as_str(), self.pick_day)
    }

    /// The leg view used by the correlation and compatibility engines.
    pub fn leg_key(&self) -> LegKey<'_> {
        LegKey {
            game_id: self.game_id,
            sport_key: &self.sport_key,
            market: self.market,
            side: &self.side,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ranks_ordered() {
        assert!(ConfidenceTier::High.rank() > ConfidenceTier::Medium.rank());
        assert!(ConfidenceTier::Medium.rank() > ConfidenceTier::Low.rank());
        assert!(ConfidenceTier::Low.rank() > ConfidenceTier::Filtered.rank());
    }

    #[test]
    fn test_outcome_settled() {
        assert!(PickOutcome::Win.is_settled());
        assert!(PickOutcome::Push.is_settled());
        assert!(!PickOutcome::Pending.is_settled());
    }
}
