use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::PickOutcome;

// ---------------------------------------------------------------------------
// RiskLevel
// ---------------------------------------------------------------------------

/// Parlay risk tiers. Each tier fixes a legs range, an allowed confidence
/// set, a combined-odds band and a correlation ceiling (see
/// `engine::parlays::RiskConfig`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [
        RiskLevel::Conservative,
        RiskLevel::Moderate,
        RiskLevel::Aggressive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Conservative => "conservative",
            RiskLevel::Moderate => "moderate",
            RiskLevel::Aggressive => "aggressive",
        }
    }

    /// Maximum pairwise correlation tolerated between two legs.
    pub fn correlation_ceiling(&self) -> f64 {
        match self {
            RiskLevel::Conservative => 0.15,
            RiskLevel::Moderate => 0.40,
            RiskLevel::Aggressive => 0.70,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Parlay / ParlayLeg
// ---------------------------------------------------------------------------

/// One leg of a parlay. `leg_order` matters only for display; settlement
/// is derived from the underlying pick outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParlayLeg {
    pub pick_id: Uuid,
    pub leg_order: u32,
    pub result: PickOutcome,
}

/// A bundle of 2–6 compatible, correlation-bounded picks for a risk tier.
/// Regenerated daily; the prior day's rows are replaced wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parlay {
    pub id: Uuid,
    pub risk_level: RiskLevel,
    pub num_legs: u32,
    pub combined_odds_american: i32,
    pub combined_odds_decimal: f64,
    pub combined_ev_pct: f64,
    /// Correlation-adjusted joint probability, not the naive product.
    pub combined_fair_prob: f64,
    /// Average pairwise correlation across legs.
    pub correlation_score: f64,
    pub suggested_kelly_fraction: f64,
    pub pick_date: NaiveDate,
    pub outcome: PickOutcome,
    pub profit_loss: Option<f64>,
    pub legs: Vec<ParlayLeg>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceilings_loosen_with_risk() {
        assert!(
            RiskLevel::Conservative.correlation_ceiling()
                < RiskLevel::Moderate.correlation_ceiling()
        );
        assert!(
            RiskLevel::Moderate.correlation_ceiling()
                < RiskLevel::Aggressive.correlation_ceiling()
        );
    }
}
