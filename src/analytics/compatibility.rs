use serde::Serialize;
use std::fmt;

use super::correlation::estimate_correlation;
use crate::models::{LegKey, Market, RiskLevel};

// ---------------------------------------------------------------------------
// Incompatibility
// ---------------------------------------------------------------------------

/// Why two legs cannot share a parlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Incompatibility {
    /// Same game, same market, same side — a duplicate leg.
    SameGameSameMarket,
    /// Same game, opposing sides of one market — guaranteed to cancel.
    SameGameOpposingSidesSameMarket,
    /// Moneyline plus spread on the same team — near-certain redundancy.
    SameGameSameTeamRelatedMarkets,
    /// Estimated correlation exceeds the risk tier's ceiling.
    CorrelationAboveCeiling(f64),
}

impl fmt::Display for Incompatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Incompatibility::SameGameSameMarket => f.write_str("same_game_same_market"),
            Incompatibility::SameGameOpposingSidesSameMarket => {
                f.write_str("same_game_opposing_sides_same_market")
            }
            Incompatibility::SameGameSameTeamRelatedMarkets => {
                f.write_str("same_game_same_team_related_markets")
            }
            Incompatibility::CorrelationAboveCeiling(corr) => {
                write!(f, "correlation_above_ceiling:{corr:.2}")
            }
        }
    }
}

/// Outcome of a pairwise leg compatibility check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityResult {
    pub is_compatible: bool,
    pub reason: Option<Incompatibility>,
}

impl CompatibilityResult {
    fn compatible() -> Self {
        Self {
            is_compatible: true,
            reason: None,
        }
    }

    fn blocked(reason: Incompatibility) -> Self {
        Self {
            is_compatible: false,
            reason: Some(reason),
        }
    }
}

/// Check whether two legs may share a parlay at the given risk tier.
/// Symmetric in its leg arguments; legs from different games are always
/// compatible.
pub fn check_compatibility(
    leg_a: &LegKey<'_>,
    leg_b: &LegKey<'_>,
    risk_level: RiskLevel,
) -> CompatibilityResult {
    if leg_a.game_id != leg_b.game_id {
        return CompatibilityResult::compatible();
    }

    let same_side = leg_a.side.eq_ignore_ascii_case(leg_b.side);

    if leg_a.market == leg_b.market {
        if !same_side {
            return CompatibilityResult::blocked(
                Incompatibility::SameGameOpposingSidesSameMarket,
            );
        }
        return CompatibilityResult::blocked(Incompatibility::SameGameSameMarket);
    }

    let ml_spread_pair = matches!(
        (leg_a.market, leg_b.market),
        (Market::H2h, Market::Spreads) | (Market::Spreads, Market::H2h)
    );
    if ml_spread_pair && same_side {
        return CompatibilityResult::blocked(Incompatibility::SameGameSameTeamRelatedMarkets);
    }

    let corr = estimate_correlation(leg_a, leg_b);
    if corr > risk_level.correlation_ceiling() {
        return CompatibilityResult::blocked(Incompatibility::CorrelationAboveCeiling(corr));
    }

    CompatibilityResult::compatible()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(game_id: i64, market: Market, side: &'static str) -> LegKey<'static> {
        LegKey {
            game_id,
            sport_key: "basketball_nba",
            market,
            side,
        }
    }

    #[test]
    fn test_cross_game_always_compatible() {
        let r = check_compatibility(
            &leg(1, Market::H2h, "home"),
            &leg(2, Market::H2h, "home"),
            RiskLevel::Conservative,
        );
        assert!(r.is_compatible);
        assert!(r.reason.is_none());
    }

    #[test]
    fn test_same_team_ml_spread_blocked() {
        let r = check_compatibility(
            &leg(1, Market::H2h, "home"),
            &leg(1, Market::Spreads, "home"),
            RiskLevel::Aggressive,
        );
        assert!(!r.is_compatible);
        assert_eq!(
            r.reason,
            Some(Incompatibility::SameGameSameTeamRelatedMarkets)
        );
        assert_eq!(
            r.reason.unwrap().to_string(),
            "same_game_same_team_related_markets"
        );
    }

    #[test]
    fn test_opposing_sides_same_market_blocked() {
        let r = check_compatibility(
            &leg(1, Market::H2h, "home"),
            &leg(1, Market::H2h, "away"),
            RiskLevel::Aggressive,
        );
        assert!(!r.is_compatible);
        assert_eq!(
            r.reason,
            Some(Incompatibility::SameGameOpposingSidesSameMarket)
        );
    }

    #[test]
    fn test_duplicate_leg_blocked_with_distinct_reason() {
        let r = check_compatibility(
            &leg(1, Market::H2h, "home"),
            &leg(1, Market::H2h, "home"),
            RiskLevel::Aggressive,
        );
        assert!(!r.is_compatible);
        assert_eq!(r.reason, Some(Incompatibility::SameGameSameMarket));
    }

    #[test]
    fn test_correlation_ceiling_varies_by_tier() {
        // h2h-home vs totals-over carries a 0.30 prior: above the
        // conservative ceiling, under moderate and aggressive.
        let a = leg(1, Market::H2h, "home");
        let b = leg(1, Market::Totals, "over");
        let conservative = check_compatibility(&a, &b, RiskLevel::Conservative);
        assert!(!conservative.is_compatible);
        assert_eq!(
            conservative.reason.unwrap().to_string(),
            "correlation_above_ceiling:0.30"
        );
        assert!(check_compatibility(&a, &b, RiskLevel::Moderate).is_compatible);
        assert!(check_compatibility(&a, &b, RiskLevel::Aggressive).is_compatible);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            (leg(1, Market::H2h, "home"), leg(1, Market::Spreads, "home")),
            (leg(1, Market::H2h, "home"), leg(1, Market::Totals, "over")),
            (leg(1, Market::H2h, "home"), leg(2, Market::H2h, "away")),
            (leg(1, Market::Totals, "over"), leg(1, Market::Totals, "under")),
        ];
        for level in RiskLevel::ALL {
            for (a, b) in &pairs {
                assert_eq!(
                    check_compatibility(a, b, level).is_compatible,
                    check_compatibility(b, a, level).is_compatible,
                    "asymmetric at {level} for {a:?} / {b:?}"
                );
            }
        }
    }
}
