//! Pairwise correlation priors between market/side combinations and the
//! correlation-adjusted joint probability used for parlay pricing.
//!
//! Correlation here is heuristic: a fixed prior table for same-game
//! pairs, a small base co-movement assumption across games, and a weak
//! positive default for unmapped same-game pairs. Lookups never fail.

use crate::models::{LegKey, Market};

/// Same-game correlation priors, keyed by (market, side, market, side)
/// with canonical side labels. Checked in both orderings.
const CORRELATION_PRIORS: [(Market, &str, Market, &str, f64); 15] = [
    (Market::H2h, "home", Market::H2h, "away", -1.0),
    (Market::H2h, "home", Market::Spreads, "home", 0.90),
    (Market::H2h, "away", Market::Spreads, "away", 0.90),
    (Market::H2h, "home", Market::Spreads, "away", -0.90),
    (Market::H2h, "away", Market::Spreads, "home", -0.90),
    (Market::H2h, "home", Market::Totals, "over", 0.30),
    (Market::H2h, "home", Market::Totals, "under", -0.20),
    (Market::H2h, "away", Market::Totals, "over", 0.25),
    (Market::H2h, "away", Market::Totals, "under", -0.15),
    (Market::Spreads, "home", Market::Totals, "over", 0.15),
    (Market::Spreads, "home", Market::Totals, "under", -0.10),
    (Market::Spreads, "away", Market::Totals, "over", 0.10),
    (Market::Spreads, "away", Market::Totals, "under", -0.05),
    (Market::Totals, "over", Market::Totals, "under", -1.0),
    (Market::Spreads, "home", Market::Spreads, "away", -1.0),
];

/// Base co-movement between outcomes of different games.
pub const CROSS_GAME_SAME_SPORT: f64 = 0.02;
pub const CROSS_GAME_CROSS_SPORT: f64 = 0.00;

/// Weak positive prior for same-game pairs absent from the table —
/// same-game legs generally correlate somewhat.
pub const SAME_GAME_DEFAULT: f64 = 0.10;

fn lookup_prior(market_a: Market, side_a: &str, market_b: Market, side_b: &str) -> Option<f64> {
    CORRELATION_PRIORS
        .iter()
        .find(|(ma, sa, mb, sb, _)| {
            (*ma == market_a
                && *mb == market_b
                && side_a.eq_ignore_ascii_case(sa)
                && side_b.eq_ignore_ascii_case(sb))
                || (*ma == market_b
                    && *mb == market_a
                    && side_b.eq_ignore_ascii_case(sa)
                    && side_a.eq_ignore_ascii_case(sb))
        })
        .map(|(_, _, _, _, corr)| *corr)
}

/// Estimate the correlation between two legs. Symmetric in its arguments.
pub fn estimate_correlation(a: &LegKey<'_>, b: &LegKey<'_>) -> f64 {
    if a.game_id != b.game_id {
        return if a.sport_key == b.sport_key {
            CROSS_GAME_SAME_SPORT
        } else {
            CROSS_GAME_CROSS_SPORT
        };
    }

    lookup_prior(a.market, a.side, b.market, b.side).unwrap_or(SAME_GAME_DEFAULT)
}

/// Bivariate joint probability with a first-order correlation correction:
/// `p_a*p_b + corr * sqrt(p_a(1-p_a) * p_b(1-p_b))`, clamped to [0, 1].
///
/// A Gaussian-copula-style approximation, not an exact joint — there is
/// no full joint-distribution data to do better with.
pub fn adjusted_joint_probability(prob_a: f64, prob_b: f64, correlation: f64) -> f64 {
    let value = prob_a * prob_b
        + correlation * (prob_a * (1.0 - prob_a) * prob_b * (1.0 - prob_b)).sqrt();
    value.clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
