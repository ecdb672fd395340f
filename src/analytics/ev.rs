use serde::Serialize;

use super::odds_math::{american_to_decimal, american_to_implied_prob, calculate_ev, OddsError};

/// Expected-value snapshot for one pick candidate at its best price.
#[derive(Debug, Clone, Serialize)]
pub struct PickEv {
    pub fair_prob: f64,
    pub best_odds: i32,
    pub best_odds_decimal: f64,
    pub implied_prob_at_best_odds: f64,
    pub ev_pct: f64,
    /// Fair probability minus the implied probability at the best price.
    pub edge: f64,
}

pub fn calculate_pick_ev(fair_prob: f64, best_odds_american: i32) -> Result<PickEv, OddsError> {
    let decimal_odds = american_to_decimal(best_odds_american)?;
    let implied = american_to_implied_prob(best_odds_american)?;
    let ev_pct = calculate_ev(fair_prob, decimal_odds);
    Ok(PickEv {
        fair_prob,
        best_odds: best_odds_american,
        best_odds_decimal: decimal_odds,
        implied_prob_at_best_odds: implied,
        ev_pct,
        edge: fair_prob - implied,
    })
}
