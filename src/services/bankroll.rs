//! Bankroll tracking and Kelly-sized staking suggestions.
//!
//! Balances are money, so they live in `Decimal`; the unit-based
//! analytics fields stay `f64` and are converted at the boundary.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Game, Pick};

fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

#[derive(Debug, Clone, Serialize)]
pub struct BankrollSummary {
    pub starting_balance: Decimal,
    pub current_balance: Decimal,
    pub total_wagered: Decimal,
    pub total_profit: Decimal,
    pub roi_pct: Decimal,
    pub num_bets: usize,
}

/// Roll every settled pick's profit into a balance summary.
pub fn bankroll_summary(picks: &[Pick], starting_balance: Decimal) -> BankrollSummary {
    let settled: Vec<&Pick> = picks.iter().filter(|p| p.outcome.is_settled()).collect();

    let total_profit: Decimal = settled
        .iter()
        .map(|p| to_decimal(p.profit_loss.unwrap_or(0.0)))
        .sum();
    let total_wagered: Decimal = settled
        .iter()
        .map(|p| to_decimal(p.suggested_kelly_fraction))
        .sum();

    let roi_pct = if total_wagered > Decimal::ZERO {
        total_profit / total_wagered * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    BankrollSummary {
        starting_balance,
        current_balance: starting_balance + total_profit,
        total_wagered,
        total_profit,
        roi_pct,
        num_bets: settled.len(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KellySuggestion {
    pub pick_id: Uuid,
    pub game: String,
    pub side: String,
    pub kelly_fraction: f64,
    pub current_bankroll: Decimal,
    pub suggested_stake: Decimal,
}

/// Turn the day's picks into concrete stake suggestions against the
/// current bankroll, highest EV first.
pub fn kelly_suggestions(
    picks: &[Pick],
    games: &HashMap<i64, Game>,
    bankroll: Decimal,
) -> Vec<KellySuggestion> {
    let mut ordered: Vec<&Pick> = picks.iter().collect();
    ordered.sort_by(|a, b| {
        b.ev_pct
            .partial_cmp(&a.ev_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    ordered
        .into_iter()
        .map(|pick| {
            let matchup = games
                .get(&pick.game_id)
                .map(|g| format!("{} vs {}", g.away_team, g.home_team))
                .unwrap_or_else(|| "unknown".to_string());
            let side = match pick.line {
                Some(line) => format!("{} {line}", pick.side),
                None => pick.side.clone(),
            };
            KellySuggestion {
                pick_id: pick.id,
                game: matchup,
                side,
                kelly_fraction: pick.suggested_kelly_fraction,
                current_bankroll: bankroll,
                suggested_stake: bankroll * to_decimal(pick.suggested_kelly_fraction),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct BankrollPoint {
    pub date: NaiveDate,
    pub balance: Decimal,
}

/// Daily running balance over settled picks, oldest first.
pub fn bankroll_history(picks: &[Pick], starting_balance: Decimal) -> Vec<BankrollPoint> {
    let mut by_day: HashMap<NaiveDate, Decimal> = HashMap::new();
    for pick in picks.iter().filter(|p| p.outcome.is_settled()) {
        *by_day.entry(pick.pick_day).or_insert(Decimal::ZERO) +=
            to_decimal(pick.profit_loss.unwrap_or(0.0));
    }

    let mut days: Vec<NaiveDate> = by_day.keys().copied().collect();
    days.sort();

    let mut balance = starting_balance;
    days.into_iter()
        .map(|date| {
            balance += by_day[&date];
            BankrollPoint { date, balance }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
