//! Closing-line capture and closing-line value (CLV).
//!
//! CLV measures whether a pick beat the final pre-event market: the
//! sharp-weighted closing no-vig consensus minus the probability implied
//! by the price the pick actually took. A positive number means the
//! market moved toward the pick after it was issued.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analytics::odds_math::american_to_implied_prob;
use crate::models::{Market, OddsSnapshot, Pick};

/// Books whose closing prices anchor the CLV consensus. Deliberately a
/// different set from the data-quality sharp books: these are the books
/// whose *closing* numbers are considered efficient.
pub const CLV_SHARP_BOOKS: [&str; 4] = ["pinnacle", "circa", "bookmaker", "betcris"];

fn is_clv_sharp_book(bookmaker: &str) -> bool {
    CLV_SHARP_BOOKS
        .iter()
        .any(|b| bookmaker.eq_ignore_ascii_case(b))
}

/// Flag the latest pre-commence snapshot per (bookmaker, market, side)
/// as the closing line. Returns how many snapshots were newly marked.
pub fn mark_closing_lines(
    snapshots: &mut [OddsSnapshot],
    commence_time: DateTime<Utc>,
) -> usize {
    let mut latest: HashMap<(String, Market, String), usize> = HashMap::new();
    for (idx, snap) in snapshots.iter().enumerate() {
        if snap.snapshot_time >= commence_time {
            continue;
        }
        let key = (snap.bookmaker.clone(), snap.market, snap.side.clone());
        match latest.get(&key) {
            Some(&kept) if snapshots[kept].snapshot_time >= snap.snapshot_time => {}
            _ => {
                latest.insert(key, idx);
            }
        }
    }

    let mut marked = 0;
    for idx in latest.into_values() {
        if !snapshots[idx].is_closing {
            snapshots[idx].is_closing = true;
            marked += 1;
        }
    }
    marked
}

/// CLV numbers for one pick, ready to copy onto the record.
#[derive(Debug, Clone, Serialize)]
pub struct ClvUpdate {
    pub market_clv: f64,
    pub book_clv: Option<f64>,
    pub closing_odds_american: Option<i32>,
    pub closing_snapshot_time: Option<DateTime<Utc>>,
}

/// Compute CLV for a pick from its game's snapshots. `None` when no
/// closing snapshot exists for the pick's market and side yet.
pub fn calculate_clv_for_pick(pick: &Pick, snapshots: &[OddsSnapshot]) -> Option<ClvUpdate> {
    let closing: Vec<&OddsSnapshot> = snapshots
        .iter()
        .filter(|s| s.is_closing && s.market == pick.market && s.side == pick.side)
        .collect();
    if closing.is_empty() {
        return None;
    }

    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for snap in &closing {
        let weight = if is_clv_sharp_book(&snap.bookmaker) {
            2.0
        } else {
            1.0
        };
        weighted_sum += snap.no_vig_prob * weight;
        weight_total += weight;
    }
    let closing_consensus = weighted_sum / weight_total;

    let pick_prob = match american_to_implied_prob(pick.odds_american) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(pick_id = %pick.id, error = %e, "Pick carries invalid odds");
            return None;
        }
    };

    let book_snap = closing
        .iter()
        .find(|s| s.bookmaker.eq_ignore_ascii_case(&pick.best_book));

    Some(ClvUpdate {
        market_clv: closing_consensus - pick_prob,
        book_clv: book_snap.map(|s| s.no_vig_prob - pick_prob),
        closing_odds_american: book_snap.map(|s| s.odds),
        closing_snapshot_time: book_snap.map(|s| s.snapshot_time),
    })
}

/// Fill in CLV for settled picks that do not have it yet. Returns the
/// number of picks updated.
pub fn apply_clv(
    picks: &mut [Pick],
    snapshots_by_game: &HashMap<i64, Vec<OddsSnapshot>>,
) -> usize {
    let mut updated = 0;
    for pick in picks.iter_mut() {
        if !pick.outcome.is_settled() || pick.market_clv.is_some() {
            continue;
        }
        let Some(snapshots) = snapshots_by_game.get(&pick.game_id) else {
            continue;
        };
        if let Some(update) = calculate_clv_for_pick(pick, snapshots) {
            pick.market_clv = Some(update.market_clv);
            pick.book_clv = update.book_clv;
            pick.closing_odds_american = update.closing_odds_american;
            pick.closing_snapshot_time = update.closing_snapshot_time;
            updated += 1;
        }
    }
    updated
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
