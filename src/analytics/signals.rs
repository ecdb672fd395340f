use serde::{Deserialize, Serialize};

use super::data_quality::DataQuality;
use super::line_movement::{ReverseLineMovement, SteamMove};

// Composite weights; they sum to 1.0.
const W_EV_POSITIVE: f64 = 0.25;
const W_STEAM_MOVE: f64 = 0.20;
const W_REVERSE_LINE_MOVEMENT: f64 = 0.15;
const W_BEST_LINE_AVAILABLE: f64 = 0.10;
const W_CONSENSUS_DEVIATION: f64 = 0.10;
const W_CLOSING_LINE_TREND: f64 = 0.10;
const W_DATA_QUALITY: f64 = 0.10;

/// Per-pick signal vector plus its weighted composite. Always recomputed
/// from scratch, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalBreakdown {
    pub ev_positive: f64,
    pub ev_magnitude: f64,
    pub steam_move: f64,
    pub reverse_line_movement: f64,
    pub best_line_available: f64,
    pub consensus_deviation: f64,
    pub closing_line_trend: f64,
    pub data_quality_score: f64,
    pub composite: f64,
}

impl SignalBreakdown {
    /// Count of the five boolean signals currently firing. The neutral
    /// closing-line placeholder and the quality sub-score do not count.
    pub fn signals_firing(&self) -> u32 {
        (self.ev_positive
            + self.steam_move
            + self.reverse_line_movement
            + self.best_line_available
            + self.consensus_deviation) as u32
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Data-quality sub-score: start at 1.0 and penalize thin coverage,
/// staleness, wide dispersion, missing markets and the absence of sharp
/// books; clamped to [0, 1].
pub fn quality_score(data_quality: &DataQuality) -> f64 {
    let mut score: f64 = 1.0;
    if data_quality.books_covered < 4 {
        score -= 0.2;
    }
    if data_quality.snapshot_freshness_minutes > 120 {
        score -= 0.3;
    }
    if data_quality.line_dispersion > 0.06 {
        score -= 0.2;
    }
    if data_quality.market_completeness < 0.66 {
        score -= 0.2;
    }
    if !data_quality.sharp_books_present {
        score -= 0.1;
    }
    score.clamp(0.0, 1.0)
}

/// Fold the detector outputs for one side into the weighted composite.
pub fn score_signals(
    ev_pct: f64,
    steam: Option<&SteamMove>,
    rlm: Option<&ReverseLineMovement>,
    opening_odds: i32,
    current_odds: i32,
    is_outlier_book: bool,
    data_quality: &DataQuality,
) -> SignalBreakdown {
    let ev_positive = if ev_pct > 0.0 { 1.0 } else { 0.0 };
    let steam_move = if steam.is_some() { 1.0 } else { 0.0 };
    let reverse_line_movement = if rlm.is_some() { 1.0 } else { 0.0 };
    let best_line_available = if current_odds > opening_odds { 1.0 } else { 0.0 };
    let consensus_deviation = if is_outlier_book { 1.0 } else { 0.0 };
    // TODO: derive from captured closing lines once enough games have
    // settled; a neutral 0.5 until then.
    let closing_line_trend = 0.5;
    let data_quality_score = quality_score(data_quality);

    let composite = ev_positive * W_EV_POSITIVE
        + steam_move * W_STEAM_MOVE
        + reverse_line_movement * W_REVERSE_LINE_MOVEMENT
        + best_line_available * W_BEST_LINE_AVAILABLE
        + consensus_deviation * W_CONSENSUS_DEVIATION
        + closing_line_trend * W_CLOSING_LINE_TREND
        + data_quality_score * W_DATA_QUALITY;

    SignalBreakdown {
        ev_positive,
        ev_magnitude: ev_pct,
        steam_move,
        reverse_line_movement,
        best_line_available,
        consensus_deviation,
        closing_line_trend,
        data_quality_score,
        composite,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
