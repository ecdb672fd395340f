use std::collections::HashMap;

use serde::Serialize;

use super::data_quality::{is_sharp_book, population_std_dev};
use super::odds_math::american_to_decimal;
use crate::models::{Market, OddsSnapshot};

/// Multiplier applied to sharp-book observations in the weighted mean.
const SHARP_BOOK_WEIGHT: f64 = 2.0;

/// How many population standard deviations a book may sit from the fair
/// probability before it is flagged as an outlier.
const OUTLIER_SIGMA: f64 = 2.0;

/// Consensus pricing for one side of one market.
#[derive(Debug, Clone, Serialize)]
pub struct SideConsensus {
    pub side: String,
    /// Sharp-weighted mean of no-vig probabilities.
    pub fair_prob: f64,
    /// Most bettor-favorable American price across books.
    pub best_odds: i32,
    pub best_book: Option<String>,
    pub is_outlier: bool,
    pub outlier_books: Vec<String>,
    pub books_in_consensus: usize,
}

/// Aggregate a game's snapshots for one market into per-side consensus.
///
/// Results are ordered by first appearance of each side in the input.
/// Best-price ties resolve to the first book seen, so output is only
/// deterministic when the caller feeds snapshots in a stable order (the
/// engine sorts by capture time upstream).
pub fn calculate_consensus(snapshots: &[OddsSnapshot], market: Market) -> Vec<SideConsensus> {
    let mut side_order: Vec<&str> = Vec::new();
    let mut by_side: HashMap<&str, Vec<&OddsSnapshot>> = HashMap::new();

    for snap in snapshots.iter().filter(|s| s.market == market) {
        let entry = by_side.entry(snap.side.as_str()).or_default();
        if entry.is_empty() {
            side_order.push(snap.side.as_str());
        }
        entry.push(snap);
    }

    let mut result = Vec::with_capacity(side_order.len());

    for side in side_order {
        let snaps = &by_side[side];

        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        let mut raw_probs = Vec::with_capacity(snaps.len());
        let mut best_decimal = -1.0;
        let mut best_american: Option<i32> = None;
        let mut best_book: Option<String> = None;

        for s in snaps {
            let weight = if is_sharp_book(&s.bookmaker) {
                SHARP_BOOK_WEIGHT
            } else {
                1.0
            };
            weighted_sum += s.no_vig_prob * weight;
            weight_total += weight;
            raw_probs.push(s.no_vig_prob);

            match american_to_decimal(s.odds) {
                Ok(dec) if dec > best_decimal => {
                    best_decimal = dec;
                    best_american = Some(s.odds);
                    best_book = Some(s.bookmaker.clone());
                }
                Ok(_) => {}
                Err(e) => {
                    // A malformed price never sinks the whole side.
                    tracing::warn!(
                        game_id = s.game_id,
                        bookmaker = %s.bookmaker,
                        odds = s.odds,
                        error = %e,
                        "Skipping snapshot with invalid odds"
                    );
                }
            }
        }

        let fair_prob = if weight_total > 0.0 {
            weighted_sum / weight_total
        } else {
            0.0
        };

        let stdev = population_std_dev(&raw_probs);
        let mut outlier_books: Vec<String> = Vec::new();
        if stdev > 0.0 {
            for s in snaps {
                if (s.no_vig_prob - fair_prob).abs() > OUTLIER_SIGMA * stdev {
                    outlier_books.push(s.bookmaker.clone());
                }
            }
            outlier_books.sort();
            outlier_books.dedup();
        }

        let mut books: Vec<&str> = snaps.iter().map(|s| s.bookmaker.as_str()).collect();
        books.sort_unstable();
        books.dedup();

        result.push(SideConsensus {
            side: side.to_string(),
            fair_prob,
            // +100 fallback is unreachable while sides group non-empty.
            best_odds: best_american.unwrap_or(100),
            best_book,
            is_outlier: !outlier_books.is_empty(),
            outlier_books,
            books_in_consensus: books.len(),
        });
    }

    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
