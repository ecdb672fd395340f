use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Market, OddsSnapshot};

/// Books whose prices carry extra weight in consensus and whose presence
/// upgrades data quality.
pub const SHARP_BOOKS: [&str; 4] = ["pinnacle", "betonlineag", "bovada", "circa"];

pub fn is_sharp_book(bookmaker: &str) -> bool {
    SHARP_BOOKS.iter().any(|b| bookmaker.eq_ignore_ascii_case(b))
}

/// Freshness assigned when a game has no snapshots at all; pessimistic
/// enough that downstream scoring always filters the game out.
const NO_DATA_FRESHNESS_MINUTES: i64 = 9999;

/// Summary of how trustworthy a game's snapshot set is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQuality {
    pub books_covered: usize,
    pub snapshot_freshness_minutes: i64,
    pub sharp_books_present: bool,
    /// Population stdev of no-vig probabilities across all snapshots.
    pub line_dispersion: f64,
    /// Fraction of the three expected markets observed.
    pub market_completeness: f64,
}

impl DataQuality {
    /// The sentinel returned for an empty snapshot set.
    pub fn no_data() -> Self {
        Self {
            books_covered: 0,
            snapshot_freshness_minutes: NO_DATA_FRESHNESS_MINUTES,
            sharp_books_present: false,
            line_dispersion: 0.0,
            market_completeness: 0.0,
        }
    }
}

/// Population standard deviation; 0.0 below two observations.
pub(crate) fn population_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Assess one game's snapshot set against an explicit `now`.
pub fn assess_game_quality(snapshots: &[OddsSnapshot], now: DateTime<Utc>) -> DataQuality {
    if snapshots.is_empty() {
        return DataQuality::no_data();
    }

    let books: HashSet<&str> = snapshots.iter().map(|s| s.bookmaker.as_str()).collect();

    let latest = snapshots
        .iter()
        .map(|s| s.snapshot_time)
        .max()
        .unwrap_or(now);
    let freshness = (now - latest).num_minutes().max(0);

    let probs: Vec<f64> = snapshots.iter().map(|s| s.no_vig_prob).collect();
    let dispersion = population_std_dev(&probs);

    let markets: HashSet<Market> = snapshots.iter().map(|s| s.market).collect();
    let completeness = markets.len() as f64 / Market::ALL.len() as f64;

    let sharp_present = books.iter().any(|b| is_sharp_book(b));

    DataQuality {
        books_covered: books.len(),
        snapshot_freshness_minutes: freshness,
        sharp_books_present: sharp_present,
        line_dispersion: dispersion,
        market_completeness: completeness,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn snap(book: &str, market: Market, no_vig: f64, mins_ago: i64, now: DateTime<Utc>) -> OddsSnapshot {
        let ts = now - Duration::minutes(mins_ago);
        OddsSnapshot {
            game_id: 1,
            sport_key: "basketball_nba".into(),
            bookmaker: book.into(),
            market,
            side: "home".into(),
            line: None,
            odds: -110,
            implied_prob: 0.5238,
            no_vig_prob: no_vig,
            commence_time: now + Duration::hours(4),
            snapshot_time: ts,
            snapshot_time_rounded: OddsSnapshot::round_to_minute(ts),
            is_closing: false,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 2, 18, 0, 0).unwrap()
    }

    #[test]
    fn test_full_coverage_metrics() {
        let n = now();
        let snapshots = vec![
            snap("pinnacle", Market::H2h, 0.52, 5, n),
            snap("draftkings", Market::H2h, 0.50, 4, n),
            snap("fanduel", Market::Spreads, 0.49, 3, n),
            snap("betmgm", Market::Totals, 0.51, 2, n),
        ];

        let dq = assess_game_quality(&snapshots, n);

        assert_eq!(dq.books_covered, 4);
        assert_eq!(dq.snapshot_freshness_minutes, 2);
        assert!(dq.sharp_books_present);
        assert!((dq.market_completeness - 1.0).abs() < 1e-9);
        assert!(dq.line_dispersion > 0.0);
    }

    #[test]
    fn test_empty_input_sentinel() {
        let dq = assess_game_quality(&[], now());
        assert_eq!(dq.books_covered, 0);
        assert_eq!(dq.snapshot_freshness_minutes, 9999);
        assert!(!dq.sharp_books_present);
        assert!((dq.market_completeness - 0.0).abs() < 1e-9);
        assert!((dq.line_dispersion - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_freshness_floored_at_zero() {
        let n = now();
        // Snapshot "from the future" (clock skew) must not go negative.
        let snapshots = vec![snap("draftkings", Market::H2h, 0.5, -3, n)];
        let dq = assess_game_quality(&snapshots, n);
        assert_eq!(dq.snapshot_freshness_minutes, 0);
    }

    #[test]
    fn test_single_observation_has_zero_dispersion() {
        let n = now();
        let snapshots = vec![snap("bovada", Market::H2h, 0.47, 1, n)];
        let dq = assess_game_quality(&snapshots, n);
        assert!((dq.line_dispersion - 0.0).abs() < 1e-9);
        assert!(dq.sharp_books_present);
        assert!((dq.market_completeness - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_population_std_dev() {
        assert!((population_std_dev(&[]) - 0.0).abs() < 1e-9);
        assert!((population_std_dev(&[0.5]) - 0.0).abs() < 1e-9);
        // pstdev of [2, 4] = 1.
        assert!((population_std_dev(&[2.0, 4.0]) - 1.0).abs() < 1e-9);
    }
}
