//! Market-microstructure detectors over ordered odds time-series.
//!
//! All detectors take a game's snapshot set, filter to the market (and
//! side) they care about, and sort ascending by capture time. Missing
//! patterns come back as `None`; only `opening_to_current_change` always
//! produces a value.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;

use crate::models::{Market, OddsSnapshot};

/// Max spread between the first same-direction moves of the contributing
/// books for a steam move to count as synchronized.
const STEAM_WINDOW_MINUTES: i64 = 30;

/// Minimum stretch of identical prices to call a market frozen.
const FREEZE_SPAN_MINUTES: i64 = 30;

// ---------------------------------------------------------------------------
// MoveDirection
// ---------------------------------------------------------------------------

/// Direction of an American-odds move from the bettor's point of view:
/// `Shorter` means the price moved toward the favorite (lower payout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Shorter,
    Longer,
    Flat,
}

impl MoveDirection {
    pub fn of_delta(delta: i64) -> Self {
        if delta < 0 {
            MoveDirection::Shorter
        } else if delta > 0 {
            MoveDirection::Longer
        } else {
            MoveDirection::Flat
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoveDirection::Shorter => "shorter",
            MoveDirection::Longer => "longer",
            MoveDirection::Flat => "flat",
        }
    }
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn sorted_for<'a>(
    snapshots: &'a [OddsSnapshot],
    market: Market,
    side: Option<&str>,
) -> Vec<&'a OddsSnapshot> {
    let mut snaps: Vec<&OddsSnapshot> = snapshots
        .iter()
        .filter(|s| s.market == market && side.map_or(true, |side| s.side == side))
        .collect();
    snaps.sort_by_key(|s| s.snapshot_time);
    snaps
}

// ---------------------------------------------------------------------------
// Steam move
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SteamMove {
    pub books_moved: Vec<String>,
    pub direction: MoveDirection,
    pub window_minutes: i64,
}

/// Detect a steam move: at least three distinct books whose first
/// same-direction price change lands inside a 30-minute window.
///
/// Per-book deltas are taken from consecutive same-bookmaker snapshots;
/// unchanged prices are ignored.
pub fn detect_steam_move(
    snapshots: &[OddsSnapshot],
    market: Market,
    side: &str,
) -> Option<SteamMove> {
    let snaps = sorted_for(snapshots, market, Some(side));
    if snaps.len() < 3 {
        return None;
    }

    let mut moves: HashMap<&str, Vec<(DateTime<Utc>, MoveDirection)>> = HashMap::new();
    for pair in snaps.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);
        if cur.bookmaker != prev.bookmaker {
            continue;
        }
        let delta = (cur.odds - prev.odds) as i64;
        if delta != 0 {
            moves
                .entry(cur.bookmaker.as_str())
                .or_default()
                .push((cur.snapshot_time, MoveDirection::of_delta(delta)));
        }
    }

    let window = Duration::minutes(STEAM_WINDOW_MINUTES);
    for direction in [MoveDirection::Shorter, MoveDirection::Longer] {
        let mut matching_books: Vec<&str> = Vec::new();
        let mut times: Vec<DateTime<Utc>> = Vec::new();
        for (book, events) in &moves {
            if let Some((t, _)) = events.iter().find(|(_, d)| *d == direction) {
                matching_books.push(*book);
                times.push(*t);
            }
        }
        if matching_books.len() >= 3 {
            let earliest = times.iter().min().copied()?;
            let latest = times.iter().max().copied()?;
            if latest - earliest <= window {
                let mut books: Vec<String> =
                    matching_books.iter().map(|b| b.to_string()).collect();
                books.sort();
                return Some(SteamMove {
                    books_moved: books,
                    direction,
                    window_minutes: STEAM_WINDOW_MINUTES,
                });
            }
        }
    }

    None
}

// ---------------------------------------------------------------------------
// Reverse line movement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReverseLineMovement {
    pub expected_direction: MoveDirection,
    pub actual_direction: MoveDirection,
}

/// Detect reverse line movement: the aggregate price moves against the
/// direction most individual books moved — a classic sharp-money proxy.
pub fn detect_reverse_line_movement(
    snapshots: &[OddsSnapshot],
    market: Market,
    side: &str,
) -> Option<ReverseLineMovement> {
    let snaps = sorted_for(snapshots, market, Some(side));
    if snaps.len() < 4 {
        return None;
    }

    let mut book_order: Vec<&str> = Vec::new();
    let mut by_book: HashMap<&str, Vec<&OddsSnapshot>> = HashMap::new();
    for s in &snaps {
        let entry = by_book.entry(s.bookmaker.as_str()).or_default();
        if entry.is_empty() {
            book_order.push(s.bookmaker.as_str());
        }
        entry.push(s);
    }

    let mut book_dirs: Vec<MoveDirection> = Vec::new();
    for book in &book_order {
        let items = &by_book[book];
        if items.len() < 2 {
            continue;
        }
        let delta = (items[items.len() - 1].odds - items[0].odds) as i64;
        if delta != 0 {
            book_dirs.push(MoveDirection::of_delta(delta));
        }
    }

    if book_dirs.len() < 2 {
        return None;
    }

    let shorter = book_dirs
        .iter()
        .filter(|d| **d == MoveDirection::Shorter)
        .count();
    let longer = book_dirs
        .iter()
        .filter(|d| **d == MoveDirection::Longer)
        .count();
    let expected = if shorter >= longer {
        MoveDirection::Shorter
    } else {
        MoveDirection::Longer
    };

    let book_count = book_order.len() as f64;
    let avg_open = book_order
        .iter()
        .map(|b| by_book[b][0].odds as f64)
        .sum::<f64>()
        / book_count;
    let avg_now = book_order
        .iter()
        .map(|b| by_book[b][by_book[b].len() - 1].odds as f64)
        .sum::<f64>()
        / book_count;
    // Sub-point average drift counts as flat.
    let actual = MoveDirection::of_delta((avg_now - avg_open) as i64);

    if expected != actual && actual != MoveDirection::Flat {
        return Some(ReverseLineMovement {
            expected_direction: expected,
            actual_direction: actual,
        });
    }
    None
}

// ---------------------------------------------------------------------------
// Line freeze
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct LineFreeze {
    pub frozen_minutes: i64,
}

/// Detect a frozen market: six or more snapshots spanning at least half
/// an hour with a single distinct price across the whole window.
pub fn detect_line_freeze(snapshots: &[OddsSnapshot], market: Market) -> Option<LineFreeze> {
    let snaps = sorted_for(snapshots, market, None);
    if snaps.len() < 6 {
        return None;
    }
    let minutes = (snaps[snaps.len() - 1].snapshot_time - snaps[0].snapshot_time).num_minutes();
    if minutes < FREEZE_SPAN_MINUTES {
        return None;
    }
    let first = snaps[0].odds;
    if snaps.iter().all(|s| s.odds == first) {
        return Some(LineFreeze {
            frozen_minutes: minutes,
        });
    }
    None
}

// ---------------------------------------------------------------------------
// Opening → current change
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct OpeningChange {
    pub opening_odds: i32,
    pub current_odds: i32,
    pub change: i32,
    pub direction: MoveDirection,
}

/// First-vs-last price delta. All zeros (and `Flat`) for empty input —
/// there is deliberately no null case here.
pub fn opening_to_current_change(
    snapshots: &[OddsSnapshot],
    market: Market,
    side: &str,
) -> OpeningChange {
    let snaps = sorted_for(snapshots, market, Some(side));
    let Some(first) = snaps.first() else {
        return OpeningChange {
            opening_odds: 0,
            current_odds: 0,
            change: 0,
            direction: MoveDirection::Flat,
        };
    };
    let last = snaps[snaps.len() - 1];
    let change = last.odds - first.odds;
    OpeningChange {
        opening_odds: first.odds,
        current_odds: last.odds,
        change,
        direction: MoveDirection::of_delta(change as i64),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
