use std::collections::HashMap;

use async_trait::async_trait;

use super::SnapshotProvider;
use crate::models::OddsSnapshot;

/// In-memory snapshot store. Deduplicates on the minute-rounded key the
/// way the persistent store's uniqueness constraint would, and hands
/// snapshots back sorted by capture time.
#[derive(Debug, Default, Clone)]
pub struct InMemorySnapshotStore {
    by_game: HashMap<i64, Vec<OddsSnapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a snapshot; a second snapshot for the same
    /// (game, bookmaker, market, side, minute) is dropped.
    pub fn insert(&mut self, snapshot: OddsSnapshot) -> bool {
        let rows = self.by_game.entry(snapshot.game_id).or_default();
        if rows
            .iter()
            .any(|existing| existing.dedup_key() == snapshot.dedup_key())
        {
            return false;
        }
        rows.push(snapshot);
        true
    }

    pub fn extend(&mut self, snapshots: impl IntoIterator<Item = OddsSnapshot>) {
        for snapshot in snapshots {
            self.insert(snapshot);
        }
    }

    /// Mutable access for closing-line capture.
    pub fn snapshots_mut(&mut self, game_id: i64) -> Option<&mut Vec<OddsSnapshot>> {
        self.by_game.get_mut(&game_id)
    }

    pub fn len(&self) -> usize {
        self.by_game.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_game.is_empty()
    }
}

#[async_trait]
impl SnapshotProvider for InMemorySnapshotStore {
    async fn snapshots_for_game(&self, game_id: i64) -> anyhow::Result<Vec<OddsSnapshot>> {
        let mut rows = self.by_game.get(&game_id).cloned().unwrap_or_default();
        rows.sort_by_key(|s| s.snapshot_time);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Market;
    use chrono::{Duration, TimeZone, Utc};

    fn snap(minute: i64, second: u32) -> OddsSnapshot {
        let ts = Utc.with_ymd_and_hms(2025, 11, 2, 12, 0, second).unwrap()
            + Duration::minutes(minute);
        OddsSnapshot {
            game_id: 7,
            sport_key: "basketball_nba".into(),
            bookmaker: "draftkings".into(),
            market: Market::H2h,
            side: "home".into(),
            line: None,
            odds: -110,
            implied_prob: 0.52,
            no_vig_prob: 0.50,
            commence_time: Utc.with_ymd_and_hms(2025, 11, 2, 23, 0, 0).unwrap(),
            snapshot_time: ts,
            snapshot_time_rounded: OddsSnapshot::round_to_minute(ts),
            is_closing: false,
        }
    }

    #[tokio::test]
    async fn test_same_minute_duplicate_dropped() {
        let mut store = InMemorySnapshotStore::new();
        assert!(store.insert(snap(0, 10)));
        // Same book/market/side/minute, different second.
        assert!(!store.insert(snap(0, 40)));
        assert!(store.insert(snap(1, 0)));

        let rows = store.snapshots_for_game(7).await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_rows_sorted_by_capture_time() {
        let mut store = InMemorySnapshotStore::new();
        store.insert(snap(5, 0));
        store.insert(snap(1, 0));
        store.insert(snap(3, 0));

        let rows = store.snapshots_for_game(7).await.unwrap();
        let times: Vec<_> = rows.iter().map(|s| s.snapshot_time).collect();
        let mut sorted = times.clone();
        sorted.sort();
        assert_eq!(times, sorted);
    }
}
