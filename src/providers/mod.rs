//! Capability boundaries the engine consumes.
//!
//! The analytics core is pure computation; these traits are the only
//! await points. The integrating service backs them with its store and
//! (optionally) a trained model; tests back them with in-memory fixtures.

pub mod memory;

use async_trait::async_trait;

use crate::models::{Game, Market, OddsSnapshot};

pub use memory::InMemorySnapshotStore;

/// Yields every odds snapshot recorded for a game.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// All snapshots for the game, sorted ascending by capture time.
    async fn snapshots_for_game(&self, game_id: i64) -> anyhow::Result<Vec<OddsSnapshot>>;
}

/// Pluggable source of a "true" win probability for one outcome.
///
/// Returning `Ok(None)` means the source has no opinion for this
/// (sport, market, side); the engine then falls back to consensus
/// pricing. Implementations must never treat a missing opinion as an
/// error.
#[async_trait]
pub trait ProbabilitySource: Send + Sync {
    async fn get_true_prob(
        &self,
        sport_key: &str,
        game: &Game,
        market: Market,
        side: &str,
        line: Option<f64>,
    ) -> anyhow::Result<Option<f64>>;
}

/// The consensus-only probability source: never has an opinion, so every
/// pick prices off the weighted book consensus.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsensusOnly;

#[async_trait]
impl ProbabilitySource for ConsensusOnly {
    async fn get_true_prob(
        &self,
        _sport_key: &str,
        _game: &Game,
        _market: Market,
        _side: &str,
        _line: Option<f64>,
    ) -> anyhow::Result<Option<f64>> {
        Ok(None)
    }
}
