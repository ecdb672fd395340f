pub mod game;
pub mod parlay;
pub mod pick;
pub mod snapshot;

pub use game::Game;
pub use parlay::{Parlay, ParlayLeg, RiskLevel};
pub use pick::{ConfidenceTier, LegKey, Pick, PickOutcome, ProbSource};
pub use snapshot::{Market, OddsSnapshot};
