use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A sporting event. Created on first odds sighting; scores are filled in
/// by the settlement collaborator once the event completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: i64,
    pub external_id: String,
    pub sport_key: String,
    pub home_team: String,
    pub away_team: String,
    pub commence_time: DateTime<Utc>,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub completed: bool,
}

impl Game {
    /// True once both final scores are known.
    pub fn has_final_score(&self) -> bool {
        self.completed && self.home_score.is_some() && self.away_score.is_some()
    }
}
