use rust_decimal::Decimal;
use std::env;

/// Tunables for pick and parlay generation.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Global cap on picks per day, taken by EV across all games. A busy
    /// slate crowds out lower-EV games entirely.
    pub max_daily_picks: usize,
    /// Games starting within this many hours are eligible.
    pub game_window_hours: i64,
    /// Fractional Kelly applied to single picks.
    pub pick_kelly_fraction: f64,
    /// Fractional Kelly applied to parlays.
    pub parlay_kelly_fraction: f64,
    /// Parlays kept per risk tier after ranking.
    pub max_parlays_per_tier: usize,
    /// Bankroll the staking suggestions are quoted against.
    pub starting_bankroll: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_daily_picks: 10,
            game_window_hours: 24,
            pick_kelly_fraction: 0.25,
            parlay_kelly_fraction: 0.15,
            max_parlays_per_tier: 3,
            starting_bankroll: Decimal::from(1_000),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_daily_picks: env::var("MAX_DAILY_PICKS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_daily_picks),
            game_window_hours: env::var("GAME_WINDOW_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.game_window_hours),
            pick_kelly_fraction: env::var("PICK_KELLY_FRACTION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.pick_kelly_fraction),
            parlay_kelly_fraction: env::var("PARLAY_KELLY_FRACTION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.parlay_kelly_fraction),
            max_parlays_per_tier: env::var("MAX_PARLAYS_PER_TIER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_parlays_per_tier),
            starting_bankroll: env::var("STARTING_BANKROLL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.starting_bankroll),
        }
    }
}
