pub mod parlays;
pub mod picks;

pub use parlays::{
    build_custom_parlay, build_parlays_for_risk_level, generate_daily_parlays, CustomParlayReport,
    ParlayCandidate, RiskConfig,
};
pub use picks::{generate_daily_picks, merge_picks};
