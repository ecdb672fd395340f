pub mod compatibility;
pub mod confidence;
pub mod consensus;
pub mod correlation;
pub mod data_quality;
pub mod ev;
pub mod line_movement;
pub mod odds_math;
pub mod signals;

pub use compatibility::{check_compatibility, CompatibilityResult, Incompatibility};
pub use confidence::assign_confidence;
pub use consensus::{calculate_consensus, SideConsensus};
pub use correlation::{adjusted_joint_probability, estimate_correlation};
pub use data_quality::{assess_game_quality, DataQuality, SHARP_BOOKS};
pub use ev::{calculate_pick_ev, PickEv};
pub use line_movement::{
    detect_line_freeze, detect_reverse_line_movement, detect_steam_move,
    opening_to_current_change, LineFreeze, MoveDirection, OpeningChange, ReverseLineMovement,
    SteamMove,
};
pub use odds_math::OddsError;
pub use signals::{score_signals, SignalBreakdown};
