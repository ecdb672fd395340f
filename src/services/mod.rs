pub mod bankroll;
pub mod clv;
pub mod performance;
pub mod settlement;

pub use bankroll::{bankroll_history, bankroll_summary, kelly_suggestions, BankrollSummary};
pub use clv::{apply_clv, calculate_clv_for_pick, mark_closing_lines, ClvUpdate};
pub use performance::{performance_summary, PerformanceSummary};
pub use settlement::{grade_pick, settle_parlays, settle_picks, SettlementSummary};
