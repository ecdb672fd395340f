//! Grading of settled games into pick and parlay outcomes.
//!
//! Graders are pure: (pick, final score) → outcome. Settlement walks
//! pending records, grades what it can, and leaves the rest pending —
//! a missing score or unresolvable side never fails the batch.

use std::collections::HashMap;

use metrics::counter;
use serde::Serialize;

use crate::analytics::odds_math::american_to_decimal;
use crate::models::{Game, Market, Parlay, Pick, PickOutcome};
use crate::normalize::{normalize_str, resolve_side, ResolvedSide};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettlementSummary {
    pub settled: usize,
    pub wins: usize,
    pub losses: usize,
    pub pushes: usize,
}

impl SettlementSummary {
    fn record(&mut self, outcome: PickOutcome) {
        match outcome {
            PickOutcome::Win => self.wins += 1,
            PickOutcome::Loss => self.losses += 1,
            PickOutcome::Push => self.pushes += 1,
            PickOutcome::Pending => return,
        }
        self.settled += 1;
    }
}

fn settle_h2h(pick: &Pick, game: &Game, home_score: i32, away_score: i32) -> PickOutcome {
    if home_score == away_score {
        return PickOutcome::Push;
    }
    let winner = if home_score > away_score {
        &game.home_team
    } else {
        &game.away_team
    };
    if normalize_str(&pick.side) == normalize_str(winner) {
        PickOutcome::Win
    } else {
        PickOutcome::Loss
    }
}

fn settle_spread(pick: &Pick, game: &Game, home_score: i32, away_score: i32) -> PickOutcome {
    let Some(line) = pick.line else {
        return PickOutcome::Pending;
    };
    let (own, opponent) = match resolve_side(&pick.side, &game.home_team, &game.away_team) {
        Some(ResolvedSide::Home) => (home_score, away_score),
        Some(ResolvedSide::Away) => (away_score, home_score),
        None => return PickOutcome::Pending,
    };
    let covered = own as f64 + line;
    let opponent = opponent as f64;
    if covered > opponent {
        PickOutcome::Win
    } else if covered < opponent {
        PickOutcome::Loss
    } else {
        PickOutcome::Push
    }
}

fn settle_total(pick: &Pick, home_score: i32, away_score: i32) -> PickOutcome {
    let Some(line) = pick.line else {
        return PickOutcome::Pending;
    };
    let total = (home_score + away_score) as f64;
    if (total - line).abs() < f64::EPSILON {
        return PickOutcome::Push;
    }
    match normalize_str(&pick.side).as_str() {
        "over" => {
            if total > line {
                PickOutcome::Win
            } else {
                PickOutcome::Loss
            }
        }
        "under" => {
            if total < line {
                PickOutcome::Win
            } else {
                PickOutcome::Loss
            }
        }
        _ => PickOutcome::Pending,
    }
}

/// Grade a single pick against its game's final score. `Pending` when
/// the game lacks a final score or the side cannot be resolved.
pub fn grade_pick(pick: &Pick, game: &Game) -> PickOutcome {
    let (Some(home_score), Some(away_score)) = (game.home_score, game.away_score) else {
        return PickOutcome::Pending;
    };
    if !game.completed {
        return PickOutcome::Pending;
    }
    match pick.market {
        Market::H2h => settle_h2h(pick, game, home_score, away_score),
        Market::Spreads => settle_spread(pick, game, home_score, away_score),
        Market::Totals => settle_total(pick, home_score, away_score),
    }
}

/// Settle every pending pick whose game has completed. Profit is quoted
/// in stake units: win pays `(decimal - 1) * stake`, loss costs the
/// stake, push returns it.
pub fn settle_picks(picks: &mut [Pick], games: &HashMap<i64, Game>) -> SettlementSummary {
    let mut summary = SettlementSummary::default();

    for pick in picks.iter_mut() {
        if pick.outcome.is_settled() {
            continue;
        }
        let Some(game) = games.get(&pick.game_id) else {
            continue;
        };
        let outcome = grade_pick(pick, game);
        if outcome == PickOutcome::Pending {
            continue;
        }

        let stake = pick.suggested_kelly_fraction;
        let profit = match outcome {
            PickOutcome::Win => match american_to_decimal(pick.odds_american) {
                Ok(dec) => (dec - 1.0) * stake,
                Err(e) => {
                    tracing::warn!(pick_id = %pick.id, error = %e, "Cannot price winning pick");
                    continue;
                }
            },
            PickOutcome::Loss => -stake,
            PickOutcome::Push => 0.0,
            PickOutcome::Pending => unreachable!(),
        };

        pick.outcome = outcome;
        pick.profit_loss = Some(profit);
        summary.record(outcome);

        tracing::info!(
            pick_id = %pick.id,
            game_id = pick.game_id,
            market = %pick.market,
            outcome = %outcome,
            profit,
            "Pick settled"
        );
    }

    counter!("picks_settled_total").increment(summary.settled as u64);
    summary
}

/// Settle parlays whose legs have all settled. Any pending leg defers
/// the parlay; all-push → push, any loss → loss, otherwise win.
pub fn settle_parlays(parlays: &mut [Parlay], picks: &[Pick]) -> SettlementSummary {
    let picks_by_id: HashMap<_, _> = picks.iter().map(|p| (p.id, p)).collect();
    let mut summary = SettlementSummary::default();

    for parlay in parlays.iter_mut() {
        if parlay.outcome.is_settled() {
            continue;
        }

        let mut leg_outcomes = Vec::with_capacity(parlay.legs.len());
        for leg in &parlay.legs {
            match picks_by_id.get(&leg.pick_id) {
                Some(pick) => leg_outcomes.push(pick.outcome),
                None => {
                    tracing::warn!(
                        parlay_id = %parlay.id,
                        pick_id = %leg.pick_id,
                        "Parlay leg references unknown pick"
                    );
                    leg_outcomes.push(PickOutcome::Pending);
                }
            }
        }
        if leg_outcomes.is_empty() || leg_outcomes.iter().any(|o| *o == PickOutcome::Pending) {
            continue;
        }

        for (leg, outcome) in parlay.legs.iter_mut().zip(&leg_outcomes) {
            leg.result = *outcome;
        }

        let stake = parlay.suggested_kelly_fraction;
        let (outcome, profit) = if leg_outcomes.iter().all(|o| *o == PickOutcome::Push) {
            (PickOutcome::Push, 0.0)
        } else if leg_outcomes.iter().any(|o| *o == PickOutcome::Loss) {
            (PickOutcome::Loss, -stake)
        } else {
            (PickOutcome::Win, (parlay.combined_odds_decimal - 1.0) * stake)
        };

        parlay.outcome = outcome;
        parlay.profit_loss = Some(profit);
        summary.record(outcome);

        tracing::info!(
            parlay_id = %parlay.id,
            risk_level = %parlay.risk_level,
            outcome = %outcome,
            profit,
            "Parlay settled"
        );
    }

    counter!("parlays_settled_total").increment(summary.settled as u64);
    summary
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfidenceTier, ProbSource};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn game(home_score: i32, away_score: i32) -> Game {
        Game {
            id: 1,
            external_id: "ext-1".into(),
            sport_key: "basketball_nba".into(),
            home_team: "Boston Celtics".into(),
            away_team: "Denver Nuggets".into(),
            commence_time: Utc.with_ymd_and_hms(2025, 11, 2, 23, 0, 0).unwrap(),
            home_score: Some(home_score),
            away_score: Some(away_score),
            completed: true,
        }
    }

    fn pick(market: Market, side: &str, line: Option<f64>) -> Pick {
        let now = Utc.with_ymd_and_hms(2025, 11, 2, 15, 0, 0).unwrap();
        Pick {
            id: Uuid::new_v4(),
            game_id: 1,
            sport_key: "basketball_nba".into(),
            pick_date: now,
            pick_day: now.date_naive(),
            market,
            side: side.into(),
            line,
            odds_american: -110,
            best_book: "draftkings".into(),
            fair_prob: 0.55,
            prob_source: ProbSource::Consensus,
            implied_prob: 0.5238,
            ev_pct: 0.05,
            edge: 0.03,
            composite_score: 0.6,
            confidence_tier: ConfidenceTier::Medium,
            signals: serde_json::Value::Null,
            data_quality: serde_json::Value::Null,
            suggested_kelly_fraction: 0.02,
            issued_at: now,
            outcome: PickOutcome::Pending,
            profit_loss: None,
            market_clv: None,
            book_clv: None,
            closing_odds_american: None,
            closing_snapshot_time: None,
        }
    }

    #[test]
    fn test_h2h_winner_and_loser() {
        let g = game(110, 98);
        assert_eq!(
            grade_pick(&pick(Market::H2h, "Boston Celtics", None), &g),
            PickOutcome::Win
        );
        assert_eq!(
            grade_pick(&pick(Market::H2h, "Denver Nuggets", None), &g),
            PickOutcome::Loss
        );
    }

    #[test]
    fn test_h2h_tie_is_push() {
        let g = game(100, 100);
        assert_eq!(
            grade_pick(&pick(Market::H2h, "Boston Celtics", None), &g),
            PickOutcome::Push
        );
    }

    #[test]
    fn test_spread_cover_and_push() {
        let g = game(110, 105);
        // Home -4.5 covers by half a point... 110 - 4.5 = 105.5 > 105.
        assert_eq!(
            grade_pick(&pick(Market::Spreads, "Boston Celtics", Some(-4.5)), &g),
            PickOutcome::Win
        );
        // Home -5 lands exactly: push.
        assert_eq!(
            grade_pick(&pick(Market::Spreads, "Boston Celtics", Some(-5.0)), &g),
            PickOutcome::Push
        );
        // Away +4.5 fails to cover.
        assert_eq!(
            grade_pick(&pick(Market::Spreads, "Denver Nuggets", Some(4.5)), &g),
            PickOutcome::Loss
        );
    }

    #[test]
    fn test_spread_without_line_stays_pending() {
        let g = game(110, 105);
        assert_eq!(
            grade_pick(&pick(Market::Spreads, "Boston Celtics", None), &g),
            PickOutcome::Pending
        );
    }

    #[test]
    fn test_totals_over_under_push() {
        let g = game(110, 105);
        assert_eq!(
            grade_pick(&pick(Market::Totals, "over", Some(210.5)), &g),
            PickOutcome::Win
        );
        assert_eq!(
            grade_pick(&pick(Market::Totals, "under", Some(210.5)), &g),
            PickOutcome::Loss
        );
        assert_eq!(
            grade_pick(&pick(Market::Totals, "over", Some(215.0)), &g),
            PickOutcome::Push
        );
    }

    #[test]
    fn test_unresolvable_side_stays_pending() {
        let g = game(110, 105);
        assert_eq!(
            grade_pick(&pick(Market::Spreads, "Chicago Bulls", Some(-3.0)), &g),
            PickOutcome::Pending
        );
    }

    #[test]
    fn test_incomplete_game_stays_pending() {
        let mut g = game(110, 105);
        g.completed = false;
        assert_eq!(
            grade_pick(&pick(Market::H2h, "Boston Celtics", None), &g),
            PickOutcome::Pending
        );
    }

    #[test]
    fn test_settle_picks_assigns_profit() {
        let g = game(110, 98);
        let games: HashMap<i64, Game> = [(1, g)].into();
        let mut picks = vec![
            pick(Market::H2h, "Boston Celtics", None),
            pick(Market::H2h, "Denver Nuggets", None),
        ];

        let summary = settle_picks(&mut picks, &games);
        assert_eq!(summary.settled, 2);
        assert_eq!(summary.wins, 1);
        assert_eq!(summary.losses, 1);

        // Win at -110 with 0.02 staked: (1.909… - 1) * 0.02.
        let win_profit = picks[0].profit_loss.unwrap();
        assert!((win_profit - 0.01818181818).abs() < 1e-6);
        assert!((picks[1].profit_loss.unwrap() + 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_settle_parlays_from_leg_outcomes() {
        let mut win_leg = pick(Market::H2h, "Boston Celtics", None);
        win_leg.outcome = PickOutcome::Win;
        let mut push_leg = pick(Market::Totals, "over", Some(210.0));
        push_leg.outcome = PickOutcome::Push;
        let mut loss_leg = pick(Market::H2h, "Denver Nuggets", None);
        loss_leg.outcome = PickOutcome::Loss;
        let mut pending_leg = pick(Market::Totals, "under", Some(215.0));
        pending_leg.outcome = PickOutcome::Pending;

        let make_parlay = |ids: &[Uuid]| Parlay {
            id: Uuid::new_v4(),
            risk_level: crate::models::RiskLevel::Conservative,
            num_legs: ids.len() as u32,
            combined_odds_american: 264,
            combined_odds_decimal: 3.64,
            combined_ev_pct: 0.1,
            combined_fair_prob: 0.3,
            correlation_score: 0.02,
            suggested_kelly_fraction: 0.05,
            pick_date: win_leg.pick_day,
            outcome: PickOutcome::Pending,
            profit_loss: None,
            legs: ids
                .iter()
                .enumerate()
                .map(|(i, id)| crate::models::ParlayLeg {
                    pick_id: *id,
                    leg_order: i as u32 + 1,
                    result: PickOutcome::Pending,
                })
                .collect(),
        };

        let picks = vec![
            win_leg.clone(),
            push_leg.clone(),
            loss_leg.clone(),
            pending_leg.clone(),
        ];
        let mut parlays = vec![
            make_parlay(&[win_leg.id, push_leg.id]),     // win (push ignored)
            make_parlay(&[win_leg.id, loss_leg.id]),     // loss
            make_parlay(&[push_leg.id]),                 // all-push
            make_parlay(&[win_leg.id, pending_leg.id]),  // stays pending
        ];

        let summary = settle_parlays(&mut parlays, &picks);
        assert_eq!(summary.settled, 3);
        assert_eq!(summary.wins, 1);
        assert_eq!(summary.losses, 1);
        assert_eq!(summary.pushes, 1);

        assert_eq!(parlays[0].outcome, PickOutcome::Win);
        assert!((parlays[0].profit_loss.unwrap() - (3.64 - 1.0) * 0.05).abs() < 1e-12);
        assert_eq!(parlays[1].outcome, PickOutcome::Loss);
        assert!((parlays[1].profit_loss.unwrap() + 0.05).abs() < 1e-12);
        assert_eq!(parlays[2].outcome, PickOutcome::Push);
        assert_eq!(parlays[3].outcome, PickOutcome::Pending);

        // Leg results mirror the pick outcomes.
        assert_eq!(parlays[0].legs[1].result, PickOutcome::Push);
    }
}
