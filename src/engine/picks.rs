//! Daily pick generation.
//!
//! One cycle walks every eligible game, runs the analytics stack per
//! market and side, and keeps the globally best candidates by EV. The
//! pass is a pure function of (games, snapshots, probability source,
//! now): re-running with the same inputs reproduces the same picks,
//! modulo the documented best-price tie-break in consensus.

use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use metrics::{counter, gauge, histogram};
use uuid::Uuid;

use crate::analytics::confidence::assign_confidence;
use crate::analytics::consensus::calculate_consensus;
use crate::analytics::data_quality::assess_game_quality;
use crate::analytics::ev::calculate_pick_ev;
use crate::analytics::line_movement::{
    detect_reverse_line_movement, detect_steam_move, opening_to_current_change,
};
use crate::analytics::odds_math::kelly_criterion;
use crate::analytics::signals::score_signals;
use crate::config::EngineConfig;
use crate::models::{ConfidenceTier, Game, Market, OddsSnapshot, Pick, PickOutcome, ProbSource};
use crate::providers::{ProbabilitySource, SnapshotProvider};

/// Generate the day's picks across all games starting inside the
/// configured window. Candidates surviving the confidence filter are
/// ranked by EV and capped globally — a busy slate crowds out lower-EV
/// games entirely.
pub async fn generate_daily_picks(
    games: &[Game],
    snapshots: &dyn SnapshotProvider,
    prob_source: &dyn ProbabilitySource,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> anyhow::Result<Vec<Pick>> {
    let start = Instant::now();
    let window_end = now + Duration::hours(config.game_window_hours);

    let mut eligible: Vec<&Game> = games
        .iter()
        .filter(|g| g.commence_time >= now && g.commence_time <= window_end)
        .collect();
    eligible.sort_by_key(|g| g.commence_time);
    gauge!("eligible_games").set(eligible.len() as f64);

    if eligible.is_empty() {
        tracing::info!("No games inside the generation window");
        return Ok(Vec::new());
    }

    let today_start = day_start(now);
    let mut generated: Vec<Pick> = Vec::new();

    for game in eligible {
        let game_snapshots = snapshots.snapshots_for_game(game.id).await?;
        if game_snapshots.is_empty() {
            tracing::debug!(game_id = game.id, "No snapshots — skipping game");
            continue;
        }

        let data_quality = assess_game_quality(&game_snapshots, now);

        for market in Market::ALL {
            for side_consensus in calculate_consensus(&game_snapshots, market) {
                let side = side_consensus.side.as_str();
                let line = latest_line(&game_snapshots, market, side);

                let model_prob = prob_source
                    .get_true_prob(&game.sport_key, game, market, side, line)
                    .await?;
                let (fair_prob, prob_source_kind) = match model_prob {
                    Some(p) => (p, ProbSource::Model),
                    None => (side_consensus.fair_prob, ProbSource::Consensus),
                };

                let ev = match calculate_pick_ev(fair_prob, side_consensus.best_odds) {
                    Ok(ev) => ev,
                    Err(e) => {
                        tracing::warn!(
                            game_id = game.id,
                            market = %market,
                            side = %side,
                            error = %e,
                            "EV calculation failed — skipping side"
                        );
                        continue;
                    }
                };

                let steam = detect_steam_move(&game_snapshots, market, side);
                let rlm = detect_reverse_line_movement(&game_snapshots, market, side);
                let change = opening_to_current_change(&game_snapshots, market, side);

                let signals = score_signals(
                    ev.ev_pct,
                    steam.as_ref(),
                    rlm.as_ref(),
                    change.opening_odds,
                    change.current_odds,
                    side_consensus.is_outlier,
                    &data_quality,
                );

                let tier = assign_confidence(
                    signals.composite,
                    ev.ev_pct,
                    signals.signals_firing(),
                    &data_quality,
                );
                if tier == ConfidenceTier::Filtered {
                    counter!("picks_filtered_total").increment(1);
                    tracing::debug!(
                        game_id = game.id,
                        market = %market,
                        side = %side,
                        composite = signals.composite,
                        ev_pct = ev.ev_pct,
                        "Candidate filtered"
                    );
                    continue;
                }

                let kelly = match kelly_criterion(
                    fair_prob,
                    ev.best_odds_decimal,
                    config.pick_kelly_fraction,
                ) {
                    Ok(k) => k,
                    Err(e) => {
                        tracing::warn!(
                            game_id = game.id,
                            market = %market,
                            side = %side,
                            fair_prob,
                            error = %e,
                            "Kelly sizing failed — skipping side"
                        );
                        continue;
                    }
                };

                tracing::info!(
                    game_id = game.id,
                    market = %market,
                    side = %side,
                    ev_pct = ev.ev_pct,
                    tier = %tier,
                    best_book = side_consensus.best_book.as_deref().unwrap_or("unknown"),
                    "Pick candidate accepted"
                );

                generated.push(Pick {
                    id: Uuid::new_v4(),
                    game_id: game.id,
                    sport_key: game.sport_key.clone(),
                    pick_date: today_start,
                    pick_day: today_start.date_naive(),
                    market,
                    side: side.to_string(),
                    line,
                    odds_american: side_consensus.best_odds,
                    best_book: side_consensus
                        .best_book
                        .clone()
                        .unwrap_or_else(|| "unknown".to_string()),
                    fair_prob,
                    prob_source: prob_source_kind,
                    implied_prob: ev.implied_prob_at_best_odds,
                    ev_pct: ev.ev_pct,
                    edge: ev.edge,
                    composite_score: signals.composite,
                    confidence_tier: tier,
                    signals: signals.to_json(),
                    data_quality: serde_json::to_value(&data_quality)
                        .unwrap_or(serde_json::Value::Null),
                    suggested_kelly_fraction: kelly,
                    issued_at: now,
                    outcome: PickOutcome::Pending,
                    profit_loss: None,
                    market_clv: None,
                    book_clv: None,
                    closing_odds_american: None,
                    closing_snapshot_time: None,
                });
            }
        }
    }

    generated.sort_by(|a, b| {
        b.ev_pct
            .partial_cmp(&a.ev_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    generated.truncate(config.max_daily_picks);

    counter!("picks_generated_total").increment(generated.len() as u64);
    histogram!("pick_generation_seconds").record(start.elapsed().as_secs_f64());
    tracing::info!(count = generated.len(), "Pick generation cycle complete");

    Ok(generated)
}

/// Merge freshly generated candidates into the existing day's picks.
///
/// Regeneration replaces the day wholesale, but a candidate that matches
/// an existing pick on (game, market, side, day) keeps the existing
/// identity, issue time and any later-lifecycle fields (settlement,
/// CLV) — those are owned by other passes, not by regeneration.
pub fn merge_picks(existing: Vec<Pick>, fresh: Vec<Pick>) -> Vec<Pick> {
    let mut index: HashMap<(i64, Market, String, chrono::NaiveDate), Pick> = existing
        .into_iter()
        .map(|p| ((p.game_id, p.market, p.side.clone(), p.pick_day), p))
        .collect();

    fresh
        .into_iter()
        .map(|mut candidate| {
            let key = (
                candidate.game_id,
                candidate.market,
                candidate.side.clone(),
                candidate.pick_day,
            );
            if let Some(prior) = index.remove(&key) {
                candidate.id = prior.id;
                candidate.issued_at = prior.issued_at;
                candidate.outcome = prior.outcome;
                candidate.profit_loss = prior.profit_loss;
                candidate.market_clv = prior.market_clv;
                candidate.book_clv = prior.book_clv;
                candidate.closing_odds_american = prior.closing_odds_american;
                candidate.closing_snapshot_time = prior.closing_snapshot_time;
            }
            candidate
        })
        .collect()
}

fn day_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

fn latest_line(snapshots: &[OddsSnapshot], market: Market, side: &str) -> Option<f64> {
    snapshots
        .iter()
        .filter(|s| s.market == market && s.side == side)
        .max_by_key(|s| s.snapshot_time)
        .and_then(|s| s.line)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn pick(game_id: i64, side: &str, ev: f64) -> Pick {
        let now = Utc.with_ymd_and_hms(2025, 11, 2, 15, 0, 0).unwrap();
        Pick {
            id: Uuid::new_v4(),
            game_id,
            sport_key: "basketball_nba".into(),
            pick_date: day_start(now),
            pick_day: now.date_naive(),
            market: Market::H2h,
            side: side.into(),
            line: None,
            odds_american: -110,
            best_book: "draftkings".into(),
            fair_prob: 0.55,
            prob_source: ProbSource::Consensus,
            implied_prob: 0.5238,
            ev_pct: ev,
            edge: 0.03,
            composite_score: 0.5,
            confidence_tier: ConfidenceTier::Medium,
            signals: serde_json::Value::Null,
            data_quality: serde_json::Value::Null,
            suggested_kelly_fraction: 0.01,
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
    fn test_merge_preserves_identity_and_lifecycle() {
        let mut original = pick(1, "home", 0.05);
        original.outcome = PickOutcome::Win;
        original.profit_loss = Some(0.02);
        let original_id = original.id;
        let original_issued = original.issued_at;

        let mut regenerated = pick(1, "home", 0.07);
        regenerated.issued_at = original.issued_at + Duration::hours(2);

        let merged = merge_picks(vec![original], vec![regenerated]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, original_id);
        assert_eq!(merged[0].issued_at, original_issued);
        assert_eq!(merged[0].outcome, PickOutcome::Win);
        assert_eq!(merged[0].profit_loss, Some(0.02));
        // Analytics fields come from the fresh candidate.
        assert!((merged[0].ev_pct - 0.07).abs() < 1e-9);
    }

    #[test]
    fn test_merge_drops_stale_picks() {
        let stale = pick(1, "home", 0.05);
        let fresh_other = pick(2, "away", 0.04);
        let merged = merge_picks(vec![stale], vec![fresh_other.clone()]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, fresh_other.id);
    }

    #[test]
    fn test_merge_new_candidates_keep_their_identity() {
        let fresh = pick(3, "home", 0.06);
        let id = fresh.id;
        let merged = merge_picks(Vec::new(), vec![fresh]);
        assert_eq!(merged[0].id, id);
    }
}
