//! Aggregate performance reporting over settled picks.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{ConfidenceTier, Pick, PickOutcome};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceBucket {
    pub picks: usize,
    pub wins: usize,
    pub losses: usize,
    pub roi_pct: f64,
    pub avg_clv: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSummary {
    pub total_picks: usize,
    pub settled_picks: usize,
    pub pending_picks: usize,
    pub wins: usize,
    pub losses: usize,
    pub pushes: usize,
    pub win_rate: f64,
    pub roi_pct: f64,
    pub total_profit_units: f64,
    pub avg_ev_pct: f64,
    pub avg_market_clv: f64,
    pub avg_book_clv: f64,
    pub avg_odds_american: f64,
    pub high_confidence: PerformanceBucket,
    pub medium_confidence: PerformanceBucket,
    pub low_confidence: PerformanceBucket,
    pub by_sport: BTreeMap<String, PerformanceBucket>,
    pub by_market: BTreeMap<String, PerformanceBucket>,
}

fn bucket_by<F>(settled: &[&Pick], key_of: F) -> BTreeMap<String, PerformanceBucket>
where
    F: Fn(&Pick) -> String,
{
    let mut out: BTreeMap<String, PerformanceBucket> = BTreeMap::new();
    let mut profit: BTreeMap<String, f64> = BTreeMap::new();
    let mut wagered: BTreeMap<String, f64> = BTreeMap::new();
    let mut clvs: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for pick in settled {
        let key = key_of(pick);
        let bucket = out.entry(key.clone()).or_default();
        bucket.picks += 1;
        match pick.outcome {
            PickOutcome::Win => bucket.wins += 1,
            PickOutcome::Loss => bucket.losses += 1,
            _ => {}
        }
        *profit.entry(key.clone()).or_default() += pick.profit_loss.unwrap_or(0.0);
        *wagered.entry(key.clone()).or_default() += pick.suggested_kelly_fraction;
        if let Some(clv) = pick.market_clv {
            clvs.entry(key).or_default().push(clv);
        }
    }

    for (key, bucket) in out.iter_mut() {
        let staked = wagered.get(key).copied().unwrap_or(0.0);
        bucket.roi_pct = if staked > 0.0 {
            profit.get(key).copied().unwrap_or(0.0) / staked * 100.0
        } else {
            0.0
        };
        bucket.avg_clv = clvs
            .get(key)
            .filter(|v| !v.is_empty())
            .map(|v| v.iter().sum::<f64>() / v.len() as f64)
            .unwrap_or(0.0);
    }

    out
}

fn mean_of(values: impl Iterator<Item = f64>) -> f64 {
    let collected: Vec<f64> = values.collect();
    if collected.is_empty() {
        0.0
    } else {
        collected.iter().sum::<f64>() / collected.len() as f64
    }
}

/// Summarize hit rate, ROI and CLV over a pick set, broken out by
/// confidence tier, sport and market.
pub fn performance_summary(picks: &[Pick]) -> PerformanceSummary {
    let settled: Vec<&Pick> = picks.iter().filter(|p| p.outcome.is_settled()).collect();
    let wins = settled.iter().filter(|p| p.outcome == PickOutcome::Win).count();
    let losses = settled.iter().filter(|p| p.outcome == PickOutcome::Loss).count();
    let pushes = settled.iter().filter(|p| p.outcome == PickOutcome::Push).count();

    let total_profit: f64 = settled.iter().filter_map(|p| p.profit_loss).sum();
    let total_wagered: f64 = settled.iter().map(|p| p.suggested_kelly_fraction).sum();
    let win_rate = if wins + losses > 0 {
        wins as f64 / (wins + losses) as f64
    } else {
        0.0
    };

    let tier_buckets = bucket_by(&settled, |p| p.confidence_tier.as_str().to_string());
    let tier = |t: ConfidenceTier| tier_buckets.get(t.as_str()).cloned().unwrap_or_default();

    PerformanceSummary {
        total_picks: picks.len(),
        settled_picks: settled.len(),
        pending_picks: picks.len() - settled.len(),
        wins,
        losses,
        pushes,
        win_rate,
        roi_pct: if total_wagered > 0.0 {
            total_profit / total_wagered * 100.0
        } else {
            0.0
        },
        total_profit_units: total_profit,
        avg_ev_pct: mean_of(picks.iter().map(|p| p.ev_pct)),
        avg_market_clv: mean_of(settled.iter().filter_map(|p| p.market_clv)),
        avg_book_clv: mean_of(settled.iter().filter_map(|p| p.book_clv)),
        avg_odds_american: mean_of(picks.iter().map(|p| p.odds_american as f64)),
        high_confidence: tier(ConfidenceTier::High),
        medium_confidence: tier(ConfidenceTier::Medium),
        low_confidence: tier(ConfidenceTier::Low),
        by_sport: bucket_by(&settled, |p| p.sport_key.clone()),
        by_market: bucket_by(&settled, |p| p.market.as_str().to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Market, ProbSource};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn pick(
        tier: ConfidenceTier,
        outcome: PickOutcome,
        profit: Option<f64>,
        market: Market,
        clv: Option<f64>,
    ) -> Pick {
        let now = Utc.with_ymd_and_hms(2025, 11, 2, 15, 0, 0).unwrap();
        Pick {
            id: Uuid::new_v4(),
            game_id: 1,
            sport_key: "basketball_nba".into(),
            pick_date: now,
            pick_day: now.date_naive(),
            market,
            side: "Boston Celtics".into(),
            line: None,
            odds_american: -110,
            best_book: "draftkings".into(),
            fair_prob: 0.55,
            prob_source: ProbSource::Consensus,
            implied_prob: 0.5238,
            ev_pct: 0.04,
            edge: 0.03,
            composite_score: 0.6,
            confidence_tier: tier,
            signals: serde_json::Value::Null,
            data_quality: serde_json::Value::Null,
            suggested_kelly_fraction: 0.02,
            issued_at: now,
            outcome,
            profit_loss: profit,
            market_clv: clv,
            book_clv: None,
            closing_odds_american: None,
            closing_snapshot_time: None,
        }
    }

    #[test]
    fn test_summary_counts_and_rates() {
        let picks = vec![
            pick(ConfidenceTier::High, PickOutcome::Win, Some(0.018), Market::H2h, Some(0.02)),
            pick(ConfidenceTier::High, PickOutcome::Loss, Some(-0.02), Market::H2h, Some(-0.01)),
            pick(ConfidenceTier::Medium, PickOutcome::Push, Some(0.0), Market::Totals, None),
            pick(ConfidenceTier::Low, PickOutcome::Pending, None, Market::Spreads, None),
        ];

        let summary = performance_summary(&picks);
        assert_eq!(summary.total_picks, 4);
        assert_eq!(summary.settled_picks, 3);
        assert_eq!(summary.pending_picks, 1);
        assert_eq!(summary.wins, 1);
        assert_eq!(summary.losses, 1);
        assert_eq!(summary.pushes, 1);
        assert!((summary.win_rate - 0.5).abs() < 1e-9);
        // Profit -0.002 over 0.06 wagered.
        assert!((summary.total_profit_units - (-0.002)).abs() < 1e-9);
        assert!((summary.roi_pct - (-0.002 / 0.06 * 100.0)).abs() < 1e-9);
        assert!((summary.avg_market_clv - 0.005).abs() < 1e-9);
    }

    #[test]
    fn test_tier_and_market_buckets() {
        let picks = vec![
            pick(ConfidenceTier::High, PickOutcome::Win, Some(0.018), Market::H2h, Some(0.02)),
            pick(ConfidenceTier::High, PickOutcome::Loss, Some(-0.02), Market::H2h, None),
            pick(ConfidenceTier::Medium, PickOutcome::Win, Some(0.018), Market::Totals, None),
        ];

        let summary = performance_summary(&picks);
        assert_eq!(summary.high_confidence.picks, 2);
        assert_eq!(summary.high_confidence.wins, 1);
        assert_eq!(summary.high_confidence.losses, 1);
        assert!((summary.high_confidence.avg_clv - 0.02).abs() < 1e-9);
        assert_eq!(summary.medium_confidence.picks, 1);
        assert_eq!(summary.low_confidence, PerformanceBucket::default());

        assert_eq!(summary.by_market["h2h"].picks, 2);
        assert_eq!(summary.by_market["totals"].picks, 1);
        assert_eq!(summary.by_sport["basketball_nba"].picks, 3);
    }

    #[test]
    fn test_empty_input() {
        let summary = performance_summary(&[]);
        assert_eq!(summary.total_picks, 0);
        assert!((summary.win_rate - 0.0).abs() < 1e-9);
        assert!((summary.roi_pct - 0.0).abs() < 1e-9);
    }
}
