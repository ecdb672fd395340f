//! Parlay candidate search and the ad-hoc custom parlay builder.
//!
//! Per risk tier: filter picks by confidence, rank by EV, then combine a
//! greedy seed with exhaustive enumeration for small leg counts. Joint
//! probability folds each leg against the first leg's correlation — a
//! deliberate approximation kept for continuity, not full pairwise
//! joint modeling.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use itertools::Itertools;
use metrics::counter;
use serde::Serialize;
use uuid::Uuid;

use crate::analytics::compatibility::check_compatibility;
use crate::analytics::correlation::{adjusted_joint_probability, estimate_correlation};
use crate::analytics::odds_math::{
    american_to_decimal, calculate_ev, calculate_parlay_odds, decimal_to_american,
    kelly_criterion,
};
use crate::config::EngineConfig;
use crate::models::{ConfidenceTier, Parlay, ParlayLeg, Pick, PickOutcome, RiskLevel};

/// Pairwise correlation above which the custom builder attaches a
/// warning to an otherwise-accepted pair.
const CUSTOM_WARNING_CORRELATION: f64 = 0.40;

// ---------------------------------------------------------------------------
// Risk tier configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RiskConfig {
    pub min_legs: usize,
    pub max_legs: usize,
    pub allowed_confidence: &'static [ConfidenceTier],
    pub min_combined_odds_american: i32,
    pub max_combined_odds_american: i32,
    pub max_correlation: f64,
}

impl RiskConfig {
    pub fn for_level(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Conservative => Self {
                min_legs: 2,
                max_legs: 3,
                allowed_confidence: &[ConfidenceTier::High],
                min_combined_odds_american: 150,
                max_combined_odds_american: 300,
                max_correlation: level.correlation_ceiling(),
            },
            RiskLevel::Moderate => Self {
                min_legs: 3,
                max_legs: 4,
                allowed_confidence: &[ConfidenceTier::High, ConfidenceTier::Medium],
                min_combined_odds_american: 300,
                max_combined_odds_american: 800,
                max_correlation: level.correlation_ceiling(),
            },
            RiskLevel::Aggressive => Self {
                min_legs: 4,
                max_legs: 6,
                allowed_confidence: &[
                    ConfidenceTier::High,
                    ConfidenceTier::Medium,
                    ConfidenceTier::Low,
                ],
                min_combined_odds_american: 800,
                max_combined_odds_american: 2500,
                max_correlation: level.correlation_ceiling(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ParlayCandidate {
    pub legs: Vec<Pick>,
    pub num_legs: usize,
    pub combined_fair_prob: f64,
    pub combined_odds_decimal: f64,
    pub combined_odds_american: i32,
    pub combined_ev_pct: f64,
    /// Average pairwise correlation across all leg pairs.
    pub correlation_score: f64,
    pub risk_level: RiskLevel,
    pub suggested_kelly_fraction: f64,
}

fn avg_pairwise_correlation(legs: &[Pick]) -> f64 {
    let pairs: Vec<f64> = legs
        .iter()
        .tuple_combinations()
        .map(|(a, b)| estimate_correlation(&a.leg_key(), &b.leg_key()))
        .collect();
    if pairs.is_empty() {
        0.0
    } else {
        pairs.iter().sum::<f64>() / pairs.len() as f64
    }
}

/// Sequential joint probability: each leg is folded in against its
/// correlation with the *first* leg only.
fn joint_probability(legs: &[Pick]) -> f64 {
    let Some(first) = legs.first() else {
        return 0.0;
    };
    let mut prob = first.fair_prob;
    for leg in &legs[1..] {
        let corr = estimate_correlation(&first.leg_key(), &leg.leg_key());
        prob = adjusted_joint_probability(prob, leg.fair_prob, corr);
    }
    prob.clamp(0.0, 1.0)
}

fn candidate_from_legs(
    legs: Vec<Pick>,
    risk_level: RiskLevel,
    kelly_fraction: f64,
) -> Option<ParlayCandidate> {
    let mut decimals = Vec::with_capacity(legs.len());
    for leg in &legs {
        match american_to_decimal(leg.odds_american) {
            Ok(dec) => decimals.push(dec),
            Err(e) => {
                tracing::warn!(pick_id = %leg.id, error = %e, "Leg carries invalid odds");
                return None;
            }
        }
    }
    let combined_decimal = calculate_parlay_odds(&decimals).ok()?;
    let combined_american = decimal_to_american(combined_decimal).ok()?;
    let fair_prob = joint_probability(&legs);
    let combined_ev = calculate_ev(fair_prob, combined_decimal);
    let correlation = avg_pairwise_correlation(&legs);
    // A degenerate joint probability (clamped to 0 or 1) sizes to zero.
    let kelly = kelly_criterion(fair_prob, combined_decimal, kelly_fraction).unwrap_or(0.0);

    Some(ParlayCandidate {
        num_legs: legs.len(),
        legs,
        combined_fair_prob: fair_prob,
        combined_odds_decimal: combined_decimal,
        combined_odds_american: combined_american,
        combined_ev_pct: combined_ev,
        correlation_score: correlation,
        risk_level,
        suggested_kelly_fraction: kelly,
    })
}

fn is_valid_candidate(candidate: &ParlayCandidate, config: &RiskConfig) -> bool {
    if candidate.combined_odds_american < config.min_combined_odds_american
        || candidate.combined_odds_american > config.max_combined_odds_american
    {
        return false;
    }
    if candidate.correlation_score > config.max_correlation {
        return false;
    }
    candidate.combined_ev_pct > 0.0
}

/// Build up to `max_parlays` candidates for one risk tier.
pub fn build_parlays_for_risk_level(
    picks: &[Pick],
    risk_level: RiskLevel,
    kelly_fraction: f64,
    max_parlays: usize,
) -> Vec<ParlayCandidate> {
    let config = RiskConfig::for_level(risk_level);

    let mut pool: Vec<&Pick> = picks
        .iter()
        .filter(|p| config.allowed_confidence.contains(&p.confidence_tier))
        .collect();
    if pool.len() < config.min_legs {
        return Vec::new();
    }
    pool.sort_by(|a, b| {
        b.ev_pct
            .partial_cmp(&a.ev_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut candidates: Vec<ParlayCandidate> = Vec::new();

    for size in config.min_legs..=config.max_legs {
        if pool.len() < size {
            continue;
        }

        // Greedy seed: walk the EV-ranked pool, adding each pick that is
        // pairwise-compatible with everything already selected.
        let mut selected: Vec<&Pick> = vec![pool[0]];
        for &pick in &pool[1..] {
            if selected.len() >= size {
                break;
            }
            let compatible = selected.iter().all(|leg| {
                check_compatibility(&leg.leg_key(), &pick.leg_key(), risk_level).is_compatible
            });
            if compatible {
                selected.push(pick);
            }
        }
        if selected.len() == size {
            let legs: Vec<Pick> = selected.iter().map(|p| (*p).clone()).collect();
            if let Some(candidate) = candidate_from_legs(legs, risk_level, kelly_fraction) {
                if is_valid_candidate(&candidate, &config) {
                    candidates.push(candidate);
                } else {
                    counter!("parlay_candidates_rejected_total").increment(1);
                }
            }
        }

        // Exhaustive search stays tractable only for small leg counts.
        if size <= 3 {
            for combo in pool.iter().combinations(size) {
                let all_compatible = combo.iter().tuple_combinations().all(|(a, b)| {
                    check_compatibility(&a.leg_key(), &b.leg_key(), risk_level).is_compatible
                });
                if !all_compatible {
                    continue;
                }
                let legs: Vec<Pick> = combo.iter().map(|p| (**p).clone()).collect();
                if let Some(candidate) = candidate_from_legs(legs, risk_level, kelly_fraction) {
                    if is_valid_candidate(&candidate, &config) {
                        candidates.push(candidate);
                    } else {
                        counter!("parlay_candidates_rejected_total").increment(1);
                    }
                }
            }
        }
    }

    // Deduplicate by leg set, keeping the highest EV; the BTreeMap keeps
    // ranking deterministic across runs.
    let mut unique: BTreeMap<Vec<Uuid>, ParlayCandidate> = BTreeMap::new();
    for candidate in candidates {
        let mut key: Vec<Uuid> = candidate.legs.iter().map(|p| p.id).collect();
        key.sort();
        match unique.get(&key) {
            Some(kept) if kept.combined_ev_pct >= candidate.combined_ev_pct => {}
            _ => {
                unique.insert(key, candidate);
            }
        }
    }

    let mut ranked: Vec<ParlayCandidate> = unique.into_values().collect();
    ranked.sort_by(|a, b| {
        b.combined_ev_pct
            .partial_cmp(&a.combined_ev_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(max_parlays);
    ranked
}

/// Regenerate the day's parlays across all risk tiers. The caller
/// replaces the prior day's rows with the result wholesale.
pub fn generate_daily_parlays(
    today_picks: &[Pick],
    config: &EngineConfig,
    pick_day: NaiveDate,
) -> Vec<Parlay> {
    if today_picks.len() < 2 {
        tracing::info!("Fewer than two picks today — no parlays");
        return Vec::new();
    }

    let mut generated = Vec::new();
    for risk_level in RiskLevel::ALL {
        let candidates = build_parlays_for_risk_level(
            today_picks,
            risk_level,
            config.parlay_kelly_fraction,
            config.max_parlays_per_tier,
        );
        tracing::info!(
            risk_level = %risk_level,
            count = candidates.len(),
            "Parlay candidates built"
        );
        for candidate in candidates {
            let legs = candidate
                .legs
                .iter()
                .enumerate()
                .map(|(idx, pick)| ParlayLeg {
                    pick_id: pick.id,
                    leg_order: idx as u32 + 1,
                    result: PickOutcome::Pending,
                })
                .collect();
            generated.push(Parlay {
                id: Uuid::new_v4(),
                risk_level,
                num_legs: candidate.num_legs as u32,
                combined_odds_american: candidate.combined_odds_american,
                combined_odds_decimal: candidate.combined_odds_decimal,
                combined_ev_pct: candidate.combined_ev_pct,
                combined_fair_prob: candidate.combined_fair_prob,
                correlation_score: candidate.correlation_score,
                suggested_kelly_fraction: candidate.suggested_kelly_fraction,
                pick_date: pick_day,
                outcome: PickOutcome::Pending,
                profit_loss: None,
                legs,
            });
        }
    }

    counter!("parlays_generated_total").increment(generated.len() as u64);
    generated
}

// ---------------------------------------------------------------------------
// Custom parlays
// ---------------------------------------------------------------------------

/// Diagnostic payload for a user-specified parlay build.
#[derive(Debug, Clone, Serialize)]
pub struct CustomParlayReport {
    pub is_valid: bool,
    pub reason: Option<String>,
    pub compatibility_warnings: Vec<String>,
    pub combined_odds_american: Option<i32>,
    pub combined_odds_decimal: Option<f64>,
    pub combined_ev_pct: Option<f64>,
    pub combined_fair_prob: Option<f64>,
    pub correlation_score: Option<f64>,
    pub suggested_kelly_fraction: Option<f64>,
}

impl CustomParlayReport {
    fn invalid(reason: &str, warnings: Vec<String>) -> Self {
        Self {
            is_valid: false,
            reason: Some(reason.to_string()),
            compatibility_warnings: warnings,
            combined_odds_american: None,
            combined_odds_decimal: None,
            combined_ev_pct: None,
            combined_fair_prob: None,
            correlation_score: None,
            suggested_kelly_fraction: None,
        }
    }
}

/// Validate and price a user-chosen set of picks as a parlay.
///
/// Hard blocks use the aggressive ceiling — the least restrictive tier,
/// since the user explicitly chose these legs. Pairs above 0.40
/// correlation produce warnings, not rejections.
pub fn build_custom_parlay(
    pick_ids: &[Uuid],
    all_picks: &[Pick],
    config: &EngineConfig,
) -> CustomParlayReport {
    let mut distinct: Vec<Uuid> = Vec::new();
    for id in pick_ids {
        if !distinct.contains(id) {
            distinct.push(*id);
        }
    }
    if distinct.len() < 2 {
        return CustomParlayReport::invalid("at_least_two_picks_required", Vec::new());
    }

    let mut legs: Vec<Pick> = Vec::with_capacity(distinct.len());
    for id in &distinct {
        match all_picks.iter().find(|p| p.id == *id) {
            Some(pick) => legs.push(pick.clone()),
            None => return CustomParlayReport::invalid("pick_not_found", Vec::new()),
        }
    }

    let mut warnings: Vec<String> = Vec::new();
    for (a, b) in legs.iter().tuple_combinations() {
        let result = check_compatibility(&a.leg_key(), &b.leg_key(), RiskLevel::Aggressive);
        if !result.is_compatible {
            let reason = result
                .reason
                .map(|r| r.to_string())
                .unwrap_or_else(|| "incompatible".to_string());
            return CustomParlayReport::invalid(&reason, vec![reason.clone()]);
        }
        let corr = estimate_correlation(&a.leg_key(), &b.leg_key());
        if corr > CUSTOM_WARNING_CORRELATION {
            warnings.push(format!("high_pair_correlation:{}-{}:{corr:.2}", a.id, b.id));
        }
    }

    let Some(candidate) = candidate_from_legs(
        legs,
        RiskLevel::Aggressive,
        config.parlay_kelly_fraction,
    ) else {
        return CustomParlayReport::invalid("invalid_leg_odds", warnings);
    };

    CustomParlayReport {
        is_valid: true,
        reason: None,
        compatibility_warnings: warnings,
        combined_odds_american: Some(candidate.combined_odds_american),
        combined_odds_decimal: Some(candidate.combined_odds_decimal),
        combined_ev_pct: Some(candidate.combined_ev_pct),
        combined_fair_prob: Some(candidate.combined_fair_prob),
        correlation_score: Some(candidate.correlation_score),
        suggested_kelly_fraction: Some(candidate.suggested_kelly_fraction),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
