use super::data_quality::DataQuality;
use crate::models::ConfidenceTier;

fn downgrade_one_tier(tier: ConfidenceTier) -> ConfidenceTier {
    match tier {
        ConfidenceTier::High => ConfidenceTier::Medium,
        ConfidenceTier::Medium => ConfidenceTier::Low,
        // Low is the floor; repeated downgrades are idempotent.
        other => other,
    }
}

/// Assign a confidence tier from the composite score, EV and data
/// quality. Single pass: base tier from thresholds, then quality-driven
/// downgrades. `Filtered` is terminal — the candidate is dropped.
pub fn assign_confidence(
    composite_score: f64,
    ev_pct: f64,
    signals_firing: u32,
    data_quality: &DataQuality,
) -> ConfidenceTier {
    let adjusted_composite = if data_quality.sharp_books_present {
        composite_score
    } else {
        composite_score - 0.10
    };

    let mut tier = if adjusted_composite >= 0.70 && ev_pct >= 0.05 && signals_firing >= 3 {
        ConfidenceTier::High
    } else if adjusted_composite >= 0.45 && ev_pct >= 0.02 && signals_firing >= 2 {
        ConfidenceTier::Medium
    } else if adjusted_composite >= 0.30 && ev_pct >= 0.01 {
        ConfidenceTier::Low
    } else {
        return ConfidenceTier::Filtered;
    };

    if data_quality.books_covered < 4 && tier == ConfidenceTier::High {
        tier = ConfidenceTier::Medium;
    }
    if data_quality.snapshot_freshness_minutes > 120 {
        tier = ConfidenceTier::Low;
    }
    if data_quality.line_dispersion > 0.06 {
        tier = downgrade_one_tier(tier);
    }
    if data_quality.market_completeness < 0.66 {
        tier = downgrade_one_tier(tier);
    }

    tier
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
