//! Pure odds conversions and staking math.
//!
//! Every function here is total over valid input and fails fast with an
//! `OddsError` otherwise — a zero American price or an empty parlay is a
//! caller bug, not something to coerce.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum OddsError {
    #[error("invalid american odds: {0} (must be nonzero)")]
    InvalidOdds(i32),

    #[error("decimal odds must exceed 1.0, got {0}")]
    InvalidDecimal(f64),

    #[error("probability must be inside (0, 1), got {0}")]
    InvalidProbability(f64),

    #[error("probabilities must be non-negative with a positive sum")]
    InvalidProbabilityList,

    #[error("odds list is empty")]
    EmptyOddsList,

    #[error("kelly fraction must be positive, got {0}")]
    InvalidFraction(f64),
}

/// American → decimal odds. `+150 → 2.5`, `-110 → 1.909…`.
pub fn american_to_decimal(odds: i32) -> Result<f64, OddsError> {
    if odds == 0 {
        return Err(OddsError::InvalidOdds(odds));
    }
    if odds > 0 {
        Ok(odds as f64 / 100.0 + 1.0)
    } else {
        Ok(100.0 / odds.abs() as f64 + 1.0)
    }
}

/// Decimal → American odds, rounded to the nearest integer price.
pub fn decimal_to_american(decimal: f64) -> Result<i32, OddsError> {
    if decimal <= 1.0 {
        return Err(OddsError::InvalidDecimal(decimal));
    }
    if decimal >= 2.0 {
        Ok(((decimal - 1.0) * 100.0).round() as i32)
    } else {
        Ok((-100.0 / (decimal - 1.0)).round() as i32)
    }
}

/// Vig-inclusive implied probability of an American price.
pub fn american_to_implied_prob(odds: i32) -> Result<f64, OddsError> {
    if odds == 0 {
        return Err(OddsError::InvalidOdds(odds));
    }
    if odds > 0 {
        Ok(100.0 / (odds as f64 + 100.0))
    } else {
        let abs = odds.abs() as f64;
        Ok(abs / (abs + 100.0))
    }
}

/// Inverse of `american_to_implied_prob`. Probabilities above one half
/// map to favorite (negative) prices.
pub fn implied_prob_to_american(prob: f64) -> Result<i32, OddsError> {
    if prob <= 0.0 || prob >= 1.0 {
        return Err(OddsError::InvalidProbability(prob));
    }
    if prob > 0.5 {
        Ok((-(prob / (1.0 - prob)) * 100.0).round() as i32)
    } else {
        Ok((((1.0 - prob) / prob) * 100.0).round() as i32)
    }
}

/// Normalize one market's implied probabilities so they sum to 1
/// (overround removal). Empty input yields an empty list.
pub fn remove_vig(probs: &[f64]) -> Result<Vec<f64>, OddsError> {
    if probs.is_empty() {
        return Ok(Vec::new());
    }
    if probs.iter().any(|p| *p < 0.0) {
        return Err(OddsError::InvalidProbabilityList);
    }
    let total: f64 = probs.iter().sum();
    if total <= 0.0 {
        return Err(OddsError::InvalidProbabilityList);
    }
    Ok(probs.iter().map(|p| p / total).collect())
}

/// Expected profit fraction per unit staked.
pub fn calculate_ev(fair_prob: f64, decimal_odds: f64) -> f64 {
    fair_prob * decimal_odds - 1.0
}

/// Combined decimal odds of a parlay: the product of its leg odds.
pub fn calculate_parlay_odds(decimals: &[f64]) -> Result<f64, OddsError> {
    if decimals.is_empty() {
        return Err(OddsError::EmptyOddsList);
    }
    let mut combined = 1.0;
    for &dec in decimals {
        if dec <= 1.0 {
            return Err(OddsError::InvalidDecimal(dec));
        }
        combined *= dec;
    }
    Ok(combined)
}

/// Fractional Kelly stake: `max(0, fraction * (b*p - q) / b)` with
/// `b = decimal - 1`, `q = 1 - p`. Never negative — a negative-edge bet
/// sizes to zero rather than suggesting a short.
pub fn kelly_criterion(fair_prob: f64, decimal_odds: f64, fraction: f64) -> Result<f64, OddsError> {
    if fair_prob <= 0.0 || fair_prob >= 1.0 {
        return Err(OddsError::InvalidProbability(fair_prob));
    }
    if decimal_odds <= 1.0 {
        return Err(OddsError::InvalidDecimal(decimal_odds));
    }
    if fraction <= 0.0 {
        return Err(OddsError::InvalidFraction(fraction));
    }
    let b = decimal_odds - 1.0;
    let q = 1.0 - fair_prob;
    let full_kelly = (b * fair_prob - q) / b;
    Ok((full_kelly * fraction).max(0.0))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
