//! Side and team-name normalization.
//!
//! Bookmakers label outcomes inconsistently (abbreviated city names,
//! stray whitespace, `Home`/`home`). Everything that compares sides goes
//! through here so a mismatched label degrades to a logged warning and an
//! unresolved side, never a crashed pipeline.

use std::fmt;

/// Known alternate spellings mapped to the canonical team name.
const TEAM_NAME_ALIASES: [(&str, &str); 4] = [
    ("la clippers", "Los Angeles Clippers"),
    ("los angeles clippers", "Los Angeles Clippers"),
    ("la lakers", "Los Angeles Lakers"),
    ("los angeles lakers", "Los Angeles Lakers"),
];

/// Collapse runs of whitespace and lowercase for comparison.
pub fn normalize_str(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Canonical team name: whitespace-collapsed, alias-resolved.
pub fn normalize_team_name(team_name: &str) -> String {
    let cleaned = team_name.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        return cleaned;
    }
    let lowered = cleaned.to_lowercase();
    TEAM_NAME_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or(cleaned)
}

/// Pass canonical side labels through unchanged; anything else is trimmed
/// and returned as-is (a team name).
pub fn normalize_side_label(side: &str) -> String {
    let normalized = normalize_str(side);
    match normalized.as_str() {
        "home" | "away" | "over" | "under" => normalized,
        _ => side.trim().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Side resolution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedSide {
    Home,
    Away,
}

impl ResolvedSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolvedSide::Home => "home",
            ResolvedSide::Away => "away",
        }
    }
}

impl fmt::Display for ResolvedSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve a bookmaker's outcome label against the game's two teams.
///
/// Returns `None` (with a warning) when the label matches neither side —
/// callers skip the row rather than guessing.
pub fn resolve_side(side: &str, home_team: &str, away_team: &str) -> Option<ResolvedSide> {
    let normalized_side = normalize_str(side);
    if normalized_side == "home" {
        return Some(ResolvedSide::Home);
    }
    if normalized_side == "away" {
        return Some(ResolvedSide::Away);
    }

    let normalized_home = normalize_str(home_team);
    let normalized_away = normalize_str(away_team);

    if !normalized_side.is_empty() && normalized_side == normalized_home {
        return Some(ResolvedSide::Home);
    }
    if !normalized_side.is_empty() && normalized_side == normalized_away {
        return Some(ResolvedSide::Away);
    }

    // Second chance through the alias table.
    let alias_side = normalize_str(&normalize_team_name(side));
    let alias_home = normalize_str(&normalize_team_name(home_team));
    let alias_away = normalize_str(&normalize_team_name(away_team));

    if !alias_side.is_empty() && alias_side == alias_home {
        return Some(ResolvedSide::Home);
    }
    if !alias_side.is_empty() && alias_side == alias_away {
        return Some(ResolvedSide::Away);
    }

    tracing::warn!(
        side = %side,
        home_team = %home_team,
        away_team = %away_team,
        "Could not resolve outcome side"
    );
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
