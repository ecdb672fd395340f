use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use linesight::models::{
    ConfidenceTier, Game, Market, OddsSnapshot, Pick, PickOutcome, ProbSource,
};

/// Fixed "now" so every fixture and assertion is deterministic.
#[allow(dead_code)]
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 2, 18, 0, 0).unwrap()
}

/// Install a test subscriber once; respects RUST_LOG.
#[allow(dead_code)]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[allow(dead_code)]
pub fn game(id: i64, home: &str, away: &str, commence_in_hours: i64) -> Game {
    Game {
        id,
        external_id: format!("ext-{id}"),
        sport_key: "basketball_nba".into(),
        home_team: home.into(),
        away_team: away.into(),
        commence_time: now() + Duration::hours(commence_in_hours),
        home_score: None,
        away_score: None,
        completed: false,
    }
}

/// Snapshot captured `mins_ago` minutes before the fixed now.
#[allow(dead_code)]
pub fn snapshot(
    game: &Game,
    bookmaker: &str,
    market: Market,
    side: &str,
    odds: i32,
    no_vig: f64,
    mins_ago: i64,
) -> OddsSnapshot {
    let ts = now() - Duration::minutes(mins_ago);
    let implied = if odds > 0 {
        100.0 / (odds as f64 + 100.0)
    } else {
        odds.abs() as f64 / (odds.abs() as f64 + 100.0)
    };
    OddsSnapshot {
        game_id: game.id,
        sport_key: game.sport_key.clone(),
        bookmaker: bookmaker.into(),
        market,
        side: side.into(),
        line: match market {
            Market::H2h => None,
            Market::Spreads => Some(-4.5),
            Market::Totals => Some(215.5),
        },
        odds,
        implied_prob: implied,
        no_vig_prob: no_vig,
        commence_time: game.commence_time,
        snapshot_time: ts,
        snapshot_time_rounded: OddsSnapshot::round_to_minute(ts),
        is_closing: false,
    }
}

/// A hand-built pick for parlay and settlement scenarios.
#[allow(dead_code)]
pub fn pick(
    game: &Game,
    market: Market,
    side: &str,
    odds: i32,
    fair_prob: f64,
    ev_pct: f64,
    tier: ConfidenceTier,
) -> Pick {
    Pick {
        id: Uuid::new_v4(),
        game_id: game.id,
        sport_key: game.sport_key.clone(),
        pick_date: now(),
        pick_day: now().date_naive(),
        market,
        side: side.into(),
        line: match market {
            Market::H2h => None,
            Market::Spreads => Some(-4.5),
            Market::Totals => Some(215.5),
        },
        odds_american: odds,
        best_book: "draftkings".into(),
        fair_prob,
        prob_source: ProbSource::Consensus,
        implied_prob: 0.5238,
        ev_pct,
        edge: fair_prob - 0.5238,
        composite_score: 0.6,
        confidence_tier: tier,
        signals: serde_json::Value::Null,
        data_quality: serde_json::Value::Null,
        suggested_kelly_fraction: 0.02,
        issued_at: now(),
        outcome: PickOutcome::Pending,
        profit_loss: None,
        market_clv: None,
        book_clv: None,
        closing_odds_american: None,
        closing_snapshot_time: None,
    }
}
