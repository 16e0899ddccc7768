use crate::game::constants::DEFAULT_TURN_TIMEOUT_MS;
use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    /// Per-turn deadline before the auto-action fires
    pub turn_timeout_ms: u64,
    /// When enabled, any seated player may start a hand; otherwise only the
    /// table owner can
    pub auto_start: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:holdem.db".to_string()),
            turn_timeout_ms: env::var("TURN_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TURN_TIMEOUT_MS),
            auto_start: env::var("AUTO_START")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            turn_timeout_ms: DEFAULT_TURN_TIMEOUT_MS,
            auto_start: false,
        }
    }
}
