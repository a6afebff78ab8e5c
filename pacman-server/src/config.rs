//! Server configuration, loaded once at startup.
//!
//! Built on a `figment`-over-environment pattern
//! (`Figment::new().merge(Env::raw())`), with room/brain fields for
//! configuration: tick period, match timers, capture scoring, default
//! brain search depth, and the tabular policy file path. Persistent
//! ranking and authentication are out of scope, so no OAuth/S3/database
//! fields are present.
use std::path::PathBuf;

use figment::{providers::Env, value::UncasedStr, Figment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: std::net::IpAddr,
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u32,

    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,
    #[serde(default = "default_frightened_duration_ms")]
    pub frightened_duration_ms: u64,
    #[serde(default = "default_respawn_delay_ms")]
    pub respawn_delay_ms: u64,
    #[serde(default = "default_match_duration_ms")]
    pub match_duration_ms: u64,
    #[serde(default = "default_captures_to_win")]
    pub captures_to_win: u32,
    #[serde(default = "default_base_capture_score")]
    pub base_capture_score: u32,
    #[serde(default = "default_capture_score_multiplier")]
    pub capture_score_multiplier: f64,
    #[serde(default = "default_max_players")]
    pub max_players: usize,
    #[serde(default = "default_search_depth")]
    pub search_depth: u8,
    #[serde(default = "default_room_ttl_seconds")]
    pub room_ttl_seconds: u64,

    /// Path to the pre-trained tabular policy file. Missing or unreadable
    /// is a transient integration fault: the server logs and continues
    /// with the heuristic brains only.
    pub model_path: Option<PathBuf>,
}

fn default_host() -> std::net::IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    3000
}

fn default_shutdown_timeout() -> u32 {
    5
}

fn default_tick_period_ms() -> u64 {
    50
}

fn default_frightened_duration_ms() -> u64 {
    10_000
}

fn default_respawn_delay_ms() -> u64 {
    5_000
}

fn default_match_duration_ms() -> u64 {
    180_000
}

fn default_captures_to_win() -> u32 {
    3
}

fn default_base_capture_score() -> u32 {
    200
}

fn default_capture_score_multiplier() -> f64 {
    1.5
}

fn default_max_players() -> usize {
    4
}

fn default_search_depth() -> u8 {
    12
}

fn default_room_ttl_seconds() -> u64 {
    60 * 60
}

impl Config {
    /// Projects the server-wide config onto the per-room tunables
    /// `pacman-core` actually consumes, clamping the search depth to the
    /// `[1, 20]` contract regardless of what an operator configured.
    pub fn room_config(&self) -> pacman_core::RoomConfig {
        pacman_core::RoomConfig {
            tick_period_ms: self.tick_period_ms,
            frightened_duration_ms: self.frightened_duration_ms,
            respawn_delay_ms: self.respawn_delay_ms,
            match_duration_ms: self.match_duration_ms,
            captures_to_win: self.captures_to_win,
            base_capture_score: self.base_capture_score,
            capture_score_multiplier: self.capture_score_multiplier,
            max_players: self.max_players,
            search_depth: self.search_depth.clamp(1, 20),
            emote_refresh_ticks: 3,
        }
    }
}

pub fn load_config() -> Config {
    Figment::new()
        .merge(Env::raw().map(|key| {
            if key == UncasedStr::new("RAILWAY_DEPLOYMENT_DRAINING_SECONDS") {
                "SHUTDOWN_TIMEOUT".into()
            } else {
                key.into()
            }
        }))
        .extract()
        .expect("Failed to load config")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            port: default_port(),
            host: default_host(),
            shutdown_timeout_seconds: default_shutdown_timeout(),
            tick_period_ms: default_tick_period_ms(),
            frightened_duration_ms: default_frightened_duration_ms(),
            respawn_delay_ms: default_respawn_delay_ms(),
            match_duration_ms: default_match_duration_ms(),
            captures_to_win: default_captures_to_win(),
            base_capture_score: default_base_capture_score(),
            capture_score_multiplier: default_capture_score_multiplier(),
            max_players: default_max_players(),
            search_depth: default_search_depth(),
            room_ttl_seconds: default_room_ttl_seconds(),
            model_path: None,
        }
    }

    #[test]
    fn search_depth_clamps_to_spec_range() {
        let mut config = base_config();
        config.search_depth = 255;
        assert_eq!(config.room_config().search_depth, 20);
        config.search_depth = 0;
        assert_eq!(config.room_config().search_depth, 1);
    }
}
