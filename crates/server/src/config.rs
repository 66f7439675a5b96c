//! Server configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub power_up: PowerUpConfig,
    #[serde(default)]
    pub room: RoomConfig,
}

impl Config {
    /// Load configuration from `config.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    /// Load configuration from `path`, writing the defaults there if it does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }

    /// Wall-clock time between two ticks.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.server.tick_rate.max(1)))
    }

    /// Number of ticks a power-up effect stays active.
    pub fn power_up_ticks(&self) -> u32 {
        self.power_up.duration_secs.saturating_mul(self.server.tick_rate)
    }

    /// Number of ticks between a round ending and the next one starting.
    pub fn restart_delay_ticks(&self) -> u32 {
        let ticks = self.room.restart_delay_ms.saturating_mul(u64::from(self.server.tick_rate)) / 1000;
        u32::try_from(ticks.max(1)).unwrap_or(u32::MAX)
    }
}

/// Server networking and general settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum concurrent connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Simulation ticks per second.
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            max_connections: default_max_connections(),
            tick_rate: default_tick_rate(),
        }
    }
}

fn default_port() -> u16 {
    5000
}
fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_max_connections() -> usize {
    256
}
fn default_tick_rate() -> u32 {
    64
}

/// Board and spatial index configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BoardConfig {
    #[serde(default = "default_board_size")]
    pub width: f32,
    #[serde(default = "default_board_size")]
    pub height: f32,
    /// Shapes a quadtree leaf holds before it splits.
    #[serde(default = "default_quad_capacity")]
    pub quad_capacity: usize,
    /// Depth below which the quadtree never splits.
    #[serde(default = "default_quad_max_depth")]
    pub quad_max_depth: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: default_board_size(),
            height: default_board_size(),
            quad_capacity: default_quad_capacity(),
            quad_max_depth: default_quad_max_depth(),
        }
    }
}

fn default_board_size() -> f32 {
    800.0
}
fn default_quad_capacity() -> usize {
    25
}
fn default_quad_max_depth() -> u32 {
    5
}

/// Player movement and trail configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    /// Distance travelled per tick.
    #[serde(default = "default_player_speed")]
    pub speed: f32,
    #[serde(default = "default_head_radius")]
    pub head_radius: f32,
    #[serde(default = "default_line_width")]
    pub line_width: f32,
    /// Heading change per tick while steering, in radians.
    #[serde(default = "default_turn_rate")]
    pub turn_rate: f32,
    /// Per-tick chance of opening a gap in the trail.
    #[serde(default = "default_gap_chance")]
    pub gap_chance: f64,
    /// Length of a trail gap in ticks.
    #[serde(default = "default_gap_duration")]
    pub gap_duration: u32,
    /// Extra query radius around a breaker's head.
    #[serde(default = "default_breaker_margin")]
    pub breaker_margin: f32,
    /// Minimum distance between a spawn point and the board edge.
    #[serde(default = "default_spawn_margin")]
    pub spawn_margin: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: default_player_speed(),
            head_radius: default_head_radius(),
            line_width: default_line_width(),
            turn_rate: default_turn_rate(),
            gap_chance: default_gap_chance(),
            gap_duration: default_gap_duration(),
            breaker_margin: default_breaker_margin(),
            spawn_margin: default_spawn_margin(),
        }
    }
}

fn default_player_speed() -> f32 {
    1.5
}
fn default_head_radius() -> f32 {
    3.0
}
fn default_line_width() -> f32 {
    3.0
}
fn default_turn_rate() -> f32 {
    0.05
}
fn default_gap_chance() -> f64 {
    0.005
}
fn default_gap_duration() -> u32 {
    12
}
fn default_breaker_margin() -> f32 {
    3.0
}
fn default_spawn_margin() -> f32 {
    80.0
}

/// Power-up spawning configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PowerUpConfig {
    /// Per-tick chance of spawning a power-up.
    #[serde(default = "default_spawn_chance")]
    pub spawn_chance: f64,
    #[serde(default = "default_power_up_radius")]
    pub radius: f32,
    /// How long an effect lasts once picked up.
    #[serde(default = "default_power_up_duration")]
    pub duration_secs: u32,
    /// Upper bound on uncollected power-ups lying on the board.
    #[serde(default = "default_max_on_board")]
    pub max_on_board: usize,
}

impl Default for PowerUpConfig {
    fn default() -> Self {
        Self {
            spawn_chance: default_spawn_chance(),
            radius: default_power_up_radius(),
            duration_secs: default_power_up_duration(),
            max_on_board: default_max_on_board(),
        }
    }
}

fn default_spawn_chance() -> f64 {
    0.005
}
fn default_power_up_radius() -> f32 {
    10.0
}
fn default_power_up_duration() -> u32 {
    10
}
fn default_max_on_board() -> usize {
    8
}

/// Room membership and round configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoomConfig {
    #[serde(default = "default_max_players")]
    pub max_players: usize,
    /// Players needed to start a round.
    #[serde(default = "default_min_players")]
    pub min_players: usize,
    /// Pause between a round ending and the next one starting.
    #[serde(default = "default_restart_delay")]
    pub restart_delay_ms: u64,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_players: default_max_players(),
            min_players: default_min_players(),
            restart_delay_ms: default_restart_delay(),
        }
    }
}

fn default_max_players() -> usize {
    8
}
fn default_min_players() -> usize {
    2
}
fn default_restart_delay() -> u64 {
    3000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[board]\nwidth = 400.0\n").unwrap();
        assert_eq!(config.board.width, 400.0);
        assert_eq!(config.board.height, 800.0);
        assert_eq!(config.server.tick_rate, 64);
        assert_eq!(config.room.max_players, 8);
    }

    #[test]
    fn test_derived_tick_values() {
        let config = Config::default();
        assert_eq!(config.tick_interval(), Duration::from_micros(15_625));
        assert_eq!(config.power_up_ticks(), 640);
        assert_eq!(config.restart_delay_ticks(), 192);
    }

    #[test]
    fn test_huge_durations_saturate() {
        let mut config = Config::default();
        config.server.tick_rate = u32::MAX;
        config.power_up.duration_secs = 10;
        config.room.restart_delay_ms = u64::MAX;
        assert_eq!(config.power_up_ticks(), u32::MAX);
        assert_eq!(config.restart_delay_ticks(), u32::MAX);
    }

    #[test]
    fn test_default_roundtrip_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.player.turn_rate, 0.05);
        assert_eq!(parsed.power_up.max_on_board, 8);
    }
}
