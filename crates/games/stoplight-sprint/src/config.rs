use serde::{Deserialize, Serialize};

/// Data-driven configuration for the sprint race.
///
/// Durations are seconds; positions are progress units along the track.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SprintConfig {
    /// Track length in progress units.
    pub track_length: f32,
    /// Starting line, as a fraction of the track.
    pub start_fraction: f32,
    /// Finish line, as a fraction of the track.
    pub finish_fraction: f32,
    /// Simulation tick period.
    pub tick_seconds: f32,
    /// Stop dwell sample range.
    pub stop_dwell_min: f32,
    pub stop_dwell_max: f32,
    /// Fixed caution dwell.
    pub caution_dwell: f32,
    /// Go dwell sample range.
    pub go_dwell_min: f32,
    pub go_dwell_max: f32,
    /// Grace between entering Stop and the violation sweep.
    pub violation_grace: f32,
    /// Delay before a stop-phase blunder eliminates a bot.
    pub misstep_delay: f32,
    /// Delay between an end condition firing and the results screen.
    pub end_display_delay: f32,
    /// Player advance per tick during Go.
    pub player_go_stride: f32,
    /// Player advance per tick during Caution.
    pub player_caution_stride: f32,
    /// Bot stride sample range (advance per tick).
    pub bot_stride_min: f32,
    pub bot_stride_max: f32,
    /// Upper bound for sampled bot risk.
    pub bot_risk_max: f32,
    /// Probability a bot advances during Go.
    pub bot_go_chance: f32,
    /// Multiplier on risk for moving during Caution.
    pub bot_caution_factor: f32,
    /// Multiplier on risk for blundering during Stop.
    pub bot_blunder_factor: f32,
    /// Finishers needed to end the race.
    pub podium_size: usize,
}

impl Default for SprintConfig {
    fn default() -> Self {
        Self {
            track_length: 100.0,
            start_fraction: 0.08,
            finish_fraction: 0.85,
            tick_seconds: 0.1,
            stop_dwell_min: 2.0,
            stop_dwell_max: 5.0,
            caution_dwell: 0.8,
            go_dwell_min: 1.5,
            go_dwell_max: 3.5,
            violation_grace: 0.2,
            misstep_delay: 0.3,
            end_display_delay: 2.0,
            player_go_stride: 1.2,
            player_caution_stride: 0.6,
            bot_stride_min: 0.5,
            bot_stride_max: 1.7,
            bot_risk_max: 0.3,
            bot_go_chance: 0.9,
            bot_caution_factor: 0.5,
            bot_blunder_factor: 0.15,
            podium_size: 3,
        }
    }
}

impl SprintConfig {
    /// Starting position in progress units.
    pub fn start_line(&self) -> f32 {
        self.track_length * self.start_fraction
    }

    /// Finish position in progress units.
    pub fn finish_line(&self) -> f32 {
        self.track_length * self.finish_fraction
    }

    /// Load config from environment or TOML file, falling back to defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("STOPLIGHT_SPRINT_CONFIG")
            && let Ok(contents) = std::fs::read_to_string(&path)
            && let Ok(config) = toml::from_str::<Self>(&contents)
        {
            return config;
        }
        match std::fs::read_to_string("config/sprint.toml") {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to parse config/sprint.toml: {e}, using defaults");
                    Self::default()
                },
            },
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_and_finish_lines() {
        let config = SprintConfig::default();
        assert!((config.start_line() - 8.0).abs() < 1e-4);
        assert!((config.finish_line() - 85.0).abs() < 1e-4);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: SprintConfig = toml::from_str("stop_dwell_min = 3.0").unwrap();
        assert!((config.stop_dwell_min - 3.0).abs() < f32::EPSILON);
        assert!((config.caution_dwell - 0.8).abs() < f32::EPSILON);
        assert_eq!(config.podium_size, 3);
    }
}
