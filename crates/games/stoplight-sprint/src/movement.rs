use serde::{Deserialize, Serialize};

use stoplight_core::game_trait::ActorStatus;

use crate::bot::BotProfile;
use crate::config::SprintConfig;
use crate::signal::SignalPhase;

/// Race state of a single contestant, player or bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerState {
    /// Progress along the track. Non-decreasing, capped at the finish
    /// line, frozen once the runner leaves Active.
    pub position: f32,
    /// Whether the runner is currently trying to move, legal or not.
    pub moving: bool,
    pub status: ActorStatus,
    /// Advance per tick while moving (bots; the player strides by phase).
    pub stride: f32,
    /// Blunder weight for non-go phases (bots; zero for the player).
    pub risk: f32,
    pub is_player: bool,
    /// Countdown to a scheduled stop-phase blunder elimination.
    pub misstep_in: Option<f32>,
    pub finish_tick: Option<u64>,
}

impl RunnerState {
    pub fn player(start: f32) -> Self {
        Self {
            position: start,
            moving: false,
            status: ActorStatus::Active,
            stride: 0.0,
            risk: 0.0,
            is_player: true,
            misstep_in: None,
            finish_tick: None,
        }
    }

    pub fn bot(start: f32, profile: BotProfile) -> Self {
        Self {
            position: start,
            moving: false,
            status: ActorStatus::Active,
            stride: profile.stride,
            risk: profile.risk,
            is_player: false,
            misstep_in: None,
            finish_tick: None,
        }
    }

    /// Back to the starting line, keeping the sampled profile.
    pub fn reset(&mut self, start: f32) {
        self.position = start;
        self.moving = false;
        self.status = ActorStatus::Active;
        self.misstep_in = None;
        self.finish_tick = None;
    }
}

/// Distance this runner covers in one tick, given the signal.
fn step_len(runner: &RunnerState, phase: SignalPhase, config: &SprintConfig) -> f32 {
    if runner.is_player {
        match phase {
            SignalPhase::Go => config.player_go_stride,
            SignalPhase::Caution => config.player_caution_stride,
            SignalPhase::Stop => 0.0,
        }
    } else {
        // A moving bot advances whatever the light says; the stop-phase
        // case only arises from a blunder and gets punished separately.
        runner.stride
    }
}

/// Advance one tick of movement. Returns true when the runner crossed
/// the finish line this tick. Runners without intent, and runners no
/// longer Active, do not move.
pub fn advance(runner: &mut RunnerState, phase: SignalPhase, config: &SprintConfig) -> bool {
    if runner.status != ActorStatus::Active || !runner.moving {
        return false;
    }
    let step = step_len(runner, phase, config);
    if step <= 0.0 {
        return false;
    }
    let finish = config.finish_line();
    runner.position = (runner.position + step).min(finish);
    runner.position >= finish
}

/// Fraction of the course covered, for progress displays.
pub fn progress(position: f32, config: &SprintConfig) -> f32 {
    (position / config.finish_line()).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SprintConfig {
        SprintConfig::default()
    }

    fn moving_player(config: &SprintConfig) -> RunnerState {
        let mut runner = RunnerState::player(config.start_line());
        runner.moving = true;
        runner
    }

    #[test]
    fn player_strides_by_phase() {
        let config = config();
        let mut runner = moving_player(&config);

        assert!(!advance(&mut runner, SignalPhase::Go, &config));
        assert!((runner.position - 9.2).abs() < 1e-4);

        advance(&mut runner, SignalPhase::Caution, &config);
        assert!((runner.position - 9.8).abs() < 1e-4);

        advance(&mut runner, SignalPhase::Stop, &config);
        assert!((runner.position - 9.8).abs() < 1e-4, "no gain on Stop");
    }

    #[test]
    fn no_movement_without_intent() {
        let config = config();
        let mut runner = RunnerState::player(config.start_line());
        advance(&mut runner, SignalPhase::Go, &config);
        assert!((runner.position - config.start_line()).abs() < 1e-4);
    }

    #[test]
    fn bots_advance_by_stride_regardless_of_phase() {
        let config = config();
        let mut runner = RunnerState::bot(
            config.start_line(),
            BotProfile {
                stride: 1.0,
                risk: 0.2,
            },
        );
        runner.moving = true;
        for phase in [SignalPhase::Go, SignalPhase::Caution, SignalPhase::Stop] {
            let before = runner.position;
            advance(&mut runner, phase, &config);
            assert!((runner.position - before - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn settled_runners_never_move() {
        let config = config();
        for status in [ActorStatus::Eliminated, ActorStatus::Finished] {
            let mut runner = moving_player(&config);
            runner.position = 40.0;
            runner.status = status;
            assert!(!advance(&mut runner, SignalPhase::Go, &config));
            assert!((runner.position - 40.0).abs() < 1e-4);
        }
    }

    #[test]
    fn position_clamps_at_the_finish_line() {
        let config = config();
        let mut runner = moving_player(&config);
        runner.position = config.finish_line() - 0.5;
        assert!(advance(&mut runner, SignalPhase::Go, &config));
        assert!((runner.position - config.finish_line()).abs() < 1e-4);
    }

    #[test]
    fn reset_keeps_the_profile() {
        let config = config();
        let profile = BotProfile {
            stride: 1.3,
            risk: 0.25,
        };
        let mut runner = RunnerState::bot(config.start_line(), profile);
        runner.moving = true;
        runner.position = 50.0;
        runner.status = ActorStatus::Eliminated;
        runner.misstep_in = Some(0.2);
        runner.finish_tick = Some(10);

        runner.reset(config.start_line());
        assert!((runner.position - config.start_line()).abs() < 1e-4);
        assert_eq!(runner.status, ActorStatus::Active);
        assert!(!runner.moving);
        assert_eq!(runner.misstep_in, None);
        assert_eq!(runner.finish_tick, None);
        assert!((runner.stride - 1.3).abs() < 1e-4);
        assert!((runner.risk - 0.25).abs() < 1e-4);
    }

    #[test]
    fn progress_fraction_caps_at_one() {
        let config = config();
        assert!((progress(config.finish_line(), &config) - 1.0).abs() < 1e-4);
        assert!(progress(8.0, &config) < 0.1);
        assert!(progress(200.0, &config) <= 1.0);
    }
}
