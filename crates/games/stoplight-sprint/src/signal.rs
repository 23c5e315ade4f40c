use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::config::SprintConfig;

/// Current signal light, controlling which movement is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalPhase {
    Stop,
    Caution,
    Go,
}

impl SignalPhase {
    /// Cyclic order Stop -> Caution -> Go -> Stop.
    pub fn next(self) -> Self {
        match self {
            SignalPhase::Stop => SignalPhase::Caution,
            SignalPhase::Caution => SignalPhase::Go,
            SignalPhase::Go => SignalPhase::Stop,
        }
    }
}

/// Phase scheduler with randomized dwell times.
///
/// Every delay of the signal cycle is a countdown re-checked each tick,
/// so a firing that arrives after the relevant state has moved on
/// resolves to a no-op instead of needing cancellation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalTimer {
    pub phase: SignalPhase,
    /// Time left in the current phase.
    pub remaining: f32,
    /// Countdown to the violation sweep, armed on each Stop entry.
    pub sweep_pending: Option<f32>,
}

impl Default for SignalTimer {
    fn default() -> Self {
        Self {
            phase: SignalPhase::Stop,
            remaining: 0.0,
            sweep_pending: None,
        }
    }
}

/// What a single timer tick produced.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalTick {
    /// Phase entered during this tick, if any.
    pub entered: Option<SignalPhase>,
    /// The post-grace violation sweep came due this tick.
    pub sweep_due: bool,
}

impl SignalTimer {
    /// Arm the timer at race start; the session opens on Stop with the
    /// sweep already scheduled.
    pub fn start(rng: &mut StdRng, config: &SprintConfig) -> Self {
        let mut timer = Self::default();
        timer.enter(SignalPhase::Stop, rng, config);
        timer
    }

    fn enter(&mut self, phase: SignalPhase, rng: &mut StdRng, config: &SprintConfig) {
        self.phase = phase;
        self.remaining = dwell(phase, rng, config);
        if phase == SignalPhase::Stop {
            self.sweep_pending = Some(config.violation_grace);
        }
    }

    /// Advance the schedule by one tick.
    pub fn tick(&mut self, dt: f32, rng: &mut StdRng, config: &SprintConfig) -> SignalTick {
        let mut out = SignalTick::default();

        // Sweep countdown runs first so a sweep armed by a phase change
        // below starts counting on the next tick, giving the full grace.
        if let Some(left) = self.sweep_pending.as_mut() {
            *left -= dt;
            if *left <= 0.0 {
                self.sweep_pending = None;
                // Judged only if the light is still red at fire time.
                out.sweep_due = self.phase == SignalPhase::Stop;
            }
        }

        self.remaining -= dt;
        if self.remaining <= 0.0 {
            let next = self.phase.next();
            self.enter(next, rng, config);
            out.entered = Some(next);
        }

        out
    }
}

/// Sample the dwell duration for a phase.
fn dwell(phase: SignalPhase, rng: &mut StdRng, config: &SprintConfig) -> f32 {
    match phase {
        SignalPhase::Stop => rng.random_range(config.stop_dwell_min..config.stop_dwell_max),
        SignalPhase::Caution => config.caution_dwell,
        SignalPhase::Go => rng.random_range(config.go_dwell_min..config.go_dwell_max),
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(99)
    }

    #[test]
    fn phase_cycle_order() {
        assert_eq!(SignalPhase::Stop.next(), SignalPhase::Caution);
        assert_eq!(SignalPhase::Caution.next(), SignalPhase::Go);
        assert_eq!(SignalPhase::Go.next(), SignalPhase::Stop);
    }

    #[test]
    fn starts_on_stop_with_armed_sweep() {
        let mut rng = rng();
        let config = SprintConfig::default();
        let timer = SignalTimer::start(&mut rng, &config);
        assert_eq!(timer.phase, SignalPhase::Stop);
        assert!(timer.remaining >= config.stop_dwell_min);
        assert!(timer.remaining < config.stop_dwell_max);
        assert_eq!(timer.sweep_pending, Some(config.violation_grace));
    }

    #[test]
    fn sweep_fires_once_per_stop_entry() {
        let mut rng = rng();
        let config = SprintConfig::default();
        let mut timer = SignalTimer::start(&mut rng, &config);

        let mut fired = 0;
        let mut fired_at_tick = 0;
        for i in 1..=20 {
            let out = timer.tick(config.tick_seconds, &mut rng, &config);
            if out.sweep_due {
                fired += 1;
                fired_at_tick = i;
            }
        }
        assert_eq!(fired, 1, "exactly one sweep per Stop entry");
        // 0.2 s of grace at 0.1 s ticks.
        assert!((1..=3).contains(&fired_at_tick), "fired at {fired_at_tick}");
    }

    #[test]
    fn dwells_stay_in_bounds_across_a_full_cycle() {
        let mut rng = rng();
        let config = SprintConfig::default();
        let mut timer = SignalTimer::start(&mut rng, &config);

        let mut ticks_in_phase = 0;
        let mut seen = vec![(SignalPhase::Stop, 0)];
        for _ in 0..200 {
            ticks_in_phase += 1;
            let out = timer.tick(config.tick_seconds, &mut rng, &config);
            if let Some(phase) = out.entered {
                seen.last_mut().unwrap().1 = ticks_in_phase;
                seen.push((phase, 0));
                ticks_in_phase = 0;
            }
        }

        let phases: Vec<SignalPhase> = seen.iter().map(|(p, _)| *p).collect();
        assert!(phases.len() >= 4, "several transitions in 20 s");
        for window in phases.windows(2) {
            assert_eq!(window[1], window[0].next(), "order is cyclic");
        }
        for (phase, ticks) in &seen[..seen.len() - 1] {
            let (min, max) = match phase {
                SignalPhase::Stop => (config.stop_dwell_min, config.stop_dwell_max),
                SignalPhase::Caution => (config.caution_dwell, config.caution_dwell),
                SignalPhase::Go => (config.go_dwell_min, config.go_dwell_max),
            };
            let dwell = *ticks as f32 * config.tick_seconds;
            assert!(
                dwell >= min - config.tick_seconds && dwell <= max + config.tick_seconds,
                "{phase:?} dwelled {dwell}s outside [{min}, {max}]"
            );
        }
    }

    #[test]
    fn reentering_stop_rearms_the_sweep() {
        let mut rng = rng();
        let config = SprintConfig::default();
        let mut timer = SignalTimer::start(&mut rng, &config);

        let mut sweeps = 0;
        let mut stop_entries = 1; // the race starts on Stop
        for _ in 0..400 {
            let out = timer.tick(config.tick_seconds, &mut rng, &config);
            if out.entered == Some(SignalPhase::Stop) {
                stop_entries += 1;
            }
            if out.sweep_due {
                sweeps += 1;
            }
        }
        assert!(stop_entries >= 2, "cycle must wrap back to Stop in 40 s");
        // The last Stop entry may still have its sweep pending.
        assert!(
            sweeps == stop_entries || sweeps == stop_entries - 1,
            "{sweeps} sweeps for {stop_entries} stop entries"
        );
    }
}
