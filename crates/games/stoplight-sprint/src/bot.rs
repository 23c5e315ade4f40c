use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::config::SprintConfig;
use crate::signal::SignalPhase;

/// Per-session movement profile for a bot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BotProfile {
    /// Advance per tick while moving.
    pub stride: f32,
    /// Blunder weight for non-go phases.
    pub risk: f32,
}

/// Sample a fresh profile at race start.
pub fn sample_profile(rng: &mut StdRng, config: &SprintConfig) -> BotProfile {
    BotProfile {
        stride: rng.random_range(config.bot_stride_min..config.bot_stride_max),
        risk: rng.random_range(0.0..config.bot_risk_max),
    }
}

/// A bot's decision for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotMove {
    /// Stay put.
    Hold,
    /// Move this tick.
    Advance,
    /// Move during Stop: a blunder that schedules elimination.
    Blunder,
}

/// Decide a bot's intent for this tick from the current signal.
///
/// Go: advance most of the time. Caution: a gamble weighted by risk.
/// Stop: hold, except the occasional blunder.
pub fn decide(phase: SignalPhase, risk: f32, rng: &mut StdRng, config: &SprintConfig) -> BotMove {
    match phase {
        SignalPhase::Go => {
            if rng.random::<f32>() < config.bot_go_chance {
                BotMove::Advance
            } else {
                BotMove::Hold
            }
        },
        SignalPhase::Caution => {
            if rng.random::<f32>() < risk * config.bot_caution_factor {
                BotMove::Advance
            } else {
                BotMove::Hold
            }
        },
        SignalPhase::Stop => {
            if rng.random::<f32>() < risk * config.bot_blunder_factor {
                BotMove::Blunder
            } else {
                BotMove::Hold
            }
        },
    }
}
