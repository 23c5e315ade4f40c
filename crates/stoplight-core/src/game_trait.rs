use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::contestant::Contestant;

/// Unique identifier for a contestant in a session.
pub type ActorId = u32;

/// Core trait that every Stoplight minigame implements.
///
/// The shell owns rendering, input translation, and the results screen;
/// the game owns the session state machine and the simulation. The shell
/// drives `tick()` once per `tick_period()` and forwards player intents
/// between ticks.
pub trait StoplightGame: Send + Sync {
    /// Game metadata for the title screen.
    fn metadata(&self) -> GameMetadata;

    /// Start a race: Instructions -> Running with a full state reset.
    /// Ignored from any other session state.
    fn begin(&mut self, lineup: &[Contestant], config: &GameConfig);

    /// Advance the simulation by exactly one fixed tick. Returns events
    /// for the shell. A tick arriving outside Running is stale and a
    /// no-op.
    fn tick(&mut self) -> Vec<GameEvent>;

    /// Record the human player's current hold-to-move intent. Stale
    /// outside Running, or once the player is no longer active.
    fn set_player_intent(&mut self, moving: bool);

    /// Return to Instructions from any state, resetting the session.
    fn restart(&mut self);

    /// Current lifecycle state.
    fn session_state(&self) -> SessionState;

    /// Fixed simulation tick period.
    fn tick_period(&self) -> Duration {
        Duration::from_millis(100)
    }

    /// Standings for the results screen, one row per contestant.
    fn final_standings(&self) -> Vec<Standing>;
}

/// Game metadata for the title screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
    pub contestant_count: u8,
    pub estimated_duration: Duration,
}

/// Per-session configuration handed to `begin`.
///
/// Game-specific tuning lives in each game crate's own config file; this
/// carries only session options such as the RNG seed used by tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameConfig {
    pub custom: HashMap<String, serde_json::Value>,
}

impl GameConfig {
    /// Config carrying a fixed RNG seed for deterministic runs.
    pub fn with_seed(seed: u64) -> Self {
        let mut config = Self::default();
        config.custom.insert("seed".to_string(), seed.into());
        config
    }

    /// The RNG seed, if one was supplied.
    pub fn seed(&self) -> Option<u64> {
        self.custom.get("seed").and_then(|v| v.as_u64())
    }
}

/// Session lifecycle. Linear; `restart` is the only way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Instructions,
    Running,
    Ended,
}

/// A contestant's race status. Terminal once it leaves Active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorStatus {
    Active,
    Eliminated,
    Finished,
}

/// Events emitted by a game during a tick, consumed by the shell for
/// one-shot effects (explosions, fanfares, the results screen).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ActorEliminated { actor: ActorId },
    ActorFinished { actor: ActorId, placement: usize },
    SessionEnded { outcome: RaceOutcome },
}

/// Why the player lost. The categories are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    /// Caught moving during the stop signal.
    MovedOnStop,
    /// Survived, but the podium filled without them.
    NotTopThree,
}

/// Final result of a session, resolved once when it ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceOutcome {
    pub won: bool,
    pub reason: Option<LossReason>,
    /// 1-based finishing placement; contestants who never finished are
    /// ranked last.
    pub placement: usize,
    pub elapsed_ticks: u64,
    pub final_position: f32,
}

/// One results-screen row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub actor: ActorId,
    pub status: ActorStatus,
    pub placement: Option<usize>,
    pub finish_tick: Option<u64>,
}
