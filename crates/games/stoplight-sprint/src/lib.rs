pub mod bot;
pub mod config;
pub mod movement;
pub mod resolver;
pub mod signal;

use std::collections::HashMap;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use stoplight_core::contestant::{Contestant, ContestantColor};
use stoplight_core::game_trait::{
    ActorId, ActorStatus, GameConfig, GameEvent, GameMetadata, RaceOutcome, SessionState, Standing,
    StoplightGame,
};

use bot::BotMove;
use config::SprintConfig;
use movement::RunnerState;
use resolver::{FinishEntry, RaceBoard};
use signal::{SignalPhase, SignalTimer};

/// Serializable session state. The shell reads it through `snapshot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SprintState {
    pub session: SessionState,
    pub signal: SignalTimer,
    pub elapsed_ticks: u64,
    pub runners: HashMap<ActorId, RunnerState>,
    pub board: RaceBoard,
    /// Countdown to the results screen once an end condition fired.
    pub end_countdown: Option<f32>,
    pub outcome: Option<RaceOutcome>,
}

impl SprintState {
    fn idle() -> Self {
        Self {
            session: SessionState::Instructions,
            signal: SignalTimer::default(),
            elapsed_ticks: 0,
            runners: HashMap::new(),
            board: RaceBoard::new(0),
            end_countdown: None,
            outcome: None,
        }
    }
}

/// Read-only view refreshed once per tick for the rendering shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub session: SessionState,
    pub phase: SignalPhase,
    pub elapsed_ticks: u64,
    /// Lineup order: the player first, then the bots.
    pub actors: Vec<ActorSnapshot>,
    pub finish_order: Vec<FinishEntry>,
    pub survivor_count: u32,
    /// Player's live rank estimate for the HUD.
    pub player_rank: usize,
}

/// One contestant's row in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub display_name: String,
    pub color: ContestantColor,
    pub position: f32,
    /// Fraction of the course covered, for progress bars.
    pub progress: f32,
    pub status: ActorStatus,
    pub moving: bool,
}

/// The standard lineup: the player plus five bots.
pub fn default_lineup() -> Vec<Contestant> {
    let mut lineup = vec![Contestant::player(0, "YOU")];
    lineup.extend((0..5).map(|i| Contestant::bot(i + 1, i as usize)));
    lineup
}

/// The red light / green light race.
pub struct StoplightSprint {
    state: SprintState,
    lineup: Vec<Contestant>,
    /// Lineup order, for deterministic per-tick iteration.
    runner_ids: Vec<ActorId>,
    player_id: Option<ActorId>,
    rng: StdRng,
    game_config: SprintConfig,
}

impl StoplightSprint {
    pub fn new() -> Self {
        Self::with_config(SprintConfig::load())
    }

    pub fn with_config(config: SprintConfig) -> Self {
        Self {
            state: SprintState::idle(),
            lineup: Vec::new(),
            runner_ids: Vec::new(),
            player_id: None,
            rng: StdRng::from_os_rng(),
            game_config: config,
        }
    }

    pub fn state(&self) -> &SprintState {
        &self.state
    }

    pub fn config(&self) -> &SprintConfig {
        &self.game_config
    }

    pub fn outcome(&self) -> Option<&RaceOutcome> {
        self.state.outcome.as_ref()
    }

    /// Per-tick view for the rendering shell.
    pub fn snapshot(&self) -> RaceSnapshot {
        RaceSnapshot {
            session: self.state.session,
            phase: self.state.signal.phase,
            elapsed_ticks: self.state.elapsed_ticks,
            actors: self
                .lineup
                .iter()
                .filter_map(|entry| {
                    let runner = self.state.runners.get(&entry.id)?;
                    Some(ActorSnapshot {
                        id: entry.id,
                        display_name: entry.display_name.clone(),
                        color: entry.color,
                        position: runner.position,
                        progress: movement::progress(runner.position, &self.game_config),
                        status: runner.status,
                        moving: runner.moving,
                    })
                })
                .collect(),
            finish_order: self.state.board.entries().to_vec(),
            survivor_count: self.state.board.survivors(),
            player_rank: resolver::live_rank(
                &self.state.runners,
                self.player_id,
                self.state.board.finish_count(),
                self.runner_ids.len(),
            ),
        }
    }

    fn active_bot_count(&self) -> usize {
        self.runner_ids
            .iter()
            .filter(|id| {
                self.state
                    .runners
                    .get(id)
                    .is_some_and(|r| !r.is_player && r.status == ActorStatus::Active)
            })
            .count()
    }

    fn active_count(&self) -> usize {
        self.runner_ids
            .iter()
            .filter(|id| {
                self.state
                    .runners
                    .get(id)
                    .is_some_and(|r| r.status == ActorStatus::Active)
            })
            .count()
    }

    /// Cross the line: record the finish and settle the runner. Safe to
    /// call again for the same runner; repeats change nothing.
    fn finish_runner(&mut self, id: ActorId, events: &mut Vec<GameEvent>) {
        let tick = self.state.elapsed_ticks;
        let Some(runner) = self.state.runners.get_mut(&id) else {
            return;
        };
        if runner.status != ActorStatus::Active {
            return;
        }
        let Some(placement) = self.state.board.record_finish(id, tick) else {
            return;
        };
        runner.status = ActorStatus::Finished;
        runner.moving = false;
        runner.misstep_in = None;
        runner.finish_tick = Some(tick);
        events.push(GameEvent::ActorFinished { actor: id, placement });
    }

    /// Take a runner off the track. Safe to call again; an already
    /// settled runner stays as it is.
    fn eliminate_runner(&mut self, id: ActorId, events: &mut Vec<GameEvent>) {
        let was_player = {
            let Some(runner) = self.state.runners.get_mut(&id) else {
                return;
            };
            if runner.status != ActorStatus::Active {
                return;
            }
            runner.status = ActorStatus::Eliminated;
            runner.moving = false;
            runner.misstep_in = None;
            runner.is_player
        };
        self.state.board.record_elimination();
        events.push(GameEvent::ActorEliminated { actor: id });

        // Survival by default: the last rival fell before anyone crossed,
        // so the player takes the finish at the current tick.
        if !was_player
            && self.state.board.finish_count() == 0
            && self.active_bot_count() == 0
            && let Some(player_id) = self.player_id
            && self
                .state
                .runners
                .get(&player_id)
                .is_some_and(|r| r.status == ActorStatus::Active)
        {
            self.finish_runner(player_id, events);
        }
    }

    /// An end condition holds: podium full, track empty, or the player
    /// caught moving.
    fn race_settled(&self) -> bool {
        let player_out = self
            .player_id
            .and_then(|id| self.state.runners.get(&id))
            .is_some_and(|r| r.status == ActorStatus::Eliminated);
        player_out
            || self
                .state
                .board
                .should_end(self.active_count(), self.game_config.podium_size)
    }

    /// Resolve the outcome and close the session. Stale once the session
    /// has left Running.
    fn settle_session(&mut self, events: &mut Vec<GameEvent>) {
        if self.state.session != SessionState::Running {
            return;
        }
        let outcome = resolver::resolve(
            &self.state.board,
            self.player_id,
            &self.state.runners,
            self.state.elapsed_ticks,
            self.game_config.podium_size,
        );
        self.state.session = SessionState::Ended;
        self.state.outcome = Some(outcome.clone());
        events.push(GameEvent::SessionEnded { outcome });
    }
}

impl Default for StoplightSprint {
    fn default() -> Self {
        Self::with_config(SprintConfig::default())
    }
}

impl StoplightGame for StoplightSprint {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Stoplight Sprint".to_string(),
            description: "Dash on green, freeze on red. First three across the line advance."
                .to_string(),
            contestant_count: 6,
            estimated_duration: Duration::from_secs(60),
        }
    }

    fn begin(&mut self, lineup: &[Contestant], config: &GameConfig) {
        if self.state.session != SessionState::Instructions {
            tracing::debug!(state = ?self.state.session, "Ignored begin outside Instructions");
            return;
        }
        if let Some(seed) = config.seed() {
            self.rng = StdRng::seed_from_u64(seed);
        }

        self.lineup.clear();
        self.runner_ids.clear();
        let start = self.game_config.start_line();
        let mut runners = HashMap::new();
        for entry in lineup {
            if runners.contains_key(&entry.id) {
                tracing::debug!(actor = entry.id, "Dropped duplicate lineup entry");
                continue;
            }
            let runner = if entry.is_player {
                RunnerState::player(start)
            } else {
                RunnerState::bot(start, bot::sample_profile(&mut self.rng, &self.game_config))
            };
            runners.insert(entry.id, runner);
            self.runner_ids.push(entry.id);
            self.lineup.push(entry.clone());
        }
        self.player_id = self.lineup.iter().find(|c| c.is_player).map(|c| c.id);
        if self.player_id.is_none() {
            tracing::warn!("Lineup has no player entry; the race runs unmanned");
        }

        self.state = SprintState {
            session: SessionState::Running,
            signal: SignalTimer::start(&mut self.rng, &self.game_config),
            elapsed_ticks: 0,
            runners,
            board: RaceBoard::new(self.runner_ids.len() as u32),
            end_countdown: None,
            outcome: None,
        };
    }

    fn tick(&mut self) -> Vec<GameEvent> {
        if self.state.session != SessionState::Running {
            return Vec::new();
        }
        let dt = self.game_config.tick_seconds;
        self.state.elapsed_ticks += 1;
        let mut events = Vec::new();

        // Signal schedule, plus the violation sweep once its grace ran
        // out: every Active runner still holding the move intent is out.
        let signal = self.state.signal.tick(dt, &mut self.rng, &self.game_config);
        if signal.sweep_due {
            let caught: Vec<ActorId> = self
                .runner_ids
                .iter()
                .copied()
                .filter(|id| {
                    self.state
                        .runners
                        .get(id)
                        .is_some_and(|r| r.status == ActorStatus::Active && r.moving)
                })
                .collect();
            for id in caught {
                self.eliminate_runner(id, &mut events);
            }
        }

        // Scheduled blunder eliminations that came due.
        let mut due = Vec::new();
        for id in &self.runner_ids {
            if let Some(runner) = self.state.runners.get_mut(id)
                && let Some(left) = runner.misstep_in.as_mut()
            {
                *left -= dt;
                if *left <= 0.0 {
                    runner.misstep_in = None;
                    due.push(*id);
                }
            }
        }
        for id in due {
            self.eliminate_runner(id, &mut events);
        }

        // One consistent simulation step: intent and movement for every
        // runner, in lineup order, before any ranking consumer reads
        // positions.
        let phase = self.state.signal.phase;
        let ids = self.runner_ids.clone();
        for id in ids {
            let crossed = {
                let Some(runner) = self.state.runners.get_mut(&id) else {
                    continue;
                };
                if runner.status != ActorStatus::Active {
                    continue;
                }
                if !runner.is_player {
                    match bot::decide(phase, runner.risk, &mut self.rng, &self.game_config) {
                        BotMove::Hold => runner.moving = false,
                        BotMove::Advance => runner.moving = true,
                        BotMove::Blunder => {
                            runner.moving = true;
                            // Keep the earliest pending blunder.
                            if runner.misstep_in.is_none() {
                                runner.misstep_in = Some(self.game_config.misstep_delay);
                            }
                        },
                    }
                }
                movement::advance(runner, phase, &self.game_config)
            };
            if crossed {
                self.finish_runner(id, &mut events);
            }
        }

        // End-of-race bookkeeping. The simulation keeps running through
        // the display delay, so late finishers still get a placement.
        if self.state.end_countdown.is_none() && self.race_settled() {
            self.state.end_countdown = Some(self.game_config.end_display_delay);
        }
        if let Some(left) = self.state.end_countdown.as_mut() {
            *left -= dt;
            if *left <= 0.0 {
                self.state.end_countdown = None;
                self.settle_session(&mut events);
            }
        }

        events
    }

    fn set_player_intent(&mut self, moving: bool) {
        if self.state.session != SessionState::Running {
            tracing::debug!(moving, "Dropped player intent outside a running session");
            return;
        }
        let Some(runner) = self.player_id.and_then(|id| self.state.runners.get_mut(&id)) else {
            return;
        };
        if runner.status != ActorStatus::Active {
            tracing::debug!(moving, "Dropped player intent for a settled runner");
            return;
        }
        runner.moving = moving;
    }

    fn restart(&mut self) {
        let start = self.game_config.start_line();
        for runner in self.state.runners.values_mut() {
            runner.reset(start);
        }
        self.state.session = SessionState::Instructions;
        self.state.signal = SignalTimer::default();
        self.state.elapsed_ticks = 0;
        self.state.board = RaceBoard::new(self.runner_ids.len() as u32);
        self.state.end_countdown = None;
        self.state.outcome = None;
    }

    fn session_state(&self) -> SessionState {
        self.state.session
    }

    fn tick_period(&self) -> Duration {
        Duration::from_secs_f32(self.game_config.tick_seconds)
    }

    fn final_standings(&self) -> Vec<Standing> {
        self.lineup
            .iter()
            .filter_map(|entry| {
                let runner = self.state.runners.get(&entry.id)?;
                Some(Standing {
                    actor: entry.id,
                    status: runner.status,
                    placement: self.state.board.placement_of(entry.id),
                    finish_tick: runner.finish_tick,
                })
            })
            .collect()
    }
}
