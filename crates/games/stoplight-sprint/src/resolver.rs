use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use stoplight_core::game_trait::{ActorId, ActorStatus, LossReason, RaceOutcome};

use crate::movement::RunnerState;

/// One finisher, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishEntry {
    pub actor: ActorId,
    pub tick: u64,
}

/// Finish and survival bookkeeping for one race.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceBoard {
    entries: Vec<FinishEntry>,
    survivors: u32,
    total: u32,
}

impl RaceBoard {
    pub fn new(total: u32) -> Self {
        Self {
            entries: Vec::new(),
            survivors: total,
            total,
        }
    }

    /// Append a finisher and return the 1-based placement. A repeated
    /// recording changes nothing and returns None.
    pub fn record_finish(&mut self, actor: ActorId, tick: u64) -> Option<usize> {
        if self.entries.iter().any(|e| e.actor == actor) {
            return None;
        }
        if self.entries.len() as u32 >= self.total {
            return None;
        }
        self.entries.push(FinishEntry { actor, tick });
        Some(self.entries.len())
    }

    /// One elimination happened somewhere on the track.
    pub fn record_elimination(&mut self) {
        self.survivors = self.survivors.saturating_sub(1);
    }

    pub fn finish_count(&self) -> usize {
        self.entries.len()
    }

    pub fn survivors(&self) -> u32 {
        self.survivors
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn entries(&self) -> &[FinishEntry] {
        &self.entries
    }

    /// 1-based placement, if the actor finished.
    pub fn placement_of(&self, actor: ActorId) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.actor == actor)
            .map(|i| i + 1)
    }

    /// The race is over when the podium is full, or when somebody has
    /// finished and nobody left on the track can still join them. The
    /// second clause keeps a race from hanging open once e.g. the first
    /// finisher crosses and every remaining runner is then eliminated.
    pub fn should_end(&self, active_count: usize, podium: usize) -> bool {
        self.entries.len() >= podium || (active_count == 0 && !self.entries.is_empty())
    }
}

/// Final outcome for the player, computed once when the session ends.
pub fn resolve(
    board: &RaceBoard,
    player: Option<ActorId>,
    runners: &HashMap<ActorId, RunnerState>,
    elapsed_ticks: u64,
    podium: usize,
) -> RaceOutcome {
    let runner = player.and_then(|id| runners.get(&id));
    let final_position = runner.map_or(0.0, |r| r.position);
    let placement = player.and_then(|id| board.placement_of(id));

    match placement {
        Some(p) if p <= podium => RaceOutcome {
            won: true,
            reason: None,
            placement: p,
            elapsed_ticks,
            final_position,
        },
        other => {
            let eliminated = runner.is_some_and(|r| r.status == ActorStatus::Eliminated);
            let reason = if eliminated {
                LossReason::MovedOnStop
            } else {
                LossReason::NotTopThree
            };
            RaceOutcome {
                won: false,
                reason: Some(reason),
                placement: other.unwrap_or(board.total().max(1) as usize),
                elapsed_ticks,
                final_position,
            }
        },
    }
}

/// Player's live rank estimate for the HUD: standing among non-eliminated
/// runners by position, shifted by the finished count, capped at the
/// lineup size. An eliminated player ranks last.
pub fn live_rank(
    runners: &HashMap<ActorId, RunnerState>,
    player: Option<ActorId>,
    finished: usize,
    total: usize,
) -> usize {
    let Some(me) = player.and_then(|id| runners.get(&id)) else {
        return total;
    };
    if me.status == ActorStatus::Eliminated {
        return total;
    }
    let ahead = runners
        .values()
        .filter(|r| r.status != ActorStatus::Eliminated && r.position > me.position)
        .count();
    (ahead + 1 + finished).min(total)
}
