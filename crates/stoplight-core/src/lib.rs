pub mod contestant;
pub mod game_trait;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::contestant::Contestant;
    use crate::game_trait::{ActorId, GameConfig, GameEvent, SessionState, StoplightGame};

    /// One player ("YOU") plus `bot_count` bots with sequential ids.
    pub fn make_lineup(bot_count: usize) -> Vec<Contestant> {
        let mut lineup = vec![Contestant::player(0, "YOU")];
        lineup.extend((0..bot_count).map(|i| Contestant::bot(i as ActorId + 1, i)));
        lineup
    }

    /// GameConfig carrying a fixed RNG seed for deterministic runs.
    pub fn seeded_config(seed: u64) -> GameConfig {
        GameConfig::with_seed(seed)
    }

    /// Run `n` ticks, returning all accumulated events.
    pub fn run_ticks(game: &mut dyn StoplightGame, n: usize) -> Vec<GameEvent> {
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(game.tick());
        }
        all_events
    }

    // ================================================================
    // Game Trait Contract Tests
    // ================================================================
    // A generic suite every StoplightGame implementation must pass. Game
    // crates call these from their own #[cfg(test)] modules with a
    // concrete game instance.

    /// begin() with a lineup must enter Running and produce one standing
    /// per contestant.
    pub fn contract_begin_enters_running(game: &mut dyn StoplightGame, bot_count: usize) {
        let lineup = make_lineup(bot_count);
        game.begin(&lineup, &seeded_config(7));
        assert_eq!(game.session_state(), SessionState::Running);
        assert_eq!(
            game.final_standings().len(),
            lineup.len(),
            "one standing per lineup entry"
        );
    }

    /// A tick before begin() is a stale callback: no events, no state
    /// transition.
    pub fn contract_tick_before_begin_is_noop(game: &mut dyn StoplightGame) {
        assert_eq!(game.session_state(), SessionState::Instructions);
        let events = game.tick();
        assert!(events.is_empty(), "stale tick must emit nothing");
        assert_eq!(game.session_state(), SessionState::Instructions);
    }

    /// restart() must return to Instructions from a running session, and
    /// ticks afterwards must be no-ops.
    pub fn contract_restart_resets(game: &mut dyn StoplightGame, bot_count: usize) {
        game.begin(&make_lineup(bot_count), &seeded_config(7));
        run_ticks(game, 50);
        game.restart();
        assert_eq!(game.session_state(), SessionState::Instructions);
        assert!(game.tick().is_empty(), "tick after restart must be stale");
    }

    /// Standings must cover the lineup with unique actor ids.
    pub fn contract_standings_cover_lineup(game: &mut dyn StoplightGame, bot_count: usize) {
        let lineup = make_lineup(bot_count);
        game.begin(&lineup, &seeded_config(7));
        let standings = game.final_standings();
        assert_eq!(standings.len(), lineup.len());
        for entry in &lineup {
            assert_eq!(
                standings.iter().filter(|s| s.actor == entry.id).count(),
                1,
                "exactly one standing for actor {}",
                entry.id
            );
        }
    }

    /// A player holding the move intent through every signal must reach a
    /// terminal session state (they get caught on the first stop sweep),
    /// ending with a SessionEnded event.
    pub fn contract_session_eventually_ends(
        game: &mut dyn StoplightGame,
        bot_count: usize,
        max_ticks: usize,
    ) {
        game.begin(&make_lineup(bot_count), &seeded_config(42));
        let mut saw_ended_event = false;
        for _ in 0..max_ticks {
            game.set_player_intent(true);
            let events = game.tick();
            saw_ended_event |= events
                .iter()
                .any(|e| matches!(e, GameEvent::SessionEnded { .. }));
            if game.session_state() == SessionState::Ended {
                assert!(saw_ended_event, "Ended state must come with its event");
                return;
            }
        }
        panic!("session must end within {max_ticks} ticks");
    }
}
