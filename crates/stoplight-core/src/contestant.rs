use serde::{Deserialize, Serialize};

use crate::game_trait::ActorId;

/// A contestant entered into a race session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contestant {
    pub id: ActorId,
    pub display_name: String,
    pub color: ContestantColor,
    /// Exactly one lineup entry should be the human player.
    pub is_player: bool,
}

impl Contestant {
    /// The human player's lineup entry.
    pub fn player(id: ActorId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            color: ContestantColor::PALETTE[0],
            is_player: true,
        }
    }

    /// A computer opponent, named and colored by its index.
    pub fn bot(id: ActorId, index: usize) -> Self {
        let palette = ContestantColor::PALETTE;
        Self {
            id,
            display_name: format!("Bot {}", index + 1),
            color: palette[(index + 1) % palette.len()],
            is_player: false,
        }
    }
}

/// Avatar color, read by the rendering shell from snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestantColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for ContestantColor {
    fn default() -> Self {
        Self::PALETTE[0]
    }
}

impl ContestantColor {
    /// Predefined palette; the player takes the first entry, bots cycle
    /// through the rest.
    pub const PALETTE: &[ContestantColor] = &[
        ContestantColor {
            r: 46,
            g: 213,
            b: 115,
        }, // Green
        ContestantColor {
            r: 255,
            g: 87,
            b: 87,
        }, // Red
        ContestantColor {
            r: 78,
            g: 205,
            b: 196,
        }, // Teal
        ContestantColor {
            r: 255,
            g: 195,
            b: 18,
        }, // Yellow
        ContestantColor {
            r: 130,
            g: 88,
            b: 255,
        }, // Purple
        ContestantColor {
            r: 83,
            g: 152,
            b: 255,
        }, // Blue
    ];
}
