use std::io;

use thiserror::Error;

use crate::entity::OwnerId;
use crate::position::{Direction, Position};

/// Structural problems found while parsing level text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing undo limit line")]
    MissingUndoLimit,
    #[error("invalid undo limit '{0}' (expected an integer >= -1)")]
    InvalidUndoLimit(String),
    #[error("invalid character '{ch}' at position ({x}, {y})")]
    InvalidCharacter { ch: char, x: usize, y: usize },
    #[error("player {0} appears more than once")]
    DuplicatePlayer(OwnerId),
    #[error("no players found on board")]
    NoPlayers,
    #[error("box count ({boxes}) does not match destination count ({destinations})")]
    BoxDestinationMismatch { boxes: usize, destinations: usize },
    #[error("box '{}' has no matching player", .0.box_char())]
    BoxWithoutPlayer(OwnerId),
    #[error("player {0} has no box")]
    PlayerWithoutBox(OwnerId),
}

/// Error type for loading a level from disk.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid level: {0}")]
    Parse(#[from] ParseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UndoError {
    #[error("no undos remaining")]
    QuotaExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("player {0} not found")]
    PlayerNotFound(OwnerId),
}

/// Reasons the rules layer refuses a step. The board is untouched in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error(transparent)]
    UnknownPlayer(#[from] LookupError),
    #[error("moving {dir} from {from} leaves the board")]
    OutOfBounds { from: Position, dir: Direction },
    #[error("{at} is blocked")]
    Blocked { at: Position },
    #[error("player {player} cannot push box '{}' at {at}", .owner.box_char())]
    ForeignBox {
        player: OwnerId,
        owner: OwnerId,
        at: Position,
    },
}
