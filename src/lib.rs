//! Multi-player box-pushing puzzle engine.
//!
//! Levels are parsed into an immutable [`LevelMap`]; each session plays on its
//! own [`PlayState`], which records relocations into checkpointed transitions
//! so whole turns can be undone.

pub mod entity;
pub mod error;
pub mod level;
pub mod position;
pub mod rules;
pub mod state;
pub mod transition;

pub use entity::{Entity, OwnerId};
pub use error::{LevelError, LookupError, MoveError, ParseError, UndoError};
pub use level::{LevelMap, UndoLimit};
pub use position::{Direction, Position};
pub use rules::{Step, step};
pub use state::{PlayState, UndoQuota};
pub use transition::{Relocation, Transition};
