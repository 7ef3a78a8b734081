use log::{debug, warn};

use crate::entity::{Entity, OwnerId};
use crate::error::MoveError;
use crate::position::Direction;
use crate::state::PlayState;

/// What a successful step did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Walked,
    Pushed,
}

/// Move `player` one cell in `dir`, pushing its own box if one is in the way.
///
/// A legal step is committed as exactly one checkpoint. An illegal step leaves
/// the board untouched. Rules:
/// - walls and other players block
/// - a box can only be pushed by the player with the same owner
/// - a box can only be pushed into an empty cell
pub fn step(state: &mut PlayState, player: OwnerId, dir: Direction) -> Result<Step, MoveError> {
    let result = try_step(state, player, dir);
    match &result {
        Ok(step) => debug!("[Rules] {} {} -> {:?}", player, dir, step),
        Err(err) => warn!("[Rules] {} {} rejected: {}", player, dir, err),
    }
    result
}

fn try_step(state: &mut PlayState, player: OwnerId, dir: Direction) -> Result<Step, MoveError> {
    let from = state.player_position(player)?;
    let to = from.step(dir);
    if !state.contains(to) {
        return Err(MoveError::OutOfBounds { from, dir });
    }

    match state.entity(to) {
        Entity::Empty => {
            state.move_entity(from, to);
            state.checkpoint();
            Ok(Step::Walked)
        }
        Entity::Box(owner) if owner == player => {
            let beyond = to.step(dir);
            if !state.entity(beyond).is_passable() {
                return Err(MoveError::Blocked { at: beyond });
            }
            state.move_entity(to, beyond);
            state.move_entity(from, to);
            state.checkpoint();
            Ok(Step::Pushed)
        }
        Entity::Box(owner) => Err(MoveError::ForeignBox {
            player,
            owner,
            at: to,
        }),
        Entity::Wall | Entity::Player(_) => Err(MoveError::Blocked { at: to }),
    }
}
