use std::collections::HashSet;
use std::fmt;
use std::mem;

use arrayvec::ArrayVec;
use log::{debug, warn};

use crate::entity::{Entity, MAX_OWNERS, OwnerId};
use crate::error::{LookupError, UndoError};
use crate::level::{Layout, LevelMap, UndoLimit};
use crate::position::Position;
use crate::transition::Transition;

/// Undos left in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoQuota {
    Unlimited,
    Remaining(u64),
}

impl From<UndoLimit> for UndoQuota {
    fn from(limit: UndoLimit) -> Self {
        match limit {
            UndoLimit::Unlimited => UndoQuota::Unlimited,
            UndoLimit::Disabled => UndoQuota::Remaining(0),
            UndoLimit::Fixed(n) => UndoQuota::Remaining(n),
        }
    }
}

/// The live board of one play session.
///
/// Starts as a copy of a [`LevelMap`] and is never written back to it. Moves
/// are applied without any legality checks; callers decide what is legal.
/// Moves accumulate in an in-progress transition until [`PlayState::checkpoint`]
/// commits them as one undoable turn.
#[derive(Debug, Clone)]
pub struct PlayState {
    layout: Layout,
    destinations: HashSet<Position>,
    quota: UndoQuota,
    history: Vec<Transition>,
    current: Transition,
}

impl PlayState {
    pub fn new(level: &LevelMap) -> Self {
        PlayState {
            layout: level.layout().clone(),
            destinations: level.destinations().clone(),
            quota: level.undo_limit().into(),
            history: Vec::new(),
            current: Transition::new(),
        }
    }

    pub fn entity(&self, pos: Position) -> Entity {
        self.layout.get(pos)
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.layout.contains(pos)
    }

    pub fn width(&self) -> usize {
        self.layout.width()
    }

    pub fn height(&self) -> usize {
        self.layout.height()
    }

    pub fn player_position(&self, id: OwnerId) -> Result<Position, LookupError> {
        self.layout
            .iter()
            .find(|&(_, entity)| entity == Entity::Player(id))
            .map(|(pos, _)| pos)
            .ok_or(LookupError::PlayerNotFound(id))
    }

    /// Every player on the board with its position, in letter order.
    pub fn player_positions(&self) -> ArrayVec<(OwnerId, Position), MAX_OWNERS> {
        let mut players: ArrayVec<(OwnerId, Position), MAX_OWNERS> = self
            .layout
            .iter()
            .filter_map(|(pos, entity)| match entity {
                Entity::Player(id) => Some((id, pos)),
                Entity::Wall | Entity::Empty | Entity::Box(_) => None,
            })
            .take(MAX_OWNERS)
            .collect();
        players.sort_unstable_by_key(|&(id, _)| id);
        players
    }

    pub fn destinations(&self) -> &HashSet<Position> {
        &self.destinations
    }

    pub fn is_destination(&self, pos: Position) -> bool {
        self.destinations.contains(&pos)
    }

    pub fn undo_quota(&self) -> UndoQuota {
        self.quota
    }

    /// Number of committed turns available to undo.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Moves made since the last checkpoint.
    pub fn in_progress(&self) -> &Transition {
        &self.current
    }

    /// Relocate whatever occupies `from` to `to`, leaving `from` Empty.
    ///
    /// No validation happens here: the caller must already have established
    /// that the move is legal.
    pub fn move_entity(&mut self, from: Position, to: Position) {
        let entity = self.layout.get(from);
        self.layout.set(from, Entity::Empty);
        self.layout.set(to, entity);
        self.current.record(from, to);
    }

    /// Commit the in-progress moves as one undoable turn.
    pub fn checkpoint(&mut self) {
        if self.current.is_empty() {
            debug!("[PlayState] checkpoint with no pending moves ignored");
            return;
        }
        let turn = mem::take(&mut self.current);
        debug!(
            "[PlayState] checkpoint #{} ({} relocations)",
            self.history.len() + 1,
            turn.len()
        );
        self.history.push(turn);
    }

    /// Revert the most recent committed turn. Moves made since the last
    /// checkpoint are reverted first, as part of the same undo.
    ///
    /// Returns `Ok(false)` when there was nothing to revert; no quota is spent
    /// in that case. Fails without touching the board when the quota is used up.
    pub fn undo(&mut self) -> Result<bool, UndoError> {
        if self.quota == UndoQuota::Remaining(0) {
            warn!("[PlayState] undo refused: quota exhausted");
            return Err(UndoError::QuotaExhausted);
        }

        let pending = mem::take(&mut self.current);
        let turn = self.history.pop().unwrap_or_default();
        if pending.is_empty() && turn.is_empty() {
            debug!("[PlayState] undo with nothing to revert");
            return Ok(false);
        }

        // Pending moves sit on top of the committed turn, so they go first
        self.apply(&pending.reversed());
        self.apply(&turn.reversed());
        if let UndoQuota::Remaining(n) = &mut self.quota {
            *n = n.saturating_sub(1);
        }
        debug!(
            "[PlayState] undid {} relocations, quota now {:?}",
            pending.len() + turn.len(),
            self.quota
        );
        Ok(true)
    }

    /// True when every destination currently holds a box, whoever owns it.
    pub fn is_win(&self) -> bool {
        self.destinations
            .iter()
            .all(|&pos| self.layout.get(pos).is_box())
    }

    /// Apply all relocations at once: lift every source, clear them, then drop
    /// each entity at its target. Order of the records does not matter.
    fn apply(&mut self, turn: &Transition) {
        let lifted: Vec<(Position, Entity)> = turn
            .iter()
            .map(|r| (r.to, self.layout.get(r.from)))
            .collect();
        for r in turn {
            self.layout.set(r.from, Entity::Empty);
        }
        for (to, entity) in lifted {
            self.layout.set(to, entity);
        }
    }
}

impl fmt::Display for PlayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height() {
            let mut line = String::with_capacity(self.width());
            for x in 0..self.width() {
                let pos = Position::new(x as i32, y as i32);
                let ch = match self.layout.get(pos) {
                    Entity::Wall => '#',
                    Entity::Player(id) => id.player_char(),
                    Entity::Box(id) => id.box_char(),
                    Entity::Empty if self.is_destination(pos) => '@',
                    Entity::Empty => '.',
                };
                line.push(ch);
            }
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
