use std::fmt;

/// Identifies a player and the boxes it may push. Always an upper-case ASCII letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(u8);

pub const MAX_OWNERS: usize = 26;

impl OwnerId {
    /// Build an owner from either case of its letter. Returns None for non-letters.
    pub fn from_letter(ch: char) -> Option<OwnerId> {
        if ch.is_ascii_alphabetic() {
            Some(OwnerId(ch.to_ascii_uppercase() as u8))
        } else {
            None
        }
    }

    /// The upper-case letter used for this owner's player.
    pub fn player_char(self) -> char {
        self.0 as char
    }

    /// The lower-case letter used for this owner's boxes.
    pub fn box_char(self) -> char {
        self.0.to_ascii_lowercase() as char
    }

    /// 0 for `A`, 25 for `Z`.
    pub fn index(self) -> usize {
        (self.0 - b'A') as usize
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.player_char())
    }
}

/// What occupies a cell. Destinations are not entities; they are tracked separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Wall,
    Empty,
    Player(OwnerId),
    Box(OwnerId),
}

impl Entity {
    pub fn owner(&self) -> Option<OwnerId> {
        match self {
            Entity::Player(id) | Entity::Box(id) => Some(*id),
            Entity::Wall | Entity::Empty => None,
        }
    }

    pub fn is_box(&self) -> bool {
        matches!(self, Entity::Box(_))
    }

    pub fn is_player(&self) -> bool {
        matches!(self, Entity::Player(_))
    }

    /// True if something can be moved onto this cell.
    pub fn is_passable(&self) -> bool {
        match self {
            Entity::Empty => true,
            Entity::Wall | Entity::Player(_) | Entity::Box(_) => false,
        }
    }
}
