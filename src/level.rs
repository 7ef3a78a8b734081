use std::collections::HashSet;
use std::fs;
use std::num::IntErrorKind;
use std::path::Path;
use std::str::FromStr;

use arrayvec::ArrayVec;

use crate::entity::{Entity, MAX_OWNERS, OwnerId};
use crate::error::{LevelError, ParseError};
use crate::position::Position;

/// How many undos a level allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoLimit {
    Unlimited,
    Disabled,
    Fixed(u64),
}

impl UndoLimit {
    fn from_line(line: &str) -> Result<Self, ParseError> {
        let text = line.trim();
        if let Ok(n) = text.parse::<u64>() {
            return Ok(if n == 0 {
                UndoLimit::Disabled
            } else {
                UndoLimit::Fixed(n)
            });
        }
        match text.parse::<i64>() {
            Ok(-1) => Ok(UndoLimit::Unlimited),
            // Larger than any count a session could spend
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(UndoLimit::Fixed(u64::MAX)),
            _ => Err(ParseError::InvalidUndoLimit(line.to_string())),
        }
    }
}

/// Dense row-major entity grid shared by the level and the live play state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Layout {
    width: usize,
    height: usize,
    cells: Vec<Entity>,
}

impl Layout {
    fn new(width: usize, height: usize) -> Self {
        Layout {
            width,
            height,
            cells: vec![Entity::Empty; width * height],
        }
    }

    pub(crate) fn width(&self) -> usize {
        self.width
    }

    pub(crate) fn height(&self) -> usize {
        self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        let (x, y) = (usize::try_from(pos.x).ok()?, usize::try_from(pos.y).ok()?);
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    pub(crate) fn contains(&self, pos: Position) -> bool {
        self.index(pos).is_some()
    }

    /// Anything outside the grid reads as a wall.
    pub(crate) fn get(&self, pos: Position) -> Entity {
        self.index(pos).map_or(Entity::Wall, |idx| self.cells[idx])
    }

    /// Writes outside the grid are ignored.
    pub(crate) fn set(&mut self, pos: Position, entity: Entity) {
        if let Some(idx) = self.index(pos) {
            self.cells[idx] = entity;
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (Position, Entity)> + '_ {
        self.cells.iter().enumerate().map(|(idx, &entity)| {
            let pos = Position::new((idx % self.width) as i32, (idx / self.width) as i32);
            (pos, entity)
        })
    }
}

/// An immutable, validated level: the starting layout, its destinations and its undo limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelMap {
    layout: Layout,
    destinations: HashSet<Position>,
    undo_limit: UndoLimit,
    player_ids: ArrayVec<OwnerId, MAX_OWNERS>,
}

impl LevelMap {
    /// Parse a level from text.
    ///
    /// The first line is the undo limit: `-1` for unlimited, `0` for none,
    /// `n > 0` for exactly `n` undos. The remaining lines form the grid:
    /// - `#` = Wall
    /// - `.` = Empty
    /// - `@` = Destination (empty until a box covers it)
    /// - `A`-`Z` = Player owned by that letter
    /// - `a`-`z` = Box owned by the upper-case form of that letter
    ///
    /// Short rows are padded with Empty. Either the whole level validates or
    /// an error is returned.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut lines = text.lines();
        let undo_limit = UndoLimit::from_line(lines.next().ok_or(ParseError::MissingUndoLimit)?)?;

        let mut rows: Vec<&str> = lines.collect();
        while rows.last().is_some_and(|row| row.is_empty()) {
            rows.pop();
        }

        let height = rows.len();
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);

        let mut layout = Layout::new(width, height);
        let mut destinations = HashSet::new();
        let mut players = [false; MAX_OWNERS];
        let mut boxes = [false; MAX_OWNERS];
        let mut box_count = 0;

        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let pos = Position::new(x as i32, y as i32);
                match ch {
                    '#' => layout.set(pos, Entity::Wall),
                    '.' => {}
                    '@' => {
                        destinations.insert(pos);
                    }
                    'A'..='Z' | 'a'..='z' => {
                        let Some(owner) = OwnerId::from_letter(ch) else {
                            return Err(ParseError::InvalidCharacter { ch, x, y });
                        };
                        if ch.is_ascii_uppercase() {
                            if players[owner.index()] {
                                return Err(ParseError::DuplicatePlayer(owner));
                            }
                            players[owner.index()] = true;
                            layout.set(pos, Entity::Player(owner));
                        } else {
                            boxes[owner.index()] = true;
                            box_count += 1;
                            layout.set(pos, Entity::Box(owner));
                        }
                    }
                    _ => return Err(ParseError::InvalidCharacter { ch, x, y }),
                }
            }
        }

        let player_ids: ArrayVec<OwnerId, MAX_OWNERS> = (b'A'..=b'Z')
            .filter_map(|letter| OwnerId::from_letter(letter as char))
            .filter(|owner| players[owner.index()])
            .collect();

        if player_ids.is_empty() {
            return Err(ParseError::NoPlayers);
        }

        if box_count != destinations.len() {
            return Err(ParseError::BoxDestinationMismatch {
                boxes: box_count,
                destinations: destinations.len(),
            });
        }

        for letter in b'A'..=b'Z' {
            let Some(owner) = OwnerId::from_letter(letter as char) else {
                continue;
            };
            match (players[owner.index()], boxes[owner.index()]) {
                (false, true) => return Err(ParseError::BoxWithoutPlayer(owner)),
                (true, false) => return Err(ParseError::PlayerWithoutBox(owner)),
                _ => {}
            }
        }

        Ok(LevelMap {
            layout,
            destinations,
            undo_limit,
            player_ids,
        })
    }

    /// Read and parse a level file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let contents = fs::read_to_string(path)?;
        Ok(Self::parse(&contents)?)
    }

    /// The starting entity at `pos`. Empty for unassigned cells, Wall outside the board.
    pub fn entity(&self, pos: Position) -> Entity {
        self.layout.get(pos)
    }

    pub fn destinations(&self) -> &HashSet<Position> {
        &self.destinations
    }

    pub fn is_destination(&self, pos: Position) -> bool {
        self.destinations.contains(&pos)
    }

    pub fn undo_limit(&self) -> UndoLimit {
        self.undo_limit
    }

    pub fn width(&self) -> usize {
        self.layout.width()
    }

    pub fn height(&self) -> usize {
        self.layout.height()
    }

    /// Owners that have a player, in letter order.
    pub fn player_ids(&self) -> &[OwnerId] {
        &self.player_ids
    }

    /// Always equal to the number of destinations.
    pub fn box_count(&self) -> usize {
        self.destinations.len()
    }

    pub(crate) fn layout(&self) -> &Layout {
        &self.layout
    }
}

impl FromStr for LevelMap {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LevelMap::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(ch: char) -> OwnerId {
        OwnerId::from_letter(ch).unwrap()
    }

    #[test]
    fn test_parse_basic_level() {
        let level = LevelMap::parse("-1\n####\n#A@#\n#a.#\n####\n").unwrap();

        assert_eq!(level.width(), 4);
        assert_eq!(level.height(), 4);
        assert_eq!(level.undo_limit(), UndoLimit::Unlimited);
        assert_eq!(level.entity(Position::new(1, 1)), Entity::Player(owner('A')));
        assert_eq!(level.entity(Position::new(1, 2)), Entity::Box(owner('A')));
        assert_eq!(level.entity(Position::new(0, 0)), Entity::Wall);
        assert_eq!(level.destinations(), &HashSet::from([Position::new(2, 1)]));
        assert_eq!(level.entity(Position::new(2, 1)), Entity::Empty);
        assert_eq!(level.player_ids(), &[owner('A')]);
    }

    #[test]
    fn test_undo_limit_forms() {
        let grid = "\n#A@a#\n";
        let parse = |limit: &str| LevelMap::parse(&format!("{}{}", limit, grid));

        assert_eq!(parse("-1").unwrap().undo_limit(), UndoLimit::Unlimited);
        assert_eq!(parse("0").unwrap().undo_limit(), UndoLimit::Disabled);
        assert_eq!(parse("3").unwrap().undo_limit(), UndoLimit::Fixed(3));
        assert_eq!(parse(" 2 ").unwrap().undo_limit(), UndoLimit::Fixed(2));
        assert_eq!(
            parse("99999999999").unwrap().undo_limit(),
            UndoLimit::Fixed(99_999_999_999)
        );
        assert_eq!(
            parse("123456789012345678901234567890").unwrap().undo_limit(),
            UndoLimit::Fixed(u64::MAX)
        );

        for bad in ["-2", "abc", "", "1.5", "-99999999999999999999999"] {
            assert!(
                matches!(parse(bad), Err(ParseError::InvalidUndoLimit(_))),
                "limit {:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(LevelMap::parse(""), Err(ParseError::MissingUndoLimit));
    }

    #[test]
    fn test_invalid_character() {
        let result = LevelMap::parse("-1\n####\n#A@#\n#a $#\n####");
        assert_eq!(
            result,
            Err(ParseError::InvalidCharacter { ch: ' ', x: 2, y: 2 })
        );
    }

    #[test]
    fn test_duplicate_player() {
        let result = LevelMap::parse("-1\n#A.A#\n#a@a#\n#@..#");
        assert_eq!(result, Err(ParseError::DuplicatePlayer(owner('A'))));
    }

    #[test]
    fn test_no_players() {
        let result = LevelMap::parse("-1\n####\n#..#\n####");
        assert_eq!(result, Err(ParseError::NoPlayers));
    }

    #[test]
    fn test_box_destination_mismatch() {
        // Two boxes, one destination
        let result = LevelMap::parse("-1\n#####\n#Aaa#\n#@..#\n#####");
        assert_eq!(
            result,
            Err(ParseError::BoxDestinationMismatch {
                boxes: 2,
                destinations: 1
            })
        );

        // One box, two destinations
        let result = LevelMap::parse("-1\n#####\n#Aa.#\n#@@.#\n#####");
        assert!(matches!(
            result,
            Err(ParseError::BoxDestinationMismatch { .. })
        ));
    }

    #[test]
    fn test_orphaned_box() {
        let result = LevelMap::parse("-1\n#####\n#Ab@#\n#####");
        // Owners are checked in letter order, so 'A' lacking a box is reported first
        assert_eq!(result, Err(ParseError::PlayerWithoutBox(owner('A'))));

        let result = LevelMap::parse("-1\n######\n#Aab@@#\n######");
        assert_eq!(result, Err(ParseError::BoxWithoutPlayer(owner('B'))));
    }

    #[test]
    fn test_player_without_box() {
        let result = LevelMap::parse("-1\n######\n#ABa@#\n######");
        assert_eq!(result, Err(ParseError::PlayerWithoutBox(owner('B'))));
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let level = LevelMap::parse("2\n#####\n#A@a\n##").unwrap();

        assert_eq!(level.width(), 5);
        assert_eq!(level.height(), 3);
        assert_eq!(level.entity(Position::new(4, 1)), Entity::Empty);
        assert_eq!(level.entity(Position::new(3, 2)), Entity::Empty);
        assert_eq!(level.undo_limit(), UndoLimit::Fixed(2));
    }

    #[test]
    fn test_out_of_bounds_reads_as_wall() {
        let level = LevelMap::parse("-1\nA@a").unwrap();
        assert_eq!(level.entity(Position::new(-1, 0)), Entity::Wall);
        assert_eq!(level.entity(Position::new(3, 0)), Entity::Wall);
        assert_eq!(level.entity(Position::new(0, 1)), Entity::Wall);
    }

    #[test]
    fn test_multiple_owners() {
        let level = LevelMap::parse(
            "0\n\
             #######\n\
             #B.b.@#\n\
             #A.a.@#\n\
             #######",
        )
        .unwrap();

        assert_eq!(level.player_ids(), &[owner('A'), owner('B')]);
        assert_eq!(level.box_count(), 2);
        assert!(level.is_destination(Position::new(5, 1)));
        assert!(!level.is_destination(Position::new(4, 1)));
    }

    #[test]
    fn test_from_str() {
        let level: LevelMap = "-1\n#A@a#".parse().unwrap();
        assert_eq!(level.width(), 5);
    }

    #[test]
    fn test_from_file_no_file() {
        let result = LevelMap::from_file("nonexistent_level.txt");
        assert!(matches!(result.unwrap_err(), LevelError::Io(_)));
    }
}
