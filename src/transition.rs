use crate::position::Position;

/// One relocation: whatever sat at `from` now sits at `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relocation {
    pub from: Position,
    pub to: Position,
}

/// The relocations making up one logical turn, at most one record per moved entity.
///
/// Recording a move whose origin is the destination of an earlier record extends
/// that record instead of adding a new one, so `A -> B` followed by `B -> C`
/// is stored as `A -> C`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    relocations: Vec<Relocation>,
}

impl Transition {
    pub fn new() -> Self {
        Transition {
            relocations: Vec::new(),
        }
    }

    pub fn record(&mut self, from: Position, to: Position) {
        if let Some(idx) = self.relocations.iter().position(|r| r.to == from) {
            if self.relocations[idx].from == to {
                // Back where it started: nothing left to undo for this entity
                self.relocations.remove(idx);
            } else {
                self.relocations[idx].to = to;
            }
        } else if from != to {
            self.relocations.push(Relocation { from, to });
        }
    }

    /// The inverse turn: every record with its origin and destination swapped.
    pub fn reversed(&self) -> Transition {
        Transition {
            relocations: self
                .relocations
                .iter()
                .rev()
                .map(|r| Relocation {
                    from: r.to,
                    to: r.from,
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.relocations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.relocations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relocation> {
        self.relocations.iter()
    }
}

impl<'a> IntoIterator for &'a Transition {
    type Item = &'a Relocation;
    type IntoIter = std::slice::Iter<'a, Relocation>;

    fn into_iter(self) -> Self::IntoIter {
        self.relocations.iter()
    }
}
