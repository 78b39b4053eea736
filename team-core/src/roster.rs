use serde::{Deserialize, Serialize};

use crate::catalog::CatalogEntry;
use crate::constants::{ROSTER_CAPACITY, ROSTER_DEFAULT_SIZE};
use crate::geometry::{Point, default_roster_position};

/// Stable identity of a slot for as long as it stays on the roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotId(u32);

/// One roster member with all of its placement overrides.
///
/// Overrides live on the slot, so removing an earlier slot shifts them along
/// with the entry instead of requiring index bookkeeping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RosterSlot {
    pub id: SlotId,
    pub entry: CatalogEntry,
    /// Sprite size override (px); `None` means the default.
    pub size: Option<u32>,
    /// Dragged position; `None` keeps the default row position for the slot's index.
    pub position: Option<Point>,
    pub flipped: bool,
    pub rotation: i32,
}

impl RosterSlot {
    pub fn size(&self) -> u32 {
        self.size.unwrap_or(ROSTER_DEFAULT_SIZE)
    }

    pub fn position(&self, index: usize) -> Point {
        self.position
            .unwrap_or_else(|| default_roster_position(index))
    }
}

/// Ordered, capped list of selected entries. Duplicates are allowed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    slots: Vec<RosterSlot>,
    next_id: u32,
}

impl Roster {
    /// Append an entry; returns `None` once the roster is full.
    pub fn push(&mut self, entry: CatalogEntry) -> Option<SlotId> {
        if self.is_full() {
            return None;
        }
        let id = SlotId(self.next_id);
        self.next_id += 1;
        self.slots.push(RosterSlot {
            id,
            entry,
            size: None,
            position: None,
            flipped: false,
            rotation: 0,
        });
        Some(id)
    }

    /// Remove and return the slot at `index`; later slots move down by one.
    pub fn remove(&mut self, index: usize) -> Option<RosterSlot> {
        (index < self.slots.len()).then(|| self.slots.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&RosterSlot> {
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut RosterSlot> {
        self.slots.get_mut(index)
    }

    pub fn index_of(&self, id: SlotId) -> Option<usize> {
        self.slots.iter().position(|s| s.id == id)
    }

    pub fn slots(&self) -> &[RosterSlot] {
        &self.slots
    }

    pub fn iter(&self) -> impl Iterator<Item = &RosterSlot> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= ROSTER_CAPACITY
    }
}
