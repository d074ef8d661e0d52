//! Prize slots and the fixed-size per-slot record.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// One of the three named prize positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// First prize, revealed last.
    First,
    /// Second prize.
    Second,
    /// Third prize, revealed first.
    Third,
}

impl Slot {
    /// All slots in prize order.
    pub const ALL: [Slot; 3] = [Slot::First, Slot::Second, Slot::Third];

    /// All slots in the order they are revealed during a pick.
    pub const REVEAL_ORDER: [Slot; 3] = [Slot::Third, Slot::Second, Slot::First];

    /// Zero-based position of the slot in prize order.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Slot::First => 0,
            Slot::Second => 1,
            Slot::Third => 2,
        }
    }

    /// Lowercase slot name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Slot::First => "first",
            Slot::Second => "second",
            Slot::Third => "third",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fixed-size record holding one value per slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerSlot<T> {
    /// Value for the first prize.
    pub first: T,
    /// Value for the second prize.
    pub second: T,
    /// Value for the third prize.
    pub third: T,
}

impl<T> PerSlot<T> {
    /// Build a record by evaluating `f` once per slot, in prize order.
    pub fn from_fn(mut f: impl FnMut(Slot) -> T) -> Self {
        Self {
            first: f(Slot::First),
            second: f(Slot::Second),
            third: f(Slot::Third),
        }
    }

    /// Iterate over `(slot, value)` pairs in prize order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &T)> {
        Slot::ALL.into_iter().map(move |slot| (slot, &self[slot]))
    }

    /// Apply `f` to every value.
    pub fn map<U>(&self, mut f: impl FnMut(Slot, &T) -> U) -> PerSlot<U> {
        PerSlot::from_fn(|slot| f(slot, &self[slot]))
    }
}

impl<T> Index<Slot> for PerSlot<T> {
    type Output = T;

    fn index(&self, slot: Slot) -> &T {
        match slot {
            Slot::First => &self.first,
            Slot::Second => &self.second,
            Slot::Third => &self.third,
        }
    }
}

impl<T> IndexMut<Slot> for PerSlot<T> {
    fn index_mut(&mut self, slot: Slot) -> &mut T {
        match slot {
            Slot::First => &mut self.first,
            Slot::Second => &mut self.second,
            Slot::Third => &mut self.third,
        }
    }
}
