//! Garment views and per-view storage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// View errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("Unknown view: {0}")]
    UnknownView(String),
    #[error("View not offered by this product: {0}")]
    NotOffered(ViewKey),
}

/// One named perspective of a garment template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewKey {
    Front,
    Back,
    SleeveLeft,
    SleeveRight,
}

impl ViewKey {
    /// All views in canonical order.
    pub const ALL: [ViewKey; 4] = [
        ViewKey::Front,
        ViewKey::Back,
        ViewKey::SleeveLeft,
        ViewKey::SleeveRight,
    ];

    /// Wire name (`front`, `back`, `sleeveLeft`, `sleeveRight`).
    pub fn as_str(self) -> &'static str {
        match self {
            ViewKey::Front => "front",
            ViewKey::Back => "back",
            ViewKey::SleeveLeft => "sleeveLeft",
            ViewKey::SleeveRight => "sleeveRight",
        }
    }

    /// Human-readable label for view buttons.
    pub fn label(self) -> &'static str {
        match self {
            ViewKey::Front => "Front",
            ViewKey::Back => "Back",
            ViewKey::SleeveLeft => "Sleeve Left",
            ViewKey::SleeveRight => "Sleeve Right",
        }
    }

    fn index(self) -> usize {
        match self {
            ViewKey::Front => 0,
            ViewKey::Back => 1,
            ViewKey::SleeveLeft => 2,
            ViewKey::SleeveRight => 3,
        }
    }
}

impl fmt::Display for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewKey {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViewKey::ALL
            .into_iter()
            .find(|view| view.as_str() == s)
            .ok_or_else(|| ViewError::UnknownView(s.to_string()))
    }
}

/// Fixed-size record holding at most one value per view.
///
/// Absent entries are `None`, never a zero-valued placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewMap<T> {
    slots: [Option<T>; 4],
}

impl<T> Default for ViewMap<T> {
    fn default() -> Self {
        Self {
            slots: [None, None, None, None],
        }
    }
}

impl<T> ViewMap<T> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, view: ViewKey) -> Option<&T> {
        self.slots[view.index()].as_ref()
    }

    pub fn get_mut(&mut self, view: ViewKey) -> Option<&mut T> {
        self.slots[view.index()].as_mut()
    }

    /// Insert a value, returning the one it replaced.
    pub fn insert(&mut self, view: ViewKey, value: T) -> Option<T> {
        self.slots[view.index()].replace(value)
    }

    /// Store a value and borrow it back.
    pub fn put(&mut self, view: ViewKey, value: T) -> &mut T {
        self.slots[view.index()].insert(value)
    }

    pub fn remove(&mut self, view: ViewKey) -> Option<T> {
        self.slots[view.index()].take()
    }

    pub fn contains(&self, view: ViewKey) -> bool {
        self.slots[view.index()].is_some()
    }

    /// Present entries in canonical view order.
    pub fn iter(&self) -> impl Iterator<Item = (ViewKey, &T)> {
        ViewKey::ALL
            .into_iter()
            .filter_map(move |view| self.get(view).map(|value| (view, value)))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
