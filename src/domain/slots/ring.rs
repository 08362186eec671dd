//! Fixed-size ring of recording slots

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::InvalidSlotError;

/// Number of recording slots
pub const SLOT_COUNT: usize = 3;

/// Opaque reference to where a recorded clip lives (path or `file://` URI)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filesystem path of the clip, with any `file://` scheme removed
    pub fn to_path(&self) -> PathBuf {
        PathBuf::from(self.0.strip_prefix("file://").unwrap_or(&self.0))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<PathBuf> for Locator {
    fn from(path: PathBuf) -> Self {
        Self(path.to_string_lossy().into_owned())
    }
}

/// Zero-based slot position, always in `[0, SLOT_COUNT)`.
///
/// Displays and parses 1-based, matching the "Record 1..3" buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SlotIndex(usize);

impl SlotIndex {
    /// All slots in ring order
    pub fn all() -> impl Iterator<Item = SlotIndex> {
        (0..SLOT_COUNT).map(SlotIndex)
    }

    pub fn new(index: usize) -> Result<Self, InvalidSlotError> {
        if index < SLOT_COUNT {
            Ok(Self(index))
        } else {
            Err(InvalidSlotError {
                input: (index + 1).to_string(),
            })
        }
    }

    pub const fn get(&self) -> usize {
        self.0
    }

    /// Human-facing slot number (1-based)
    pub const fn number(&self) -> usize {
        self.0 + 1
    }

    fn advance(self) -> Self {
        Self((self.0 + 1) % SLOT_COUNT)
    }
}

impl TryFrom<usize> for SlotIndex {
    type Error = InvalidSlotError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::new(index)
    }
}

impl FromStr for SlotIndex {
    type Err = InvalidSlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidSlotError {
            input: s.to_string(),
        };
        let number: usize = s.trim().parse().map_err(|_| invalid())?;
        number
            .checked_sub(1)
            .and_then(|index| Self::new(index).ok())
            .ok_or_else(invalid)
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Record {}", self.number())
    }
}

/// The recording slots plus the cursor for the next completed recording.
///
/// Writes go round-robin; when the cursor wraps onto a populated slot the
/// oldest recording is replaced.
#[derive(Debug, Clone, Default)]
pub struct SlotRing {
    slots: [Option<Locator>; SLOT_COUNT],
    next: SlotIndex,
}

impl SlotRing {
    /// Create a ring with every slot empty
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a finished recording at the cursor and advance it by one
    pub fn record_completed(&mut self, locator: Locator) -> SlotIndex {
        let written = self.next;
        self.slots[written.get()] = Some(locator);
        self.next = written.advance();
        written
    }

    /// Slot contents in ring order; always `SLOT_COUNT` long
    pub fn contents(&self) -> Vec<Option<Locator>> {
        self.slots.to_vec()
    }

    pub fn get(&self, index: SlotIndex) -> Option<&Locator> {
        self.slots[index.get()].as_ref()
    }

    pub fn next_index(&self) -> SlotIndex {
        self.next
    }

    /// Replay previously persisted locators (oldest first) from slot 0.
    /// Only the newest `SLOT_COUNT` are kept.
    pub fn restore<I>(&mut self, locators: I)
    where
        I: IntoIterator<Item = Locator>,
    {
        let locators: Vec<Locator> = locators.into_iter().collect();
        let skip = locators.len().saturating_sub(SLOT_COUNT);

        *self = Self::new();
        for locator in locators.into_iter().skip(skip) {
            self.record_completed(locator);
        }
    }
}
