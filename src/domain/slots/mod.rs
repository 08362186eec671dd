//! Recording slots

mod ring;

pub use ring::{Locator, SlotIndex, SlotRing, SLOT_COUNT};
