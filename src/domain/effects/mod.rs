//! Bundled sound effects

mod catalog;

pub use catalog::{EffectCatalog, EffectKey, ALL_EFFECTS};
