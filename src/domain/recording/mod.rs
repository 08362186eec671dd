//! Recording settings

mod quality;

pub use quality::QualityPreset;
