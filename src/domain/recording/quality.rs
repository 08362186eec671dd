//! Recording quality preset

use std::fmt;
use std::str::FromStr;

use crate::domain::error::InvalidQualityError;

/// Sample rate used by the low quality preset
pub const LOW_QUALITY_SAMPLE_RATE: u32 = 16_000;

/// Capture quality for new recordings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QualityPreset {
    /// Device native sample rate
    #[default]
    High,
    /// 16 kHz speech quality
    Low,
}

impl QualityPreset {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }

    /// Output sample rate for a capture running at `device_rate`
    pub const fn target_sample_rate(&self, device_rate: u32) -> u32 {
        match self {
            Self::High => device_rate,
            Self::Low => LOW_QUALITY_SAMPLE_RATE,
        }
    }
}

impl FromStr for QualityPreset {
    type Err = InvalidQualityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "low" => Ok(Self::Low),
            _ => Err(InvalidQualityError {
                input: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
