//! Monitor configuration types
//!
//! The defaults match the reference wiring: indicator LED on line 17,
//! sensor on line 27, 200 ms debounce, LED initially lit.

use kymo_hal::LineId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default indicator (LED) line
pub const DEFAULT_INDICATOR_LINE: LineId = LineId(17);

/// Default sensor (encoder/button) line
pub const DEFAULT_SENSOR_LINE: LineId = LineId(27);

/// Default debounce interval in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u32 = 200;

/// Wiring and policy for one monitor instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MonitorConfig {
    /// Output line toggled on each sensor transition
    pub indicator: LineId,
    /// Input line watched for transitions
    pub sensor: LineId,
    /// Minimum interval between accepted transitions
    pub debounce_ms: u32,
    /// Level the indicator holds before the first transition
    pub indicator_initial_high: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            indicator: DEFAULT_INDICATOR_LINE,
            sensor: DEFAULT_SENSOR_LINE,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            indicator_initial_high: true,
        }
    }
}

impl MonitorConfig {
    /// Create a config with explicit line assignments and default policy
    pub const fn new(indicator: LineId, sensor: LineId) -> Self {
        Self {
            indicator,
            sensor,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            indicator_initial_high: true,
        }
    }
}
