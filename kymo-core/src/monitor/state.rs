//! Shared monitor state
//!
//! One atomic boolean for the indicator level, one atomic counter for the
//! transitions. Both are updated from interrupt context and read from the
//! configuration path, so plain fields are not an option.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Coherent view of the monitor state at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StateSnapshot {
    /// Indicator level as last commanded
    pub indicator_high: bool,
    /// Transitions observed so far
    pub transitions: u32,
}

/// Shared state of one monitor instance
///
/// Owned by the caller and passed by reference to the edge monitor; lifetime
/// scoped to one start/stop cycle. The indicator field always equals the
/// last value written to the indicator line - the handler writes the line
/// from the value recorded here, never the other way round.
pub struct MonitorState {
    indicator: AtomicBool,
    transitions: AtomicU32,
}

impl MonitorState {
    /// Create state with the indicator at its initial level and a zero count
    pub const fn new(indicator_initial_high: bool) -> Self {
        Self {
            indicator: AtomicBool::new(indicator_initial_high),
            transitions: AtomicU32::new(0),
        }
    }

    /// Record one debounced transition
    ///
    /// Toggles the indicator level and increments the counter, each with a
    /// single atomic read-modify-write. Returns the new indicator level.
    /// Never blocks; safe to call from interrupt context.
    pub fn record_edge(&self) -> bool {
        let was_high = self.indicator.fetch_xor(true, Ordering::AcqRel);
        self.transitions.fetch_add(1, Ordering::Release);
        !was_high
    }

    /// Overwrite the indicator level outside the edge path
    ///
    /// Used by the shutdown sequence, which parks the indicator line low;
    /// the recorded level must follow that final write.
    pub(crate) fn set_indicator_level(&self, high: bool) {
        self.indicator.store(high, Ordering::Release);
    }

    /// Indicator level as last commanded
    pub fn indicator_high(&self) -> bool {
        self.indicator.load(Ordering::Acquire)
    }

    /// Total transitions observed
    pub fn transitions(&self) -> u32 {
        self.transitions.load(Ordering::Acquire)
    }

    /// Read both fields for reporting
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            indicator_high: self.indicator_high(),
            transitions: self.transitions(),
        }
    }
}
