//! Interrupt mapping and registration abstractions
//!
//! A sensor line is mapped to a platform interrupt identifier, then a
//! registration arms the trigger conditions. While armed, the platform's
//! interrupt dispatch invokes the registered [`EdgeHandler`] once per
//! debounced transition.

use crate::line::{LineId, LinePlatform};

/// A single transition on a digital input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// Low-to-high transition
    Rising,
    /// High-to-low transition
    Falling,
}

/// The set of trigger conditions for an interrupt registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TriggerSet {
    /// Trigger on rising edges
    pub rising: bool,
    /// Trigger on falling edges
    pub falling: bool,
}

impl TriggerSet {
    /// Trigger on rising edges only
    pub const fn rising() -> Self {
        Self {
            rising: true,
            falling: false,
        }
    }

    /// Trigger on falling edges only
    pub const fn falling() -> Self {
        Self {
            rising: false,
            falling: true,
        }
    }

    /// Trigger on both rising and falling edges
    pub const fn both() -> Self {
        Self {
            rising: true,
            falling: true,
        }
    }

    /// Check whether no trigger condition is set
    pub fn is_empty(&self) -> bool {
        !self.rising && !self.falling
    }

    /// Check whether the given edge satisfies this trigger set
    pub fn matches(&self, edge: Edge) -> bool {
        match edge {
            Edge::Rising => self.rising,
            Edge::Falling => self.falling,
        }
    }
}

/// Errors from interrupt platform operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptError {
    /// The line has no interrupt source on this platform
    NoInterrupt,
    /// The interrupt is already registered elsewhere
    Conflict,
}

/// Invoked by the platform's interrupt dispatch, once per debounced edge
///
/// Implementations run in interrupt context: they must not block, must not
/// allocate, and must complete in bounded time. `Sync` because the call
/// arrives on an execution context distinct from the configuration path.
pub trait EdgeHandler: Sync {
    /// Handle one debounced transition
    fn on_edge(&self);
}

/// Interrupt capability layered over line access
///
/// Registration methods take `&self` for the same reason as the level
/// accessors on [`LinePlatform`]: arming and disarming a trigger is a
/// register write the adapter performs under its own interior mutability.
pub trait InterruptPlatform: LinePlatform {
    /// Platform interrupt identifier
    type InterruptId: Copy + PartialEq + core::fmt::Debug;

    /// Map an acquired line to its interrupt identifier
    ///
    /// Fails with [`InterruptError::NoInterrupt`] if the line has no
    /// interrupt source.
    fn map_to_interrupt(&self, token: &Self::Token)
        -> Result<Self::InterruptId, InterruptError>;

    /// Arm the interrupt for the given trigger conditions
    ///
    /// After this returns, the platform invokes the registered handler once
    /// per debounced transition that matches `triggers`. Fails with
    /// [`InterruptError::Conflict`] if the interrupt is already registered.
    fn register_interrupt(
        &self,
        irq: Self::InterruptId,
        triggers: TriggerSet,
    ) -> Result<(), InterruptError>;

    /// Disarm the interrupt
    ///
    /// Synchronous with respect to future notifications: after this returns
    /// no further handler invocations occur for `irq`.
    fn deregister_interrupt(&self, irq: Self::InterruptId);
}

/// Conventional offset between a line id and its interrupt id
///
/// Adapters are free to use any mapping; the simulator and tests use this
/// one.
pub const IRQ_BASE: u16 = 160;

/// Default interrupt id for a line, using the conventional offset
pub fn default_interrupt_id(line: LineId) -> u16 {
    IRQ_BASE + line.0
}
