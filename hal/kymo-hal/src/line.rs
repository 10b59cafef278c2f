//! Digital line abstractions
//!
//! Provides the trait for acquiring, configuring, and releasing digital
//! lines, implemented by platform-specific adapters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Platform-specific line identifier (pin number)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineId(pub u16);

/// Line direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Line is read from hardware
    Input,
    /// Line is driven by software
    Output,
}

/// Requested configuration for a line at acquisition time
///
/// For outputs the initial level travels with the request so the platform
/// can apply it atomically with the direction change - there must be no
/// observable transient level between acquisition and the first write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineRequest {
    /// Configure as input
    Input,
    /// Configure as output, driven to `initial_high` atomically
    Output {
        /// Level the line holds from the instant it is acquired
        initial_high: bool,
    },
}

impl LineRequest {
    /// The direction this request configures
    pub fn direction(&self) -> Direction {
        match self {
            LineRequest::Input => Direction::Input,
            LineRequest::Output { .. } => Direction::Output,
        }
    }
}

/// Errors from line platform operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Identifier is not a valid line on this platform
    InvalidLine,
    /// Line is already held by another owner
    InUse,
    /// Platform cannot debounce this line
    DebounceUnsupported,
}

/// Line acquisition and level capability
///
/// Implementations own the actual hardware mechanism (kernel GPIO calls,
/// memory-mapped registers, a simulated line table).
///
/// Level accessors take `&self`: they must be reachable from interrupt
/// context concurrently with the configuration path, so implementations
/// provide their own interior mutability (hardware registers already do).
pub trait LinePlatform {
    /// Opaque per-line token returned by acquisition
    type Token;

    /// Acquire a line and configure its direction
    ///
    /// For output requests the initial level is applied atomically with the
    /// direction change. Fails if the identifier is invalid or the line is
    /// already held.
    fn acquire_line(&mut self, id: LineId, request: LineRequest)
        -> Result<Self::Token, LineError>;

    /// Set the minimum interval between accepted input transitions
    fn configure_debounce(&mut self, token: &Self::Token, interval_ms: u32)
        -> Result<(), LineError>;

    /// Drive an output line to the given level
    fn set_level(&self, token: &Self::Token, high: bool);

    /// Sample the current hardware level of a line
    fn get_level(&self, token: &Self::Token) -> bool;

    /// Make the line visible to external observers
    fn export(&mut self, token: &Self::Token, allow_direction_change: bool);

    /// Remove the line from external visibility
    fn unexport(&mut self, token: &Self::Token);

    /// Release a line back to the platform
    fn release_line(&mut self, token: Self::Token);
}
