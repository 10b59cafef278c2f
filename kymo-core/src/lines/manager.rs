//! Line manager implementation
//!
//! Tracks which lines are acquired to prevent conflicts, configures
//! direction and debounce at acquisition time, and guarantees that a failed
//! acquisition leaves no partial configuration behind.

use core::sync::atomic::{AtomicBool, Ordering};

use heapless::FnvIndexSet;
use kymo_hal::{Direction, LineError, LineId, LinePlatform, LineRequest};

/// Maximum lines one manager can hold
pub const MAX_LINES: usize = 8;

/// Errors from line acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AcquisitionError {
    /// Identifier is not a valid line on this platform
    InvalidLine,
    /// Line is already acquired, here or elsewhere
    AlreadyAcquired,
    /// Manager registry is full
    RegistryFull,
    /// Platform cannot debounce this line
    DebounceUnsupported,
}

impl From<LineError> for AcquisitionError {
    fn from(err: LineError) -> Self {
        match err {
            LineError::InvalidLine => AcquisitionError::InvalidLine,
            LineError::InUse => AcquisitionError::AlreadyAcquired,
            LineError::DebounceUnsupported => AcquisitionError::DebounceUnsupported,
        }
    }
}

/// Operation invoked against a line of the wrong direction
///
/// This is a programming error in the caller; treat it as fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DirectionError {
    /// The misused line
    pub line: LineId,
}

/// An acquired line
///
/// Owned by the caller and consumed by [`LineManager::release`]. For output
/// lines the last commanded level is cached here; reads of an output handle
/// return that cache, never a fresh hardware sample.
#[derive(Debug)]
pub struct LineHandle<T> {
    id: LineId,
    direction: Direction,
    token: T,
    /// Last commanded level (outputs only)
    commanded: AtomicBool,
}

impl<T> LineHandle<T> {
    /// The line's logical identifier
    pub fn id(&self) -> LineId {
        self.id
    }

    /// The direction fixed at acquisition
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub(crate) fn token(&self) -> &T {
        &self.token
    }
}

/// Owner of the platform's line capability
///
/// Holds the platform value and a fixed-capacity registry of acquired line
/// ids. Acquisition and release take `&mut self` (configuration path only);
/// level access takes `&self` so it stays reachable from interrupt context.
pub struct LineManager<P: LinePlatform> {
    platform: P,
    acquired: FnvIndexSet<u16, MAX_LINES>,
}

impl<P: LinePlatform> LineManager<P> {
    /// Create a manager over the given platform
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            acquired: FnvIndexSet::new(),
        }
    }

    /// Acquire an output line, driven to `initial_high` atomically
    ///
    /// The line is exported for external observation with direction changes
    /// disallowed.
    pub fn acquire_output(
        &mut self,
        id: LineId,
        initial_high: bool,
    ) -> Result<LineHandle<P::Token>, AcquisitionError> {
        self.check_registry(id)?;

        let token = self
            .platform
            .acquire_line(id, LineRequest::Output { initial_high })?;
        self.platform.export(&token, false);
        let _ = self.acquired.insert(id.0);

        Ok(LineHandle {
            id,
            direction: Direction::Output,
            token,
            commanded: AtomicBool::new(initial_high),
        })
    }

    /// Acquire an input line with the given debounce interval
    ///
    /// If debounce configuration fails after the line was acquired, the line
    /// is released before the error returns: a failed acquisition never
    /// leaves partial configuration behind.
    pub fn acquire_input(
        &mut self,
        id: LineId,
        debounce_ms: u32,
    ) -> Result<LineHandle<P::Token>, AcquisitionError> {
        self.check_registry(id)?;

        let token = self.platform.acquire_line(id, LineRequest::Input)?;
        if let Err(err) = self.platform.configure_debounce(&token, debounce_ms) {
            self.platform.release_line(token);
            return Err(err.into());
        }
        self.platform.export(&token, false);
        let _ = self.acquired.insert(id.0);

        Ok(LineHandle {
            id,
            direction: Direction::Input,
            token,
            commanded: AtomicBool::new(false),
        })
    }

    /// Acquire the indicator/sensor pair described by a monitor config
    ///
    /// Acquires the indicator first, then the sensor. If the sensor fails,
    /// the already-acquired indicator is released before the error
    /// propagates, so start-up failures unwind cleanly.
    pub fn acquire_monitor_lines(
        &mut self,
        config: &crate::config::MonitorConfig,
    ) -> Result<(LineHandle<P::Token>, LineHandle<P::Token>), AcquisitionError> {
        let indicator = self.acquire_output(config.indicator, config.indicator_initial_high)?;
        let sensor = match self.acquire_input(config.sensor, config.debounce_ms) {
            Ok(sensor) => sensor,
            Err(err) => {
                self.release(indicator);
                return Err(err);
            }
        };
        Ok((indicator, sensor))
    }

    /// Release a line
    ///
    /// Best-effort: unexports the line and returns it to the platform. The
    /// handle is consumed, so a line cannot be released twice or used after
    /// release.
    pub fn release(&mut self, handle: LineHandle<P::Token>) {
        self.acquired.remove(&handle.id.0);
        self.platform.unexport(&handle.token);
        self.platform.release_line(handle.token);
    }

    /// Read a line's current level
    ///
    /// Input lines reflect live hardware state; output lines return the last
    /// commanded value.
    pub fn read(&self, handle: &LineHandle<P::Token>) -> bool {
        match handle.direction {
            Direction::Input => self.platform.get_level(&handle.token),
            Direction::Output => handle.commanded.load(Ordering::Acquire),
        }
    }

    /// Drive an output line to the given level
    ///
    /// Fails with [`DirectionError`] on an input handle.
    pub fn write(
        &self,
        handle: &LineHandle<P::Token>,
        high: bool,
    ) -> Result<(), DirectionError> {
        if handle.direction != Direction::Output {
            return Err(DirectionError { line: handle.id });
        }
        self.set_output_level(handle, high);
        Ok(())
    }

    /// Infallible output write for callers that validated direction up front
    ///
    /// The edge monitor checks the indicator's direction once at start and
    /// then writes through here from interrupt context.
    pub(crate) fn set_output_level(&self, handle: &LineHandle<P::Token>, high: bool) {
        handle.commanded.store(high, Ordering::Release);
        self.platform.set_level(&handle.token, high);
    }

    pub(crate) fn platform(&self) -> &P {
        &self.platform
    }

    /// Number of lines currently held
    pub fn acquired_count(&self) -> usize {
        self.acquired.len()
    }

    fn check_registry(&self, id: LineId) -> Result<(), AcquisitionError> {
        if self.acquired.contains(&id.0) {
            return Err(AcquisitionError::AlreadyAcquired);
        }
        if self.acquired.len() == MAX_LINES {
            return Err(AcquisitionError::RegistryFull);
        }
        Ok(())
    }
}
