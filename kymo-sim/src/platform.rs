//! Simulated line and interrupt platform

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use kymo_hal::interrupt::default_interrupt_id;
use kymo_hal::{Direction, Edge, InterruptError, InterruptPlatform, TriggerSet};
use kymo_hal::{LineError, LineId, LinePlatform, LineRequest};

/// Number of valid lines on the simulated platform
pub const SIM_LINE_COUNT: u16 = 54;

/// Opaque token for an acquired simulated line
#[derive(Debug, PartialEq, Eq)]
pub struct SimToken {
    id: u16,
}

#[derive(Debug)]
struct SimLine {
    direction: Direction,
    level: bool,
    exported: bool,
    debounce_ms: u32,
    /// Clock value of the last transition that passed the debounce filter
    last_accepted_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
struct Armed {
    irq: u16,
    triggers: TriggerSet,
}

#[derive(Debug, Default)]
struct Inner {
    lines: HashMap<u16, SimLine>,
    now_ms: u64,
    armed: Option<Armed>,
    no_irq: HashSet<u16>,
}

/// In-memory platform with a manual clock
///
/// All state lives behind one mutex, which also gives the `&self` level and
/// registration methods their interior mutability, the way hardware
/// registers would.
#[derive(Debug, Default)]
pub struct SimPlatform {
    inner: Mutex<Inner>,
}

impl SimPlatform {
    /// Create a platform with all lines free and the clock at zero
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("sim state lock poisoned")
    }

    /// Advance the simulated clock
    pub fn advance(&self, ms: u64) {
        self.lock().now_ms += ms;
    }

    /// Current simulated time in milliseconds
    pub fn now_ms(&self) -> u64 {
        self.lock().now_ms
    }

    /// Mark a line as having no interrupt source
    pub fn deny_interrupt(&self, id: LineId) {
        self.lock().no_irq.insert(id.0);
    }

    /// Force a line's electrical level without generating a pulse
    pub fn force_level(&self, id: LineId, high: bool) {
        if let Some(line) = self.lock().lines.get_mut(&id.0) {
            line.level = high;
        }
    }

    /// Toggle an input line and report whether the armed registration
    /// would deliver the resulting edge
    ///
    /// The transition always happens electrically; delivery requires the
    /// line's debounce window to have elapsed and a matching armed trigger.
    /// The caller is the dispatch loop: for each `true` it forwards the
    /// edge to the handler under test.
    pub fn pulse(&self, id: LineId) -> bool {
        let mut inner = self.lock();
        let now = inner.now_ms;
        let armed = inner.armed;

        let Some(line) = inner.lines.get_mut(&id.0) else {
            return false;
        };
        if line.direction != Direction::Input {
            return false;
        }

        line.level = !line.level;
        let edge = if line.level {
            Edge::Rising
        } else {
            Edge::Falling
        };

        // Hardware-level debounce: bounces inside the window are never
        // accepted, registered or not
        if let Some(last) = line.last_accepted_ms {
            if now.saturating_sub(last) < u64::from(line.debounce_ms) {
                return false;
            }
        }
        line.last_accepted_ms = Some(now);

        match armed {
            Some(armed) => armed.irq == default_interrupt_id(id) && armed.triggers.matches(edge),
            None => false,
        }
    }

    /// Current level of a line
    pub fn level(&self, id: LineId) -> bool {
        self.lock()
            .lines
            .get(&id.0)
            .map(|line| line.level)
            .unwrap_or(false)
    }

    /// Check whether a line is currently acquired
    pub fn is_acquired(&self, id: LineId) -> bool {
        self.lock().lines.contains_key(&id.0)
    }

    /// Check whether a line is visible to external observers
    pub fn is_exported(&self, id: LineId) -> bool {
        self.lock()
            .lines
            .get(&id.0)
            .map(|line| line.exported)
            .unwrap_or(false)
    }

    /// The currently armed interrupt, if any
    pub fn armed_interrupt(&self) -> Option<u16> {
        self.lock().armed.map(|armed| armed.irq)
    }
}

impl LinePlatform for SimPlatform {
    type Token = SimToken;

    fn acquire_line(&mut self, id: LineId, request: LineRequest) -> Result<SimToken, LineError> {
        let mut inner = self.lock();
        if id.0 >= SIM_LINE_COUNT {
            return Err(LineError::InvalidLine);
        }
        if inner.lines.contains_key(&id.0) {
            return Err(LineError::InUse);
        }

        let level = match request {
            LineRequest::Output { initial_high } => initial_high,
            LineRequest::Input => false,
        };
        inner.lines.insert(
            id.0,
            SimLine {
                direction: request.direction(),
                level,
                exported: false,
                debounce_ms: 0,
                last_accepted_ms: None,
            },
        );
        Ok(SimToken { id: id.0 })
    }

    fn configure_debounce(&mut self, token: &SimToken, interval_ms: u32) -> Result<(), LineError> {
        let mut inner = self.lock();
        match inner.lines.get_mut(&token.id) {
            Some(line) if line.direction == Direction::Input => {
                line.debounce_ms = interval_ms;
                Ok(())
            }
            _ => Err(LineError::DebounceUnsupported),
        }
    }

    fn set_level(&self, token: &SimToken, high: bool) {
        if let Some(line) = self.lock().lines.get_mut(&token.id) {
            line.level = high;
        }
    }

    fn get_level(&self, token: &SimToken) -> bool {
        self.lock()
            .lines
            .get(&token.id)
            .map(|line| line.level)
            .unwrap_or(false)
    }

    fn export(&mut self, token: &SimToken, _allow_direction_change: bool) {
        if let Some(line) = self.lock().lines.get_mut(&token.id) {
            line.exported = true;
        }
    }

    fn unexport(&mut self, token: &SimToken) {
        if let Some(line) = self.lock().lines.get_mut(&token.id) {
            line.exported = false;
        }
    }

    fn release_line(&mut self, token: SimToken) {
        self.lock().lines.remove(&token.id);
    }
}

impl InterruptPlatform for SimPlatform {
    type InterruptId = u16;

    fn map_to_interrupt(&self, token: &SimToken) -> Result<u16, InterruptError> {
        let inner = self.lock();
        if inner.no_irq.contains(&token.id) {
            return Err(InterruptError::NoInterrupt);
        }
        Ok(default_interrupt_id(LineId(token.id)))
    }

    fn register_interrupt(&self, irq: u16, triggers: TriggerSet) -> Result<(), InterruptError> {
        let mut inner = self.lock();
        if inner.armed.is_some() {
            return Err(InterruptError::Conflict);
        }
        inner.armed = Some(Armed { irq, triggers });
        Ok(())
    }

    fn deregister_interrupt(&self, irq: u16) {
        let mut inner = self.lock();
        if inner.armed.map(|armed| armed.irq) == Some(irq) {
            inner.armed = None;
        }
    }
}
