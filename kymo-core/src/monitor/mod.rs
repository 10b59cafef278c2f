//! Edge monitoring
//!
//! Translates debounced interrupt notifications on the sensor line into two
//! state updates: the indicator line toggles and the transition counter
//! increments. The shared [`MonitorState`] is an explicitly owned value of
//! atomics, so the interrupt-context handler and the shutdown path can touch
//! it concurrently without locks.
//!
//! Lifecycle: [`EdgeMonitor::start`] arms the registration, the platform
//! invokes [`EdgeMonitor::on_edge`] once per debounced transition, and
//! [`EdgeMonitor::stop`] disarms it before the lines are released.

mod edge;
mod phase;
mod state;

pub use edge::{EdgeMonitor, RegistrationError};
pub use phase::Phase;
pub use state::{MonitorState, StateSnapshot};
