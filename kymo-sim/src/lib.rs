//! Host simulator for the Kymo capability traits
//!
//! Implements `LinePlatform` and `InterruptPlatform` over an in-memory line
//! table behind a mutex, with a manually advanced millisecond clock and
//! classic time-window debounce. Test code injects transitions with
//! [`SimPlatform::pulse`] and plays the role of the platform's interrupt
//! dispatch by forwarding each accepted pulse to the handler under test.

mod platform;

pub use platform::{SimPlatform, SimToken, SIM_LINE_COUNT};
