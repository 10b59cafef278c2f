//! Platform-agnostic core logic for the Kymo edge monitor
//!
//! This crate contains all monitor logic that does not depend on a specific
//! hardware platform:
//!
//! - Line manager (acquisition, levels, release)
//! - Edge monitor (interrupt registration, per-edge state updates)
//! - Shared monitor state (atomic counter and indicator level)
//! - Configuration type definitions
//!
//! Hardware access goes through the capability traits in `kymo-hal`; the
//! test suites drive the logic through the `kymo-sim` host simulator.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod lines;
pub mod monitor;
