//! Kymo Hardware Abstraction Layer
//!
//! This crate defines the capability traits the edge-monitor core consumes.
//! A platform adapter (kernel GPIO layer, memory-mapped registers, host
//! simulator) implements them; the core never touches hardware directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application / integration layer        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  kymo-core (line manager, edge monitor) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  kymo-hal (this crate - traits)         │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  chip adapter │       │   kymo-sim    │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`line::LinePlatform`] - line acquisition, levels, export, release
//! - [`interrupt::InterruptPlatform`] - interrupt mapping and registration
//! - [`interrupt::EdgeHandler`] - the contract adapters invoke per edge

#![no_std]
#![deny(unsafe_code)]

pub mod interrupt;
pub mod line;

// Re-export key traits and types at crate root for convenience
pub use interrupt::{Edge, EdgeHandler, InterruptError, InterruptPlatform, TriggerSet};
pub use line::{Direction, LineError, LineId, LinePlatform, LineRequest};
