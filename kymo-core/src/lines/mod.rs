//! Line management
//!
//! The [`LineManager`] owns the platform's line-acquisition capability: it is
//! the only component that acquires, exports, or releases hardware lines.
//! Each acquired line is represented by an owned [`LineHandle`] whose release
//! consumes it, so a line cannot be freed twice or written after release.

mod manager;

pub use manager::{AcquisitionError, DirectionError, LineHandle, LineManager, MAX_LINES};
