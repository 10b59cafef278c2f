//! Monitor lifecycle phase
//!
//! A registration is created once and destroyed exactly once; there is no
//! hot-reconfiguration. The phase machine encodes that:
//! `Idle -> Active -> Stopped`, with `Stopped` terminal.

/// Lifecycle phase of an edge monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// No registration has been created yet
    #[default]
    Idle,
    /// Registration armed; edges are being delivered
    Active,
    /// Registration destroyed; terminal
    Stopped,
}

impl Phase {
    /// Check if a registration can be created from this phase
    pub fn can_start(&self) -> bool {
        matches!(self, Phase::Idle)
    }

    /// Check if a registration can be destroyed from this phase
    pub fn can_stop(&self) -> bool {
        matches!(self, Phase::Active)
    }

    /// Check if edge deliveries are expected in this phase
    pub fn is_active(&self) -> bool {
        matches!(self, Phase::Active)
    }
}
