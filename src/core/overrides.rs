use serde::Serialize;
use tokio::time::{Duration, Instant};

use crate::StateIndex;

/// An externally requested floor raise. Lives until cleared, or until the
/// optional hold expires.
#[derive(Debug, Clone, Copy)]
pub struct Boost {
    pub target: StateIndex,
    expires: Option<Instant>,
}

/// The override that wins the current decision cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "state")]
pub enum ActiveOverride {
    None,
    Boost(StateIndex),
    Suspend(StateIndex),
    ThermalCap(StateIndex),
}

/// External override slots for one governor instance.
///
/// The three slots are independent, but exactly one is authoritative per
/// decision: Suspend beats Boost beats ThermalCap. Entering suspend silences
/// a boost without discarding it, so the boost becomes relevant again after
/// resume (unless its hold expired in the meantime).
#[derive(Debug, Default)]
pub struct OverrideState {
    boost: Option<Boost>,
    suspend: Option<StateIndex>,
    thermal_cap: Option<StateIndex>,
}

impl OverrideState {
    pub fn set_boost(&mut self, target: StateIndex, hold: Option<Duration>) {
        self.boost = Some(Boost {
            target,
            expires: hold.map(|d| Instant::now() + d),
        });
    }

    pub fn clear_boost(&mut self) {
        self.boost = None;
    }

    pub fn enter_suspend(&mut self, clamp: StateIndex) {
        self.suspend = Some(clamp);
    }

    pub fn exit_suspend(&mut self) {
        self.suspend = None;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspend.is_some()
    }

    /// The clamp state while suspended. The actuation worker uses this to
    /// reject any other target queued by a tick that raced the suspend flag.
    pub fn suspend_clamp(&self) -> Option<StateIndex> {
        self.suspend
    }

    pub fn set_thermal_cap(&mut self, max: StateIndex) {
        self.thermal_cap = Some(max);
    }

    pub fn clear_thermal_cap(&mut self) {
        self.thermal_cap = None;
    }

    pub fn thermal_cap(&self) -> Option<StateIndex> {
        self.thermal_cap
    }

    /// Resolve which override governs this cycle. Expired boosts are dropped
    /// lazily here, on the cycle that first observes them gone.
    pub fn authoritative(&mut self) -> ActiveOverride {
        if let Some(b) = self.boost
            && b.expires.is_some_and(|t| Instant::now() >= t)
        {
            self.boost = None;
        }
        if let Some(clamp) = self.suspend {
            return ActiveOverride::Suspend(clamp);
        }
        if let Some(b) = self.boost {
            return ActiveOverride::Boost(b.target);
        }
        if let Some(max) = self.thermal_cap {
            return ActiveOverride::ThermalCap(max);
        }
        ActiveOverride::None
    }
}
