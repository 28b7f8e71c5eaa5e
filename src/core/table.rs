use serde::{Deserialize, Serialize};

use crate::StateIndex;
use crate::error::ConfigError;

/// Up/down load boundaries for one state.
///
/// A governor leaves state `s` upward when load exceeds `up`, downward when
/// load drops below `down`; the band `down < load <= up` holds the state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEntry {
    pub up: f64,
    pub down: f64,
}

impl ThresholdEntry {
    pub fn new(up: f64, down: f64) -> Self {
        Self { up, down }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for v in [self.up, self.down] {
            if !v.is_finite() || v < 0.0 {
                return Err(ConfigError::ThresholdNotFinite(v));
            }
        }
        if self.down > self.up {
            return Err(ConfigError::ThresholdInverted {
                up: self.up,
                down: self.down,
            });
        }
        Ok(())
    }
}

/// Ordered decision matrix, one row per state index.
///
/// Rows are data, not assumed monotonic across states: real tables carry
/// deliberately wide "escape" rows (the core-hotplug table opens with
/// `(400, 0)`), so no ordering between rows is ever relied on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    entries: Vec<ThresholdEntry>,
}

impl ThresholdTable {
    pub fn new(entries: Vec<ThresholdEntry>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyTable);
        }
        for e in &entries {
            e.validate()?;
        }
        Ok(Self { entries })
    }

    pub fn from_rows(rows: &[(f64, f64)]) -> Result<Self, ConfigError> {
        Self::new(
            rows.iter()
                .map(|&(up, down)| ThresholdEntry::new(up, down))
                .collect(),
        )
    }

    /// Entry for `state`, clamped to the last row. Returns a copy so callers
    /// always see both thresholds from the same write.
    pub fn lookup(&self, state: StateIndex) -> ThresholdEntry {
        let idx = (state as usize).min(self.entries.len() - 1);
        self.entries[idx]
    }

    /// Replace one row. Out-of-bounds states are rejected, not grown.
    pub fn set(&mut self, state: StateIndex, entry: ThresholdEntry) -> Result<(), ConfigError> {
        entry.validate()?;
        let idx = state as usize;
        if idx >= self.entries.len() {
            return Err(ConfigError::StateOutOfTable {
                state,
                rows: self.entries.len(),
            });
        }
        self.entries[idx] = entry;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.entries.len()
    }

    /// Highest state index the table has a row for.
    pub fn max_state(&self) -> StateIndex {
        (self.entries.len() - 1) as StateIndex
    }
}
