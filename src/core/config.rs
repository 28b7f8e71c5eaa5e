use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::StateIndex;
use crate::core::table::ThresholdTable;
use crate::error::ConfigError;

pub const DEFAULT_WINDOW: usize = 10;
pub const MAX_WINDOW: usize = 128;
pub const DEFAULT_CYCLE_PERIOD: Duration = Duration::from_millis(100);
pub const MIN_CYCLE_PERIOD: Duration = Duration::from_millis(10);
pub const MAX_CYCLE_PERIOD: Duration = Duration::from_secs(60);
pub const DEFAULT_HYSTERESIS: Duration = Duration::from_millis(2000);
pub const MAX_HYSTERESIS: Duration = Duration::from_secs(300);

/// Runtime-tunable knobs of one governor instance.
///
/// Values live for the process lifetime only; every policy preset documents
/// its own defaults (see `policy`). All writes through the governor's setter
/// surface are range-checked and rejected wholesale on bad input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernorConfig {
    /// Moving-average window, in samples.
    pub window: usize,
    /// Interval between decision cycles, measured from cycle start.
    pub cycle_period: Duration,
    /// How long down-transitions stay suppressed after an up-move.
    pub hysteresis: Duration,
    pub min_state: StateIndex,
    pub max_state: StateIndex,
    /// State a boost raises the floor to when none is given explicitly.
    pub boost_target: StateIndex,
    pub table: ThresholdTable,
}

impl GovernorConfig {
    /// Config with documented defaults (window 10, period 100ms, hysteresis
    /// 2000ms) over the given table and bounds; boost targets `max_state`.
    pub fn new(
        table: ThresholdTable,
        min_state: StateIndex,
        max_state: StateIndex,
    ) -> Result<Self, ConfigError> {
        let cfg = Self {
            window: DEFAULT_WINDOW,
            cycle_period: DEFAULT_CYCLE_PERIOD,
            hysteresis: DEFAULT_HYSTERESIS,
            min_state,
            max_state,
            boost_target: max_state,
            table,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_WINDOW).contains(&self.window) {
            return Err(ConfigError::WindowOutOfRange(self.window));
        }
        if self.cycle_period < MIN_CYCLE_PERIOD || self.cycle_period > MAX_CYCLE_PERIOD {
            return Err(ConfigError::PeriodOutOfRange(self.cycle_period));
        }
        if self.hysteresis > MAX_HYSTERESIS {
            return Err(ConfigError::HysteresisTooLong(self.hysteresis));
        }
        if self.min_state > self.max_state {
            return Err(ConfigError::BoundsInverted {
                min: self.min_state,
                max: self.max_state,
            });
        }
        if self.max_state > self.table.max_state() {
            return Err(ConfigError::BoundsBeyondTable {
                max: self.max_state,
                rows: self.table.rows(),
            });
        }
        if self.boost_target < self.min_state || self.boost_target > self.max_state {
            return Err(ConfigError::BoostOutOfBounds {
                target: self.boost_target,
                min: self.min_state,
                max: self.max_state,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ThresholdTable {
        ThresholdTable::from_rows(&[(50.0, 0.0), (100.0, 40.0), (410.0, 80.0)]).unwrap()
    }

    #[test]
    fn defaults_validate() {
        let cfg = GovernorConfig::new(table(), 0, 2).unwrap();
        assert_eq!(cfg.window, DEFAULT_WINDOW);
        assert_eq!(cfg.boost_target, 2);
    }

    #[test]
    fn bounds_beyond_table_rejected() {
        assert_eq!(
            GovernorConfig::new(table(), 0, 3),
            Err(ConfigError::BoundsBeyondTable { max: 3, rows: 3 })
        );
    }

    #[test]
    fn inverted_bounds_rejected() {
        assert_eq!(
            GovernorConfig::new(table(), 2, 1),
            Err(ConfigError::BoundsInverted { min: 2, max: 1 })
        );
    }

    #[test]
    fn pinned_bounds_allowed() {
        assert!(GovernorConfig::new(table(), 1, 1).is_ok());
    }
}
