//! Ready-made configurations for the four concrete governor policies. Each
//! is plain data over the same engine: only the table, bounds and timing
//! differ. Defaults are documented per policy; nothing here is hard-coded in
//! the core.

use std::time::Duration;

use crate::StateIndex;
use crate::core::config::GovernorConfig;
use crate::core::table::ThresholdTable;
use crate::error::ConfigError;

/// Core on/off governor. State = number of online cores.
///
/// Core 0 never goes offline, so the floor is one core. Row 0 is a wide
/// escape row and unreachable with `min_state` = 1. Defaults: window 10,
/// period 1000ms, hysteresis 2000ms; suspend clamps to 1 core.
pub fn hotplug(total_cpus: StateIndex) -> Result<GovernorConfig, ConfigError> {
    let table = ThresholdTable::from_rows(&[
        (400.0, 0.0),
        (50.0, 0.0),
        (100.0, 40.0),
        (150.0, 80.0),
        (410.0, 140.0),
    ])?;
    let max_state = total_cpus.min(table.max_state());
    let mut cfg = GovernorConfig::new(table, 1, max_state)?;
    cfg.cycle_period = Duration::from_millis(1000);
    Ok(cfg)
}

/// CPU frequency ladder, 11 levels. State = index into the frequency table.
///
/// Rows derive from the classic `up = 55 + level`, `down = 20 + level` rule.
/// That ladder was built for one-step moves, so loads above the top band
/// deliberately hold rather than jump. Defaults: window 1 (the raw busy
/// percent is already wall-interval averaged), period 40ms, no hysteresis;
/// the boost target pins level 7 for touch boost.
pub fn cpufreq() -> Result<GovernorConfig, ConfigError> {
    let rows: Vec<(f64, f64)> = (0..11)
        .map(|level| (55.0 + level as f64, 20.0 + level as f64))
        .collect();
    let table = ThresholdTable::from_rows(&rows)?;
    let mut cfg = GovernorConfig::new(table, 0, 10)?;
    cfg.window = 1;
    cfg.cycle_period = Duration::from_millis(40);
    cfg.hysteresis = Duration::ZERO;
    cfg.boost_target = 7;
    cfg.validate()?;
    Ok(cfg)
}

/// GPU power-scaling, 5 levels. State = performance level, 0 slowest.
///
/// The table is the conservative power-scale matrix reindexed so that a
/// higher state means more performance; row 0 is the escape row and
/// unreachable with `min_state` = 1. Load is busy-percent accumulated over
/// the polling interval. Defaults: window 1, period 100ms, no hysteresis;
/// wake boosts straight to the top level.
pub fn gpu() -> Result<GovernorConfig, ConfigError> {
    let table = ThresholdTable::from_rows(&[
        (100.0, 0.0),
        (60.0, 0.0),
        (75.0, 35.0),
        (90.0, 45.0),
        (110.0, 60.0),
    ])?;
    let mut cfg = GovernorConfig::new(table, 1, 4)?;
    cfg.window = 1;
    cfg.cycle_period = Duration::from_millis(100);
    cfg.hysteresis = Duration::ZERO;
    Ok(cfg)
}

/// Thermal throttler. Load = max sensor temperature in degrees C; state =
/// permitted performance level, 5 severities from fully throttled (0) to
/// unthrottled (4).
///
/// Bands derive from `temp_max` (the classic default is 85): unthrottled up
/// to `temp_max - 10`, then trip points at -5, -2 and `temp_max` itself.
/// Defaults: window 1 (react to the instantaneous reading), period 2000ms,
/// no hysteresis so re-throttling is never delayed.
pub fn thermal(temp_max: f64) -> Result<GovernorConfig, ConfigError> {
    let table = ThresholdTable::from_rows(&[
        (200.0, temp_max),
        (temp_max, temp_max - 2.0),
        (temp_max - 2.0, temp_max - 5.0),
        (temp_max - 5.0, temp_max - 10.0),
        (temp_max - 10.0, 0.0),
    ])?;
    let mut cfg = GovernorConfig::new(table, 0, 4)?;
    cfg.window = 1;
    cfg.cycle_period = Duration::from_millis(2000);
    cfg.hysteresis = Duration::ZERO;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::decision::{DecisionInputs, decide};
    use crate::core::overrides::ActiveOverride;

    fn inputs(load: f64, current: StateIndex) -> DecisionInputs {
        DecisionInputs {
            load,
            current,
            locked: false,
            active: ActiveOverride::None,
        }
    }

    #[test]
    fn presets_validate() {
        for cfg in [
            hotplug(4).unwrap(),
            cpufreq().unwrap(),
            gpu().unwrap(),
            thermal(85.0).unwrap(),
        ] {
            cfg.validate().unwrap();
        }
    }

    #[test]
    fn hotplug_caps_max_state_at_table() {
        assert_eq!(hotplug(8).unwrap().max_state, 4);
        assert_eq!(hotplug(2).unwrap().max_state, 2);
    }

    #[test]
    fn hotplug_load_sixty_from_one_core_wants_two() {
        let cfg = hotplug(4).unwrap();
        assert_eq!(decide(&cfg, inputs(60.0, 1)).target, 2);
    }

    #[test]
    fn gpu_bands_pick_expected_levels() {
        let cfg = gpu().unwrap();
        assert_eq!(decide(&cfg, inputs(30.0, 2)).target, 1);
        assert_eq!(decide(&cfg, inputs(50.0, 1)).target, 1);
        assert_eq!(decide(&cfg, inputs(65.0, 1)).target, 2);
        assert_eq!(decide(&cfg, inputs(80.0, 2)).target, 3);
        assert_eq!(decide(&cfg, inputs(95.0, 3)).target, 4);
        // beyond every band: hold
        assert_eq!(decide(&cfg, inputs(120.0, 4)).target, 4);
    }

    #[test]
    fn thermal_maps_temperature_to_severity() {
        let cfg = thermal(85.0).unwrap();
        // cool: unthrottled
        assert_eq!(decide(&cfg, inputs(60.0, 4)).target, 4);
        // warming through the trip points
        assert_eq!(decide(&cfg, inputs(78.0, 4)).target, 3);
        assert_eq!(decide(&cfg, inputs(82.0, 3)).target, 2);
        assert_eq!(decide(&cfg, inputs(84.0, 2)).target, 1);
        // over the limit: fully throttled
        assert_eq!(decide(&cfg, inputs(90.0, 1)).target, 0);
    }

    #[test]
    fn cpufreq_touch_boost_targets_level_seven() {
        let cfg = cpufreq().unwrap();
        assert_eq!(cfg.boost_target, 7);
        let d = decide(
            &cfg,
            DecisionInputs {
                load: 0.0,
                current: 2,
                locked: false,
                active: ActiveOverride::Boost(cfg.boost_target),
            },
        );
        assert_eq!(d.target, 7);
    }
}
