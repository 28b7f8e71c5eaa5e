use tracing::debug;

use crate::StateIndex;
use crate::core::config::GovernorConfig;
use crate::core::overrides::ActiveOverride;

/// Everything a single decision consumes, snapshotted at cycle start.
#[derive(Debug, Clone, Copy)]
pub struct DecisionInputs {
    pub load: f64,
    pub current: StateIndex,
    pub locked: bool,
    pub active: ActiveOverride,
}

/// Outcome of one decision cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub target: StateIndex,
    /// Arm the hysteresis lock (set on every up-move and on boost).
    pub arm_lock: bool,
    /// Force the lock clear (suspend only).
    pub force_unlock: bool,
}

impl Decision {
    fn hold(current: StateIndex) -> Self {
        Self {
            target: current,
            arm_lock: false,
            force_unlock: false,
        }
    }
}

/// One decision step. Pure: all clock and platform state arrives in `inputs`.
///
/// Precedence: suspend clamps unconditionally and clears the lock; an active
/// boost below which the resource currently sits raises the floor and skips
/// the table; a thermal cap tightens whatever the normal rule picked. The
/// normal rule scans states from `min_state` upward and takes the lowest `s`
/// whose band `down[s] < load <= up[s]` contains the load; no matching band
/// holds the current state. Up-moves arm hysteresis, down-moves are
/// suppressed while it is armed.
pub fn decide(cfg: &GovernorConfig, inputs: DecisionInputs) -> Decision {
    let (min, max) = (cfg.min_state, cfg.max_state);

    if let ActiveOverride::Suspend(clamp) = inputs.active {
        return Decision {
            target: clamp.clamp(min, max),
            arm_lock: false,
            force_unlock: true,
        };
    }

    if let ActiveOverride::Boost(want) = inputs.active
        && inputs.current < want
    {
        let clamped = want.clamp(min, max);
        if clamped != want {
            debug!(target: "loadgov::decision", want, clamped, "boost target clamped to bounds");
        }
        return Decision {
            target: clamped,
            arm_lock: true,
            force_unlock: false,
        };
    }
    // A boost at or below the current state never lowers anything; the
    // normal rule decides this cycle.

    let mut target = if min == max {
        // Pinned bounds short-circuit the table entirely.
        min
    } else {
        (min..=max)
            .find(|&s| {
                let e = cfg.table.lookup(s);
                e.down < inputs.load && inputs.load <= e.up
            })
            .unwrap_or(inputs.current)
    };

    target = target.clamp(min, max);
    if let ActiveOverride::ThermalCap(cap) = inputs.active {
        target = target.min(cap.clamp(min, max));
    }

    if target > inputs.current {
        return Decision {
            target,
            arm_lock: true,
            force_unlock: false,
        };
    }
    if target < inputs.current && inputs.locked {
        return Decision::hold(inputs.current);
    }
    Decision {
        target,
        arm_lock: false,
        force_unlock: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::ThresholdTable;

    fn hotplug_cfg() -> GovernorConfig {
        let table = ThresholdTable::from_rows(&[
            (400.0, 0.0),
            (50.0, 0.0),
            (100.0, 40.0),
            (150.0, 80.0),
            (410.0, 140.0),
        ])
        .unwrap();
        GovernorConfig::new(table, 1, 4).unwrap()
    }

    fn inputs(load: f64, current: StateIndex) -> DecisionInputs {
        DecisionInputs {
            load,
            current,
            locked: false,
            active: ActiveOverride::None,
        }
    }

    #[test]
    fn lowest_matching_band_from_min_state() {
        // Row 0 is an unreachable escape row when min_state is 1: load 60
        // from state 1 lands in state 2's band (40 < 60 <= 100), not row 0's
        // wide (0, 400] band.
        let cfg = hotplug_cfg();
        let d = decide(&cfg, inputs(60.0, 1));
        assert_eq!(d.target, 2);
        assert!(d.arm_lock);
    }

    #[test]
    fn in_band_load_holds_state() {
        let cfg = hotplug_cfg();
        // 80 < 110 <= 150 is state 3's band
        let d = decide(&cfg, inputs(110.0, 3));
        assert_eq!(d.target, 3);
        assert!(!d.arm_lock);
    }

    #[test]
    fn boundary_load_belongs_to_the_band_it_closes() {
        let cfg = hotplug_cfg();
        // up side is inclusive: load exactly at up[1] = 50 stays in band 1
        assert_eq!(decide(&cfg, inputs(50.0, 1)).target, 1);
        // down side is strict: load exactly at down[2] = 40 is not in band 2
        assert_eq!(decide(&cfg, inputs(40.0, 2)).target, 1);
    }

    #[test]
    fn no_matching_band_holds_current() {
        // Non-monotonic table with a gap: nothing matches load 70.
        let table = ThresholdTable::from_rows(&[(50.0, 0.0), (100.0, 80.0)]).unwrap();
        let cfg = GovernorConfig::new(table, 0, 1).unwrap();
        assert_eq!(decide(&cfg, inputs(70.0, 1)).target, 1);
        assert_eq!(decide(&cfg, inputs(70.0, 0)).target, 0);
    }

    #[test]
    fn locked_suppresses_down_move() {
        let cfg = hotplug_cfg();
        let d = decide(
            &cfg,
            DecisionInputs {
                load: 10.0,
                current: 3,
                locked: true,
                active: ActiveOverride::None,
            },
        );
        assert_eq!(d.target, 3);
        assert!(!d.arm_lock);
    }

    #[test]
    fn locked_never_blocks_up_move() {
        let cfg = hotplug_cfg();
        let d = decide(
            &cfg,
            DecisionInputs {
                load: 200.0,
                current: 3,
                locked: true,
                active: ActiveOverride::None,
            },
        );
        assert_eq!(d.target, 4);
        assert!(d.arm_lock);
    }

    #[test]
    fn suspend_clamps_and_unlocks() {
        let cfg = hotplug_cfg();
        let d = decide(
            &cfg,
            DecisionInputs {
                load: 300.0,
                current: 4,
                locked: true,
                active: ActiveOverride::Suspend(1),
            },
        );
        assert_eq!(d.target, 1);
        assert!(d.force_unlock);
        assert!(!d.arm_lock);
    }

    #[test]
    fn boost_raises_floor_and_arms_lock() {
        let cfg = hotplug_cfg();
        let d = decide(
            &cfg,
            DecisionInputs {
                load: 0.0,
                current: 1,
                locked: false,
                active: ActiveOverride::Boost(2),
            },
        );
        assert_eq!(d.target, 2);
        assert!(d.arm_lock);
    }

    #[test]
    fn boost_below_current_never_lowers() {
        let cfg = hotplug_cfg();
        // load 110 is state 3's band, so the normal rule holds 3
        let d = decide(
            &cfg,
            DecisionInputs {
                load: 110.0,
                current: 3,
                locked: false,
                active: ActiveOverride::Boost(2),
            },
        );
        assert_eq!(d.target, 3);
    }

    #[test]
    fn boost_above_max_is_clamped() {
        let cfg = hotplug_cfg();
        let d = decide(
            &cfg,
            DecisionInputs {
                load: 0.0,
                current: 1,
                locked: false,
                active: ActiveOverride::Boost(9),
            },
        );
        assert_eq!(d.target, 4);
    }

    #[test]
    fn thermal_cap_tightens_normal_target() {
        let cfg = hotplug_cfg();
        let d = decide(
            &cfg,
            DecisionInputs {
                load: 200.0, // wants state 4
                current: 1,
                locked: false,
                active: ActiveOverride::ThermalCap(2),
            },
        );
        assert_eq!(d.target, 2);
        assert!(d.arm_lock);
    }

    #[test]
    fn pinned_bounds_ignore_table_and_load() {
        let mut cfg = hotplug_cfg();
        cfg.min_state = 3;
        cfg.max_state = 3;
        cfg.boost_target = 3;
        for load in [0.0, 60.0, 500.0] {
            assert_eq!(decide(&cfg, inputs(load, 1)).target, 3);
            assert_eq!(decide(&cfg, inputs(load, 4)).target, 3);
        }
    }

    #[test]
    fn tightened_bounds_clamp_target() {
        let mut cfg = hotplug_cfg();
        cfg.max_state = 2;
        let d = decide(&cfg, inputs(200.0, 1));
        // load 200 matches no band within 1..=2, holds; load 90 matches 2
        assert_eq!(d.target, 1);
        assert_eq!(decide(&cfg, inputs(90.0, 1)).target, 2);
    }
}
