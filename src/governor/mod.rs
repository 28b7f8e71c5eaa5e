//! Governor orchestration: owns the shared state, the periodic cycle task
//! and the actuation worker, and exposes the runtime-tunable surface plus
//! the override entry points.

mod actuator;
mod cycle;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::StateIndex;
use crate::core::config::{GovernorConfig, MAX_CYCLE_PERIOD, MAX_HYSTERESIS, MAX_WINDOW, MIN_CYCLE_PERIOD};
use crate::core::hysteresis::HysteresisLock;
use crate::core::overrides::{ActiveOverride, OverrideState};
use crate::core::sampler::LoadSampler;
use crate::core::table::ThresholdEntry;
use crate::error::ConfigError;
use crate::platform::Resource;

use actuator::Command;

/// Commands queued ahead of the actuation worker before dispatch degrades to
/// a loud error. Anything beyond a couple means the worker is wedged.
const ACTUATION_QUEUE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunState {
    Running,
    Suspended,
    Stopped,
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Telemetry {
    pub smoothed: f64,
    pub last_raw: f64,
    pub state: StateIndex,
    pub target: StateIndex,
}

/// State shared between the governor handle, the cycle task and the
/// actuation worker. Critical sections never await, so plain std mutexes.
pub(crate) struct Shared {
    pub(crate) resource: Arc<dyn Resource>,
    pub(crate) config: Mutex<GovernorConfig>,
    pub(crate) sampler: Mutex<LoadSampler>,
    pub(crate) overrides: Mutex<OverrideState>,
    pub(crate) hysteresis: Mutex<HysteresisLock>,
    pub(crate) telemetry: Mutex<Telemetry>,
}

/// Recover from a poisoned mutex rather than propagating the panic; every
/// guarded value stays internally consistent under all partial updates.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Read-only snapshot for observability surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct GovernorStatus {
    pub state: StateIndex,
    pub smoothed_load: f64,
    pub target: StateIndex,
    pub locked: bool,
    pub authority: ActiveOverride,
    pub suspended: bool,
    pub running: bool,
}

/// One closed-loop governor instance over an injected [`Resource`].
///
/// Instances are independent: each owns its cycle task, actuation worker and
/// tunables, so per-CPU or per-device governors never share state. Dropping
/// the handle stops both tasks; [`Governor::shutdown`] does so gracefully.
pub struct Governor {
    shared: Arc<Shared>,
    cmd_tx: mpsc::Sender<Command>,
    run_tx: watch::Sender<RunState>,
    cycle: JoinHandle<()>,
    actuator: JoinHandle<()>,
}

impl Governor {
    /// Validate `config`, spawn the cycle task and actuation worker, and
    /// start governing. Must be called from within a tokio runtime.
    pub fn start(resource: Arc<dyn Resource>, config: GovernorConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let window = config.window;
        let shared = Arc::new(Shared {
            resource,
            sampler: Mutex::new(LoadSampler::new(window)),
            overrides: Mutex::new(OverrideState::default()),
            hysteresis: Mutex::new(HysteresisLock::new()),
            telemetry: Mutex::new(Telemetry::default()),
            config: Mutex::new(config),
        });

        let (cmd_tx, cmd_rx) = mpsc::channel(ACTUATION_QUEUE);
        let (run_tx, run_rx) = watch::channel(RunState::Running);

        let actuator = tokio::spawn(actuator::run(cmd_rx, shared.clone()));
        let cycle = tokio::spawn(cycle::run(shared.clone(), cmd_tx.clone(), run_rx));

        Ok(Self {
            shared,
            cmd_tx,
            run_tx,
            cycle,
            actuator,
        })
    }

    /// Stop cycling, let the worker drain, and reap both tasks.
    pub async fn shutdown(self) {
        let _ = self.run_tx.send(RunState::Stopped);
        let _ = self.cycle.await;
        drop(self.cmd_tx);
        let _ = self.actuator.await;
    }

    // --- observability -----------------------------------------------------

    pub fn smoothed_load(&self) -> f64 {
        lock(&self.shared.telemetry).smoothed
    }

    /// Last state observed by the cycle or the actuation worker.
    pub fn current_state(&self) -> StateIndex {
        lock(&self.shared.telemetry).state
    }

    /// False once the cycle task has died, which would silently freeze the
    /// resource at its last state; owners should treat it loudly.
    pub fn is_running(&self) -> bool {
        !self.cycle.is_finished()
    }

    pub fn status(&self) -> GovernorStatus {
        let t = *lock(&self.shared.telemetry);
        GovernorStatus {
            state: t.state,
            smoothed_load: t.smoothed,
            target: t.target,
            locked: lock(&self.shared.hysteresis).is_locked(),
            authority: lock(&self.shared.overrides).authoritative(),
            suspended: lock(&self.shared.overrides).is_suspended(),
            running: self.is_running(),
        }
    }

    /// Snapshot of the current tunables.
    pub fn config(&self) -> GovernorConfig {
        lock(&self.shared.config).clone()
    }

    // --- configuration surface ---------------------------------------------

    pub fn set_window(&self, window: usize) -> Result<(), ConfigError> {
        if !(1..=MAX_WINDOW).contains(&window) {
            return Err(ConfigError::WindowOutOfRange(window));
        }
        lock(&self.shared.config).window = window;
        lock(&self.shared.sampler).resize(window);
        debug!(target: "loadgov::config", window, "sample window updated");
        Ok(())
    }

    pub fn set_cycle_period(&self, period: Duration) -> Result<(), ConfigError> {
        if !(MIN_CYCLE_PERIOD..=MAX_CYCLE_PERIOD).contains(&period) {
            return Err(ConfigError::PeriodOutOfRange(period));
        }
        lock(&self.shared.config).cycle_period = period;
        debug!(target: "loadgov::config", ?period, "cycle period updated");
        Ok(())
    }

    pub fn set_hysteresis(&self, duration: Duration) -> Result<(), ConfigError> {
        if duration > MAX_HYSTERESIS {
            return Err(ConfigError::HysteresisTooLong(duration));
        }
        lock(&self.shared.config).hysteresis = duration;
        debug!(target: "loadgov::config", ?duration, "hysteresis updated");
        Ok(())
    }

    /// Tighten or widen the state bounds. The boost target is clamped into
    /// the new bounds rather than rejected.
    pub fn set_bounds(&self, min: StateIndex, max: StateIndex) -> Result<(), ConfigError> {
        if min > max {
            return Err(ConfigError::BoundsInverted { min, max });
        }
        let mut cfg = lock(&self.shared.config);
        let mut candidate = cfg.clone();
        candidate.min_state = min;
        candidate.max_state = max;
        candidate.boost_target = candidate.boost_target.clamp(min, max);
        candidate.validate()?;
        if candidate.boost_target != cfg.boost_target {
            debug!(
                target: "loadgov::config",
                from = cfg.boost_target, to = candidate.boost_target,
                "boost target clamped into new bounds"
            );
        }
        *cfg = candidate;
        debug!(target: "loadgov::config", min, max, "state bounds updated");
        Ok(())
    }

    pub fn set_boost_target(&self, target: StateIndex) -> Result<(), ConfigError> {
        let mut cfg = lock(&self.shared.config);
        if target < cfg.min_state || target > cfg.max_state {
            return Err(ConfigError::BoostOutOfBounds {
                target,
                min: cfg.min_state,
                max: cfg.max_state,
            });
        }
        cfg.boost_target = target;
        Ok(())
    }

    /// Replace one threshold row. Readers only ever copy entries out under
    /// the config lock, so a torn up/down pair is impossible.
    pub fn set_threshold(&self, state: StateIndex, entry: ThresholdEntry) -> Result<(), ConfigError> {
        lock(&self.shared.config).table.set(state, entry)?;
        debug!(
            target: "loadgov::config",
            state, up = entry.up, down = entry.down,
            "threshold row updated"
        );
        Ok(())
    }

    // --- override entry points ----------------------------------------------

    /// Raise the decision floor, optionally only for `hold`. A `None` target
    /// falls back to the configured `boost_target` (the touch-boost case,
    /// which carries no per-event target). Fire-and-forget: takes effect from
    /// the next cycle. Targets outside the configured bounds are clamped,
    /// not rejected.
    pub fn enter_boost(&self, target: Option<StateIndex>, hold: Option<Duration>) {
        let (min, max, configured) = {
            let cfg = lock(&self.shared.config);
            (cfg.min_state, cfg.max_state, cfg.boost_target)
        };
        let requested = target.unwrap_or(configured);
        let clamped = requested.clamp(min, max);
        if clamped != requested {
            warn!(
                target: "loadgov::override",
                requested, clamped,
                "boost target outside bounds, clamped"
            );
        }
        lock(&self.shared.overrides).set_boost(clamped, hold);
        debug!(target: "loadgov::override", boost = clamped, ?hold, "boost entered");
    }

    pub fn clear_boost(&self) {
        lock(&self.shared.overrides).clear_boost();
        debug!(target: "loadgov::override", "boost cleared");
    }

    /// Pin the resource at `clamp` and halt normal decisioning: sets the
    /// suspend slot (any racing cycle already decides the clamp), clears the
    /// hysteresis lock, parks the cycle task, waits for in-flight actuation
    /// to quiesce, then drives straight to the clamp state. Idempotent.
    pub async fn enter_suspend(&self, clamp: StateIndex) {
        let clamp = {
            let cfg = lock(&self.shared.config);
            clamp.clamp(cfg.min_state, cfg.max_state)
        };
        {
            lock(&self.shared.overrides).enter_suspend(clamp);
            lock(&self.shared.hysteresis).unlock();
        }
        let _ = self.run_tx.send(RunState::Suspended);

        let (ack_tx, ack_rx) = oneshot::channel();
        if self.cmd_tx.send(Command::Quiesce(ack_tx)).await.is_ok() {
            let _ = ack_rx.await;
        }
        let _ = self.cmd_tx.send(Command::Converge(clamp)).await;
        info!(target: "loadgov::override", clamp, "suspended");
    }

    /// Restore normal bounds, drive to the maximum permitted state and
    /// resume periodic cycling.
    pub async fn exit_suspend(&self) {
        let resume_to = {
            let cfg = lock(&self.shared.config);
            let cap = lock(&self.shared.overrides)
                .thermal_cap()
                .unwrap_or(cfg.max_state);
            cfg.max_state.min(cap.max(cfg.min_state))
        };
        lock(&self.shared.overrides).exit_suspend();
        let _ = self.cmd_tx.send(Command::Converge(resume_to)).await;
        let _ = self.run_tx.send(RunState::Running);
        info!(target: "loadgov::override", resume_to, "resumed");
    }

    /// Cap normal decisions at `max`. Caps outside bounds are clamped.
    pub fn set_thermal_cap(&self, max: StateIndex) {
        let clamped = {
            let cfg = lock(&self.shared.config);
            max.clamp(cfg.min_state, cfg.max_state)
        };
        if clamped != max {
            warn!(target: "loadgov::override", max, clamped, "thermal cap outside bounds, clamped");
        }
        lock(&self.shared.overrides).set_thermal_cap(clamped);
        info!(target: "loadgov::override", cap = clamped, "thermal cap set");
    }

    pub fn clear_thermal_cap(&self) {
        lock(&self.shared.overrides).clear_thermal_cap();
        info!(target: "loadgov::override", "thermal cap cleared");
    }
}
