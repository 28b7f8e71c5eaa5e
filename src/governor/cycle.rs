use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error, warn};

use crate::core::decision::{DecisionInputs, decide};
use crate::governor::actuator::Command;
use crate::governor::{RunState, Shared, lock};

/// Periodic decision cycle for one governor instance.
///
/// The next cycle is scheduled from the previous cycle's start, so jitter in
/// decision or dispatch time never drifts the sampling period. Suspend parks
/// the loop on the run-state channel; stop (or a dropped sender) ends it.
pub(crate) async fn run(
    shared: Arc<Shared>,
    cmd_tx: mpsc::Sender<Command>,
    mut run_rx: watch::Receiver<RunState>,
) {
    debug!(target: "loadgov::cycle", "cycle task started");
    loop {
        let run_state = *run_rx.borrow_and_update();
        match run_state {
            RunState::Stopped => break,
            RunState::Suspended => {
                if run_rx.changed().await.is_err() {
                    break;
                }
                continue;
            }
            RunState::Running => {}
        }

        let started = Instant::now();
        tick(&shared, &cmd_tx).await;

        let period = lock(&shared.config).cycle_period;
        tokio::select! {
            _ = sleep_until(started + period) => {}
            changed = run_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                // loop head re-reads the new run state
            }
        }
    }
    debug!(target: "loadgov::cycle", "cycle task stopped");
}

async fn tick(shared: &Shared, cmd_tx: &mpsc::Sender<Command>) {
    // A failed load read degrades to the last raw sample; the cycle always
    // proceeds and reschedules.
    let raw = match shared.resource.read_load().await {
        Ok(v) if v >= 0.0 => v,
        Ok(v) => {
            warn!(target: "loadgov::cycle", raw = v, "negative load sample clamped to zero");
            0.0
        }
        Err(e) => {
            let last = lock(&shared.telemetry).last_raw;
            warn!(target: "loadgov::cycle", error = %e, last, "load read failed, reusing last sample");
            last
        }
    };
    let smoothed = lock(&shared.sampler).tick(raw);

    let current = match shared.resource.current_state().await {
        Ok(s) => s,
        Err(e) => {
            let last = lock(&shared.telemetry).state;
            warn!(target: "loadgov::cycle", error = %e, last, "state read failed, using last known");
            last
        }
    };

    let cfg = lock(&shared.config).clone();
    let active = lock(&shared.overrides).authoritative();
    let locked = lock(&shared.hysteresis).is_locked();

    let decision = decide(
        &cfg,
        DecisionInputs {
            load: smoothed,
            current,
            locked,
            active,
        },
    );

    {
        let mut hyst = lock(&shared.hysteresis);
        if decision.force_unlock {
            hyst.unlock();
        } else if decision.arm_lock {
            hyst.lock(cfg.hysteresis);
        }
    }

    {
        let mut t = lock(&shared.telemetry);
        t.last_raw = raw;
        t.smoothed = smoothed;
        t.state = current;
        t.target = decision.target;
    }

    if decision.target != current {
        debug!(
            target: "loadgov::cycle",
            load = smoothed, current, target_state = decision.target, ?active,
            "dispatching convergence"
        );
        // Non-blocking hand-off; a full queue means the worker is wedged,
        // which silently freezes the resource, so shout.
        if let Err(e) = cmd_tx.try_send(Command::Converge(decision.target)) {
            error!(
                target: "loadgov::cycle",
                target_state = decision.target, error = %e,
                "actuation queue stalled, dropping target"
            );
        }
    }
}
