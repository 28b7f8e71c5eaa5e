use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::StateIndex;
use crate::governor::{Shared, lock};
use crate::platform::Direction;

/// Consecutive step failures tolerated before a convergence job is abandoned
/// until the next cycle re-dispatches it.
const MAX_STEP_FAILURES: u32 = 3;

#[derive(Debug)]
pub(crate) enum Command {
    /// Drive the resource to this state, one step at a time.
    Converge(StateIndex),
    /// Ack once every previously queued job has finished. Suspend sends this
    /// before pinning the clamp state so no stale target lands afterwards.
    Quiesce(oneshot::Sender<()>),
}

/// Serial actuation worker: one per governor instance, so up-moves and
/// down-moves can never interleave against the same resource.
pub(crate) async fn run(mut rx: mpsc::Receiver<Command>, shared: Arc<Shared>) {
    debug!(target: "loadgov::actuator", "actuation worker started");
    while let Some(cmd) = rx.recv().await {
        match cmd {
            Command::Converge(target) => {
                // A tick that snapshots the overrides just before suspend
                // sets the slot can enqueue its normal-mode target behind
                // the clamp. While suspended, only the clamp state may land.
                let stale = lock(&shared.overrides)
                    .suspend_clamp()
                    .is_some_and(|clamp| clamp != target);
                if stale {
                    debug!(
                        target: "loadgov::actuator",
                        target_state = target,
                        "dropping stale target queued across suspend"
                    );
                    continue;
                }
                converge(&shared, target).await;
            }
            Command::Quiesce(ack) => {
                let _ = ack.send(());
            }
        }
    }
    debug!(target: "loadgov::actuator", "actuation worker stopped");
}

/// Step toward `target`, re-reading the live state before every step so
/// concurrent external changes are respected. Stops the moment live state
/// equals the target, however many steps that takes.
async fn converge(shared: &Shared, target: StateIndex) {
    let mut failures = 0u32;
    loop {
        let current = match shared.resource.current_state().await {
            Ok(s) => s,
            Err(e) => {
                warn!(target: "loadgov::actuator", error = %e, "state read failed mid-convergence, deferring");
                return;
            }
        };
        lock(&shared.telemetry).state = current;

        if current == target {
            return;
        }
        let direction = if current < target {
            Direction::Up
        } else {
            Direction::Down
        };

        match shared.resource.step(direction).await {
            Ok(()) => failures = 0,
            Err(e) => {
                failures += 1;
                warn!(
                    target: "loadgov::actuator",
                    ?direction, failures, error = %e,
                    "actuation step failed"
                );
                if failures >= MAX_STEP_FAILURES {
                    warn!(
                        target: "loadgov::actuator",
                        current, target_state = target,
                        "giving up convergence until next cycle"
                    );
                    return;
                }
            }
        }
    }
}
