use tokio::time::{Duration, Instant};

/// Time-bounded suppressor of down-transitions, armed on every up-move so a
/// freshly raised state cannot flap straight back down.
///
/// Expiry is a stored deadline, not a cycle counter: the lock reads unlocked
/// once the deadline passes even if no decision cycle ran in between (cycles
/// are themselves paused during suspend). Up-moves and overrides are never
/// affected.
#[derive(Debug, Default)]
pub struct HysteresisLock {
    deadline: Option<Instant>,
}

impl HysteresisLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the suppressor until `now + duration`.
    pub fn lock(&mut self, duration: Duration) {
        self.deadline = Some(Instant::now() + duration);
    }

    pub fn is_locked(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() < d)
    }

    /// Clear immediately. Used on suspend so a pending lock cannot delay
    /// power-down.
    pub fn unlock(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn locks_until_deadline() {
        let mut lock = HysteresisLock::new();
        assert!(!lock.is_locked());

        lock.lock(Duration::from_millis(2000));
        assert!(lock.is_locked());

        advance(Duration::from_millis(1999)).await;
        assert!(lock.is_locked());

        advance(Duration::from_millis(1)).await;
        assert!(!lock.is_locked());
    }

    #[tokio::test(start_paused = true)]
    async fn relock_extends_deadline() {
        let mut lock = HysteresisLock::new();
        lock.lock(Duration::from_millis(100));
        advance(Duration::from_millis(50)).await;
        lock.lock(Duration::from_millis(100));
        advance(Duration::from_millis(99)).await;
        assert!(lock.is_locked());
    }

    #[tokio::test(start_paused = true)]
    async fn unlock_clears_immediately() {
        let mut lock = HysteresisLock::new();
        lock.lock(Duration::from_secs(60));
        lock.unlock();
        assert!(!lock.is_locked());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_never_locks() {
        let mut lock = HysteresisLock::new();
        lock.lock(Duration::ZERO);
        assert!(!lock.is_locked());
    }
}
