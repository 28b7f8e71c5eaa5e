use async_trait::async_trait;

use crate::error::PlatformError;
use crate::{LoadSample, StateIndex};

/// Direction of a single actuation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// The narrow capability interface a platform injects into a governor.
///
/// How a unit is brought online, a frequency level changed or a load counter
/// read is entirely the platform's business; the governor only ever asks for
/// an instantaneous load figure, the live state index, and one step in one
/// direction. Implementations must be safe to call from the cycle task and
/// the actuation worker concurrently.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Instantaneous load reading, unit-agnostic (percent-of-capacity,
    /// summed busy percent, degrees C -- whatever the policy samples).
    async fn read_load(&self) -> Result<LoadSample, PlatformError>;

    /// The resource's live discrete operating point.
    async fn current_state(&self) -> Result<StateIndex, PlatformError>;

    /// Move one unit or one level in `direction`. Which concrete unit gets
    /// picked (e.g. which offline core to bring up) is the platform's choice.
    async fn step(&self, direction: Direction) -> Result<(), PlatformError>;
}
