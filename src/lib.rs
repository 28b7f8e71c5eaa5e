//! Closed-loop resource governors driven by a smoothed load signal.
//!
//! One engine covers the whole family -- core hotplug, CPU frequency
//! scaling, GPU power levels, thermal caps: sample a load figure each cycle,
//! smooth it over a ring of recent samples, look the current state up in a
//! per-state threshold table, decide up/down/hold, suppress flapping with a
//! time-based hysteresis lock, and honor external overrides (boost,
//! suspend/resume, thermal cap). The mechanics of actually flipping a core
//! or changing a clock are injected through the narrow [`Resource`] trait,
//! so a governor instance is just policy data plus that capability.
//!
//! ```no_run
//! use std::sync::Arc;
//! use loadgov::{Governor, policy};
//! # use loadgov::{Resource, Direction, PlatformError};
//! # struct MyCpus;
//! # #[async_trait::async_trait]
//! # impl Resource for MyCpus {
//! #     async fn read_load(&self) -> Result<f64, PlatformError> { Ok(0.0) }
//! #     async fn current_state(&self) -> Result<u32, PlatformError> { Ok(1) }
//! #     async fn step(&self, _: Direction) -> Result<(), PlatformError> { Ok(()) }
//! # }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let governor = Governor::start(Arc::new(MyCpus), policy::hotplug(4)?)?;
//! governor.enter_boost(None, None); // floor rises to the configured boost target
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod error;
pub mod governor;
pub mod platform;
pub mod policy;

/// Discrete operating point: core count, frequency level, power level.
pub type StateIndex = u32;

/// One raw load reading; unit-agnostic and non-negative.
pub type LoadSample = f64;

pub use crate::core::config::GovernorConfig;
pub use crate::core::overrides::ActiveOverride;
pub use crate::core::table::{ThresholdEntry, ThresholdTable};
pub use crate::error::{ConfigError, PlatformError};
pub use crate::governor::{Governor, GovernorStatus};
pub use crate::platform::{Direction, Resource};
