use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::{signal, time};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use loadgov::{Direction, Governor, PlatformError, Resource, policy};

/// Simulated 4-core cluster: a triangle-wave load and an atomic online-core
/// count stand in for the real hotplug capability.
struct SimCluster {
    online: AtomicU32,
    ticks: AtomicU64,
}

impl SimCluster {
    fn new() -> Self {
        Self {
            online: AtomicU32::new(1),
            ticks: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl Resource for SimCluster {
    async fn read_load(&self) -> Result<f64, PlatformError> {
        let t = self.ticks.fetch_add(1, Ordering::Relaxed);
        // slow triangle wave between idle and near-saturated
        let phase = (t % 120) as f64 / 120.0;
        let wave = 2.0 * if phase < 0.5 { phase } else { 1.0 - phase };
        Ok(wave * 380.0)
    }

    async fn current_state(&self) -> Result<u32, PlatformError> {
        Ok(self.online.load(Ordering::Relaxed))
    }

    async fn step(&self, direction: Direction) -> Result<(), PlatformError> {
        match direction {
            Direction::Up => {
                self.online.fetch_add(1, Ordering::Relaxed);
            }
            Direction::Down => {
                if self.online.load(Ordering::Relaxed) <= 1 {
                    return Err(PlatformError::Unavailable("core 0 stays online".into()));
                }
                self.online.fetch_sub(1, Ordering::Relaxed);
            }
        }
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(std::io::stderr))
        .init();

    let config = policy::hotplug(4)?;
    tracing::info!(
        "loadgovd v{} started (hotplug policy, {} states, period {:?})",
        env!("CARGO_PKG_VERSION"),
        config.table.rows(),
        config.cycle_period,
    );

    let governor = Governor::start(Arc::new(SimCluster::new()), config)?;

    loop {
        tokio::select! {
            _ = time::sleep(Duration::from_secs(2)) => {
                let status = governor.status();
                println!("{}", serde_json::to_string(&status)?);
                if !status.running {
                    tracing::error!("cycle task died, resource frozen at state {}", status.state);
                    break;
                }
            }
            _ = signal::ctrl_c() => {
                tracing::info!("received ctrl-c, shutting down");
                break;
            }
        }
    }

    governor.shutdown().await;
    tracing::info!("stopped");
    Ok(())
}
