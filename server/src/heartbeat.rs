//! Liveness signal
//!
//! A detached task that logs on a fixed period. It owns nothing but its interval.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Spawn the heartbeat on the current runtime
pub fn spawn_heartbeat(interval: Duration) -> JoinHandle<()> {
    tokio::spawn(beat(interval, || {
        tracing::info!("Server alive, waiting for requests...");
    }))
}

async fn beat<F: FnMut()>(interval: Duration, mut on_beat: F) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        on_beat();
    }
}
