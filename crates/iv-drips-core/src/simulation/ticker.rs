//! Cancellable periodic driver for the simulation.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::{tick, DripState, SpeedMode};

/// Wall-clock period between simulation ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

enum Command {
    Replace(Vec<DripState>),
}

/// Owns a session's simulated states and ticks them on a timer.
///
/// Each tick's snapshot is published on a watch channel. The task is aborted
/// by [`Ticker::cancel`] or when the ticker is dropped, so a mode switch that
/// replaces the ticker can never leave an orphaned timer behind.
///
/// Must be created inside a Tokio runtime.
pub struct Ticker {
    mode: SpeedMode,
    task: JoinHandle<()>,
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Vec<DripState>>,
}

impl Ticker {
    pub fn spawn(initial: Vec<DripState>, mode: SpeedMode) -> Self {
        Self::with_period(initial, mode, TICK_INTERVAL)
    }

    /// Spawn with a custom wall-clock period. Each period still advances the
    /// simulation by one tick.
    pub fn with_period(initial: Vec<DripState>, mode: SpeedMode, period: Duration) -> Self {
        let (snapshot_tx, snapshots) = watch::channel(initial.clone());
        let (commands, mut command_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            let mut states = initial;
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of an interval completes immediately
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let next = tick(&states, mode);
                        log_depletions(&states, &next);
                        states = next;
                    }
                    Some(command) = command_rx.recv() => match command {
                        Command::Replace(fresh) => {
                            states = fresh;
                            interval.reset();
                        }
                    },
                    else => break,
                }

                if snapshot_tx.send(states.clone()).is_err() {
                    break;
                }
            }
        });

        Self {
            mode,
            task,
            commands,
            snapshots,
        }
    }

    pub fn mode(&self) -> SpeedMode {
        self.mode
    }

    /// Discard simulated state in favour of freshly fetched states.
    pub fn replace(&self, states: Vec<DripState>) {
        // Send only fails once the task is gone, and then there is nothing to reset
        let _ = self.commands.send(Command::Replace(states));
    }

    /// Latest published snapshot.
    pub fn latest(&self) -> Vec<DripState> {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<DripState>> {
        self.snapshots.clone()
    }

    /// Stop ticking and return the last snapshot.
    pub fn cancel(self) -> Vec<DripState> {
        self.latest()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn log_depletions(before: &[DripState], after: &[DripState]) {
    for (old, new) in before.iter().zip(after) {
        if !old.is_depleted() && new.is_depleted() {
            debug!(patient_id = new.patient_id, "infusion completed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(id: i64) -> DripState {
        DripState::new(id, 360.0, 1000.0, None)
    }

    #[tokio::test(start_paused = true)]
    async fn test_publishes_one_snapshot_per_tick() {
        let ticker = Ticker::spawn(vec![bag(1)], SpeedMode::Live);
        let mut rx = ticker.subscribe();

        for _ in 0..3 {
            rx.changed().await.unwrap();
        }

        let latest = ticker.latest();
        // 360 ml/h is 0.1 ml per second
        assert!((latest[0].current_volume - 999.7).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_mode_runs_fast() {
        let ticker = Ticker::spawn(vec![bag(1)], SpeedMode::Demonstration);
        let mut rx = ticker.subscribe();
        rx.changed().await.unwrap();

        assert!((ticker.latest()[0].current_volume - 990.0).abs() < 1e-9);
        assert_eq!(ticker.mode(), SpeedMode::Demonstration);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replace_discards_simulated_state() {
        let ticker = Ticker::spawn(vec![bag(1)], SpeedMode::Demonstration);
        let mut rx = ticker.subscribe();
        rx.changed().await.unwrap();
        rx.changed().await.unwrap();

        ticker.replace(vec![bag(2)]);
        rx.changed().await.unwrap();

        let latest = rx.borrow_and_update().clone();
        assert_eq!(latest[0].patient_id, 2);
        assert_eq!(latest[0].current_volume, 1000.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_the_timer() {
        let ticker = Ticker::spawn(vec![bag(1)], SpeedMode::Live);
        let mut rx = ticker.subscribe();
        drop(ticker);

        while rx.changed().await.is_ok() {}
        assert!(rx.has_changed().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_returns_last_snapshot() {
        let ticker = Ticker::spawn(vec![bag(1)], SpeedMode::Live);
        let mut rx = ticker.subscribe();
        rx.changed().await.unwrap();

        let last = ticker.cancel();
        assert!(last[0].current_volume < 1000.0);
    }
}
