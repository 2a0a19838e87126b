use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::core::models::usage::AggregatedSnapshot;

pub type PassFuture = Pin<Box<dyn Future<Output = AggregatedSnapshot> + Send>>;
/// One aggregation pass, injected at construction so the aggregator plugs
/// in at daemon start and tests plug in stubs.
pub type PassFn = Arc<dyn Fn() -> PassFuture + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Scheduled,
    Running,
}

enum Command {
    Refresh,
    SetPeriod(Duration),
}

/// Drives recurring aggregation passes off a single logical timer.
///
/// Guarantees: an immediate pass on start before the first timer fire; at
/// most one pass in flight; refresh requests and timer fires are identical
/// triggers; requests arriving mid-pass coalesce into at most one extra
/// pass; a period change rearms the timer and triggers one immediate pass.
/// All state is in-memory and reinitializes on restart.
pub struct Scheduler {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Option<AggregatedSnapshot>>,
    states: watch::Receiver<SchedulerState>,
    task: JoinHandle<()>,
}

impl Scheduler {
    pub fn start(interval_minutes: u64, pass: PassFn) -> Self {
        Self::with_period(Duration::from_secs(interval_minutes.max(1) * 60), pass)
    }

    pub fn with_period(period: Duration, pass: PassFn) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshots) = watch::channel(None);
        let (state_tx, states) = watch::channel(SchedulerState::Idle);
        let task = tokio::spawn(run_loop(period, pass, command_rx, snapshot_tx, state_tx));
        Self {
            commands,
            snapshots,
            states,
            task,
        }
    }

    /// Request an immediate pass; treated exactly like a timer fire.
    pub fn refresh_now(&self) {
        let _ = self.commands.send(Command::Refresh);
    }

    /// Rearm the timer with a new cadence, triggering one immediate pass so
    /// the change is felt right away.
    pub fn set_interval(&self, minutes: u64) {
        self.set_period(Duration::from_secs(minutes.max(1) * 60));
    }

    pub fn set_period(&self, period: Duration) {
        let _ = self.commands.send(Command::SetPeriod(period));
    }

    /// Snapshot push channel: holds the latest published snapshot only.
    pub fn subscribe(&self) -> watch::Receiver<Option<AggregatedSnapshot>> {
        self.snapshots.clone()
    }

    pub fn state(&self) -> SchedulerState {
        *self.states.borrow()
    }

    /// Finish the in-flight pass (if any) and stop. In-flight fetches are
    /// never cancelled.
    pub async fn shutdown(self) {
        drop(self.commands);
        let _ = self.task.await;
    }
}

async fn run_loop(
    mut period: Duration,
    pass: PassFn,
    mut commands: mpsc::UnboundedReceiver<Command>,
    snapshots: watch::Sender<Option<AggregatedSnapshot>>,
    states: watch::Sender<SchedulerState>,
) {
    // Initial immediate pass, before the first timer-driven one.
    run_pass(&pass, &snapshots, &states).await;

    loop {
        if coalesce_pending(&mut period, &pass, &mut commands, &snapshots, &states)
            .await
            .is_none()
        {
            break;
        }

        let _ = states.send(SchedulerState::Scheduled);
        tokio::select! {
            _ = tokio::time::sleep(period) => {}
            cmd = commands.recv() => match cmd {
                Some(Command::Refresh) => {}
                Some(Command::SetPeriod(new_period)) => period = new_period,
                None => break,
            }
        }
        run_pass(&pass, &snapshots, &states).await;
    }

    let _ = states.send(SchedulerState::Idle);
}

/// Drain triggers that queued up while a pass was running: any number of
/// pending requests collapses into at most one extra pass per drain round.
/// Returns None once all command senders are gone.
async fn coalesce_pending(
    period: &mut Duration,
    pass: &PassFn,
    commands: &mut mpsc::UnboundedReceiver<Command>,
    snapshots: &watch::Sender<Option<AggregatedSnapshot>>,
    states: &watch::Sender<SchedulerState>,
) -> Option<()> {
    loop {
        let mut rerun = false;
        loop {
            match commands.try_recv() {
                Ok(Command::Refresh) => rerun = true,
                Ok(Command::SetPeriod(new_period)) => {
                    *period = new_period;
                    rerun = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return None,
            }
        }
        if !rerun {
            return Some(());
        }
        run_pass(pass, snapshots, states).await;
    }
}

async fn run_pass(
    pass: &PassFn,
    snapshots: &watch::Sender<Option<AggregatedSnapshot>>,
    states: &watch::Sender<SchedulerState>,
) {
    let _ = states.send(SchedulerState::Running);
    let snapshot = pass().await;
    // The snapshot is published whole, after the pass completes; a consumer
    // never observes a partially filled pass.
    let _ = snapshots.send(Some(snapshot));
}
