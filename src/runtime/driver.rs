//! tokio event loop around a `SessionController`.
//!
//! One task owns the controller and serializes everything that can change
//! it: commands from the frontend, the one-second turn timer, and deferred
//! tasks coming due. Snapshots go out on a `watch` channel.
//!
//! ## Timers
//!
//! The turn timer is an `Interval` tagged with the controller's `TimerKey`.
//! After every event the driver compares keys. Anything that refills the
//! timer (a new game, a new turn, an accepted flip) gets a fresh interval,
//! and leaving `InProgress` drops it, so at most one timer is ever live.
//!
//! Deferred tasks wait in a due-time queue. Tasks from a superseded game are
//! dropped from the queue as soon as the game changes; anything else that
//! went stale is rejected by the controller when it runs.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::core::{CardIndex, Snapshot};
use crate::error::DriverError;
use crate::session::{Deferred, SessionController, TickOutcome, TimerKey};

/// Interval between timer ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

const COMMAND_BUFFER: usize = 64;

/// Actions a frontend can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Restart,
    Flip(CardIndex),
    SwitchTurn,
}

/// Handle to a running session task.
#[derive(Debug)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Snapshot>,
    shutdown: CancellationToken,
    task: JoinHandle<SessionController>,
}

impl SessionHandle {
    /// Queue a command for the session.
    pub async fn send(&self, command: Command) -> Result<(), DriverError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| DriverError::Closed)
    }

    /// Subscribe to snapshots. The receiver starts at the latest one.
    #[must_use]
    pub fn snapshots(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// The most recent snapshot.
    #[must_use]
    pub fn latest(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Stop the session task and take back the controller.
    ///
    /// Commands still queued are discarded.
    pub async fn shutdown(self) -> Result<SessionController, DriverError> {
        self.shutdown.cancel();
        Ok(self.task.await?)
    }

    /// Stop accepting commands, let the queued ones run, then take back the
    /// controller.
    pub async fn close(self) -> Result<SessionController, DriverError> {
        let Self { commands, task, .. } = self;
        drop(commands);
        Ok(task.await?)
    }
}

/// Run `controller` on a new tokio task.
///
/// Must be called from within a tokio runtime.
pub fn spawn(mut controller: SessionController) -> SessionHandle {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());

    controller.subscribe(move |snapshot: &Snapshot| {
        snapshot_tx.send_replace(snapshot.clone());
    });

    let shutdown = CancellationToken::new();
    let driver = SessionDriver {
        controller,
        commands: command_rx,
        shutdown: shutdown.clone(),
        pending: Vec::new(),
        timer: None,
    };

    SessionHandle {
        commands: command_tx,
        snapshots: snapshot_rx,
        shutdown,
        task: tokio::spawn(driver.run()),
    }
}

#[derive(Debug)]
struct Pending {
    due: Instant,
    task: Deferred,
}

struct SessionDriver {
    controller: SessionController,
    commands: mpsc::Receiver<Command>,
    shutdown: CancellationToken,
    pending: Vec<Pending>,
    timer: Option<(TimerKey, Interval)>,
}

impl SessionDriver {
    async fn run(mut self) -> SessionController {
        info!("Session driver started");

        loop {
            self.sync_timer();
            let next_due = self.pending.iter().map(|p| p.due).min();

            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    debug!("Session driver received shutdown signal");
                    break;
                }

                command = self.commands.recv() => match command {
                    Some(command) => self.apply(command),
                    None => {
                        debug!("All session handles dropped");
                        break;
                    }
                },

                _ = next_tick(&mut self.timer) => {
                    if let TickOutcome::TimedOut(player) = self.controller.tick() {
                        debug!(%player, "Timer expired");
                    }
                }

                _ = sleep_until(next_due) => self.run_due(),
            }

            self.collect_scheduled();
        }

        info!("Session driver stopped");
        self.controller
    }

    fn apply(&mut self, command: Command) {
        debug!(?command, "Command received");
        match command {
            Command::Start => {
                self.controller.start_game();
            }
            Command::Restart => self.controller.restart_game(),
            Command::Flip(index) => {
                self.controller.flip_card(index);
            }
            Command::SwitchTurn => {
                self.controller.switch_turn();
            }
        }
    }

    /// Keep exactly one interval alive for the current timer key.
    fn sync_timer(&mut self) {
        let wanted = self.controller.timer_key();
        if wanted == self.timer.as_ref().map(|(key, _)| *key) {
            return;
        }

        self.timer = wanted.map(|key| {
            let mut interval = time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            debug!(game = key.game, turn = key.turn, timer = key.timer, "Turn timer armed");
            (key, interval)
        });
    }

    /// Move newly scheduled work into the queue and cancel work from old games.
    fn collect_scheduled(&mut self) {
        let game = self.controller.epochs().game;
        let before = self.pending.len();
        self.pending.retain(|p| p.task.game() == game);
        if self.pending.len() < before {
            debug!(cancelled = before - self.pending.len(), "Cancelled deferred tasks");
        }

        let now = Instant::now();
        self.pending.extend(
            self.controller
                .take_scheduled()
                .into_iter()
                .map(|s| Pending { due: now + s.delay, task: s.task }),
        );
    }

    fn run_due(&mut self) {
        let now = Instant::now();
        let (mut due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.due <= now);
        self.pending = rest;

        due.sort_by_key(|p| p.due);
        for p in due {
            self.controller.run_deferred(p.task);
        }
    }
}

async fn next_tick(timer: &mut Option<(TimerKey, Interval)>) {
    match timer {
        Some((_, interval)) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn sleep_until(due: Option<Instant>) {
    match due {
        Some(due) => time::sleep_until(due).await,
        None => std::future::pending().await,
    }
}
