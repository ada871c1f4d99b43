//! Background worker that owns the rig.
//!
//! The [`RigWorker`] is the only owner of mutable rig state. It runs in its
//! own Tokio task and uses `tokio::select!` to handle:
//!
//! - [`Command`]s from the UI
//! - a 1 Hz wall clock and a 1 Hz acquisition countdown
//! - results from the dispatcher task, which owns both command channels and
//!   runs one relay at a time so two commands never race on a mailbox
//! - results from the sensor task, which polls every two seconds
//! - a [`CancellationToken`] for shutdown
//!
//! After every change it publishes a [`RigEvent::Snapshot`].

use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::{Interval, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use spinrig_types::{Actuator, ConnectionState, RelayOutcome, RigCommand, SensorReading};

use crate::channel::CommandChannel;
use crate::error::{Error, Result};
use crate::messages::{Command, RigEvent};
use crate::rig::{Rejection, RigState};
use crate::sensor::SensorPoller;
use crate::thresholds::HumidityBand;
use crate::timer::{DEFAULT_INITIAL_MINUTES, DEFAULT_RESET_MINUTES, MINUTES_RANGE, Tick, Timer};
use crate::traits::Relay;

/// A relay behind a shared trait object.
pub type DynRelay = Arc<dyn Relay>;

/// The rig's three relays.
pub struct Rig {
    pub slider: CommandChannel<DynRelay>,
    pub belt: CommandChannel<DynRelay>,
    pub sensor: SensorPoller<DynRelay>,
}

/// Intervals and presets for a [`RigWorker`].
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    pub clock_interval: Duration,
    pub timer_interval: Duration,
    pub sensor_interval: Duration,
    pub initial_minutes: u32,
    pub reset_minutes: u32,
    pub band: HumidityBand,
    /// Capacity of the command, event and relay queues (at least 2).
    pub channel_capacity: usize,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            clock_interval: Duration::from_secs(1),
            timer_interval: Duration::from_secs(1),
            sensor_interval: Duration::from_secs(2),
            initial_minutes: DEFAULT_INITIAL_MINUTES,
            reset_minutes: DEFAULT_RESET_MINUTES,
            band: HumidityBand::default(),
            channel_capacity: 64,
        }
    }
}

impl WorkerOptions {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("clock interval", self.clock_interval),
            ("timer interval", self.timer_interval),
            ("sensor interval", self.sensor_interval),
        ] {
            if value.is_zero() {
                return Err(Error::invalid_config(format!("{} must be non-zero", name)));
            }
        }
        if self.channel_capacity < 2 {
            return Err(Error::invalid_config("channel capacity must be at least 2"));
        }
        for (name, minutes) in [
            ("initial minutes", self.initial_minutes),
            ("reset minutes", self.reset_minutes),
        ] {
            if !MINUTES_RANGE.contains(&minutes) {
                return Err(Error::invalid_config(format!(
                    "{} must be {}-{}, got {}",
                    name,
                    MINUTES_RANGE.start(),
                    MINUTES_RANGE.end(),
                    minutes
                )));
            }
        }
        if self.band.min > self.band.max {
            return Err(Error::invalid_config(format!(
                "humidity band is empty ({} > {})",
                self.band.min, self.band.max
            )));
        }
        Ok(())
    }
}

/// The UI's side of a running worker.
pub struct RigHandle {
    pub commands: mpsc::Sender<Command>,
    pub events: mpsc::Receiver<RigEvent>,
    pub cancel: CancellationToken,
}

impl RigHandle {
    /// Send a command, failing if the worker has stopped.
    pub async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| Error::WorkerStopped)
    }
}

#[derive(Debug)]
struct Dispatched {
    command: RigCommand,
    state: ConnectionState,
    result: std::result::Result<RelayOutcome, String>,
}

#[derive(Debug)]
struct SensorUpdate {
    reading: SensorReading,
    updated: Option<OffsetDateTime>,
    error: Option<String>,
    consecutive_failures: u32,
}

/// Owns both command channels; runs one relay at a time.
struct Dispatcher {
    slider: CommandChannel<DynRelay>,
    belt: CommandChannel<DynRelay>,
    requests: mpsc::Receiver<RigCommand>,
    results: mpsc::Sender<Dispatched>,
    cancel: CancellationToken,
}

impl Dispatcher {
    async fn run(mut self) {
        loop {
            let command = tokio::select! {
                _ = self.cancel.cancelled() => break,
                cmd = self.requests.recv() => match cmd {
                    Some(cmd) => cmd,
                    None => break,
                },
            };

            let channel = match command.actuator() {
                Actuator::Slider => &mut self.slider,
                Actuator::Belt => &mut self.belt,
            };
            // An in-flight relay is killed when its future is dropped.
            let result = tokio::select! {
                _ = self.cancel.cancelled() => break,
                result = channel.send(command) => result,
            };

            let dispatched = Dispatched {
                command,
                state: channel.state(),
                result: result.map(|r| r.outcome).map_err(|e| e.to_string()),
            };
            if self.results.send(dispatched).await.is_err() {
                break;
            }
        }
        debug!("Dispatcher stopped");
    }
}

/// Polls the sensor on an interval or on request.
struct SensorTask {
    poller: SensorPoller<DynRelay>,
    period: Duration,
    requests: mpsc::Receiver<()>,
    results: mpsc::Sender<SensorUpdate>,
    cancel: CancellationToken,
}

impl SensorTask {
    async fn run(mut self) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {}
                req = self.requests.recv() => {
                    if req.is_none() {
                        break;
                    }
                    ticker.reset();
                }
            }

            let result = tokio::select! {
                _ = self.cancel.cancelled() => break,
                result = self.poller.poll() => result,
            };

            let update = SensorUpdate {
                reading: self.poller.last(),
                updated: self.poller.last_updated(),
                error: result.err().map(|e| e.to_string()),
                consecutive_failures: self.poller.consecutive_failures(),
            };
            if self.results.send(update).await.is_err() {
                break;
            }
        }
        debug!("Sensor task stopped");
    }
}

/// Background worker that owns all rig state.
pub struct RigWorker {
    state: RigState,
    options: WorkerOptions,
    command_rx: mpsc::Receiver<Command>,
    event_tx: mpsc::Sender<RigEvent>,
    dispatch_tx: mpsc::Sender<RigCommand>,
    dispatch_rx: mpsc::Receiver<Dispatched>,
    poll_tx: mpsc::Sender<()>,
    sensor_rx: mpsc::Receiver<SensorUpdate>,
    cancel: CancellationToken,
    tasks_cancel: CancellationToken,
    tasks: Option<(Dispatcher, SensorTask)>,
}

impl RigWorker {
    /// Create a worker and the handle the UI uses to drive it.
    ///
    /// Nothing runs until [`RigWorker::run`] is awaited or spawned.
    pub fn new(rig: Rig, options: WorkerOptions) -> Result<(Self, RigHandle)> {
        options.validate()?;
        let capacity = options.channel_capacity;

        let (command_tx, command_rx) = mpsc::channel(capacity);
        let (event_tx, event_rx) = mpsc::channel(capacity);
        let (dispatch_tx, dispatch_requests) = mpsc::channel(capacity);
        let (dispatch_results, dispatch_rx) = mpsc::channel(capacity);
        let (poll_tx, poll_requests) = mpsc::channel(1);
        let (sensor_results, sensor_rx) = mpsc::channel(capacity);

        let cancel = CancellationToken::new();
        let tasks_cancel = cancel.child_token();

        let dispatcher = Dispatcher {
            slider: rig.slider,
            belt: rig.belt,
            requests: dispatch_requests,
            results: dispatch_results,
            cancel: tasks_cancel.clone(),
        };
        let sensor = SensorTask {
            poller: rig.sensor,
            period: options.sensor_interval,
            requests: poll_requests,
            results: sensor_results,
            cancel: tasks_cancel.clone(),
        };

        let state = RigState::new(
            Timer::new(options.initial_minutes, options.reset_minutes),
            options.band,
        );

        let worker = Self {
            state,
            options,
            command_rx,
            event_tx,
            dispatch_tx,
            dispatch_rx,
            poll_tx,
            sensor_rx,
            cancel: cancel.clone(),
            tasks_cancel,
            tasks: Some((dispatcher, sensor)),
        };
        let handle = RigHandle {
            commands: command_tx,
            events: event_rx,
            cancel,
        };
        Ok((worker, handle))
    }

    /// Run the worker's main loop.
    ///
    /// Runs until [`Command::Shutdown`] is received, the command channel is
    /// closed or the cancellation token fires.
    pub async fn run(mut self) {
        info!("RigWorker started");

        let mut handles = Vec::new();
        if let Some((dispatcher, sensor)) = self.tasks.take() {
            handles.push(tokio::spawn(dispatcher.run()));
            handles.push(tokio::spawn(sensor.run()));
        }

        let mut clock = interval(self.options.clock_interval);
        clock.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut countdown = interval(self.options.timer_interval);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("RigWorker cancelled");
                    break;
                }
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(Command::Shutdown) => {
                            info!("RigWorker received shutdown command");
                            break;
                        }
                        Some(cmd) => self.handle_command(cmd, &mut countdown).await,
                        None => {
                            info!("Command channel closed, shutting down worker");
                            break;
                        }
                    }
                }
                _ = clock.tick() => self.publish().await,
                _ = countdown.tick() => self.handle_countdown().await,
                Some(dispatched) = self.dispatch_rx.recv() => {
                    self.handle_dispatched(dispatched).await;
                }
                Some(update) = self.sensor_rx.recv() => {
                    self.handle_sensor(update).await;
                }
            }
        }

        self.tasks_cancel.cancel();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Worker task panicked");
            }
        }
        info!("RigWorker stopped");
    }

    async fn handle_command(&mut self, cmd: Command, countdown: &mut Interval) {
        info!(?cmd, "Handling command");

        match cmd {
            Command::Send(command) => {
                if let Err(rejection) = self.state.check_command(&command) {
                    self.emit(RigEvent::Rejected(rejection)).await;
                    return;
                }
                self.dispatch(command).await;
            }
            Command::SetTimerMinutes(minutes) => {
                match self.state.set_timer_minutes(minutes) {
                    Ok(()) => self.publish().await,
                    Err(rejection) => self.emit(RigEvent::Rejected(rejection)).await,
                }
            }
            // Both timed commands must fit in the queue.
            Command::StartAcquisition if self.dispatch_tx.capacity() < 2 => {
                warn!("Relay queue is full, acquisition not started");
                self.emit(RigEvent::Rejected(Rejection::Busy)).await;
            }
            Command::StartAcquisition => match self.state.start_acquisition() {
                Ok(commands) => {
                    // First decrement lands one full period after the start.
                    countdown.reset();
                    let minutes = commands[0].value();
                    info!(minutes, "Acquisition started");
                    self.emit(RigEvent::AcquisitionStarted { minutes }).await;
                    self.publish().await;
                    for command in commands {
                        self.dispatch(command).await;
                    }
                }
                Err(rejection) => self.emit(RigEvent::Rejected(rejection)).await,
            },
            Command::PollSensor => {
                // A poll is already pending when the slot is full.
                let _ = self.poll_tx.try_send(());
            }
            Command::Shutdown => {}
        }
    }

    /// Queue `command` for the dispatcher without blocking the select loop.
    async fn dispatch(&mut self, command: RigCommand) {
        match self.dispatch_tx.try_send(command) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(%command, "Relay queue is full, command dropped");
                self.emit(RigEvent::Rejected(Rejection::Busy)).await;
            }
            Err(TrySendError::Closed(_)) => {
                warn!(%command, "Dispatcher has stopped, command dropped");
                self.state
                    .apply_connection(command.actuator(), ConnectionState::Disabled);
                self.emit(RigEvent::CommandFailed {
                    command,
                    error: Error::WorkerStopped.to_string(),
                })
                .await;
                self.publish().await;
            }
        }
    }

    async fn handle_countdown(&mut self) {
        match self.state.tick_timer() {
            Tick::Idle => {}
            Tick::Running(remaining) => {
                debug!(%remaining, "Countdown");
                self.publish().await;
            }
            Tick::Expired => {
                info!("Acquisition finished");
                self.emit(RigEvent::AcquisitionFinished).await;
                self.publish().await;
            }
        }
    }

    async fn handle_dispatched(&mut self, dispatched: Dispatched) {
        let Dispatched {
            command,
            state,
            result,
        } = dispatched;
        self.state.apply_connection(command.actuator(), state);

        match result {
            Ok(outcome) => {
                if outcome != RelayOutcome::Success {
                    warn!(%command, %outcome, "Relay did not pass the message");
                }
                self.emit(RigEvent::CommandCompleted { command, outcome })
                    .await;
            }
            Err(error) => {
                warn!(%command, %error, "Relay failed");
                self.emit(RigEvent::CommandFailed { command, error }).await;
            }
        }
        self.publish().await;
    }

    async fn handle_sensor(&mut self, update: SensorUpdate) {
        self.state.apply_reading(update.reading, update.updated);
        if let Some(error) = update.error {
            self.emit(RigEvent::SensorFailed {
                error,
                consecutive_failures: update.consecutive_failures,
            })
            .await;
        }
        self.publish().await;
    }

    async fn emit(&self, event: RigEvent) {
        // The UI may already be gone during shutdown.
        let _ = self.event_tx.send(event).await;
    }

    async fn publish(&self) {
        let snapshot = self.state.snapshot(now());
        self.emit(RigEvent::Snapshot(Box::new(snapshot))).await;
    }
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
