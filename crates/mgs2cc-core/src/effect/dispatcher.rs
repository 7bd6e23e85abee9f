//! Request intake and retry driver.
//!
//! The dispatcher owns a worker thread that feeds requests to the
//! [`Engine`], re-gates deferred ones, retries transient failures and keeps
//! track of running timed effects. Every submitted request gets exactly one
//! [`StatusReporter::notify`] call.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::engine::{Engine, Started};
use super::sink::StatusReporter;
use super::timed::TimedHandle;
use super::{EffectOutcome, EffectRequest, EffectState, RequestId};
use crate::config::EngineConfig;
use crate::error::{Error, Result};

enum Command {
    Submit(EffectRequest),
    Cancel(RequestId),
    Shutdown,
}

pub struct Dispatcher {
    tx: Sender<Command>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Dispatcher {
    pub fn spawn(
        engine: Arc<Engine>,
        reporter: Arc<dyn StatusReporter>,
        config: EngineConfig,
    ) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let worker = Worker {
            engine,
            reporter,
            config,
            waiting: Vec::new(),
            running: HashMap::new(),
        };
        let handle = thread::Builder::new()
            .name("effect-dispatcher".to_string())
            .spawn(move || worker.run(rx))?;

        Ok(Self {
            tx,
            worker: Mutex::new(Some(handle)),
        })
    }

    /// Queue a request. Returns as soon as the worker has it.
    pub fn submit(&self, request: EffectRequest) -> Result<RequestId> {
        let id = request.id;
        self.tx
            .send(Command::Submit(request))
            .map_err(|_| Error::DispatcherStopped)?;
        Ok(id)
    }

    /// Cancel a waiting request or a running timed effect.
    pub fn cancel(&self, id: RequestId) -> Result<()> {
        self.tx
            .send(Command::Cancel(id))
            .map_err(|_| Error::DispatcherStopped)
    }

    /// Stop the worker, ending every timed effect. Safe to call repeatedly.
    pub fn shutdown(&self) {
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = self.tx.send(Command::Shutdown);
            if handle.join().is_err() {
                warn!("Dispatcher worker panicked");
            }
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Waiting {
    request: EffectRequest,
    state: EffectState,
    submitted: Instant,
    failures: u32,
    next_attempt: Instant,
}

struct Running {
    code: String,
    handle: TimedHandle,
}

struct Worker {
    engine: Arc<Engine>,
    reporter: Arc<dyn StatusReporter>,
    config: EngineConfig,
    waiting: Vec<Waiting>,
    running: HashMap<RequestId, Running>,
}

impl Worker {
    fn run(mut self, rx: Receiver<Command>) {
        debug!("Dispatcher started");
        loop {
            match rx.recv_timeout(self.next_wakeup()) {
                Ok(Command::Submit(request)) => {
                    debug!("Accepted {} {}", request.id, request.code);
                    let now = Instant::now();
                    self.attempt(Waiting {
                        request,
                        state: EffectState::Pending,
                        submitted: now,
                        failures: 0,
                        next_attempt: now,
                    });
                }
                Ok(Command::Cancel(id)) => self.cancel(id),
                Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }
            self.retry_due();
            self.reap();
        }
        self.stop();
    }

    /// Time until the next retry is due, bounded so finished effects get reaped.
    fn next_wakeup(&self) -> Duration {
        let now = Instant::now();
        self.waiting
            .iter()
            .map(|w| w.next_attempt.saturating_duration_since(now))
            .min()
            .unwrap_or(self.config.retry_interval())
            .min(self.config.tick_interval())
    }

    fn attempt(&mut self, mut entry: Waiting) {
        entry.state = EffectState::Gating;
        match self.engine.start(&entry.request) {
            Started::Finished { outcome, message } => {
                if outcome.is_transient() {
                    entry.failures += 1;
                    if entry.failures < self.config.max_attempts {
                        info!(
                            "{} {} failed ({}), retrying ({}/{})",
                            entry.request.id,
                            entry.request.code,
                            outcome,
                            entry.failures,
                            self.config.max_attempts
                        );
                        self.requeue(entry, EffectState::Retrying);
                        return;
                    }
                }
                self.report(&entry.request, &outcome, message.as_deref());
            }
            Started::Deferred => {
                if entry.submitted.elapsed() >= self.config.defer_timeout() {
                    let outcome = EffectOutcome::FailTransient("game is not ready".to_string());
                    self.report(&entry.request, &outcome, None);
                } else {
                    self.requeue(entry, EffectState::Deferred);
                }
            }
            Started::Running { handle, message } => {
                self.report(&entry.request, &EffectOutcome::Success, Some(&message));
                let running = Running {
                    code: entry.request.code,
                    handle,
                };
                if let Some(previous) = self.running.insert(entry.request.id, running) {
                    warn!("{} reused by a new effect, cancelling {}", entry.request.id, previous.code);
                    previous.handle.cancel();
                    previous.handle.join();
                }
            }
        }
    }

    fn requeue(&mut self, mut entry: Waiting, state: EffectState) {
        if entry.state != state {
            debug!("{} {} is {}", entry.request.id, entry.request.code, state);
        }
        entry.state = state;
        entry.next_attempt = Instant::now() + self.config.retry_interval();
        self.waiting.push(entry);
    }

    fn retry_due(&mut self) {
        let now = Instant::now();
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.waiting)
            .into_iter()
            .partition(|w| w.next_attempt <= now);
        self.waiting = pending;
        for entry in due {
            self.attempt(entry);
        }
    }

    fn reap(&mut self) {
        let finished: Vec<RequestId> = self
            .running
            .iter()
            .filter(|(_, r)| r.handle.is_finished())
            .map(|(id, _)| *id)
            .collect();
        for id in finished {
            if let Some(running) = self.running.remove(&id) {
                let reason = running.handle.join();
                info!("{} {} ended: {}", id, running.code, reason);
            }
        }
    }

    fn cancel(&mut self, id: RequestId) {
        if let Some(pos) = self.waiting.iter().position(|w| w.request.id == id) {
            let entry = self.waiting.remove(pos);
            let outcome = EffectOutcome::FailPermanent("cancelled".to_string());
            self.report(&entry.request, &outcome, None);
        } else if let Some(running) = self.running.get(&id) {
            info!("Cancelling {} {}", id, running.code);
            running.handle.cancel();
        } else {
            debug!("Nothing to cancel for {}", id);
        }
    }

    fn stop(&mut self) {
        for running in self.running.values() {
            running.handle.cancel();
        }
        for (id, running) in self.running.drain() {
            let reason = running.handle.join();
            debug!("{} {} stopped: {}", id, running.code, reason);
        }

        let outcome = EffectOutcome::FailTransient("dispatcher shut down".to_string());
        for entry in std::mem::take(&mut self.waiting) {
            self.report(&entry.request, &outcome, None);
        }
        debug!("Dispatcher stopped");
    }

    fn report(&self, request: &EffectRequest, outcome: &EffectOutcome, message: Option<&str>) {
        info!("{} {}: {}", request.id, request.code, outcome);
        self.reporter
            .notify(request.id, &request.code, outcome, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::fixture::Target;
    use crate::effect::sink::{ChannelReporter, LogSink};
    use crate::effect::EffectReport;
    use crate::game::{Item, StateClassifier, Weapon};
    use std::sync::mpsc::Receiver;

    const TICK: Duration = Duration::from_millis(20);
    const WAIT: Duration = Duration::from_secs(5);

    fn config() -> EngineConfig {
        EngineConfig::builder()
            .tick_interval(TICK)
            .retry_interval(TICK)
            .defer_timeout(Duration::from_millis(200))
            .max_attempts(3)
            .build()
    }

    fn dispatcher_with(target: &Target, config: EngineConfig) -> (Dispatcher, Receiver<EffectReport>) {
        let engine = Arc::new(Engine::new(
            Arc::clone(&target.connector),
            Arc::new(StateClassifier::default()),
            Arc::new(LogSink),
            config.clone(),
        ));
        let (tx, rx) = mpsc::channel();
        let dispatcher = Dispatcher::spawn(engine, Arc::new(ChannelReporter::new(tx)), config).unwrap();
        (dispatcher, rx)
    }

    fn dispatcher(target: &Target) -> (Dispatcher, Receiver<EffectReport>) {
        dispatcher_with(target, config())
    }

    fn request(id: u64, code: &str) -> EffectRequest {
        EffectRequest::from_code(RequestId(id), code, "bob")
    }

    #[test]
    fn test_submit_reports_success() {
        let target = Target::new();
        let (dispatcher, rx) = dispatcher(&target);

        assert_eq!(dispatcher.submit(request(1, "flinchPlayer")).unwrap(), RequestId(1));
        let report = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(report.id, RequestId(1));
        assert_eq!(report.state, EffectState::Completed);
        assert_eq!(
            report.message.as_deref(),
            Some("bob made the player flinch. Flinch: 0 -> 1")
        );
        assert_eq!(target.flinch(), 1);
    }

    #[test]
    fn test_extreme_quantity_keeps_worker_alive() {
        let target = Target::new();
        target.set_weapon(Weapon::M9, 5);
        let (dispatcher, rx) = dispatcher(&target);

        dispatcher.submit(request(20, "addM9Ammo_2147483647")).unwrap();
        dispatcher.submit(request(21, "flinchPlayer")).unwrap();

        let first = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(first.id, RequestId(20));
        assert_eq!(first.outcome, EffectOutcome::Success);
        assert_eq!(target.weapon(Weapon::M9), i16::MAX);

        let second = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(second.id, RequestId(21));
        assert_eq!(second.outcome, EffectOutcome::Success);
    }

    #[test]
    fn test_unsupported_is_reported() {
        let target = Target::new();
        let (dispatcher, rx) = dispatcher(&target);
        dispatcher.submit(request(2, "teleport")).unwrap();
        assert_eq!(rx.recv_timeout(WAIT).unwrap().outcome, EffectOutcome::Unsupported);
    }

    #[test]
    fn test_deferred_request_runs_once_ready() {
        let target = Target::new();
        target.set_location("d12t");
        let (dispatcher, rx) = dispatcher(&target);

        dispatcher.submit(request(3, "flinchPlayer")).unwrap();
        thread::sleep(TICK * 3);
        assert!(rx.try_recv().is_err());
        assert_eq!(target.flinch(), 0);

        target.set_location("w12a");
        let report = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(report.outcome, EffectOutcome::Success);
        assert_eq!(target.flinch(), 1);
    }

    #[test]
    fn test_deferred_request_times_out() {
        let target = Target::new();
        target.set_pause(4);
        let (dispatcher, rx) = dispatcher(&target);

        let started = Instant::now();
        dispatcher.submit(request(4, "flinchPlayer")).unwrap();
        let report = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(
            report.outcome,
            EffectOutcome::FailTransient("game is not ready".into())
        );
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert_eq!(target.process.write_count(), 0);
    }

    #[test]
    fn test_transient_failure_is_retried() {
        let target = Target::new();
        target.break_flinch_pointer();
        let config = EngineConfig::builder()
            .tick_interval(TICK)
            .retry_interval(Duration::from_millis(60))
            .max_attempts(5)
            .build();
        let (dispatcher, rx) = dispatcher_with(&target, config);

        dispatcher.submit(request(5, "flinchPlayer")).unwrap();
        thread::sleep(Duration::from_millis(30));
        target.repair_flinch_pointer();

        let report = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(report.outcome, EffectOutcome::Success);
        assert_eq!(target.flinch(), 1);
    }

    #[test]
    fn test_transient_failure_gives_up() {
        let target = Target::new();
        target.break_flinch_pointer();
        let (dispatcher, rx) = dispatcher(&target);

        dispatcher.submit(request(6, "flinchPlayer")).unwrap();
        let report = rx.recv_timeout(WAIT).unwrap();
        assert!(report.outcome.is_transient());
        assert_eq!(report.state, EffectState::Failed);
        assert!(rx.recv_timeout(TICK * 5).is_err());
    }

    #[test]
    fn test_cancel_waiting_request() {
        let target = Target::new();
        target.set_location("select");
        let (dispatcher, rx) = dispatcher(&target);

        dispatcher.submit(request(7, "setAlertStatus")).unwrap();
        dispatcher.cancel(RequestId(7)).unwrap();
        let report = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(report.outcome, EffectOutcome::FailPermanent("cancelled".into()));
        assert!(rx.recv_timeout(TICK * 5).is_err());
    }

    #[test]
    fn test_cancel_running_effect() {
        let target = Target::new();
        let (dispatcher, rx) = dispatcher(&target);

        let request = request(8, "infiniteAmmo").with_duration(Duration::from_secs(30));
        dispatcher.submit(request).unwrap();
        let report = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(report.outcome, EffectOutcome::Success);
        assert_eq!(
            report.message.as_deref(),
            Some("bob gave the player the Bandana for 30 seconds.")
        );

        thread::sleep(TICK * 3);
        assert_eq!(target.item(Item::Bandana), 1);
        dispatcher.cancel(RequestId(8)).unwrap();

        let deadline = Instant::now() + WAIT;
        while target.item(Item::Bandana) != 0 && Instant::now() < deadline {
            thread::sleep(TICK);
        }
        assert_eq!(target.item(Item::Bandana), 0);
    }

    #[test]
    fn test_shutdown_ends_running_effects() {
        let target = Target::new();
        let (dispatcher, rx) = dispatcher(&target);

        let request = request(9, "infiniteAmmo").with_duration(Duration::from_secs(30));
        dispatcher.submit(request).unwrap();
        rx.recv_timeout(WAIT).unwrap();
        thread::sleep(TICK * 2);

        dispatcher.shutdown();
        assert_eq!(target.item(Item::Bandana), 0);
        dispatcher.shutdown();
    }

    #[test]
    fn test_shutdown_fails_waiting_requests() {
        let target = Target::new();
        target.connector.detach();
        let (dispatcher, rx) = dispatcher(&target);

        dispatcher.submit(request(10, "flinchPlayer")).unwrap();
        thread::sleep(TICK);
        dispatcher.shutdown();

        let report = rx.recv_timeout(WAIT).unwrap();
        assert!(report.outcome.is_transient());
        assert!(matches!(
            dispatcher.submit(request(11, "flinchPlayer")),
            Err(Error::DispatcherStopped)
        ));
    }
}
