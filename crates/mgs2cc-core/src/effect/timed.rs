//! Repeating effects.
//!
//! A [`RepeatAction`] runs on its own thread: `on_start` once, then `tick`
//! every `poll_interval` while the duration has not elapsed and `ready`
//! holds, then `on_end` exactly once. Cancellation is cooperative and takes
//! effect between ticks.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::Serialize;
use strum::Display;
use tracing::{debug, warn};

use crate::error::Result;
use crate::signal::CancelSignal;

/// Why a repeating effect stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EndReason {
    Elapsed,
    ReadinessLost,
    Cancelled,
}

type StartHook = Box<dyn FnOnce() + Send>;
type TickFn = Box<dyn FnMut() -> Result<()> + Send>;
type TickHook = Box<dyn FnMut() + Send>;
type EndHook = Box<dyn FnOnce(EndReason) + Send>;
type ReadyFn = Box<dyn Fn() -> bool + Send>;

pub struct RepeatAction {
    name: String,
    poll_interval: Duration,
    duration: Duration,
    on_start: Option<StartHook>,
    tick: TickFn,
    on_each_tick: Option<TickHook>,
    on_end: Option<EndHook>,
    ready: ReadyFn,
}

impl RepeatAction {
    pub fn new<F>(name: impl Into<String>, duration: Duration, poll_interval: Duration, tick: F) -> Self
    where
        F: FnMut() -> Result<()> + Send + 'static,
    {
        Self {
            name: name.into(),
            poll_interval,
            duration,
            on_start: None,
            tick: Box::new(tick),
            on_each_tick: None,
            on_end: None,
            ready: Box::new(|| true),
        }
    }

    pub fn on_start<F: FnOnce() + Send + 'static>(mut self, f: F) -> Self {
        self.on_start = Some(Box::new(f));
        self
    }

    /// Runs after every successful tick.
    pub fn on_each_tick<F: FnMut() + Send + 'static>(mut self, f: F) -> Self {
        self.on_each_tick = Some(Box::new(f));
        self
    }

    pub fn on_end<F: FnOnce(EndReason) + Send + 'static>(mut self, f: F) -> Self {
        self.on_end = Some(Box::new(f));
        self
    }

    /// Checked before every tick; once false the effect ends.
    pub fn ready<F: Fn() -> bool + Send + 'static>(mut self, f: F) -> Self {
        self.ready = Box::new(f);
        self
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Start ticking on a dedicated thread.
    pub fn spawn(self) -> Result<TimedHandle> {
        let RepeatAction {
            name,
            poll_interval,
            duration,
            on_start,
            mut tick,
            mut on_each_tick,
            on_end,
            ready,
        } = self;

        let signal = Arc::new(CancelSignal::new());
        let completion = Arc::new(Completion::new(on_end));

        let worker_signal = Arc::clone(&signal);
        let worker_completion = Arc::clone(&completion);
        let thread_name = format!("effect-{name}");
        let join = thread::Builder::new().name(thread_name).spawn(move || {
            if let Some(on_start) = on_start {
                on_start();
            }

            let started = Instant::now();
            let mut ticks = 0u32;
            let reason = loop {
                if worker_signal.is_cancelled() {
                    break EndReason::Cancelled;
                }
                let elapsed = started.elapsed();
                if elapsed >= duration {
                    break EndReason::Elapsed;
                }
                if !ready() {
                    break EndReason::ReadinessLost;
                }

                match tick() {
                    Ok(()) => {
                        if let Some(hook) = on_each_tick.as_mut() {
                            hook();
                        }
                    }
                    Err(e) => warn!("{} tick failed: {}", name, e),
                }
                ticks += 1;

                let remaining = duration.saturating_sub(started.elapsed());
                if worker_signal.wait(poll_interval.min(remaining)) {
                    break EndReason::Cancelled;
                }
            };

            debug!("{} ended after {} ticks: {}", name, ticks, reason);
            worker_completion.finish(reason);
            reason
        })?;

        Ok(TimedHandle {
            signal,
            completion,
            join: Some(join),
        })
    }
}

/// Runs the end hook at most once, whichever side gets there first.
///
/// Dropping the last reference without finishing (the worker panicked)
/// runs the hook as a cancellation.
struct Completion {
    hook: Mutex<Option<EndHook>>,
}

impl Completion {
    fn new(hook: Option<EndHook>) -> Self {
        Self {
            hook: Mutex::new(Some(hook.unwrap_or_else(|| Box::new(|_: EndReason| {})))),
        }
    }

    /// Returns `true` if this call ran the hook.
    fn finish(&self, reason: EndReason) -> bool {
        let hook = self
            .hook
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match hook {
            Some(hook) => {
                hook(reason);
                true
            }
            None => false,
        }
    }

    fn is_finished(&self) -> bool {
        self.hook
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        self.finish(EndReason::Cancelled);
    }
}

/// Handle to a running repeating effect
pub struct TimedHandle {
    signal: Arc<CancelSignal>,
    completion: Arc<Completion>,
    join: Option<JoinHandle<EndReason>>,
}

impl TimedHandle {
    /// Ask the effect to stop. Returns immediately; the end hook runs on the
    /// effect thread once the current tick (if any) is done.
    pub fn cancel(&self) {
        self.signal.cancel();
    }

    /// Whether the end hook has run
    pub fn is_finished(&self) -> bool {
        self.completion.is_finished()
    }

    /// Wait for the effect thread to exit.
    pub fn join(mut self) -> EndReason {
        match self.join.take().map(JoinHandle::join) {
            Some(Ok(reason)) => reason,
            Some(Err(_)) => {
                warn!("Effect thread panicked");
                EndReason::Cancelled
            }
            None => EndReason::Cancelled,
        }
    }
}
