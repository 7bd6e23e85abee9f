//! Outbound seams: player-facing messages and request outcomes.

use std::sync::mpsc::Sender;

use chrono::Local;
use tracing::{info, warn};

use super::{EffectOutcome, EffectReport, EffectState, RequestId};

/// Receives player-facing messages ("alice made the player flinch.")
pub trait MessageSink: Send + Sync {
    fn send(&self, message: &str);
}

/// Receives exactly one outcome per request
pub trait StatusReporter: Send + Sync {
    fn notify(&self, id: RequestId, code: &str, outcome: &EffectOutcome, message: Option<&str>);
}

impl<F> MessageSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn send(&self, message: &str) {
        self(message)
    }
}

impl<F> StatusReporter for F
where
    F: Fn(RequestId, &str, &EffectOutcome, Option<&str>) + Send + Sync,
{
    fn notify(&self, id: RequestId, code: &str, outcome: &EffectOutcome, message: Option<&str>) {
        self(id, code, outcome, message)
    }
}

/// Writes messages to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl MessageSink for LogSink {
    fn send(&self, message: &str) {
        info!("{}", message);
    }
}

/// Forwards messages over a channel
pub struct ChannelSink {
    tx: Sender<String>,
}

impl ChannelSink {
    pub fn new(tx: Sender<String>) -> Self {
        Self { tx }
    }
}

impl MessageSink for ChannelSink {
    fn send(&self, message: &str) {
        if self.tx.send(message.to_string()).is_err() {
            warn!("Message dropped, receiver gone: {}", message);
        }
    }
}

/// Forwards outcomes over a channel as [`EffectReport`]s
pub struct ChannelReporter {
    tx: Sender<EffectReport>,
}

impl ChannelReporter {
    pub fn new(tx: Sender<EffectReport>) -> Self {
        Self { tx }
    }
}

impl StatusReporter for ChannelReporter {
    fn notify(&self, id: RequestId, code: &str, outcome: &EffectOutcome, message: Option<&str>) {
        let state = match outcome {
            EffectOutcome::Success => EffectState::Completed,
            _ => EffectState::Failed,
        };
        let report = EffectReport {
            id,
            code: code.to_string(),
            state,
            outcome: outcome.clone(),
            message: message.map(str::to_string),
            timestamp: Local::now(),
        };
        if self.tx.send(report).is_err() {
            warn!("Outcome for {} dropped, receiver gone", id);
        }
    }
}
