//! Effects: what viewers can trigger, and how requests become memory writes.

mod actions;
pub mod catalog;
pub mod dispatcher;
pub mod engine;
#[cfg(test)]
mod fixture;
pub mod request;
pub mod sink;
pub mod timed;

pub use catalog::{CATALOG, EffectDef, EffectKind, lookup};
pub use dispatcher::Dispatcher;
pub use engine::{Engine, Started};
pub use request::{EffectOutcome, EffectReport, EffectRequest, EffectState, RequestId};
pub use sink::{ChannelReporter, ChannelSink, LogSink, MessageSink, StatusReporter};
pub use timed::{EndReason, RepeatAction, TimedHandle};
