//! # mgs2cc-core
//!
//! Core library for the MGS2 crowd-control effect engine.
//!
//! This crate provides:
//! - Pointer-chain resolution and typed access to a live game process
//! - Game state classification (is the player in control right now?)
//! - The effect catalogue, execution engine and retrying dispatcher
//!
//! Everything that touches memory goes through [`memory::ProcessMemory`], so
//! the engine can be driven against a simulated target in tests.

pub mod config;
pub mod effect;
pub mod error;
pub mod game;
pub mod memory;
pub mod signal;

pub use config::{Config, EngineConfig, EngineConfigBuilder, ProcessConfig};
pub use effect::{
    CATALOG, ChannelReporter, ChannelSink, Dispatcher, EffectDef, EffectKind, EffectOutcome,
    EffectReport, EffectRequest, EffectState, Engine, LogSink, MessageSink, RequestId,
    StatusReporter,
};
pub use error::{Error, Result};
pub use game::{Character, GameState, GameStateSnapshot, Item, StateClassifier, StateRules, Weapon};
pub use memory::{
    Accessor, AddressChain, AddressTable, Addresses, Connector, PointerWidth, ProcessHandle,
    ProcessMemory, Session,
};
pub use signal::CancelSignal;
