//! CLI command implementations.

pub mod catalog;
pub mod resolve;
pub mod run;
pub mod status;
