use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

/// Identifier assigned by whoever submits the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One externally triggered effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectRequest {
    pub id: RequestId,
    pub code: String,
    pub parameters: Vec<String>,
    /// Overrides the catalogue default for timed effects
    pub duration: Option<Duration>,
    /// Display name of whoever triggered it
    pub viewer: String,
}

impl EffectRequest {
    /// Build a request from its wire code, e.g. `addM9Ammo_25` becomes code
    /// `addM9Ammo` with parameters `["25"]`.
    pub fn from_code(id: RequestId, wire_code: &str, viewer: impl Into<String>) -> Self {
        let mut parts = wire_code.trim().split('_');
        let code = parts.next().unwrap_or_default().to_string();
        Self {
            id,
            code,
            parameters: parts.map(str::to_string).collect(),
            duration: None,
            viewer: viewer.into(),
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// First parameter as an integer quantity
    pub fn quantity(&self) -> Option<i32> {
        self.parameters.first()?.trim().parse().ok()
    }
}

/// Terminal result of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum EffectOutcome {
    Success,
    /// Might succeed if tried again later
    FailTransient(String),
    FailPermanent(String),
    Unsupported,
}

impl EffectOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::FailTransient(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::FailTransient(r) | Self::FailPermanent(r) => Some(r),
            Self::Success | Self::Unsupported => None,
        }
    }
}

impl fmt::Display for EffectOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::FailTransient(r) => write!(f, "failed (transient): {r}"),
            Self::FailPermanent(r) => write!(f, "failed: {r}"),
            Self::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Where a request is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, IntoStaticStr, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EffectState {
    Pending,
    Gating,
    Executing,
    Deferred,
    Completed,
    Retrying,
    Failed,
}

/// Outcome record handed to reporters
#[derive(Debug, Clone, Serialize)]
pub struct EffectReport {
    pub id: RequestId,
    pub code: String,
    pub state: EffectState,
    #[serde(flatten)]
    pub outcome: EffectOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: DateTime<Local>,
}
