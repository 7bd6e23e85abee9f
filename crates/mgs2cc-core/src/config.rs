//! Configuration.
//!
//! Everything has a built-in default, so an empty or partial TOML file is
//! valid:
//!
//! ```toml
//! [process]
//! executable = "METAL GEAR SOLID2.exe"
//!
//! [engine]
//! retry_interval_ms = 1000
//! max_attempts = 3
//!
//! [addresses]
//! flinch = '"METAL GEAR SOLID2.exe"+17DF660=>+A8'
//!
//! [state]
//! non_interactive_pause_codes = [1, 2, 4]
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::game::StateRules;
use crate::memory::layout::MODULE_NAME;
use crate::memory::{AddressTable, PointerWidth};

/// Default timings
pub mod timing {
    use std::time::Duration;

    /// Interval between ticks of a timed effect
    pub const TICK_INTERVAL: Duration = Duration::from_millis(500);

    /// How often deferred or failed requests are re-attempted
    pub const RETRY_INTERVAL: Duration = Duration::from_secs(1);

    /// How long a request may stay deferred before it is reported as failed
    pub const DEFER_TIMEOUT: Duration = Duration::from_secs(60);

    /// Attempts for a request whose action fails transiently
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Delay before the alert timer is settled after triggering an alert
    pub const ALERT_SETTLE_DELAY: Duration = Duration::from_secs(1);

    /// Delay between attempts to find the target process
    pub const ATTACH_RETRY_DELAY: Duration = Duration::from_secs(5);

    /// Interval of the liveness check while attached
    pub const LIVENESS_POLL_INTERVAL: Duration = Duration::from_millis(500);
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub process: ProcessConfig,
    pub engine: EngineConfig,
    pub addresses: AddressTable,
    pub state: StateRules,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.process.executable.trim().is_empty() {
            return Err(Error::Config("process.executable must not be empty".into()));
        }
        self.engine.validate()?;
        self.addresses.compile(self.process.pointer_width)?;
        Ok(())
    }
}

/// Target process selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    /// Executable name to look for
    pub executable: String,
    /// Width of pointers followed by `=>` steps
    pub pointer_width: PointerWidth,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            executable: MODULE_NAME.to_string(),
            pointer_width: PointerWidth::Eight,
        }
    }
}

/// Effect engine and dispatcher tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tick_interval_ms: u64,
    pub retry_interval_ms: u64,
    pub defer_timeout_ms: u64,
    pub max_attempts: u32,
    pub alert_settle_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: timing::TICK_INTERVAL.as_millis() as u64,
            retry_interval_ms: timing::RETRY_INTERVAL.as_millis() as u64,
            defer_timeout_ms: timing::DEFER_TIMEOUT.as_millis() as u64,
            max_attempts: timing::MAX_ATTEMPTS,
            alert_settle_delay_ms: timing::ALERT_SETTLE_DELAY.as_millis() as u64,
        }
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn defer_timeout(&self) -> Duration {
        Duration::from_millis(self.defer_timeout_ms)
    }

    pub fn alert_settle_delay(&self) -> Duration {
        Duration::from_millis(self.alert_settle_delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(Error::Config("engine.tick_interval_ms must be positive".into()));
        }
        if self.retry_interval_ms == 0 {
            return Err(Error::Config("engine.retry_interval_ms must be positive".into()));
        }
        if self.max_attempts == 0 {
            return Err(Error::Config("engine.max_attempts must be at least 1".into()));
        }
        Ok(())
    }
}

/// Builder for EngineConfig
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    tick_interval: Option<Duration>,
    retry_interval: Option<Duration>,
    defer_timeout: Option<Duration>,
    max_attempts: Option<u32>,
    alert_settle_delay: Option<Duration>,
}

impl EngineConfigBuilder {
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = Some(interval);
        self
    }

    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = Some(interval);
        self
    }

    pub fn defer_timeout(mut self, timeout: Duration) -> Self {
        self.defer_timeout = Some(timeout);
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn alert_settle_delay(mut self, delay: Duration) -> Self {
        self.alert_settle_delay = Some(delay);
        self
    }

    pub fn build(self) -> EngineConfig {
        let default = EngineConfig::default();
        let millis = |d: Option<Duration>, fallback: u64| d.map_or(fallback, |d| d.as_millis() as u64);
        EngineConfig {
            tick_interval_ms: millis(self.tick_interval, default.tick_interval_ms),
            retry_interval_ms: millis(self.retry_interval, default.retry_interval_ms),
            defer_timeout_ms: millis(self.defer_timeout, default.defer_timeout_ms),
            max_attempts: self.max_attempts.unwrap_or(default.max_attempts),
            alert_settle_delay_ms: millis(self.alert_settle_delay, default.alert_settle_delay_ms),
        }
    }
}
