use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Failed to open process: {0}")]
    ProcessOpenFailed(String),

    #[error("Module not loaded in target process: {0}")]
    ModuleNotFound(String),

    #[error("Address chain {chain} could not be resolved: {reason}")]
    Unresolvable { chain: String, reason: String },

    #[error("Failed to read {size} bytes at address {address:#x}")]
    ReadFault { address: u64, size: usize },

    #[error("Failed to write {size} bytes at address {address:#x}")]
    WriteFault { address: u64, size: usize },

    #[error("Invalid address chain '{expr}': {reason}")]
    InvalidAddressChain { expr: String, reason: String },

    #[error("Not attached to a target process")]
    Detached,

    #[error("Effect dispatcher is not running")]
    DispatcherStopped,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Whether the failure came from the memory path (resolution or transfer)
    /// rather than from configuration or I/O.
    pub fn is_memory_fault(&self) -> bool {
        matches!(
            self,
            Error::Unresolvable { .. }
                | Error::ReadFault { .. }
                | Error::WriteFault { .. }
                | Error::ModuleNotFound(_)
                | Error::Detached
        )
    }
}
