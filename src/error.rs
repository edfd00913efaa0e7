// Error types
//
// Only host-library failures at start-up are fatal. Allocation failures are
// reported so the caller can skip the frame and retry on the next cycle.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TerminalError>;

/// Errors raised by the display and input backend
#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("failed to allocate {bytes} bytes for {what}")]
    OutOfMemory { what: &'static str, bytes: usize },

    #[error("rendering surface error: {0}")]
    Surface(String),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<pixels::Error> for TerminalError {
    fn from(e: pixels::Error) -> Self {
        TerminalError::Surface(e.to_string())
    }
}

impl From<pixels::TextureError> for TerminalError {
    fn from(e: pixels::TextureError) -> Self {
        TerminalError::Surface(e.to_string())
    }
}

/// Errors raised while loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
