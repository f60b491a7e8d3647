//! Error types for the browser automation surface

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Timeout after {timeout_ms} ms waiting for {what}")]
    Timeout { what: String, timeout_ms: u64 },

    #[error("No element matches {0}")]
    NotFound(String),

    #[error("Strict mode violation: {locator} resolved to {count} elements")]
    StrictMode { locator: String, count: usize },

    #[error("Element not actionable: {locator} ({reason})")]
    NotActionable { locator: String, reason: String },

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid text pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Playwright not found. Install with: npm i playwright && npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright bridge error: {0}")]
    Bridge(String),

    #[error("Playwright bridge exited")]
    BridgeClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DriverError {
    /// Whether the error came from a bounded wait running out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, DriverError::Timeout { .. })
    }
}

pub type DriverResult<T> = Result<T, DriverError>;
