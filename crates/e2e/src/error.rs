//! Error types for the page objects

use ngx_pilot_driver::DriverError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("App not loaded: {probe} not visible after {timeout_ms} ms")]
    AppNotLoaded { probe: String, timeout_ms: u64 },

    #[error("Element not found: {what} not visible after {timeout_ms} ms")]
    ElementNotFound { what: String, timeout_ms: u64 },

    #[error("Date not found: no current-month day cell with text \"{day}\" in {month}")]
    DateNotFound { day: String, month: String },

    #[error("Calendar navigation failed: \"{target}\" not shown after {steps} page turns (last label: \"{last_label}\")")]
    Navigation {
        target: String,
        steps: usize,
        last_label: String,
    },

    #[error("Navigation timeout after {timeout_ms} ms waiting for any of headers: {headers}{}", buttons_suffix(.buttons))]
    NavigationTimeout {
        timeout_ms: u64,
        headers: String,
        buttons: String,
    },

    #[error("Date offset {0} days is out of the supported calendar range")]
    InvalidOffset(i64),

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn buttons_suffix(buttons: &str) -> String {
    if buttons.is_empty() {
        String::new()
    } else {
        format!(" or buttons: {}", buttons)
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
