//! The page handle consumed by the page objects

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Instant};

use crate::error::{DriverError, DriverResult};
use crate::locator::Locator;

/// Interval used by the default polling `wait_for`
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

impl WaitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitState::Visible => "visible",
            WaitState::Hidden => "hidden",
            WaitState::Attached => "attached",
            WaitState::Detached => "detached",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClickOptions {
    /// Skip actionability checks (visibility, pointer interception)
    pub force: bool,
}

impl ClickOptions {
    pub fn forced() -> Self {
        Self { force: true }
    }
}

/// A single browser tab.
///
/// Element operations resolve the locator when called. Actions (`click`,
/// `fill`, `set_checked`) and single-element reads require the locator to
/// resolve to exactly one element.
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigate to a URL, relative paths resolve against the base URL
    async fn goto(&self, url: &str) -> DriverResult<()>;

    async fn url(&self) -> DriverResult<String>;

    async fn count(&self, locator: &Locator) -> DriverResult<usize>;

    /// Whether any element the locator resolves to is visible. Not strict:
    /// several matches are fine.
    async fn is_visible(&self, locator: &Locator) -> DriverResult<bool>;

    async fn click(&self, locator: &Locator, options: ClickOptions) -> DriverResult<()>;

    async fn fill(&self, locator: &Locator, value: &str) -> DriverResult<()>;

    async fn set_checked(
        &self,
        locator: &Locator,
        checked: bool,
        options: ClickOptions,
    ) -> DriverResult<()>;

    async fn text_content(&self, locator: &Locator) -> DriverResult<Option<String>>;

    async fn get_attribute(&self, locator: &Locator, name: &str) -> DriverResult<Option<String>>;

    async fn input_value(&self, locator: &Locator) -> DriverResult<String>;

    async fn scroll_into_view(&self, locator: &Locator) -> DriverResult<()>;

    async fn mouse_move(&self, x: f64, y: f64) -> DriverResult<()>;

    async fn mouse_down(&self) -> DriverResult<()>;

    async fn mouse_up(&self) -> DriverResult<()>;

    /// Wait until the locator reaches `state`, failing with
    /// [`DriverError::Timeout`] once `timeout` has elapsed.
    async fn wait_for(
        &self,
        locator: &Locator,
        state: WaitState,
        timeout: Duration,
    ) -> DriverResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            let reached = match state {
                WaitState::Visible => self.is_visible(locator).await?,
                WaitState::Hidden => !self.is_visible(locator).await?,
                WaitState::Attached => self.count(locator).await? > 0,
                WaitState::Detached => self.count(locator).await? == 0,
            };
            if reached {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(DriverError::Timeout {
                    what: format!("{} to be {}", locator, state.as_str()),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            sleep(DEFAULT_POLL_INTERVAL).await;
        }
    }
}
