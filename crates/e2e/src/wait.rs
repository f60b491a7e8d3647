//! Bounded waits shared by the page objects

use std::time::Duration;

use ngx_pilot_driver::{Locator, Page, WaitState};
use tokio::time::{sleep, Instant};

use crate::error::{E2eError, E2eResult};

/// Wait for `locator` to become visible, turning a driver timeout into
/// [`E2eError::ElementNotFound`]
pub(crate) async fn expect_visible(
    page: &dyn Page,
    locator: &Locator,
    timeout: Duration,
) -> E2eResult<()> {
    match page.wait_for(locator, WaitState::Visible, timeout).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_timeout() => Err(E2eError::ElementNotFound {
            what: locator.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }),
        Err(e) => Err(e.into()),
    }
}

/// Poll an input until its value equals `expected`
pub(crate) async fn expect_input_value(
    page: &dyn Page,
    locator: &Locator,
    expected: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> E2eResult<()> {
    let deadline = Instant::now() + timeout;
    loop {
        let actual = page.input_value(locator).await?;
        if actual == expected {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(E2eError::AssertionFailed(format!(
                "{} has value \"{}\", expected \"{}\" within {} ms",
                locator,
                actual,
                expected,
                timeout.as_millis()
            )));
        }
        sleep(poll_interval).await;
    }
}
