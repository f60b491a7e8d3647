//! Form Layouts page helpers
//!
//! Blank or missing inputs are replaced with fixed fallbacks, so a scenario
//! driven by incomplete data still submits a well-formed form.

use std::sync::Arc;

use ngx_pilot_driver::{AriaRole, ClickOptions, Locator, Page, TextMatch};
use tracing::info;

use crate::config::PilotConfig;
use crate::error::E2eResult;
use crate::wait::expect_visible;

pub const DEFAULT_GRID_EMAIL: &str = "qa@example.com";
pub const DEFAULT_GRID_PASSWORD: &str = "Secret123!";
pub const DEFAULT_GRID_OPTION: &str = "Option 1";
pub const DEFAULT_INLINE_NAME: &str = "Jane Doe";
pub const DEFAULT_INLINE_EMAIL: &str = "qa+inline@example.com";

/// Values actually typed into the "Using the Grid" form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSubmission {
    pub email: String,
    pub password: String,
    pub option: String,
}

/// Values actually typed into the "Inline form"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSubmission {
    pub name: String,
    pub email: String,
    pub remember_me: bool,
}

pub struct FormLayoutsPage {
    page: Arc<dyn Page>,
    config: Arc<PilotConfig>,
}

impl FormLayoutsPage {
    pub fn new(page: Arc<dyn Page>, config: Arc<PilotConfig>) -> Self {
        Self { page, config }
    }

    fn card(&self, header: &str) -> Locator {
        Locator::css("nb-card").has_text(TextMatch::contains(header))
    }

    pub async fn submit_using_the_grid(
        &self,
        email: Option<&str>,
        password: Option<&str>,
        option: Option<&str>,
    ) -> E2eResult<GridSubmission> {
        let values = GridSubmission {
            email: coerce(email, DEFAULT_GRID_EMAIL),
            password: coerce(password, DEFAULT_GRID_PASSWORD),
            option: coerce(option, DEFAULT_GRID_OPTION),
        };

        let form = self.card("Using the Grid");
        expect_visible(self.page.as_ref(), &form, self.config.timeouts.element()).await?;

        self.page
            .fill(&form.role_within(AriaRole::Textbox, Some(TextMatch::exact("Email"))), &values.email)
            .await?;
        self.page
            .fill(
                &form.role_within(AriaRole::Textbox, Some(TextMatch::exact("Password"))),
                &values.password,
            )
            .await?;
        // The native radio sits under Nebular's styled overlay
        self.page
            .set_checked(
                &form.role_within(AriaRole::Radio, Some(TextMatch::exact_ignore_case(&values.option))),
                true,
                ClickOptions::forced(),
            )
            .await?;
        self.page
            .click(&form.role_within(AriaRole::Button, None), ClickOptions::default())
            .await?;

        info!("Submitted Using the Grid as {} ({})", values.email, values.option);
        Ok(values)
    }

    /// The checkbox is only touched when `remember_me` is set
    pub async fn submit_inline(
        &self,
        name: Option<&str>,
        email: Option<&str>,
        remember_me: bool,
    ) -> E2eResult<InlineSubmission> {
        let values = InlineSubmission {
            name: coerce(name, DEFAULT_INLINE_NAME),
            email: coerce(email, DEFAULT_INLINE_EMAIL),
            remember_me,
        };

        let form = self.card("Inline form");
        expect_visible(self.page.as_ref(), &form, self.config.timeouts.element()).await?;

        // The name input is labelled by its placeholder
        self.page
            .fill(&form.role_within(AriaRole::Textbox, Some(TextMatch::exact("Jane Doe"))), &values.name)
            .await?;
        self.page
            .fill(&form.role_within(AriaRole::Textbox, Some(TextMatch::exact("Email"))), &values.email)
            .await?;
        if remember_me {
            self.page
                .set_checked(&form.role_within(AriaRole::Checkbox, None), true, ClickOptions::forced())
                .await?;
        }
        self.page
            .click(&form.role_within(AriaRole::Button, None), ClickOptions::default())
            .await?;

        info!("Submitted Inline form as {} <{}>", values.name, values.email);
        Ok(values)
    }
}

/// Trimmed `value`, or `fallback` when it is absent or blank
pub fn coerce(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(None, "qa@example.com" ; "absent")]
    #[test_case(Some(""), "qa@example.com" ; "empty")]
    #[test_case(Some("   "), "qa@example.com" ; "blank")]
    #[test_case(Some("  me@x.io "), "me@x.io" ; "trimmed")]
    fn test_coerce(value: Option<&str>, expected: &str) {
        assert_eq!(coerce(value, DEFAULT_GRID_EMAIL), expected);
    }
}
