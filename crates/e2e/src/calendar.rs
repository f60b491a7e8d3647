//! Datepicker automation
//!
//! Picking a date is a small search over the calendar overlay:
//!
//! ```text
//! Closed ──open picker──▶ Open ──label != target──▶ Paging ─┐
//!                          │                          ▲      │ click prev/next
//!                          │                          └──────┘ (≤ max_month_steps)
//!                          └──label == target──▶ TargetMonthVisible
//!                                                      │ click current-month cell
//!                                                      ▼
//!                                                 DaySelected
//! ```
//!
//! Day cells of the neighbouring months are rendered with the same numbers,
//! so matching is restricted to cells without the bounding-month class and
//! compares the whole cell text.

use std::sync::Arc;

use chrono::{Datelike, Days, Local, NaiveDate};
use ngx_pilot_driver::{ClickOptions, Locator, Page, TextMatch};
use tracing::{debug, info};

use crate::config::PilotConfig;
use crate::error::{E2eError, E2eResult};
use crate::wait::{expect_input_value, expect_visible};

/// Source of "today" for offset arithmetic
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// The local calendar date of the machine running the tests
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock stuck on one date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// The date a pick is aiming for, with the strings used to find and report it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarTarget {
    pub date: NaiveDate,
    pub day: u32,
    /// "Feb"
    pub month_short: String,
    /// "February"
    pub month_long: String,
    pub year: i32,
    /// "Feb 4, 2024"
    pub formatted: String,
}

impl CalendarTarget {
    pub fn from_date(date: NaiveDate) -> Self {
        let month_short = date.format("%b").to_string();
        let formatted = format!("{} {}, {}", month_short, date.day(), date.year());
        Self {
            date,
            day: date.day(),
            month_short,
            month_long: date.format("%B").to_string(),
            year: date.year(),
            formatted,
        }
    }

    /// `today` shifted by `offset` days, in either direction
    pub fn from_offset(today: NaiveDate, offset: i64) -> E2eResult<Self> {
        let date = if offset >= 0 {
            today.checked_add_days(Days::new(offset as u64))
        } else {
            today.checked_sub_days(Days::new(offset.unsigned_abs()))
        };
        date.map(Self::from_date)
            .ok_or(E2eError::InvalidOffset(offset))
    }

    /// The calendar header text for the target month, "February 2024"
    pub fn month_label(&self) -> String {
        format!("{} {}", self.month_long, self.year)
    }

    fn first_of_month(&self) -> NaiveDate {
        self.date.with_day(1).unwrap_or(self.date)
    }
}

/// Parse a "Month Year" calendar header into the first day of that month
pub fn parse_month_label(label: &str) -> Option<NaiveDate> {
    let label = label.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDate::parse_from_str(&format!("1 {}", label), "%d %B %Y").ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageDirection {
    Forward,
    Backward,
}

/// Drives the Nebular datepickers of the demo app
pub struct CalendarNavigator {
    page: Arc<dyn Page>,
    config: Arc<PilotConfig>,
    clock: Arc<dyn Clock>,
}

impl CalendarNavigator {
    pub fn new(page: Arc<dyn Page>, config: Arc<PilotConfig>, clock: Arc<dyn Clock>) -> Self {
        Self {
            page,
            config,
            clock,
        }
    }

    /// Pick `today + offset` in the common datepicker and return the date as
    /// the input displays it.
    pub async fn select_date(&self, offset: i64) -> E2eResult<String> {
        let input = Locator::placeholder(&self.config.calendar.form_picker_placeholder);
        self.open_picker(&input).await?;

        let formatted = self.pick_in_open_calendar(offset).await?;
        self.verify_input(&input, &formatted).await?;

        info!("Selected {} in the form picker", formatted);
        Ok(formatted)
    }

    /// Pick a start and an end date in the range picker; returns
    /// `"<start> - <end>"`
    pub async fn select_date_range(&self, start: i64, end: i64) -> E2eResult<String> {
        let input = Locator::placeholder(&self.config.calendar.range_picker_placeholder);
        self.open_picker(&input).await?;

        let first = self.pick_in_open_calendar(start).await?;
        let second = self.pick_in_open_calendar(end).await?;
        let joined = format!("{} - {}", first, second);
        self.verify_input(&input, &joined).await?;

        info!("Selected range {}", joined);
        Ok(joined)
    }

    /// Pick `today + offset` in a calendar that is already open
    pub async fn pick_in_open_calendar(&self, offset: i64) -> E2eResult<String> {
        let target = CalendarTarget::from_offset(self.clock.today(), offset)?;
        self.select_target(&target).await?;
        Ok(target.formatted)
    }

    /// Page the open calendar to the target month and click the day.
    ///
    /// Returns the number of page turns it took.
    pub async fn select_target(&self, target: &CalendarTarget) -> E2eResult<usize> {
        let calendar = &self.config.calendar;
        let wanted = target.month_label();
        let label_locator = Locator::css(&calendar.view_mode_selector).first();
        expect_visible(self.page.as_ref(), &label_locator, self.config.timeouts.element()).await?;

        let mut label = self.read_label(&label_locator).await?;
        let mut steps = 0;
        while !label.contains(&wanted) {
            if steps >= calendar.max_month_steps {
                return Err(E2eError::Navigation {
                    target: wanted,
                    steps,
                    last_label: label,
                });
            }
            let direction = direction_towards(&label, target);
            let control = match direction {
                PageDirection::Forward => &calendar.next_selector,
                PageDirection::Backward => &calendar.prev_selector,
            };
            debug!(?direction, "Calendar shows \"{}\", paging towards \"{}\"", label, wanted);
            self.page
                .click(&Locator::css(control).first(), ClickOptions::default())
                .await?;
            steps += 1;
            label = self.read_label(&label_locator).await?;
        }

        let day = target.day.to_string();
        let cells = Locator::css(calendar.current_month_cells()).has_text(TextMatch::exact(&day));
        if self.page.count(&cells).await? == 0 {
            return Err(E2eError::DateNotFound { day, month: label });
        }
        self.page.click(&cells.first(), ClickOptions::default()).await?;

        debug!("Clicked day {} of {} after {} page turns", target.day, wanted, steps);
        Ok(steps)
    }

    async fn open_picker(&self, input: &Locator) -> E2eResult<()> {
        expect_visible(self.page.as_ref(), input, self.config.timeouts.element()).await?;
        self.page.click(input, ClickOptions::default()).await?;
        Ok(())
    }

    async fn read_label(&self, locator: &Locator) -> E2eResult<String> {
        let text = self.page.text_content(locator).await?.unwrap_or_default();
        Ok(text.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    async fn verify_input(&self, input: &Locator, expected: &str) -> E2eResult<()> {
        let timeouts = &self.config.timeouts;
        expect_input_value(
            self.page.as_ref(),
            input,
            expected,
            timeouts.element(),
            timeouts.poll_interval(),
        )
        .await
    }
}

/// Unparseable labels page forward
fn direction_towards(label: &str, target: &CalendarTarget) -> PageDirection {
    match parse_month_label(label) {
        Some(shown) if shown > target.first_of_month() => PageDirection::Backward,
        _ => PageDirection::Forward,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test_case(ymd(2024, 1, 25), 10, "Feb 4, 2024" ; "into next month")]
    #[test_case(ymd(2024, 12, 25), 10, "Jan 4, 2025" ; "across year end")]
    #[test_case(ymd(2024, 3, 1), -1, "Feb 29, 2024" ; "back into leap february")]
    #[test_case(ymd(2024, 1, 5), 0, "Jan 5, 2024" ; "today")]
    fn test_target_formatting(today: NaiveDate, offset: i64, expected: &str) {
        let target = CalendarTarget::from_offset(today, offset).unwrap();
        assert_eq!(target.formatted, expected);
    }

    #[test]
    fn test_target_fields() {
        let target = CalendarTarget::from_offset(ymd(2024, 12, 25), 10).unwrap();
        assert_eq!(target.day, 4);
        assert_eq!(target.month_short, "Jan");
        assert_eq!(target.month_long, "January");
        assert_eq!(target.year, 2025);
        assert_eq!(target.month_label(), "January 2025");
    }

    #[test]
    fn test_offset_out_of_range() {
        let err = CalendarTarget::from_offset(ymd(2024, 1, 1), i64::MAX).unwrap_err();
        assert!(matches!(err, E2eError::InvalidOffset(i64::MAX)));
    }

    #[test]
    fn test_parse_month_label() {
        assert_eq!(parse_month_label("February 2024"), Some(ymd(2024, 2, 1)));
        assert_eq!(parse_month_label("  December\n 2023 "), Some(ymd(2023, 12, 1)));
        assert_eq!(parse_month_label("2024"), None);
    }

    #[test]
    fn test_direction() {
        let target = CalendarTarget::from_date(ymd(2024, 3, 10));
        assert_eq!(direction_towards("January 2024", &target), PageDirection::Forward);
        assert_eq!(direction_towards("May 2024", &target), PageDirection::Backward);
        assert_eq!(direction_towards("2024 - 2035", &target), PageDirection::Forward);
    }
}
