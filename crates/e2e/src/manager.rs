//! One handle per test session over all page objects

use std::sync::Arc;

use ngx_pilot_driver::Page;
use once_cell::sync::OnceCell;

use crate::calendar::{CalendarNavigator, Clock, SystemClock};
use crate::config::PilotConfig;
use crate::forms::FormLayoutsPage;
use crate::sidebar::SidebarNavigator;

/// Owns the session's page handle and builds each page object on first use
pub struct PageManager {
    page: Arc<dyn Page>,
    config: Arc<PilotConfig>,
    clock: Arc<dyn Clock>,
    sidebar: OnceCell<SidebarNavigator>,
    calendar: OnceCell<CalendarNavigator>,
    form_layouts: OnceCell<FormLayoutsPage>,
}

impl PageManager {
    pub fn new(page: Arc<dyn Page>, config: PilotConfig) -> Self {
        Self {
            page,
            config: Arc::new(config),
            clock: Arc::new(SystemClock),
            sidebar: OnceCell::new(),
            calendar: OnceCell::new(),
            form_layouts: OnceCell::new(),
        }
    }

    /// Replace the clock used for date offsets
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self.calendar = OnceCell::new();
        self
    }

    pub fn page(&self) -> &Arc<dyn Page> {
        &self.page
    }

    pub fn config(&self) -> &PilotConfig {
        &self.config
    }

    pub fn navigate_to(&self) -> &SidebarNavigator {
        self.sidebar
            .get_or_init(|| SidebarNavigator::new(self.page.clone(), self.config.clone()))
    }

    pub fn on_datepicker_page(&self) -> &CalendarNavigator {
        self.calendar.get_or_init(|| {
            CalendarNavigator::new(self.page.clone(), self.config.clone(), self.clock.clone())
        })
    }

    pub fn on_form_layouts_page(&self) -> &FormLayoutsPage {
        self.form_layouts
            .get_or_init(|| FormLayoutsPage::new(self.page.clone(), self.config.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ngx_pilot_driver::{NgxAdminApp, SimPage};

    #[test]
    fn test_navigators_are_built_once() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 25).unwrap();
        let page: Arc<dyn Page> = Arc::new(SimPage::new(NgxAdminApp::new(today)));
        let pm = PageManager::new(page, PilotConfig::default());

        assert!(std::ptr::eq(pm.navigate_to(), pm.navigate_to()));
        assert!(std::ptr::eq(pm.on_datepicker_page(), pm.on_datepicker_page()));
        assert!(std::ptr::eq(pm.on_form_layouts_page(), pm.on_form_layouts_page()));
    }
}
