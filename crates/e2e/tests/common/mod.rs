//! Shared session setup for the integration suites

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use ngx_pilot_driver::{NgxAdminApp, Page, SimPage};
use ngx_pilot_e2e::{FixedClock, PageManager, PilotConfig};

pub const DATEPICKER: &str = "/pages/forms/datepicker";
pub const FORM_LAYOUTS: &str = "/pages/forms/layouts";

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// The date every suite treats as "today" unless it says otherwise
pub fn today() -> NaiveDate {
    ymd(2024, 1, 25)
}

pub struct Session {
    pub sim: Arc<SimPage<NgxAdminApp>>,
    pub pm: PageManager,
}

impl Session {
    pub fn new(app: NgxAdminApp, today: NaiveDate) -> Self {
        Self::with_config(app, today, PilotConfig::default())
    }

    pub fn with_config(app: NgxAdminApp, today: NaiveDate, config: PilotConfig) -> Self {
        ngx_pilot_e2e::logging::init();
        let sim = Arc::new(SimPage::new(app));
        let page: Arc<dyn Page> = sim.clone();
        let pm = PageManager::new(page, config).with_clock(Arc::new(FixedClock(today)));
        Self { sim, pm }
    }

    /// Blank tab for `today`
    pub fn blank() -> Self {
        Self::new(NgxAdminApp::new(today()), today())
    }

    /// Tab already showing `path`
    pub fn at(path: &str) -> Self {
        Self::new(NgxAdminApp::new(today()).at(path), today())
    }

    pub fn page_turns(&self) -> (usize, usize) {
        (
            self.sim.click_count("calendar:next"),
            self.sim.click_count("calendar:prev"),
        )
    }
}
