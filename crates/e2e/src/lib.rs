//! ngx-pilot page objects
//!
//! Page objects for the ngx-admin demo dashboard, built on the [`Page`]
//! trait from `ngx-pilot-driver`:
//! - Reach any sidebar section through a verified, bounded navigation
//! - Pick single dates and ranges in the Nebular datepickers by day offset
//! - Fill and submit the Form Layouts forms with safe fallbacks
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  PageManager (one per test session)                         │
//! │    ├── navigate_to() -> SidebarNavigator                    │
//! │    │     ├── ensure_app_loaded()                            │
//! │    │     ├── go_to_section(target, timeout) -> Report       │
//! │    │     └── assert_section_reachable(title)                │
//! │    ├── on_datepicker_page() -> CalendarNavigator            │
//! │    │     ├── select_date(offset) -> "Feb 4, 2024"           │
//! │    │     └── select_date_range(start, end)                  │
//! │    ├── on_form_layouts_page() -> FormLayoutsPage            │
//! │    └── page() -> Arc<dyn Page>                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  PilotConfig (YAML)                                         │
//! │    ├── timeouts { element, section, ready, poll }           │
//! │    ├── calendar { selectors, max_month_steps }              │
//! │    └── sidebar  { selectors, expand_attempts, settle }      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`Page`]: ngx_pilot_driver::Page

pub mod calendar;
pub mod config;
pub mod error;
pub mod forms;
pub mod logging;
pub mod manager;
pub mod sections;
pub mod sidebar;
mod wait;

pub use calendar::{CalendarNavigator, CalendarTarget, Clock, FixedClock, SystemClock};
pub use config::PilotConfig;
pub use error::{E2eError, E2eResult};
pub use forms::FormLayoutsPage;
pub use manager::PageManager;
pub use sections::Section;
pub use sidebar::{
    ExpandOutcome, LookupStrategy, NavigationReport, NavigationTarget, SidebarNavigator,
    SignalKind, SuccessSignal,
};
