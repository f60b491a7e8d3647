//! ngx-pilot browser automation surface
//!
//! The page objects in `ngx-pilot-e2e` talk to a browser only through the
//! [`Page`] trait defined here. Two implementations ship with the crate:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Page (trait)                                                │
//! │    goto / url / count / is_visible / wait_for                │
//! │    click / fill / set_checked / scroll_into_view             │
//! │    text_content / get_attribute / input_value / mouse_*      │
//! ├──────────────────────────────┬───────────────────────────────┤
//! │  PlaywrightPage              │  SimPage<A: SimApp>           │
//! │    node bridge process       │    in-memory DOM, scraper CSS │
//! │    JSON lines over stdio     │    NgxAdminApp host app       │
//! └──────────────────────────────┴───────────────────────────────┘
//! ```
//!
//! Locators are structured values ([`Locator`]), not selector strings, so
//! both backends can interpret them without a shared selector engine.

pub mod error;
pub mod locator;
pub mod page;
pub mod playwright;
pub mod sim;

pub use error::{DriverError, DriverResult};
pub use locator::{AriaRole, Locator, Nth, Selector, TextMatch};
pub use page::{ClickOptions, Page, WaitState};
pub use playwright::{Browser, PlaywrightConfig, PlaywrightPage};
pub use sim::{NgxAdminApp, SimApp, SimPage};
