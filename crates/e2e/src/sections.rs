//! Catalog of the demo app sections reachable from the sidebar

use std::fmt;

use ngx_pilot_driver::{Locator, TextMatch};
use tokio::time::{sleep, Instant};

use crate::error::{E2eError, E2eResult};
use crate::sidebar::{NavigationReport, NavigationTarget, SidebarNavigator};

/// Card headers that only exist on the Form Layouts page
pub const FORM_LAYOUTS_HEADERS: [&str; 4] =
    ["Using the Grid", "Inline form", "Form without labels", "Basic form"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    FormLayouts,
    Datepicker,
    SmartTable,
    Toastr,
    Tooltip,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::FormLayouts,
        Section::Datepicker,
        Section::SmartTable,
        Section::Toastr,
        Section::Tooltip,
    ];

    pub fn group(&self) -> &'static str {
        match self {
            Section::FormLayouts | Section::Datepicker => "Forms",
            Section::SmartTable => "Tables & Data",
            Section::Toastr | Section::Tooltip => "Modal & Overlays",
        }
    }

    pub fn leaf(&self) -> &'static str {
        match self {
            Section::FormLayouts => "Form Layouts",
            Section::Datepicker => "Datepicker",
            Section::SmartTable => "Smart Table",
            Section::Toastr => "Toastr",
            Section::Tooltip => "Tooltip",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Section::FormLayouts => "/pages/forms/layouts",
            Section::Datepicker => "/pages/forms/datepicker",
            Section::SmartTable => "/pages/tables/smart-table",
            Section::Toastr => "/pages/modal-overlays/toastr",
            Section::Tooltip => "/pages/modal-overlays/tooltip",
        }
    }

    /// Sidebar target with the signals known to appear on the section
    pub fn target(&self) -> NavigationTarget {
        let target = NavigationTarget::new(self.group(), self.leaf());
        match self {
            Section::FormLayouts => target
                .header("Using the Grid")
                .header("Inline form")
                .header("Form without labels"),
            Section::Datepicker => target.header("Common Datepicker").header("Range Datepicker"),
            Section::SmartTable => target.header("Smart Table"),
            Section::Toastr => target.header("Toastr").header("Show toast").button("Show toast"),
            Section::Tooltip => target
                .header("Tooltip With Icon")
                .header("Tooltip Placements")
                .header("Colored Tooltips"),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.leaf())
    }
}

impl SidebarNavigator {
    /// Navigate to a catalog section with the configured section timeout
    pub async fn go_to(&self, section: Section) -> E2eResult<NavigationReport> {
        self.go_to_section(&section.target(), self.config.timeouts.section())
            .await
    }

    pub async fn form_layouts_page(&self) -> E2eResult<NavigationReport> {
        self.go_to(Section::FormLayouts).await
    }

    pub async fn datepicker_page(&self) -> E2eResult<NavigationReport> {
        self.go_to(Section::Datepicker).await
    }

    pub async fn smart_table_page(&self) -> E2eResult<NavigationReport> {
        self.go_to(Section::SmartTable).await
    }

    pub async fn toastr_page(&self) -> E2eResult<NavigationReport> {
        self.go_to(Section::Toastr).await
    }

    pub async fn tooltip_page(&self) -> E2eResult<NavigationReport> {
        self.go_to(Section::Tooltip).await
    }

    /// Any Form Layouts card header, or a breadcrumb naming the page, is
    /// visible within the element timeout
    pub async fn assert_form_layouts_visible(&self) -> E2eResult<()> {
        let sidebar = &self.config.sidebar;
        let mut probes: Vec<Locator> = FORM_LAYOUTS_HEADERS
            .iter()
            .map(|h| {
                Locator::css(&sidebar.content_header_selector)
                    .has_text(TextMatch::contains(*h))
                    .first()
            })
            .collect();
        probes.push(
            Locator::css(&sidebar.breadcrumb_selector)
                .has_text(TextMatch::contains("Form Layouts"))
                .first(),
        );

        let timeouts = &self.config.timeouts;
        let deadline = Instant::now() + timeouts.element();
        loop {
            for probe in &probes {
                if self.check_visible(probe).await? {
                    return Ok(());
                }
            }
            if Instant::now() >= deadline {
                return Err(E2eError::AssertionFailed(format!(
                    "Form Layouts not visible: none of {} shown within {} ms",
                    FORM_LAYOUTS_HEADERS.join(", "),
                    timeouts.element_ms
                )));
            }
            sleep(timeouts.poll_interval()).await;
        }
    }
}
