//! Sidebar navigation against the simulated dashboard

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{today, Session};
use ngx_pilot_driver::sim::ngx::Screen;
use ngx_pilot_driver::{
    ClickOptions, DriverError, DriverResult, Locator, NgxAdminApp, Page, SimPage,
};
use ngx_pilot_e2e::{
    E2eError, ExpandOutcome, NavigationTarget, PageManager, PilotConfig, Section, SignalKind,
};
use test_case::test_case;

#[test_case(Section::FormLayouts, Screen::FormLayouts ; "form layouts")]
#[test_case(Section::Datepicker, Screen::Datepicker ; "datepicker")]
#[test_case(Section::SmartTable, Screen::SmartTable ; "smart table")]
#[test_case(Section::Toastr, Screen::Toastr ; "toastr")]
#[test_case(Section::Tooltip, Screen::Tooltip ; "tooltip")]
#[tokio::test(start_paused = true)]
async fn test_reach_every_section(section: Section, screen: Screen) {
    let session = Session::at("/");

    let report = session.pm.navigate_to().go_to(section).await.unwrap();

    assert_eq!(session.sim.with_app(|a| a.screen()), screen);
    assert!(report.url.ends_with(section.path()), "{}", report.url);
    assert_eq!(report.expand, ExpandOutcome::Expanded { attempts: 1 });
    assert!(session.sim.with_app(|a| a.group_expanded(section.group())));
}

#[tokio::test(start_paused = true)]
async fn test_navigation_is_repeatable() {
    let session = Session::at("/");
    let sidebar = session.pm.navigate_to();

    let first = sidebar.go_to(Section::FormLayouts).await.unwrap();
    let second = sidebar.go_to(Section::FormLayouts).await.unwrap();

    assert_eq!(first.expand, ExpandOutcome::Expanded { attempts: 1 });
    assert_eq!(second.expand, ExpandOutcome::AlreadyExpanded);
    assert_eq!(session.sim.click_count("group:Forms"), 1);
    assert_eq!(session.sim.with_app(|a| a.screen()), Screen::FormLayouts);
}

#[tokio::test(start_paused = true)]
async fn test_expanded_group_is_not_clicked() {
    let session = Session::new(
        NgxAdminApp::new(today()).with_group_expanded("Forms").at("/"),
        today(),
    );

    let report = session.pm.navigate_to().datepicker_page().await.unwrap();

    assert_eq!(report.expand.attempts(), 0);
    assert_eq!(session.sim.click_count("group:Forms"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_flaky_group_is_retried() {
    let session = Session::new(
        NgxAdminApp::new(today())
            .with_group_ignoring_clicks("Modal & Overlays", 2)
            .at("/"),
        today(),
    );

    let report = session.pm.navigate_to().tooltip_page().await.unwrap();

    assert_eq!(report.expand, ExpandOutcome::Expanded { attempts: 3 });
    assert_eq!(session.sim.click_count("group:Modal & Overlays"), 3);
    assert_eq!(session.sim.forced_click_count("group:Modal & Overlays"), 0);
}

#[test_case(NgxAdminApp::new(today()).with_group_requiring_force("Tables & Data") ; "needs force")]
#[test_case(NgxAdminApp::new(today()).with_group_ignoring_clicks("Tables & Data", 10) ; "ignores every attempt")]
#[tokio::test(start_paused = true)]
async fn test_stubborn_group_gets_forced_click(app: NgxAdminApp) {
    let session = Session::new(app.at("/"), today());

    let report = session.pm.navigate_to().smart_table_page().await.unwrap();

    assert_eq!(report.expand, ExpandOutcome::Forced { attempts: 4 });
    assert_eq!(session.sim.click_count("group:Tables & Data"), 5);
    assert_eq!(session.sim.forced_click_count("group:Tables & Data"), 1);
    assert_eq!(session.sim.with_app(|a| a.screen()), Screen::SmartTable);
}

#[tokio::test(start_paused = true)]
async fn test_missing_signals_time_out_with_patterns() {
    let session = Session::at("/");
    let target = NavigationTarget::new("Forms", "Form Layouts")
        .header("Stepper")
        .button("Launch wizard");

    let err = session
        .pm
        .navigate_to()
        .go_to_section(&target, Duration::from_secs(2))
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(matches!(err, E2eError::NavigationTimeout { timeout_ms: 2000, .. }));
    assert!(message.contains("*Stepper*"), "{}", message);
    assert!(message.contains("*Launch wizard*"), "{}", message);
    // The leaf was still clicked
    assert_eq!(session.sim.with_app(|a| a.screen()), Screen::FormLayouts);
}

#[tokio::test(start_paused = true)]
async fn test_toastr_is_confirmed_by_button() {
    let session = Session::at("/");
    let report = session.pm.navigate_to().toastr_page().await.unwrap();
    assert_eq!(report.signal.kind, SignalKind::Button);
    assert!(report.signal.text.matches("Show toast"));
}

#[tokio::test(start_paused = true)]
async fn test_blank_tab_opens_start_path() {
    let session = Session::blank();
    let report = session.pm.navigate_to().datepicker_page().await.unwrap();
    assert!(report.url.starts_with("http://localhost:4200"));
    assert_eq!(session.sim.with_app(|a| a.screen()), Screen::Datepicker);
}

#[tokio::test(start_paused = true)]
async fn test_app_that_never_loads() {
    let session = Session::new(NgxAdminApp::new(today()).never_loading(), today());

    let err = session.pm.navigate_to().form_layouts_page().await.unwrap_err();

    match err {
        E2eError::AppNotLoaded { probe, timeout_ms } => {
            assert!(probe.contains("nb-layout"), "{}", probe);
            assert_eq!(timeout_ms, 15_000);
        }
        other => panic!("expected AppNotLoaded, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_unknown_group_is_not_found() {
    let session = Session::at("/");
    let target = NavigationTarget::new("Charts", "Echarts").header("Echarts");

    let err = session
        .pm
        .navigate_to()
        .go_to_section(&target, Duration::from_secs(5))
        .await
        .unwrap_err();

    match err {
        E2eError::ElementNotFound { what, timeout_ms } => {
            assert!(what.contains("a[title=\"Charts\"]"), "{}", what);
            assert!(what.contains("role=link[name=\"Charts\"/i]"), "{}", what);
            assert_eq!(timeout_ms, 10_000);
        }
        other => panic!("expected ElementNotFound, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_quick_links_outside_sidebar_are_ignored() {
    let session = Session::at("/");
    session.pm.navigate_to().tooltip_page().await.unwrap();
    session.pm.navigate_to().form_layouts_page().await.unwrap();

    assert_eq!(session.sim.click_count("header:forms"), 0);
    assert_eq!(session.sim.click_count("header:tooltip"), 0);
    assert_eq!(session.sim.click_count("leaf:/pages/modal-overlays/tooltip"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_section_reachable_only_when_group_open() {
    let session = Session::at("/");
    let sidebar = session.pm.navigate_to();

    sidebar.assert_section_reachable("Forms").await.unwrap();
    let err = sidebar.assert_section_reachable("Form Layouts").await.unwrap_err();
    assert!(matches!(err, E2eError::ElementNotFound { .. }));

    sidebar.go_to(Section::Datepicker).await.unwrap();
    sidebar.assert_section_reachable("Form Layouts").await.unwrap();
    // Accessible names are matched without regard to case
    sidebar.assert_section_reachable("form layouts").await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_form_layouts_proof() {
    let session = Session::at("/");
    let sidebar = session.pm.navigate_to();

    let err = sidebar.assert_form_layouts_visible().await.unwrap_err();
    assert!(matches!(err, E2eError::AssertionFailed(_)));

    sidebar.form_layouts_page().await.unwrap();
    sidebar.assert_form_layouts_visible().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_missing_leaf_in_known_group() {
    let session = Session::at("/");
    let target = NavigationTarget::new("Forms", "Stepper").header("Stepper");

    let err = session
        .pm
        .navigate_to()
        .go_to_section(&target, Duration::from_secs(5))
        .await
        .unwrap_err();

    match err {
        E2eError::ElementNotFound { what, .. } => {
            assert!(what.contains("a[title=\"Stepper\"]"), "{}", what);
        }
        other => panic!("expected ElementNotFound, got {other:?}"),
    }
    // The group was opened before the leaf lookup gave up
    assert!(session.sim.with_app(|a| a.group_expanded("Forms")));
    assert_eq!(session.sim.with_app(|a| a.screen()), Screen::Dashboard);
}

#[tokio::test(start_paused = true)]
async fn test_forced_click_that_changes_nothing_fails_on_leaf() {
    let session = Session::new(
        NgxAdminApp::new(today()).with_group_stuck("Forms").at("/"),
        today(),
    );

    let err = session.pm.navigate_to().datepicker_page().await.unwrap_err();

    match err {
        E2eError::ElementNotFound { what, timeout_ms } => {
            assert!(what.contains("Datepicker"), "{}", what);
            assert_eq!(timeout_ms, 10_000);
        }
        other => panic!("expected ElementNotFound, got {other:?}"),
    }
    assert_eq!(session.sim.click_count("group:Forms"), 5);
    assert_eq!(session.sim.forced_click_count("group:Forms"), 1);
    assert_eq!(session.sim.with_app(|a| a.screen()), Screen::Dashboard);
}

#[tokio::test(start_paused = true)]
async fn test_layout_without_sidebar_is_not_ready() {
    let session = Session::new(NgxAdminApp::new(today()).without_sidebar().at("/"), today());

    let err = session.pm.navigate_to().toastr_page().await.unwrap_err();

    match err {
        E2eError::AppNotLoaded { probe, timeout_ms } => {
            assert!(probe.contains("nb-sidebar"), "{}", probe);
            assert_eq!(timeout_ms, 15_000);
        }
        other => panic!("expected AppNotLoaded, got {other:?}"),
    }
}

/// Simulated page whose card header lookups fail the way a strict
/// locator does when several headers match
struct StrictHeaders(Arc<SimPage<NgxAdminApp>>);

impl StrictHeaders {
    fn check(locator: &Locator) -> DriverResult<()> {
        if locator.to_string().contains("nb-card-header") {
            return Err(DriverError::StrictMode {
                locator: locator.to_string(),
                count: 2,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Page for StrictHeaders {
    async fn goto(&self, url: &str) -> DriverResult<()> {
        self.0.goto(url).await
    }

    async fn url(&self) -> DriverResult<String> {
        self.0.url().await
    }

    async fn count(&self, locator: &Locator) -> DriverResult<usize> {
        self.0.count(locator).await
    }

    async fn is_visible(&self, locator: &Locator) -> DriverResult<bool> {
        Self::check(locator)?;
        self.0.is_visible(locator).await
    }

    async fn click(&self, locator: &Locator, options: ClickOptions) -> DriverResult<()> {
        self.0.click(locator, options).await
    }

    async fn fill(&self, locator: &Locator, value: &str) -> DriverResult<()> {
        self.0.fill(locator, value).await
    }

    async fn set_checked(
        &self,
        locator: &Locator,
        checked: bool,
        options: ClickOptions,
    ) -> DriverResult<()> {
        self.0.set_checked(locator, checked, options).await
    }

    async fn text_content(&self, locator: &Locator) -> DriverResult<Option<String>> {
        self.0.text_content(locator).await
    }

    async fn get_attribute(&self, locator: &Locator, name: &str) -> DriverResult<Option<String>> {
        self.0.get_attribute(locator, name).await
    }

    async fn input_value(&self, locator: &Locator) -> DriverResult<String> {
        self.0.input_value(locator).await
    }

    async fn scroll_into_view(&self, locator: &Locator) -> DriverResult<()> {
        self.0.scroll_into_view(locator).await
    }

    async fn mouse_move(&self, x: f64, y: f64) -> DriverResult<()> {
        self.0.mouse_move(x, y).await
    }

    async fn mouse_down(&self) -> DriverResult<()> {
        self.0.mouse_down().await
    }

    async fn mouse_up(&self) -> DriverResult<()> {
        self.0.mouse_up().await
    }
}

fn strict_headers_manager(config: PilotConfig) -> (Arc<SimPage<NgxAdminApp>>, PageManager) {
    let sim = Arc::new(SimPage::new(NgxAdminApp::new(today()).at("/")));
    let page: Arc<dyn Page> = Arc::new(StrictHeaders(sim.clone()));
    (sim, PageManager::new(page, config))
}

#[tokio::test(start_paused = true)]
async fn test_failing_signal_lookups_count_as_not_yet() {
    let (sim, pm) = strict_headers_manager(PilotConfig::default());

    let report = pm.navigate_to().toastr_page().await.unwrap();
    assert_eq!(report.signal.kind, SignalKind::Button);

    let err = pm.navigate_to().smart_table_page().await.unwrap_err();
    assert!(
        matches!(err, E2eError::NavigationTimeout { timeout_ms: 20_000, .. }),
        "{err:?}"
    );
    assert_eq!(sim.with_app(|a| a.screen()), Screen::SmartTable);

    let err = pm.navigate_to().assert_form_layouts_visible().await.unwrap_err();
    assert!(matches!(err, E2eError::AssertionFailed(_)), "{err:?}");
}

#[tokio::test(start_paused = true)]
async fn test_malformed_signal_selector_is_reported() {
    let mut config = PilotConfig::default();
    config.sidebar.content_header_selector = "nb-card-header >".to_string();
    let session = Session::with_config(NgxAdminApp::new(today()).at("/"), today(), config);

    let err = session.pm.navigate_to().smart_table_page().await.unwrap_err();

    assert!(
        matches!(err, E2eError::Driver(DriverError::InvalidSelector { .. })),
        "{err:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn test_quoted_title_is_looked_up_not_rejected() {
    let session = Session::at("/");

    let err = session
        .pm
        .navigate_to()
        .assert_section_reachable(r#"Say "hi" \ bye"#)
        .await
        .unwrap_err();

    assert!(matches!(err, E2eError::ElementNotFound { .. }), "{err:?}");
}
