//! Sidebar navigation
//!
//! The sidebar is a two-level menu: groups that expand and collapse, and
//! leaf links that are only reachable while their group is expanded.
//! Reaching a section walks a fixed sequence of bounded steps:
//!
//! ```text
//! Unloaded ──readiness probe──▶ AppReady
//!    │                             │ locate group (title attr, then link name)
//!    ▼                             ▼
//! AppNotLoaded            GroupExpanding ──click, settle, re-read (≤ N)──┐
//!                                  │  ▲                                   │
//!                                  │  └───────────────────────────────────┘
//!                                  ▼ expanded (or one forced click)
//!                           GroupExpanded ──locate leaf, scroll, click──▶ LeafClicked
//!                                                                          │
//!                                          poll headers / buttons ◀────────┘
//!                                                   │ first visible signal
//!                                                   ▼
//!                                          SectionConfirmed
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use ngx_pilot_driver::{AriaRole, ClickOptions, DriverError, Locator, Page, TextMatch};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::config::PilotConfig;
use crate::error::{E2eError, E2eResult};
use crate::wait::expect_visible;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// A content card header or any element with the heading role
    Header,
    /// An element with the button role
    Button,
}

/// Evidence that a navigation landed on the intended view
#[derive(Debug, Clone)]
pub struct SuccessSignal {
    pub kind: SignalKind,
    pub text: TextMatch,
}

impl fmt::Display for SuccessSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SignalKind::Header => write!(f, "header {}", self.text),
            SignalKind::Button => write!(f, "button {}", self.text),
        }
    }
}

/// A sidebar leaf and the signals that prove it opened
#[derive(Debug, Clone)]
pub struct NavigationTarget {
    pub group: String,
    pub leaf: String,
    pub signals: Vec<SuccessSignal>,
}

impl NavigationTarget {
    pub fn new(group: impl Into<String>, leaf: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            leaf: leaf.into(),
            signals: Vec::new(),
        }
    }

    /// Accept a header containing `text` (case-insensitive)
    pub fn header(self, text: &str) -> Self {
        self.signal(SignalKind::Header, TextMatch::contains(text))
    }

    /// Accept a button containing `text` (case-insensitive)
    pub fn button(self, text: &str) -> Self {
        self.signal(SignalKind::Button, TextMatch::contains(text))
    }

    pub fn signal(mut self, kind: SignalKind, text: TextMatch) -> Self {
        self.signals.push(SuccessSignal { kind, text });
        self
    }

    fn patterns(&self, kind: SignalKind) -> String {
        self.signals
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| s.text.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.group, self.leaf)
    }
}

/// Ways of finding a sidebar link by its title, tried in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStrategy {
    /// `a[title="<title>"]`
    TitleAttribute,
    /// Link role whose accessible name equals the title, ignoring case
    AccessibleName,
}

impl LookupStrategy {
    pub const ORDERED: [LookupStrategy; 2] =
        [LookupStrategy::TitleAttribute, LookupStrategy::AccessibleName];

    /// Locator for `title` inside `scope`, narrowed to a single anchor
    pub fn locator(&self, scope: &Locator, title: &str) -> Locator {
        let found = match self {
            LookupStrategy::TitleAttribute => {
                scope.css_within(format!("a[title=\"{}\"]", css_string(title)))
            }
            LookupStrategy::AccessibleName => {
                scope.role_within(AriaRole::Link, Some(TextMatch::exact_ignore_case(title)))
            }
        };
        found.self_tag("a").first()
    }
}

/// Escape a value for use inside a double-quoted CSS string
fn css_string(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}

/// What it took to get a menu group open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandOutcome {
    AlreadyExpanded,
    /// The flag flipped after `attempts` regular clicks
    Expanded { attempts: usize },
    /// Regular clicks never flipped the flag; a forced click was sent and
    /// not verified
    Forced { attempts: usize },
}

impl ExpandOutcome {
    pub fn attempts(&self) -> usize {
        match self {
            ExpandOutcome::AlreadyExpanded => 0,
            ExpandOutcome::Expanded { attempts } | ExpandOutcome::Forced { attempts } => *attempts,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NavigationReport {
    pub target: String,
    pub expand: ExpandOutcome,
    /// The first signal that became visible
    pub signal: SuccessSignal,
    pub url: String,
}

pub struct SidebarNavigator {
    page: Arc<dyn Page>,
    pub(crate) config: Arc<PilotConfig>,
}

impl SidebarNavigator {
    pub fn new(page: Arc<dyn Page>, config: Arc<PilotConfig>) -> Self {
        Self { page, config }
    }

    fn sidebar(&self) -> Locator {
        Locator::css(&self.config.sidebar.sidebar_selector).first()
    }

    /// Readiness probe: layout shell and sidebar visible.
    ///
    /// A tab that never navigated is sent to the configured start path first.
    pub async fn ensure_app_loaded(&self) -> E2eResult<()> {
        if self.page.url().await? == "about:blank" {
            debug!("Blank tab, opening {}", self.config.start_path);
            self.page.goto(&self.config.start_path).await?;
        }

        let timeout = self.config.timeouts.ready();
        let probes = [
            Locator::css(&self.config.sidebar.layout_selector).first(),
            self.sidebar(),
        ];
        for probe in &probes {
            match expect_visible(self.page.as_ref(), probe, timeout).await {
                Ok(()) => {}
                Err(E2eError::ElementNotFound { .. }) => {
                    return Err(E2eError::AppNotLoaded {
                        probe: probe.to_string(),
                        timeout_ms: timeout.as_millis() as u64,
                    })
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Open a sidebar section and wait until one of its signals shows up
    pub async fn go_to_section(
        &self,
        target: &NavigationTarget,
        timeout: Duration,
    ) -> E2eResult<NavigationReport> {
        self.ensure_app_loaded().await?;

        let group = self.find_link(&target.group).await?;
        let expand = self.expand_group(&group, &target.group).await?;

        let leaf = self.find_link(&target.leaf).await?;
        self.page.scroll_into_view(&leaf).await?;
        self.page.click(&leaf, ClickOptions::default()).await?;

        let signal = self.wait_for_signals(target, timeout).await?;
        let url = self.page.url().await?;
        info!("Reached {} ({}) via {}", target, url, signal);

        Ok(NavigationReport {
            target: target.to_string(),
            expand,
            signal,
            url,
        })
    }

    /// Wait for a sidebar link with this title to be visible
    pub async fn assert_section_reachable(&self, link_title: &str) -> E2eResult<()> {
        self.find_link(link_title).await.map(|_| ())
    }

    /// Poll the lookup strategies until one yields a visible link
    async fn find_link(&self, title: &str) -> E2eResult<Locator> {
        let sidebar = self.sidebar();
        let candidates: Vec<Locator> = LookupStrategy::ORDERED
            .iter()
            .map(|s| s.locator(&sidebar, title))
            .collect();

        let timeout = self.config.timeouts.element();
        let deadline = Instant::now() + timeout;
        loop {
            for candidate in &candidates {
                if self.page.is_visible(candidate).await? {
                    return Ok(candidate.clone());
                }
            }
            if Instant::now() >= deadline {
                return Err(E2eError::ElementNotFound {
                    what: candidates
                        .iter()
                        .map(|c| c.to_string())
                        .collect::<Vec<_>>()
                        .join(" | "),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            sleep(self.config.timeouts.poll_interval()).await;
        }
    }

    async fn is_expanded(&self, group: &Locator) -> E2eResult<bool> {
        let flag = self
            .page
            .get_attribute(group, &self.config.sidebar.expanded_attribute)
            .await?;
        Ok(flag.as_deref() == Some("true"))
    }

    async fn expand_group(&self, group: &Locator, title: &str) -> E2eResult<ExpandOutcome> {
        if self.is_expanded(group).await? {
            debug!("Group {} already expanded", title);
            return Ok(ExpandOutcome::AlreadyExpanded);
        }

        let settings = &self.config.sidebar;
        for attempt in 1..=settings.expand_attempts {
            self.page.click(group, ClickOptions::default()).await?;
            sleep(settings.expand_settle()).await;
            if self.is_expanded(group).await? {
                debug!("Group {} expanded after {} click(s)", title, attempt);
                return Ok(ExpandOutcome::Expanded { attempts: attempt });
            }
        }

        warn!(
            "Group {} still collapsed after {} clicks, sending a forced click",
            title, settings.expand_attempts
        );
        self.page.click(group, ClickOptions::forced()).await?;
        Ok(ExpandOutcome::Forced {
            attempts: settings.expand_attempts,
        })
    }

    fn signal_locators(&self, signal: &SuccessSignal) -> Vec<Locator> {
        match signal.kind {
            SignalKind::Header => vec![
                Locator::css(&self.config.sidebar.content_header_selector)
                    .has_text(signal.text.clone())
                    .first(),
                Locator::role(AriaRole::Heading, Some(signal.text.clone())).first(),
            ],
            SignalKind::Button => {
                vec![Locator::role(AriaRole::Button, Some(signal.text.clone())).first()]
            }
        }
    }

    /// Visibility check that reads a failed lookup as "not yet". Only a
    /// malformed selector is reported.
    pub(crate) async fn check_visible(&self, locator: &Locator) -> E2eResult<bool> {
        match self.page.is_visible(locator).await {
            Ok(visible) => Ok(visible),
            Err(e @ DriverError::InvalidSelector { .. }) => Err(e.into()),
            Err(e) => {
                debug!("Lookup {} failed: {}", locator, e);
                Ok(false)
            }
        }
    }

    async fn wait_for_signals(
        &self,
        target: &NavigationTarget,
        timeout: Duration,
    ) -> E2eResult<SuccessSignal> {
        let deadline = Instant::now() + timeout;
        loop {
            for signal in &target.signals {
                for locator in self.signal_locators(signal) {
                    if self.check_visible(&locator).await? {
                        return Ok(signal.clone());
                    }
                }
            }
            if Instant::now() >= deadline {
                return Err(E2eError::NavigationTimeout {
                    timeout_ms: timeout.as_millis() as u64,
                    headers: target.patterns(SignalKind::Header),
                    buttons: target.patterns(SignalKind::Button),
                });
            }
            sleep(self.config.timeouts.poll_interval()).await;
        }
    }
}
