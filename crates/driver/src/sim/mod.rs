//! In-memory page implementation
//!
//! [`SimPage`] resolves [`Locator`]s against a [`Document`] rendered by a
//! [`SimApp`]. CSS segments are matched by `scraper` on a mirror of the
//! document. Every action is forwarded to the app through the handler key
//! of the target element (or its closest ancestor), after which the document
//! is rendered again. Actions are recorded so tests can assert on exactly
//! what a page object did.

pub mod dom;
pub mod ngx;
pub mod selector;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::trace;

use crate::error::{DriverError, DriverResult};
use crate::locator::{Locator, Nth, Selector};
use crate::page::{ClickOptions, Page};
use dom::{Document, NodeId};
use selector::{CssSelector, Mirror};

pub use ngx::NgxAdminApp;

/// Application behind a simulated page
pub trait SimApp: Send + 'static {
    fn render(&self) -> Document;

    fn url(&self) -> String;

    fn goto(&mut self, url: &str);

    fn click(&mut self, handle: &str, forced: bool);

    fn fill(&mut self, handle: &str, value: &str);

    fn set_checked(&mut self, handle: &str, checked: bool);
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    Click { forced: bool },
    Fill(String),
    Check(bool),
    ScrollIntoView,
}

/// One action performed against the simulated page
#[derive(Debug, Clone)]
pub struct ActionRecord {
    pub kind: ActionKind,
    pub handle: Option<String>,
    pub locator: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MouseState {
    pub x: f64,
    pub y: f64,
    pub pressed: bool,
}

struct SimState<A> {
    app: A,
    doc: Document,
    actions: Vec<ActionRecord>,
    mouse: MouseState,
}

impl<A: SimApp> SimState<A> {
    fn rerender(&mut self) {
        self.doc = self.app.render();
    }

    fn single(&self, locator: &Locator) -> DriverResult<NodeId> {
        let found = resolve(&self.doc, locator)?;
        match found.as_slice() {
            [id] => Ok(*id),
            [] => Err(DriverError::NotFound(locator.to_string())),
            _ => Err(DriverError::StrictMode {
                locator: locator.to_string(),
                count: found.len(),
            }),
        }
    }

    fn actionable(&self, locator: &Locator, forced: bool) -> DriverResult<NodeId> {
        let id = self.single(locator)?;
        if forced {
            return Ok(id);
        }
        if !self.doc.is_visible(id) {
            return Err(DriverError::NotActionable {
                locator: locator.to_string(),
                reason: "element is not visible".to_string(),
            });
        }
        if self.doc.is_intercepted(id) {
            return Err(DriverError::NotActionable {
                locator: locator.to_string(),
                reason: "another element intercepts pointer events".to_string(),
            });
        }
        Ok(id)
    }

    fn record(&mut self, kind: ActionKind, id: NodeId, locator: &Locator) -> Option<String> {
        let handle = self.doc.handler(id).map(str::to_string);
        trace!(?kind, ?handle, "sim action on {}", locator);
        self.actions.push(ActionRecord {
            kind,
            handle: handle.clone(),
            locator: locator.to_string(),
        });
        handle
    }
}

/// A [`Page`] backed by an in-memory [`SimApp`]
pub struct SimPage<A> {
    state: Mutex<SimState<A>>,
}

impl<A: SimApp> SimPage<A> {
    pub fn new(app: A) -> Self {
        let doc = app.render();
        Self {
            state: Mutex::new(SimState {
                app,
                doc,
                actions: Vec::new(),
                mouse: MouseState::default(),
            }),
        }
    }

    /// Inspect the application state
    pub fn with_app<R>(&self, f: impl FnOnce(&A) -> R) -> R {
        f(&self.state.lock().app)
    }

    /// Mutate the application state, e.g. to inject a fault mid-scenario
    pub fn with_app_mut<R>(&self, f: impl FnOnce(&mut A) -> R) -> R {
        let mut state = self.state.lock();
        let out = f(&mut state.app);
        state.rerender();
        out
    }

    pub fn actions(&self) -> Vec<ActionRecord> {
        self.state.lock().actions.clone()
    }

    /// Number of clicks (forced or not) dispatched to `handle`
    pub fn click_count(&self, handle: &str) -> usize {
        self.count_actions(handle, |k| matches!(k, ActionKind::Click { .. }))
    }

    pub fn forced_click_count(&self, handle: &str) -> usize {
        self.count_actions(handle, |k| matches!(k, ActionKind::Click { forced: true }))
    }

    fn count_actions(&self, handle: &str, pred: impl Fn(&ActionKind) -> bool) -> usize {
        self.state
            .lock()
            .actions
            .iter()
            .filter(|a| a.handle.as_deref() == Some(handle) && pred(&a.kind))
            .count()
    }

    pub fn mouse(&self) -> MouseState {
        self.state.lock().mouse
    }

    /// Resolve a locator against the current document (all matches)
    pub fn resolve_count(&self, locator: &Locator) -> DriverResult<usize> {
        let state = self.state.lock();
        Ok(resolve(&state.doc, locator)?.len())
    }
}

#[async_trait]
impl<A: SimApp> Page for SimPage<A> {
    async fn goto(&self, url: &str) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.app.goto(url);
        state.rerender();
        Ok(())
    }

    async fn url(&self) -> DriverResult<String> {
        Ok(self.state.lock().app.url())
    }

    async fn count(&self, locator: &Locator) -> DriverResult<usize> {
        self.resolve_count(locator)
    }

    async fn is_visible(&self, locator: &Locator) -> DriverResult<bool> {
        let state = self.state.lock();
        let found = resolve(&state.doc, locator)?;
        Ok(found.iter().any(|&id| state.doc.is_visible(id)))
    }

    async fn click(&self, locator: &Locator, options: ClickOptions) -> DriverResult<()> {
        let mut state = self.state.lock();
        let id = state.actionable(locator, options.force)?;
        if let Some(handle) = state.record(ActionKind::Click { forced: options.force }, id, locator) {
            state.app.click(&handle, options.force);
            state.rerender();
        }
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> DriverResult<()> {
        let mut state = self.state.lock();
        let id = state.actionable(locator, false)?;
        if !matches!(state.doc.tag(id), "input" | "textarea") {
            return Err(DriverError::NotActionable {
                locator: locator.to_string(),
                reason: "element is not an <input> or <textarea>".to_string(),
            });
        }
        if let Some(handle) = state.record(ActionKind::Fill(value.to_string()), id, locator) {
            state.app.fill(&handle, value);
            state.rerender();
        }
        Ok(())
    }

    async fn set_checked(
        &self,
        locator: &Locator,
        checked: bool,
        options: ClickOptions,
    ) -> DriverResult<()> {
        let mut state = self.state.lock();
        let id = state.actionable(locator, options.force)?;
        if !matches!(state.doc.role(id), Some("checkbox" | "radio")) {
            return Err(DriverError::NotActionable {
                locator: locator.to_string(),
                reason: "element is not a checkbox or radio".to_string(),
            });
        }
        if let Some(handle) = state.record(ActionKind::Check(checked), id, locator) {
            state.app.set_checked(&handle, checked);
            state.rerender();
        }
        Ok(())
    }

    async fn text_content(&self, locator: &Locator) -> DriverResult<Option<String>> {
        let state = self.state.lock();
        let id = state.single(locator)?;
        Ok(Some(state.doc.text_content(id)))
    }

    async fn get_attribute(&self, locator: &Locator, name: &str) -> DriverResult<Option<String>> {
        let state = self.state.lock();
        let id = state.single(locator)?;
        Ok(state.doc.attr(id, name).map(str::to_string))
    }

    async fn input_value(&self, locator: &Locator) -> DriverResult<String> {
        let state = self.state.lock();
        let id = state.single(locator)?;
        Ok(state.doc.attr(id, "value").unwrap_or_default().to_string())
    }

    async fn scroll_into_view(&self, locator: &Locator) -> DriverResult<()> {
        let mut state = self.state.lock();
        let id = state.single(locator)?;
        state.record(ActionKind::ScrollIntoView, id, locator);
        Ok(())
    }

    async fn mouse_move(&self, x: f64, y: f64) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.mouse.x = x;
        state.mouse.y = y;
        Ok(())
    }

    async fn mouse_down(&self) -> DriverResult<()> {
        self.state.lock().mouse.pressed = true;
        Ok(())
    }

    async fn mouse_up(&self) -> DriverResult<()> {
        self.state.lock().mouse.pressed = false;
        Ok(())
    }
}

/// Resolve every segment of a locator, returning matches in document order
pub fn resolve(doc: &Document, locator: &Locator) -> DriverResult<Vec<NodeId>> {
    let mut mirror: Option<Mirror> = None;
    let mut scope = vec![doc.root()];
    for segment in locator.segments() {
        let css_hits = match &segment.selector {
            Selector::Css(css) => {
                let css = CssSelector::parse(css)?;
                Some(mirror.get_or_insert_with(|| Mirror::new(doc)).select(&css))
            }
            _ => None,
        };

        let mut found: Vec<NodeId> = Vec::new();
        for &base in &scope {
            for id in doc.descendants(base) {
                let hit = match &segment.selector {
                    Selector::Css(_) => css_hits.as_ref().map(|h| h.contains(&id)).unwrap_or(false),
                    Selector::Role { role, name } => {
                        // Hidden elements are not part of the accessibility tree
                        doc.role(id) == Some(role.as_str())
                            && doc.is_visible(id)
                            && name
                                .as_ref()
                                .map(|n| n.matches(&doc.accessible_name(id)))
                                .unwrap_or(true)
                    }
                    Selector::Text(text) => {
                        text.matches(&doc.text_content(id))
                            && !doc
                                .node(id)
                                .children
                                .iter()
                                .any(|&c| text.matches(&doc.text_content(c)))
                    }
                    Selector::Placeholder(value) => doc
                        .attr(id, "placeholder")
                        .map(|p| p.eq_ignore_ascii_case(value))
                        .unwrap_or(false),
                };
                if hit {
                    found.push(id);
                }
            }
        }
        found.sort_unstable();
        found.dedup();

        if let Some(text) = &segment.has_text {
            found.retain(|&id| text.matches(&doc.text_content(id)));
        }
        if let Some(tag) = &segment.self_tag {
            found.retain(|&id| doc.tag(id) == tag);
        }
        found = match segment.nth {
            None => found,
            Some(Nth::First) => found.into_iter().take(1).collect(),
            Some(Nth::Last) => found.pop().into_iter().collect(),
            Some(Nth::Index(i)) => found.get(i).copied().into_iter().collect(),
        };

        scope = found;
    }
    Ok(scope)
}
