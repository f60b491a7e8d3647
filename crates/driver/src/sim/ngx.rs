//! Simulated ngx-admin dashboard
//!
//! Renders the parts of the Nebular demo app that the page objects touch:
//! the layout shell, the collapsible sidebar menu, the Form Layouts cards, the
//! two datepickers with a paged calendar, and placeholder content for the
//! remaining sections. Fault knobs reproduce the flaky behaviours seen in the
//! real app (menu groups ignoring clicks, groups that only react to forced
//! clicks, groups that never open, a missing sidebar, an app that never
//! finishes bootstrapping).

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::sim::dom::{Document, El};
use crate::sim::SimApp;

const BLANK: &str = "about:blank";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    FormLayouts,
    Datepicker,
    SmartTable,
    Toastr,
    Tooltip,
}

impl Screen {
    fn path(&self) -> &'static str {
        match self {
            Screen::Dashboard => "/pages/iot-dashboard",
            Screen::FormLayouts => "/pages/forms/layouts",
            Screen::Datepicker => "/pages/forms/datepicker",
            Screen::SmartTable => "/pages/tables/smart-table",
            Screen::Toastr => "/pages/modal-overlays/toastr",
            Screen::Tooltip => "/pages/modal-overlays/tooltip",
        }
    }

    fn from_path(path: &str) -> Option<Self> {
        [
            Screen::Dashboard,
            Screen::FormLayouts,
            Screen::Datepicker,
            Screen::SmartTable,
            Screen::Toastr,
            Screen::Tooltip,
        ]
        .into_iter()
        .find(|s| path.ends_with(s.path()))
    }
}

#[derive(Debug, Clone)]
struct MenuGroup {
    title: &'static str,
    leaves: Vec<(&'static str, Screen)>,
    expanded: bool,
    ignore_clicks: usize,
    requires_force: bool,
    stuck: bool,
}

/// A submitted form and the values it carried
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    UsingTheGrid {
        email: String,
        password: String,
        option: Option<String>,
    },
    Inline {
        name: String,
        email: String,
        remember_me: bool,
    },
}

#[derive(Debug, Clone, Default)]
struct Forms {
    grid_email: String,
    grid_password: String,
    grid_option: Option<String>,
    inline_name: String,
    inline_email: String,
    inline_remember: bool,
    submissions: Vec<Submission>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
    Form,
    Range,
}

#[derive(Debug, Clone, Copy)]
struct OpenCalendar {
    kind: PickerKind,
    /// First day of the displayed month
    month: NaiveDate,
    range_start: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
struct Pickers {
    today: NaiveDate,
    form_selected: Option<NaiveDate>,
    range_selected: Option<(NaiveDate, Option<NaiveDate>)>,
    open: Option<OpenCalendar>,
}

/// Simulated ngx-admin application state
#[derive(Debug, Clone)]
pub struct NgxAdminApp {
    url: String,
    never_loads: bool,
    sidebar_missing: bool,
    groups: Vec<MenuGroup>,
    screen: Screen,
    forms: Forms,
    pickers: Pickers,
}

impl NgxAdminApp {
    /// A fresh tab at `about:blank`; the calendar treats `today` as the
    /// current date
    pub fn new(today: NaiveDate) -> Self {
        Self {
            url: BLANK.to_string(),
            never_loads: false,
            sidebar_missing: false,
            groups: vec![
                MenuGroup::new(
                    "Forms",
                    vec![
                        ("Form Layouts", Screen::FormLayouts),
                        ("Datepicker", Screen::Datepicker),
                    ],
                ),
                MenuGroup::new(
                    "Modal & Overlays",
                    vec![("Toastr", Screen::Toastr), ("Tooltip", Screen::Tooltip)],
                ),
                MenuGroup::new("Tables & Data", vec![("Smart Table", Screen::SmartTable)]),
            ],
            screen: Screen::Dashboard,
            forms: Forms::default(),
            pickers: Pickers {
                today,
                form_selected: None,
                range_selected: None,
                open: None,
            },
        }
    }

    /// Start with a group already expanded
    pub fn with_group_expanded(mut self, title: &str) -> Self {
        if let Some(group) = self.group_mut(title) {
            group.expanded = true;
        }
        self
    }

    /// The group swallows its first `clicks` regular clicks
    pub fn with_group_ignoring_clicks(mut self, title: &str, clicks: usize) -> Self {
        if let Some(group) = self.group_mut(title) {
            group.ignore_clicks = clicks;
        }
        self
    }

    /// The group only toggles on forced clicks
    pub fn with_group_requiring_force(mut self, title: &str) -> Self {
        if let Some(group) = self.group_mut(title) {
            group.requires_force = true;
        }
        self
    }

    /// The group ignores every click, forced ones included
    pub fn with_group_stuck(mut self, title: &str) -> Self {
        if let Some(group) = self.group_mut(title) {
            group.stuck = true;
        }
        self
    }

    /// The layout shell renders but the sidebar never does
    pub fn without_sidebar(mut self) -> Self {
        self.sidebar_missing = true;
        self
    }

    /// Bootstrapping never completes: the layout shell is never rendered
    pub fn never_loading(mut self) -> Self {
        self.never_loads = true;
        self
    }

    /// Open directly on a section, as if the tab had already navigated there
    pub fn at(mut self, path: &str) -> Self {
        self.goto(path);
        self
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn group_expanded(&self, title: &str) -> bool {
        self.groups
            .iter()
            .any(|g| g.title == title && g.expanded)
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.forms.submissions
    }

    pub fn form_picker_value(&self) -> String {
        self.pickers.form_value()
    }

    pub fn range_picker_value(&self) -> String {
        self.pickers.range_value()
    }

    pub fn calendar_open(&self) -> bool {
        self.pickers.open.is_some()
    }

    /// Month currently shown by the open calendar
    pub fn calendar_month(&self) -> Option<NaiveDate> {
        self.pickers.open.map(|o| o.month)
    }

    fn group_mut(&mut self, title: &str) -> Option<&mut MenuGroup> {
        self.groups.iter_mut().find(|g| g.title == title)
    }

    fn loaded(&self) -> bool {
        self.url != BLANK && !self.never_loads
    }

    fn open_calendar(&mut self, kind: PickerKind) {
        let anchor = match kind {
            PickerKind::Form => self.pickers.form_selected,
            PickerKind::Range => self.pickers.range_selected.map(|(start, _)| start),
        }
        .unwrap_or(self.pickers.today);
        self.pickers.open = Some(OpenCalendar {
            kind,
            month: first_of_month(anchor),
            range_start: None,
        });
    }

    fn pick_day(&mut self, date: NaiveDate) {
        let Some(mut open) = self.pickers.open else {
            return;
        };
        match open.kind {
            PickerKind::Form => {
                self.pickers.form_selected = Some(date);
                self.pickers.open = None;
            }
            PickerKind::Range => match open.range_start {
                None => {
                    open.range_start = Some(date);
                    open.month = first_of_month(date);
                    self.pickers.range_selected = Some((date, None));
                    self.pickers.open = Some(open);
                }
                Some(start) => {
                    self.pickers.range_selected = Some((start, Some(date)));
                    self.pickers.open = None;
                }
            },
        }
    }

    fn page_calendar(&mut self, forward: bool) {
        if let Some(open) = self.pickers.open.as_mut() {
            open.month = if forward {
                open.month + Months::new(1)
            } else {
                open.month - Months::new(1)
            };
        }
    }

    // ── rendering ───────────────────────────────────────────────────────────

    fn render_header(&self) -> El {
        // Quick links outside the sidebar share titles with menu groups
        El::new("nb-layout-header").child(
            El::new("nav").class("header-container").children([
                El::new("a").attr("href", "#").attr("title", "Forms").text("Forms").handle("header:forms"),
                El::new("a").attr("href", "#").attr("title", "Tooltip").text("Tooltip").handle("header:tooltip"),
            ]),
        )
    }

    fn render_sidebar(&self) -> El {
        let mut items = vec![El::new("li").class("menu-item").child(
            El::new("a")
                .attr("href", Screen::Dashboard.path())
                .attr("title", "IoT Dashboard")
                .handle(format!("leaf:{}", Screen::Dashboard.path()))
                .child(El::new("span").class("menu-title").text("IoT Dashboard")),
        )];

        for group in &self.groups {
            let leaves = group.leaves.iter().map(|(title, screen)| {
                El::new("li").class("menu-item").child(
                    El::new("a")
                        .attr("href", screen.path())
                        .attr("title", *title)
                        .class_if(*screen == self.screen, "active")
                        .handle(format!("leaf:{}", screen.path()))
                        .child(El::new("span").class("menu-title").text(*title)),
                )
            });
            items.push(
                El::new("li")
                    .class("menu-item")
                    .child(
                        El::new("a")
                            .attr("href", "#")
                            .attr("title", group.title)
                            .attr("aria-expanded", group.expanded.to_string())
                            .handle(format!("group:{}", group.title))
                            .child(El::new("span").class("menu-title").text(group.title))
                            .child(El::new("nb-icon").class("expand-state")),
                    )
                    .child(
                        El::new("ul")
                            .class("menu-items")
                            .hidden(!group.expanded)
                            .children(leaves),
                    ),
            );
        }

        El::new("nb-sidebar")
            .class("menu-sidebar")
            .child(El::new("nb-menu").child(El::new("ul").class("menu-items").children(items)))
    }

    fn render_screen(&self) -> Vec<El> {
        match self.screen {
            Screen::Dashboard => vec![card("Temperature", vec![
                El::new("ngx-temperature-dragger").text("24"),
            ])],
            Screen::FormLayouts => self.render_form_layouts(),
            Screen::Datepicker => vec![
                card("Common Datepicker", vec![El::new("input")
                    .attr("type", "text")
                    .attr("placeholder", "Form Picker")
                    .attr("value", self.pickers.form_value())
                    .handle("picker:form")]),
                card("Datepicker With Range", vec![El::new("input")
                    .attr("type", "text")
                    .attr("placeholder", "Range Picker")
                    .attr("value", self.pickers.range_value())
                    .handle("picker:range")]),
            ],
            Screen::SmartTable => vec![card("Smart Table", vec![El::new("table").children(
                ["mdo@gmail.com", "fat@yandex.ru", "twitter@outlook.com"]
                    .into_iter()
                    .map(|email| El::new("tr").child(El::new("td").text(email))),
            )])],
            Screen::Toastr => vec![card("Toaster configuration", vec![
                El::new("button").text("Show toast").handle("toastr:show"),
                El::new("button").text("Random toast").handle("toastr:random"),
            ])],
            Screen::Tooltip => vec![
                card("Tooltip With Icon", vec![]),
                card("Tooltip Placements", vec![El::new("button").text("Top")]),
                card("Colored Tooltips", vec![]),
            ],
        }
    }

    fn render_form_layouts(&self) -> Vec<El> {
        let forms = &self.forms;
        let radio = |label: &str| {
            El::new("nb-radio").child(
                El::new("label")
                    .child(
                        El::new("input")
                            .attr("type", "radio")
                            .attr("name", "gridRadios")
                            .attr("aria-label", label)
                            .class("native-input visually-hidden")
                            .attr_if(forms.grid_option.as_deref() == Some(label), "checked", "")
                            .intercepted()
                            .handle(format!("grid:option:{}", label)),
                    )
                    .child(El::new("span").class("text").text(label)),
            )
        };

        vec![
            card("Inline form", vec![El::new("form").children([
                text_input("text", "Jane Doe", &forms.inline_name, "inline:name"),
                text_input("email", "Email", &forms.inline_email, "inline:email"),
                El::new("nb-checkbox").child(
                    El::new("label")
                        .child(
                            El::new("input")
                                .attr("type", "checkbox")
                                .attr("aria-label", "Remember me")
                                .class("native-input visually-hidden")
                                .attr_if(forms.inline_remember, "checked", "")
                                .intercepted()
                                .handle("inline:remember"),
                        )
                        .child(El::new("span").class("text").text("Remember me")),
                ),
                El::new("button").attr("type", "submit").text("Submit").handle("inline:submit"),
            ])]),
            card("Using the Grid", vec![El::new("form").children([
                text_input("email", "Email", &forms.grid_email, "grid:email"),
                text_input("password", "Password", &forms.grid_password, "grid:password"),
                El::new("fieldset").children([radio("Option 1"), radio("Option 2")]),
                El::new("button").attr("type", "submit").text("Sign in").handle("grid:submit"),
            ])]),
            card("Form without labels", vec![
                text_input("email", "Recipients", "", "nolabels:recipients"),
                El::new("button").text("Send").handle("nolabels:send"),
            ]),
            card("Basic form", vec![
                text_input("email", "Email", "", "basic:email"),
                El::new("button").text("Submit").handle("basic:submit"),
            ]),
        ]
    }

    fn render_calendar(&self, open: &OpenCalendar) -> El {
        let month = open.month;
        let lead = month.weekday().num_days_from_sunday() as i64;
        let start = month - Duration::days(lead);

        let rows = (0..6).map(|week| {
            El::new("nb-calendar-picker-row").children((0..7).map(move |weekday| {
                let date = start + Duration::days(week * 7 + weekday);
                let bounding = date.month() != month.month();
                El::new("nb-calendar-day-cell")
                    .class("day-cell ng-star-inserted")
                    .class_if(bounding, "bounding-month")
                    .class_if(date == self.pickers.today, "today")
                    .handle(format!("calendar:day:{}", date.format("%Y-%m-%d")))
                    .child(El::new("div").class("cell-content").text(date.day().to_string()))
            }))
        });

        let day_names = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
            .into_iter()
            .map(|d| El::new("div").class("day").text(d));

        El::new("nb-datepicker-container").child(
            El::new("nb-calendar").child(
                El::new("nb-card")
                    .child(
                        El::new("nb-card-header").class("calendar-header").children([
                            El::new("nb-calendar-view-mode").child(
                                El::new("button").class("appearance-ghost").text(month.format("%B %Y").to_string()),
                            ),
                            El::new("nb-calendar-pageable-navigation").children([
                                El::new("button")
                                    .handle("calendar:prev")
                                    .child(El::new("nb-icon").attr("data-name", "chevron-left")),
                                El::new("button")
                                    .handle("calendar:next")
                                    .child(El::new("nb-icon").attr("data-name", "chevron-right")),
                            ]),
                        ]),
                    )
                    .child(
                        El::new("nb-card-body").child(
                            El::new("nb-calendar-day-picker")
                                .child(El::new("nb-calendar-days-names").children(day_names))
                                .child(El::new("nb-calendar-picker").children(rows)),
                        ),
                    ),
            ),
        )
    }
}

impl SimApp for NgxAdminApp {
    fn render(&self) -> Document {
        let mut body = El::new("body");
        if !self.loaded() {
            if self.url != BLANK {
                body = body.child(El::new("div").class("spinner").text("Loading..."));
            }
            return Document::from_tree(El::new("html").child(body));
        }

        let mut layout = El::new("nb-layout").child(self.render_header());
        if !self.sidebar_missing {
            layout = layout.child(self.render_sidebar());
        }
        body = body.child(layout.child(El::new("nb-layout-column").children(self.render_screen())));
        if let Some(open) = &self.pickers.open {
            body = body.child(
                El::new("div")
                    .class("cdk-overlay-container")
                    .child(self.render_calendar(open)),
            );
        }
        Document::from_tree(El::new("html").child(body))
    }

    fn url(&self) -> String {
        if self.url == BLANK {
            BLANK.to_string()
        } else {
            format!("http://localhost:4200{}", self.url)
        }
    }

    fn goto(&mut self, url: &str) {
        let path = url
            .strip_prefix("http://localhost:4200")
            .unwrap_or(url)
            .to_string();
        self.screen = Screen::from_path(&path).unwrap_or(Screen::Dashboard);
        self.url = if path.is_empty() || path == "/" {
            Screen::Dashboard.path().to_string()
        } else {
            path
        };
        self.pickers.open = None;
    }

    fn click(&mut self, handle: &str, forced: bool) {
        if let Some(title) = handle.strip_prefix("group:") {
            if let Some(group) = self.group_mut(title) {
                if group.stuck || (group.requires_force && !forced) {
                    return;
                }
                if group.ignore_clicks > 0 && !forced {
                    group.ignore_clicks -= 1;
                    return;
                }
                group.expanded = !group.expanded;
            }
        } else if let Some(path) = handle.strip_prefix("leaf:") {
            self.goto(path);
        } else if handle == "picker:form" {
            self.open_calendar(PickerKind::Form);
        } else if handle == "picker:range" {
            self.open_calendar(PickerKind::Range);
        } else if handle == "calendar:next" {
            self.page_calendar(true);
        } else if handle == "calendar:prev" {
            self.page_calendar(false);
        } else if let Some(day) = handle.strip_prefix("calendar:day:") {
            if let Ok(date) = NaiveDate::parse_from_str(day, "%Y-%m-%d") {
                self.pick_day(date);
            }
        } else if handle == "grid:submit" {
            let forms = &mut self.forms;
            forms.submissions.push(Submission::UsingTheGrid {
                email: forms.grid_email.clone(),
                password: forms.grid_password.clone(),
                option: forms.grid_option.clone(),
            });
        } else if handle == "inline:submit" {
            let forms = &mut self.forms;
            forms.submissions.push(Submission::Inline {
                name: forms.inline_name.clone(),
                email: forms.inline_email.clone(),
                remember_me: forms.inline_remember,
            });
        } else if let Some(option) = handle.strip_prefix("grid:option:") {
            self.forms.grid_option = Some(option.to_string());
        } else if handle == "inline:remember" {
            self.forms.inline_remember = !self.forms.inline_remember;
        }
    }

    fn fill(&mut self, handle: &str, value: &str) {
        let forms = &mut self.forms;
        let field = match handle {
            "grid:email" => &mut forms.grid_email,
            "grid:password" => &mut forms.grid_password,
            "inline:name" => &mut forms.inline_name,
            "inline:email" => &mut forms.inline_email,
            _ => return,
        };
        *field = value.to_string();
    }

    fn set_checked(&mut self, handle: &str, checked: bool) {
        if let Some(option) = handle.strip_prefix("grid:option:") {
            // Radios cannot be unchecked directly
            if checked {
                self.forms.grid_option = Some(option.to_string());
            }
        } else if handle == "inline:remember" {
            self.forms.inline_remember = checked;
        }
    }
}

impl MenuGroup {
    fn new(title: &'static str, leaves: Vec<(&'static str, Screen)>) -> Self {
        Self {
            title,
            leaves,
            expanded: false,
            ignore_clicks: 0,
            requires_force: false,
            stuck: false,
        }
    }
}

impl Pickers {
    fn form_value(&self) -> String {
        self.form_selected.map(format_date).unwrap_or_default()
    }

    fn range_value(&self) -> String {
        match self.range_selected {
            Some((start, Some(end))) => format!("{} - {}", format_date(start), format_date(end)),
            Some((start, None)) => format_date(start),
            None => String::new(),
        }
    }
}

fn card(header: &str, body: Vec<El>) -> El {
    El::new("nb-card")
        .child(El::new("nb-card-header").text(header))
        .child(El::new("nb-card-body").children(body))
}

fn text_input(kind: &str, placeholder: &str, value: &str, handle: &str) -> El {
    El::new("input")
        .attr("type", kind)
        .attr("placeholder", placeholder)
        .attr("value", value)
        .class("input-full-width")
        .handle(handle)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Nebular's default `MMM d, y` input format
fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn blank_tab_renders_nothing_until_navigation() {
        let mut app = NgxAdminApp::new(ymd(2024, 1, 25));
        let doc = app.render();
        assert_eq!(doc.descendants(doc.root()).len(), 1);
        app.goto("/");
        assert_eq!(app.url(), "http://localhost:4200/pages/iot-dashboard");
        assert_eq!(app.screen(), Screen::Dashboard);
    }

    #[test]
    fn flaky_group_swallows_clicks() {
        let mut app = NgxAdminApp::new(ymd(2024, 1, 25)).with_group_ignoring_clicks("Forms", 2);
        app.click("group:Forms", false);
        app.click("group:Forms", false);
        assert!(!app.group_expanded("Forms"));
        app.click("group:Forms", false);
        assert!(app.group_expanded("Forms"));
    }

    #[test]
    fn stuck_group_ignores_forced_clicks() {
        let mut app = NgxAdminApp::new(ymd(2024, 1, 25)).with_group_stuck("Forms");
        app.click("group:Forms", false);
        app.click("group:Forms", true);
        assert!(!app.group_expanded("Forms"));
    }

    #[test]
    fn range_picker_keeps_calendar_open_between_picks() {
        let mut app = NgxAdminApp::new(ymd(2024, 1, 25)).at("/pages/forms/datepicker");
        app.click("picker:range", false);
        app.click("calendar:day:2024-01-27", false);
        assert!(app.calendar_open());
        app.click("calendar:next", false);
        app.click("calendar:day:2024-02-03", false);
        assert!(!app.calendar_open());
        assert_eq!(app.range_picker_value(), "Jan 27, 2024 - Feb 3, 2024");
    }

    #[test]
    fn calendar_grid_starts_on_sunday_with_bounding_cells() {
        let mut app = NgxAdminApp::new(ymd(2024, 3, 10)).at("/pages/forms/datepicker");
        app.click("picker:form", false);
        let doc = app.render();
        let cells: Vec<_> = doc
            .descendants(doc.root())
            .into_iter()
            .filter(|&n| doc.tag(n) == "nb-calendar-day-cell")
            .collect();
        assert_eq!(cells.len(), 42);
        // March 2024 starts on a Friday: Feb 25..29 lead the grid
        assert_eq!(doc.text_content(cells[0]), "25");
        assert!(doc.has_class(cells[0], "bounding-month"));
        assert_eq!(doc.text_content(cells[5]), "1");
        assert!(!doc.has_class(cells[5], "bounding-month"));
    }
}
