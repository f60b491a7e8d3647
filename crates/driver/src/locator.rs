//! Structured locators
//!
//! A [`Locator`] is a chain of segments. Each segment selects descendants of
//! whatever the previous segment matched, then narrows the result with
//! optional filters. Locators are lazy descriptions: every page operation
//! re-resolves them against the current document, the way Playwright does.

use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::error::DriverResult;

/// How a piece of element text is compared
#[derive(Debug, Clone)]
pub enum TextMatch {
    /// Whole (trimmed) text equals the value, case-sensitive
    Exact(String),
    /// Whole (trimmed) text equals the value, ignoring case
    ExactIgnoreCase(String),
    /// Text contains the value, ignoring case
    Contains(String),
    /// Regular expression search over the text
    Pattern {
        regex: Regex,
        source: String,
        ignore_case: bool,
    },
}

impl TextMatch {
    pub fn exact(text: impl Into<String>) -> Self {
        TextMatch::Exact(text.into())
    }

    pub fn exact_ignore_case(text: impl Into<String>) -> Self {
        TextMatch::ExactIgnoreCase(text.into())
    }

    pub fn contains(text: impl Into<String>) -> Self {
        TextMatch::Contains(text.into())
    }

    /// Compile a case-sensitive pattern.
    ///
    /// The source is also shipped verbatim to the Playwright bridge, so it
    /// should stay within the syntax shared by Rust and JavaScript regexes.
    pub fn pattern(source: &str) -> DriverResult<Self> {
        Self::build_pattern(source, false)
    }

    /// Compile a case-insensitive pattern
    pub fn pattern_ignore_case(source: &str) -> DriverResult<Self> {
        Self::build_pattern(source, true)
    }

    fn build_pattern(source: &str, ignore_case: bool) -> DriverResult<Self> {
        let regex = RegexBuilder::new(source)
            .case_insensitive(ignore_case)
            .build()?;
        Ok(TextMatch::Pattern {
            regex,
            source: source.to_string(),
            ignore_case,
        })
    }

    /// Test a piece of rendered text against this matcher
    pub fn matches(&self, text: &str) -> bool {
        let text = normalize_whitespace(text);
        match self {
            TextMatch::Exact(value) => text == normalize_whitespace(value),
            TextMatch::ExactIgnoreCase(value) => {
                text.to_lowercase() == normalize_whitespace(value).to_lowercase()
            }
            TextMatch::Contains(value) => text
                .to_lowercase()
                .contains(&normalize_whitespace(value).to_lowercase()),
            TextMatch::Pattern { regex, .. } => regex.is_match(&text),
        }
    }
}

impl fmt::Display for TextMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextMatch::Exact(value) => write!(f, "\"{}\"", value),
            TextMatch::ExactIgnoreCase(value) => write!(f, "\"{}\"/i", value),
            TextMatch::Contains(value) => write!(f, "*{}*", value),
            TextMatch::Pattern {
                source,
                ignore_case,
                ..
            } => write!(f, "/{}/{}", source, if *ignore_case { "i" } else { "" }),
        }
    }
}

/// Collapse runs of whitespace and trim, as text matching in browsers does
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// ARIA roles used by the page objects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AriaRole {
    Link,
    Button,
    Heading,
    Textbox,
    Checkbox,
    Radio,
}

impl AriaRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AriaRole::Link => "link",
            AriaRole::Button => "button",
            AriaRole::Heading => "heading",
            AriaRole::Textbox => "textbox",
            AriaRole::Checkbox => "checkbox",
            AriaRole::Radio => "radio",
        }
    }
}

/// What a single segment selects
#[derive(Debug, Clone)]
pub enum Selector {
    /// CSS selector
    Css(String),
    /// ARIA role, optionally narrowed by accessible name
    Role {
        role: AriaRole,
        name: Option<TextMatch>,
    },
    /// Innermost elements whose text matches
    Text(TextMatch),
    /// Inputs by placeholder attribute
    Placeholder(String),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(css) => write!(f, "css={}", css),
            Selector::Role { role, name: None } => write!(f, "role={}", role.as_str()),
            Selector::Role {
                role,
                name: Some(name),
            } => write!(f, "role={}[name={}]", role.as_str(), name),
            Selector::Text(text) => write!(f, "text={}", text),
            Selector::Placeholder(value) => write!(f, "placeholder=\"{}\"", value),
        }
    }
}

/// Which of the matched elements to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nth {
    First,
    Last,
    Index(usize),
}

#[derive(Debug, Clone)]
pub struct Segment {
    pub selector: Selector,
    /// Keep only matches whose text content matches
    pub has_text: Option<TextMatch>,
    /// Keep only matches that are themselves this tag (`xpath=self::tag`)
    pub self_tag: Option<String>,
    pub nth: Option<Nth>,
}

impl Segment {
    fn new(selector: Selector) -> Self {
        Self {
            selector,
            has_text: None,
            self_tag: None,
            nth: None,
        }
    }
}

/// A chain of segments resolved from the document root
#[derive(Debug, Clone)]
pub struct Locator {
    segments: Vec<Segment>,
}

impl Locator {
    pub fn new(selector: Selector) -> Self {
        Self {
            segments: vec![Segment::new(selector)],
        }
    }

    pub fn css(css: impl Into<String>) -> Self {
        Self::new(Selector::Css(css.into()))
    }

    pub fn role(role: AriaRole, name: Option<TextMatch>) -> Self {
        Self::new(Selector::Role { role, name })
    }

    pub fn text(text: TextMatch) -> Self {
        Self::new(Selector::Text(text))
    }

    pub fn placeholder(value: impl Into<String>) -> Self {
        Self::new(Selector::Placeholder(value.into()))
    }

    /// Descend into this locator's matches
    pub fn locator(&self, selector: Selector) -> Self {
        let mut next = self.clone();
        next.segments.push(Segment::new(selector));
        next
    }

    pub fn css_within(&self, css: impl Into<String>) -> Self {
        self.locator(Selector::Css(css.into()))
    }

    pub fn role_within(&self, role: AriaRole, name: Option<TextMatch>) -> Self {
        self.locator(Selector::Role { role, name })
    }

    pub fn has_text(mut self, text: TextMatch) -> Self {
        self.last_segment().has_text = Some(text);
        self
    }

    pub fn self_tag(mut self, tag: impl Into<String>) -> Self {
        self.last_segment().self_tag = Some(tag.into().to_ascii_lowercase());
        self
    }

    pub fn first(mut self) -> Self {
        self.last_segment().nth = Some(Nth::First);
        self
    }

    pub fn last(mut self) -> Self {
        self.last_segment().nth = Some(Nth::Last);
        self
    }

    pub fn nth(mut self, index: usize) -> Self {
        self.last_segment().nth = Some(Nth::Index(index));
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn last_segment(&mut self) -> &mut Segment {
        // A locator is never built without at least one segment
        let last = self.segments.len() - 1;
        &mut self.segments[last]
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, " >> ")?;
            }
            write!(f, "{}", segment.selector)?;
            if let Some(text) = &segment.has_text {
                write!(f, " [has-text={}]", text)?;
            }
            if let Some(tag) = &segment.self_tag {
                write!(f, " >> self::{}", tag)?;
            }
            match segment.nth {
                Some(Nth::First) => write!(f, " >> nth=0")?,
                Some(Nth::Last) => write!(f, " >> nth=-1")?,
                Some(Nth::Index(i)) => write!(f, " >> nth={}", i)?,
                None => {}
            }
        }
        Ok(())
    }
}
