//! CSS selectors for the simulated page
//!
//! Parsing and matching are done by `scraper`. A [`Document`] is mirrored
//! into a `scraper::Html` tree whose elements carry their arena id in a
//! `data-sim-id` attribute, so every match maps back onto a [`NodeId`].

use std::collections::BTreeSet;

use scraper::{Html, Selector};

use crate::error::{DriverError, DriverResult};
use crate::sim::dom::{Document, NodeId};

const ID_ATTR: &str = "data-sim-id";

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

#[derive(Debug, Clone)]
pub struct CssSelector {
    inner: Selector,
}

impl CssSelector {
    pub fn parse(input: &str) -> DriverResult<Self> {
        let inner = Selector::parse(input).map_err(|e| DriverError::InvalidSelector {
            selector: input.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { inner })
    }
}

/// `scraper` view of a [`Document`]
pub struct Mirror {
    html: Html,
}

impl Mirror {
    pub fn new(doc: &Document) -> Self {
        let mut out = String::new();
        write_element(doc, doc.root(), &mut out);
        Self {
            html: Html::parse_document(&out),
        }
    }

    /// Ids of every element matching `selector`, in document order
    pub fn select(&self, selector: &CssSelector) -> BTreeSet<NodeId> {
        self.html
            .select(&selector.inner)
            .filter_map(|el| el.value().attr(ID_ATTR))
            .filter_map(|id| id.parse().ok())
            .collect()
    }
}

fn write_element(doc: &Document, id: NodeId, out: &mut String) {
    let node = doc.node(id);
    out.push('<');
    out.push_str(&node.tag);
    out.push_str(&format!(" {}=\"{}\"", ID_ATTR, id));
    for (name, value) in &node.attrs {
        out.push_str(&format!(" {}=\"{}\"", name, escape(value, true)));
    }
    out.push('>');
    if VOID_TAGS.contains(&node.tag.as_str()) {
        return;
    }
    if let Some(text) = &node.text {
        out.push_str(&escape(text, false));
    }
    for &child in &node.children {
        write_element(doc, child, out);
    }
    out.push_str("</");
    out.push_str(&node.tag);
    out.push('>');
}

fn escape(raw: &str, in_attr: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attr => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::dom::El;
    use test_case::test_case;

    fn calendar() -> Document {
        Document::from_tree(
            El::new("html").child(
                El::new("body").child(
                    El::new("nb-calendar-picker")
                        .child(
                            El::new("nb-calendar-day-cell")
                                .class("day-cell bounding-month")
                                .text("30"),
                        )
                        .child(El::new("nb-calendar-day-cell").class("day-cell").text("1"))
                        .child(
                            El::new("nb-calendar-pageable-navigation").child(
                                El::new("button")
                                    .child(El::new("nb-icon").attr("data-name", "chevron-right")),
                            ),
                        ),
                ),
            ),
        )
    }

    fn select(doc: &Document, css: &str) -> Vec<NodeId> {
        let sel = CssSelector::parse(css).unwrap();
        Mirror::new(doc).select(&sel).into_iter().collect()
    }

    #[test]
    fn not_excludes_bounding_cells() {
        let doc = calendar();
        assert_eq!(select(&doc, ".day-cell").len(), 2);
        let current = select(&doc, "nb-calendar-day-cell.day-cell:not(.bounding-month)");
        assert_eq!(current.len(), 1);
        assert_eq!(doc.text_content(current[0]), "1");
    }

    #[test]
    fn descendant_and_attribute() {
        let doc = calendar();
        let found = select(
            &doc,
            "nb-calendar-pageable-navigation [data-name=\"chevron-right\"]",
        );
        assert_eq!(found.len(), 1);
        assert_eq!(doc.tag(found[0]), "nb-icon");
        assert!(select(&doc, "nb-calendar-day-cell [data-name=chevron-right]").is_empty());
    }

    #[test]
    fn selector_list_unions_in_document_order() {
        let doc = calendar();
        let found = select(&doc, "nb-icon, button");
        assert_eq!(found.len(), 2);
        assert_eq!(doc.tag(found[0]), "button");
    }

    #[test]
    fn escaped_values_survive_the_mirror() {
        let doc = Document::from_tree(
            El::new("html").child(
                El::new("body")
                    .child(El::new("a").attr("title", "Say \"hi\" & <go>").text("Tables & Data"))
                    .child(El::new("input").attr("placeholder", "Email"))
                    .child(El::new("span").text("after")),
            ),
        );
        let quoted = select(&doc, r#"a[title="Say \"hi\" & <go>"]"#);
        assert_eq!(quoted.len(), 1);
        assert_eq!(doc.text_content(quoted[0]), "Tables & Data");
        // The void input must not swallow its next sibling
        assert!(select(&doc, "input span").is_empty());
        assert_eq!(select(&doc, "body > span").len(), 1);
    }

    #[test_case("li:nth-child(x)" ; "malformed nth argument")]
    #[test_case("a >" ; "dangling combinator")]
    #[test_case("[=x]" ; "attribute without name")]
    #[test_case("a,,b" ; "empty list entry")]
    #[test_case("" ; "empty")]
    fn rejects_invalid_syntax(css: &str) {
        let err = CssSelector::parse(css).unwrap_err();
        match err {
            DriverError::InvalidSelector { selector, .. } => assert_eq!(selector, css),
            other => panic!("unexpected error: {other}"),
        }
    }
}
