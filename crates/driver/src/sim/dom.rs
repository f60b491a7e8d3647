//! Minimal document tree for the simulated page

use std::collections::BTreeMap;

pub type NodeId = usize;

/// Owned element description used to build a [`Document`]
#[derive(Debug, Clone, Default)]
pub struct El {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: Option<String>,
    children: Vec<El>,
    hidden: bool,
    intercepted: bool,
    handle: Option<String>,
}

impl El {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    pub fn attr_if(self, cond: bool, name: &str, value: &str) -> Self {
        if cond {
            self.attr(name, value)
        } else {
            self
        }
    }

    pub fn class(mut self, class: &str) -> Self {
        let merged = match self.attrs.get("class") {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, class),
            _ => class.to_string(),
        };
        self.attrs.insert("class".to_string(), merged);
        self
    }

    pub fn class_if(self, cond: bool, class: &str) -> Self {
        if cond {
            self.class(class)
        } else {
            self
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: El) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = El>) -> Self {
        self.children.extend(children);
        self
    }

    /// Rendered but not visible (`display: none` on this subtree)
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Another element sits on top and swallows pointer events
    pub fn intercepted(mut self) -> Self {
        self.intercepted = true;
        self
    }

    /// Application event handler key, looked up on this node or its ancestors
    pub fn handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub text: Option<String>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub hidden: bool,
    pub intercepted: bool,
    pub handle: Option<String>,
}

/// Arena of nodes. Ids are assigned in document (pre-)order, so sorting ids
/// sorts nodes the way they appear in the page.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    pub fn from_tree(root: El) -> Self {
        let mut doc = Document { nodes: Vec::new() };
        doc.insert(root, None);
        doc
    }

    fn insert(&mut self, el: El, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            tag: el.tag,
            attrs: el.attrs,
            text: el.text,
            children: Vec::new(),
            parent,
            hidden: el.hidden,
            intercepted: el.intercepted,
            handle: el.handle,
        });
        for child in el.children {
            let child_id = self.insert(child, Some(id));
            self.nodes[id].children.push(child_id);
        }
        id
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn tag(&self, id: NodeId) -> &str {
        &self.nodes[id].tag
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes[id].attrs.get(name).map(String::as_str)
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .map(|c| c.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// All descendants in document order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[id].children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next].children.iter().rev().copied());
        }
        out
    }

    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id];
        if let Some(text) = &node.text {
            if !out.is_empty() && !out.ends_with(' ') {
                out.push(' ');
            }
            out.push_str(text);
        }
        for &child in &node.children {
            self.collect_text(child, out);
        }
    }

    pub fn is_visible(&self, id: NodeId) -> bool {
        !self.nodes[id].hidden && self.ancestors(id).all(|a| !self.nodes[a].hidden)
    }

    pub fn is_intercepted(&self, id: NodeId) -> bool {
        self.nodes[id].intercepted
    }

    /// Event handler for a click on `id`: its own, or the closest ancestor's
    pub fn handler(&self, id: NodeId) -> Option<&str> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find_map(|n| self.nodes[n].handle.as_deref())
    }

    /// Explicit `role` attribute, otherwise the implicit ARIA role
    pub fn role(&self, id: NodeId) -> Option<&str> {
        if let Some(role) = self.attr(id, "role") {
            return Some(role);
        }
        match self.tag(id) {
            "a" if self.attr(id, "href").is_some() => Some("link"),
            "button" => Some("button"),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Some("heading"),
            "textarea" => Some("textbox"),
            "input" => match self.attr(id, "type").unwrap_or("text") {
                "checkbox" => Some("checkbox"),
                "radio" => Some("radio"),
                "button" | "submit" => Some("button"),
                "text" | "email" | "password" | "search" | "tel" | "url" => Some("textbox"),
                _ => None,
            },
            _ => None,
        }
    }

    /// Accessible name: `aria-label`, then placeholder for inputs, then text,
    /// then `title`
    pub fn accessible_name(&self, id: NodeId) -> String {
        if let Some(label) = self.attr(id, "aria-label") {
            return label.to_string();
        }
        if matches!(self.tag(id), "input" | "textarea") {
            return self.attr(id, "placeholder").unwrap_or_default().to_string();
        }
        let text = self.text_content(id);
        if !text.trim().is_empty() {
            return text;
        }
        self.attr(id, "title").unwrap_or_default().to_string()
    }
}
