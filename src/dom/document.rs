use crate::dom::selector::{Combinator, CompoundSelector, Selector};
use scraper::Html;
use std::collections::HashMap;

/// Elements serialized without a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text children are written without escaping
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noscript", "plaintext", "script", "style", "xmp",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeData {
    Document,
    Doctype(DoctypeData),
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct DoctypeData {
    name: String,
    public_id: String,
    system_id: String,
}

#[derive(Debug, Clone)]
struct ElementData {
    name: String,
    attrs: Vec<(String, String)>,
}

impl ElementData {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(key, _)| key != name);
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// Mutable document tree built from server-rendered HTML
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Document {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
        }
    }
}

impl Document {
    /// Parse a full HTML document. Parsing is lenient, like a browser's.
    pub fn parse(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let mut doc = Document::default();

        let source_root = parsed.tree.root();
        let mut mapped = HashMap::new();
        mapped.insert(source_root.id(), doc.root());

        // Pre-order walk, so a node's parent is always mapped before the node
        for source in source_root.descendants().skip(1) {
            let Some(parent) = source
                .parent()
                .and_then(|p| mapped.get(&p.id()).copied())
            else {
                continue;
            };

            let data = match source.value() {
                scraper::Node::Doctype(doctype) => NodeData::Doctype(DoctypeData {
                    name: doctype.name().to_string(),
                    public_id: doctype.public_id().to_string(),
                    system_id: doctype.system_id().to_string(),
                }),
                // Qualified names, so foreign attributes like `xlink:href` keep their prefix
                scraper::Node::Element(element) => NodeData::Element(ElementData {
                    name: element.name().to_string(),
                    attrs: element
                        .attrs
                        .iter()
                        .map(|(name, value)| {
                            let key = match &name.prefix {
                                Some(prefix) => format!("{}:{}", prefix, name.local),
                                None => name.local.to_string(),
                            };
                            (key, value.to_string())
                        })
                        .collect(),
                }),
                scraper::Node::Text(text) => NodeData::Text((**text).to_string()),
                scraper::Node::Comment(comment) => NodeData::Comment((**comment).to_string()),
                _ => continue,
            };

            let id = doc.append(parent, data);
            mapped.insert(source.id(), id);
        }

        doc
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn append(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            data,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.node(id)?.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(id.0)?.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.name.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Whether the node is still attached to the document
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root() {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Inclusive containment, like DOM `Node.contains`
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    // Connected nodes in document order
    fn descendants(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.node(id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    pub fn query_selector_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|&id| self.matches(id, selector))
            .collect()
    }

    pub fn query_selector(&self, selector: &Selector) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&id| self.matches(id, selector))
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&node| self.attr(node, "id") == Some(id))
    }

    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        self.is_element(id)
            && selector
                .groups()
                .iter()
                .any(|group| self.matches_parts(id, &group.parts))
    }

    // Right-to-left match with backtracking over ancestors
    fn matches_parts(&self, id: NodeId, parts: &[(Combinator, CompoundSelector)]) -> bool {
        let Some(((combinator, compound), rest)) = parts.split_last() else {
            return true;
        };

        if !self.matches_compound(id, compound) {
            return false;
        }
        if rest.is_empty() {
            return true;
        }

        match combinator {
            Combinator::Child => self
                .parent(id)
                .filter(|&p| self.is_element(p))
                .is_some_and(|p| self.matches_parts(p, rest)),
            Combinator::Descendant => {
                let mut current = self.parent(id);
                while let Some(ancestor) = current {
                    if self.is_element(ancestor) && self.matches_parts(ancestor, rest) {
                        return true;
                    }
                    current = self.parent(ancestor);
                }
                false
            }
        }
    }

    fn matches_compound(&self, id: NodeId, compound: &CompoundSelector) -> bool {
        match self.element(id) {
            Some(element) => {
                compound.matches(&element.name, |name| element.attr(name).map(str::to_string))
            }
            None => false,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element_mut(id) {
            element.set_attr(name, value);
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(element) = self.element_mut(id) {
            element.remove_attr(name);
        }
    }

    /// Inline style value for a CSS property, empty when unset
    pub fn style(&self, id: NodeId, property: &str) -> String {
        parse_style(self.attr(id, "style").unwrap_or_default())
            .into_iter()
            .find(|(prop, _)| prop.eq_ignore_ascii_case(property))
            .map(|(_, value)| value)
            .unwrap_or_default()
    }

    /// Set an inline style property. An empty value removes the declaration.
    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        let Some(element) = self.element_mut(id) else {
            return;
        };

        let property = property.to_ascii_lowercase();
        let mut decls = parse_style(element.attr("style").unwrap_or_default());
        match decls.iter().position(|(prop, _)| *prop == property) {
            Some(pos) if value.is_empty() => {
                decls.remove(pos);
            }
            Some(pos) => decls[pos].1 = value.to_string(),
            None if !value.is_empty() => decls.push((property, value.to_string())),
            None => {}
        }

        if decls.is_empty() {
            element.remove_attr("style");
        } else {
            element.set_attr("style", &serialize_style(&decls));
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Returns true if the class was added
    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        if !self.is_element(id) || self.has_class(id, class) {
            return false;
        }
        let mut classes: Vec<String> = self
            .attr(id, "class")
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        classes.push(class.to_string());
        self.set_attr(id, "class", &classes.join(" "));
        true
    }

    /// Returns true if the class was present and removed
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        if !self.has_class(id, class) {
            return false;
        }
        let remaining: Vec<&str> = self
            .attr(id, "class")
            .unwrap_or_default()
            .split_whitespace()
            .filter(|c| *c != class)
            .collect();
        let remaining = remaining.join(" ");
        self.set_attr(id, "class", &remaining);
        true
    }

    /// Flip a class, returning whether it is now present
    pub fn toggle_class(&mut self, id: NodeId, class: &str) -> bool {
        if self.has_class(id, class) {
            self.remove_class(id, class);
            false
        } else {
            self.add_class(id, class)
        }
    }

    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|node| match &self.node(node)?.data {
                NodeData::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace all children with a single text node. An existing text child
    /// is rewritten in place, so repeated updates do not grow the arena.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        if !self.is_element(id) {
            return;
        }
        let children = std::mem::take(&mut self.nodes[id.0].children);
        let reused = if text.is_empty() {
            None
        } else {
            children
                .iter()
                .copied()
                .find(|&child| matches!(self.nodes[child.0].data, NodeData::Text(_)))
        };

        for &child in &children {
            if Some(child) != reused {
                self.nodes[child.0].parent = None;
            }
        }

        match reused {
            Some(child) => {
                self.nodes[child.0].data = NodeData::Text(text.to_string());
                self.nodes[id.0].children.push(child);
            }
            None if !text.is_empty() => {
                self.append(id, NodeData::Text(text.to_string()));
            }
            None => {}
        }
    }

    /// Detach a node from its parent. Detached nodes drop out of every query.
    pub fn remove(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        self.nodes[parent.0].children.retain(|&child| child != id);
        self.nodes[id.0].parent = None;
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_node(self.root(), &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };

        match &node.data {
            NodeData::Document => {
                for &child in &node.children {
                    self.write_node(child, out);
                }
            }
            NodeData::Doctype(doctype) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(&doctype.name);
                if !doctype.public_id.is_empty() {
                    out.push_str(" PUBLIC \"");
                    out.push_str(&doctype.public_id);
                    out.push('"');
                    if !doctype.system_id.is_empty() {
                        out.push_str(" \"");
                        out.push_str(&doctype.system_id);
                        out.push('"');
                    }
                } else if !doctype.system_id.is_empty() {
                    out.push_str(" SYSTEM \"");
                    out.push_str(&doctype.system_id);
                    out.push('"');
                }
                out.push('>');
            }
            NodeData::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
            NodeData::Text(text) => {
                let raw = node
                    .parent
                    .and_then(|p| self.tag_name(p))
                    .is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag));
                if raw {
                    out.push_str(text);
                } else {
                    out.push_str(&escape_text(text));
                }
            }
            NodeData::Element(element) => {
                out.push('<');
                out.push_str(&element.name);
                for (key, value) in &element.attrs {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                out.push('>');

                if VOID_ELEMENTS.contains(&element.name.as_str()) {
                    return;
                }

                for &child in &node.children {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(&element.name);
                out.push('>');
            }
        }
    }
}

fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim().to_ascii_lowercase();
            let value = value.trim();
            (!prop.is_empty() && !value.is_empty()).then(|| (prop, value.to_string()))
        })
        .collect()
}

fn serialize_style(decls: &[(String, String)]) -> String {
    decls
        .iter()
        .map(|(prop, value)| format!("{}: {};", prop, value))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
