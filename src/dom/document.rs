//! In-process element tree standing in for the host page.
//!
//! Nodes live in an arena and are addressed by `NodeId`. Slots are never
//! reused, so an id held by a finished background task can be checked for
//! liveness with [`Document::is_connected`] and never aliases a newer node.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::dom::selector::Selector;
use crate::types::errors::PageError;

pub type NodeId = usize;

/// A document shared between the scanner, its badge tasks, and the host.
pub type SharedDocument = Arc<Mutex<Document>>;

#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Document,
    Doctype(String),
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    /// Lowercase tag name.
    pub tag: String,
    /// Attributes in source order; names are lowercase.
    pub attrs: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed DOM with childList mutation notifications.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Option<Node>>,
    mutations: watch::Sender<u64>,
}

impl Document {
    pub const ROOT: NodeId = 0;

    pub fn new() -> Self {
        let (mutations, _) = watch::channel(0);
        Self {
            nodes: vec![Some(Node {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            })],
            mutations,
        }
    }

    pub fn into_shared(self) -> SharedDocument {
        Arc::new(Mutex::new(self))
    }

    /// Subscribes to structural changes: child insertions, removals, and text replacement.
    ///
    /// The received value is a running mutation counter; only its changes matter.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.mutations.subscribe()
    }

    /// Number of structural mutations since the document was created.
    pub fn mutation_count(&self) -> u64 {
        *self.mutations.borrow()
    }

    fn notify(&self) {
        self.mutations.send_modify(|count| *count += 1);
    }

    fn node(&self, id: NodeId) -> Result<&Node, PageError> {
        self.nodes
            .get(id)
            .and_then(|slot| slot.as_ref())
            .ok_or(PageError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, PageError> {
        self.nodes
            .get_mut(id)
            .and_then(|slot| slot.as_mut())
            .ok_or(PageError::NodeNotFound(id))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Some(Node {
            data,
            parent: None,
            children: Vec::new(),
        }));
        self.nodes.len() - 1
    }

    // ─── Construction ───

    /// Creates a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Comment(text.to_string()))
    }

    pub fn create_doctype(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Doctype(text.to_string()))
    }

    /// Appends `child` as the last child of `parent`, detaching it from any previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), PageError> {
        self.node(parent)?;
        self.node(child)?;
        if child == parent || self.is_ancestor(child, parent) {
            return Err(PageError::HierarchyError(child));
        }
        self.detach(child)?;
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        self.notify();
        Ok(())
    }

    /// Removes a node and its whole subtree. Their ids become permanently invalid.
    pub fn remove(&mut self, id: NodeId) -> Result<(), PageError> {
        if id == Self::ROOT {
            return Err(PageError::HierarchyError(id));
        }
        self.detach(id)?;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current).and_then(|slot| slot.take()) {
                stack.extend(node.children);
            }
        }
        self.notify();
        Ok(())
    }

    fn detach(&mut self, id: NodeId) -> Result<(), PageError> {
        if let Some(parent) = self.node(id)?.parent {
            self.node_mut(parent)?.children.retain(|c| *c != id);
            self.node_mut(id)?.parent = None;
        }
        Ok(())
    }

    fn is_ancestor(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        while let Some(parent) = self.parent(id) {
            if parent == ancestor {
                return true;
            }
            id = parent;
        }
        false
    }

    // ─── Inspection ───

    /// True when the node exists and is reachable from the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        if self.node(id).is_err() {
            return false;
        }
        id == Self::ROOT || self.is_ancestor(Self::ROOT, id)
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.node(id).ok().map(|n| &n.data)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.data(id)? {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).ok().and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .map(|classes| classes.split_ascii_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in std::iter::once(id).chain(self.descendants(id)) {
            if let Some(NodeData::Text(text)) = self.data(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// Descendants of `id` in document order, `id` itself excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        out
    }

    // ─── Element mutation ───

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), PageError> {
        let name = name.to_ascii_lowercase();
        match &mut self.node_mut(id)?.data {
            NodeData::Element(el) => {
                match el.attrs.iter_mut().find(|(k, _)| *k == name) {
                    Some(slot) => slot.1 = value.to_string(),
                    None => el.attrs.push((name, value.to_string())),
                }
                Ok(())
            }
            _ => Err(PageError::NodeNotFound(id)),
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Result<(), PageError> {
        match &mut self.node_mut(id)?.data {
            NodeData::Element(el) => {
                el.attrs.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
                Ok(())
            }
            _ => Err(PageError::NodeNotFound(id)),
        }
    }

    /// Replaces all children of `id` with a single text node, like `textContent = text`.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<(), PageError> {
        let old: Vec<NodeId> = self.node(id)?.children.clone();
        for child in old {
            self.remove(child)?;
        }
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(id, text_node)?;
        }
        Ok(())
    }

    // ─── Queries ───

    /// First element under `scope` (exclusive) matching `selector`.
    pub fn query_selector(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|id| selector.matches(self, *id))
    }

    /// All elements under `scope` (exclusive) matching `selector`, in document order.
    pub fn query_selector_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| selector.matches(self, *id))
            .collect()
    }

    /// Parses `selector` and returns every match under `scope`.
    pub fn select(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, PageError> {
        Ok(self.query_selector_all(scope, &Selector::parse(selector)?))
    }

    /// First element with the given tag anywhere in the document.
    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.descendants(Self::ROOT)
            .into_iter()
            .find(|id| self.tag(*id) == Some(tag))
    }

    pub fn head(&self) -> Option<NodeId> {
        self.find_by_tag("head")
    }

    pub fn body(&self) -> Option<NodeId> {
        self.find_by_tag("body")
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
