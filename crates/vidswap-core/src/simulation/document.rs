//! In-memory document model

use crate::dom::{Document, NodeId};
use crate::source::MEDIA_TYPE_YOUTUBE;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// An event dispatched on a node, kept for inspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub target: NodeId,
    pub name: String,
    pub cancelable: bool,
}

#[derive(Debug, Default)]
struct NodeData {
    tag: String,
    attrs: BTreeMap<String, String>,
    classes: BTreeSet<String>,
    parent: Option<u64>,
    children: Vec<u64>,
}

#[derive(Debug)]
struct DocState {
    nodes: HashMap<u64, NodeData>,
    next_id: u64,
    root: u64,
    head: u64,
    body: u64,
    events: Vec<RecordedEvent>,
}

/// In-memory [`Document`] implementation.
///
/// Nodes live until the document is dropped; detaching only severs the
/// parent link, matching the capability contract.
#[derive(Debug)]
pub struct SimDocument {
    state: Mutex<DocState>,
}

impl SimDocument {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            0,
            NodeData {
                tag: "html".to_string(),
                children: vec![1, 2],
                ..NodeData::default()
            },
        );
        nodes.insert(
            1,
            NodeData {
                tag: "head".to_string(),
                parent: Some(0),
                ..NodeData::default()
            },
        );
        nodes.insert(
            2,
            NodeData {
                tag: "body".to_string(),
                parent: Some(0),
                ..NodeData::default()
            },
        );
        Self {
            state: Mutex::new(DocState {
                nodes,
                next_id: 3,
                root: 0,
                head: 1,
                body: 2,
                events: Vec::new(),
            }),
        }
    }

    pub fn body(&self) -> NodeId {
        NodeId(self.state.lock().body)
    }

    /// Build a `<video width height><source type="video/youtube" src></video>`
    /// fixture appended to the body
    pub fn video_element(&self, width: u32, height: u32, url: &str) -> NodeId {
        let el = self.create_element("video");
        self.set_attribute(el, "width", &width.to_string());
        self.set_attribute(el, "height", &height.to_string());
        let source = self.create_element("source");
        self.set_attribute(source, "type", MEDIA_TYPE_YOUTUBE);
        self.set_attribute(source, "src", url);
        self.insert_before(el, source, None);
        self.insert_before(self.body(), el, None);
        el
    }

    /// Whether the node is reachable from the document root
    pub fn is_attached(&self, node: NodeId) -> bool {
        let state = self.state.lock();
        let mut current = node.0;
        loop {
            if current == state.root {
                return true;
            }
            match state.nodes.get(&current).and_then(|n| n.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Count attached script tags with the given source URL
    pub fn script_count(&self, src: &str) -> usize {
        let ids: Vec<u64> = {
            let state = self.state.lock();
            state
                .nodes
                .iter()
                .filter(|(_, n)| n.tag == "script" && n.attrs.get("src").map(String::as_str) == Some(src))
                .map(|(id, _)| *id)
                .collect()
        };
        ids.into_iter()
            .filter(|id| self.is_attached(NodeId(*id)))
            .count()
    }

    /// Events dispatched on `node`, in order
    pub fn events_for(&self, node: NodeId) -> Vec<RecordedEvent> {
        self.state
            .lock()
            .events
            .iter()
            .filter(|e| e.target == node)
            .cloned()
            .collect()
    }
}

impl Default for SimDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for SimDocument {
    fn create_element(&self, tag: &str) -> NodeId {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.nodes.insert(
            id,
            NodeData {
                tag: tag.to_string(),
                ..NodeData::default()
            },
        );
        NodeId(id)
    }

    fn head(&self) -> NodeId {
        NodeId(self.state.lock().head)
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.state.lock().nodes.get(&node.0).map(|n| n.tag.clone())
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        if let Some(data) = self.state.lock().nodes.get_mut(&node.0) {
            data.attrs.insert(name.to_string(), value.to_string());
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.state
            .lock()
            .nodes
            .get(&node.0)
            .and_then(|n| n.attrs.get(name).cloned())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.state
            .lock()
            .nodes
            .get(&node.0)
            .and_then(|n| n.parent)
            .map(NodeId)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let state = self.state.lock();
        let parent = state.nodes.get(&node.0)?.parent?;
        let siblings = &state.nodes.get(&parent)?.children;
        let index = siblings.iter().position(|&c| c == node.0)?;
        siblings.get(index + 1).copied().map(NodeId)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.state
            .lock()
            .nodes
            .get(&node.0)
            .map(|n| n.children.iter().copied().map(NodeId).collect())
            .unwrap_or_default()
    }

    fn insert_before(&self, parent: NodeId, node: NodeId, reference: Option<NodeId>) {
        let mut state = self.state.lock();
        if !state.nodes.contains_key(&parent.0) || !state.nodes.contains_key(&node.0) {
            return;
        }
        // sever any existing parent link first
        if let Some(old_parent) = state.nodes.get(&node.0).and_then(|n| n.parent) {
            if let Some(old) = state.nodes.get_mut(&old_parent) {
                old.children.retain(|&c| c != node.0);
            }
        }
        let mut siblings = state
            .nodes
            .get_mut(&parent.0)
            .map(|n| std::mem::take(&mut n.children))
            .unwrap_or_default();
        let index = reference
            .and_then(|r| siblings.iter().position(|&c| c == r.0))
            .unwrap_or(siblings.len());
        siblings.insert(index, node.0);
        if let Some(p) = state.nodes.get_mut(&parent.0) {
            p.children = siblings;
        }
        if let Some(n) = state.nodes.get_mut(&node.0) {
            n.parent = Some(parent.0);
        }
    }

    fn detach(&self, node: NodeId) {
        let mut state = self.state.lock();
        let Some(parent) = state.nodes.get(&node.0).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = state.nodes.get_mut(&parent) {
            p.children.retain(|&c| c != node.0);
        }
        if let Some(n) = state.nodes.get_mut(&node.0) {
            n.parent = None;
        }
    }

    fn add_class(&self, node: NodeId, class: &str) {
        if let Some(data) = self.state.lock().nodes.get_mut(&node.0) {
            data.classes.insert(class.to_string());
        }
    }

    fn remove_class(&self, node: NodeId, class: &str) {
        if let Some(data) = self.state.lock().nodes.get_mut(&node.0) {
            data.classes.remove(class);
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.state
            .lock()
            .nodes
            .get(&node.0)
            .is_some_and(|n| n.classes.contains(class))
    }

    fn dispatch_event(&self, node: NodeId, name: &str, cancelable: bool) {
        self.state.lock().events.push(RecordedEvent {
            target: node,
            name: name.to_string(),
            cancelable,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_before_and_siblings() {
        let doc = SimDocument::new();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        let c = doc.create_element("div");
        doc.insert_before(doc.body(), a, None);
        doc.insert_before(doc.body(), c, None);
        doc.insert_before(doc.body(), b, Some(c));

        assert_eq!(doc.children(doc.body()), vec![a, b, c]);
        assert_eq!(doc.next_sibling(a), Some(b));
        assert_eq!(doc.next_sibling(c), None);
    }

    #[test]
    fn test_detach_keeps_node_alive() {
        let doc = SimDocument::new();
        let a = doc.create_element("div");
        doc.set_attribute(a, "id", "kept");
        doc.insert_before(doc.body(), a, None);

        doc.detach(a);
        assert_eq!(doc.parent(a), None);
        assert!(!doc.is_attached(a));
        assert_eq!(doc.attribute(a, "id").as_deref(), Some("kept"));

        doc.insert_before(doc.body(), a, None);
        assert!(doc.is_attached(a));
    }

    #[test]
    fn test_classes() {
        let doc = SimDocument::new();
        let a = doc.create_element("div");
        doc.add_class(a, "v-loading");
        assert!(doc.has_class(a, "v-loading"));
        doc.add_class(a, "v-loading");
        doc.remove_class(a, "v-loading");
        assert!(!doc.has_class(a, "v-loading"));
    }
}
