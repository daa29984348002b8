//! Document capability boundary
//!
//! The adapter never talks to a concrete document model. Everything it needs
//! from the host page goes through [`Document`], so the lifecycle logic can
//! run against the in-memory document in [`crate::simulation`] exactly as it
//! would against a real one.

use serde::{Deserialize, Serialize};

/// Handle to a node owned by a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Document capability used by the adapter and the script loader.
///
/// Detached nodes stay alive inside the document; `detach` only severs the
/// parent link so the node can be reinserted later.
pub trait Document: Send + Sync {
    /// Create a detached element with the given tag name
    fn create_element(&self, tag: &str) -> NodeId;

    /// Mount point for script tags
    fn head(&self) -> NodeId;

    /// Tag name of a node, if it exists
    fn tag_name(&self, node: NodeId) -> Option<String>;

    fn set_attribute(&self, node: NodeId, name: &str, value: &str);

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Insert `node` under `parent`, before `reference` (append when `None`)
    fn insert_before(&self, parent: NodeId, node: NodeId, reference: Option<NodeId>);

    /// Sever the parent link; the node remains alive for reinsertion
    fn detach(&self, node: NodeId);

    fn add_class(&self, node: NodeId, class: &str);

    fn remove_class(&self, node: NodeId, class: &str);

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Dispatch a DOM event on `node`
    fn dispatch_event(&self, node: NodeId, name: &str, cancelable: bool);
}
