//! Conversation graphs
//!
//! Static, validated node data driving the guided chat. The stepping logic
//! lives in `state_machine`; this module only owns the shape of the data.

pub mod flows;
mod library;
mod loader;
mod node;
mod validate;

pub use library::FlowLibrary;
pub use loader::FlowDocument;
pub use node::{ConversationNode, SideEffect};
#[allow(unused_imports)] // Public API re-exports
pub use validate::{GraphDefect, GraphError};

use std::collections::HashMap;
use std::ops::Index;

/// A named set of conversation nodes with a designated start node
#[derive(Debug, Clone)]
pub struct ConversationGraph {
    name: String,
    start: String,
    nodes: HashMap<String, ConversationNode>,
}

impl ConversationGraph {
    /// Build a graph, failing fast on structural problems.
    ///
    /// Only the checks needed to start a session are done here (non-empty,
    /// unique ids, start node present). Use [`ConversationGraph::validate`]
    /// for the full authoring check.
    pub fn new(
        name: impl Into<String>,
        start: impl Into<String>,
        nodes: impl IntoIterator<Item = ConversationNode>,
    ) -> Result<Self, GraphError> {
        let start = start.into();
        let mut by_id = HashMap::new();

        for node in nodes {
            if by_id.contains_key(&node.id) {
                return Err(GraphError::DuplicateNode(node.id));
            }
            by_id.insert(node.id.clone(), node);
        }

        if by_id.is_empty() {
            return Err(GraphError::Empty);
        }
        if !by_id.contains_key(&start) {
            return Err(GraphError::MissingStart(start));
        }

        Ok(Self {
            name: name.into(),
            start,
            nodes: by_id,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start_id(&self) -> &str {
        &self.start
    }

    pub fn start_node(&self) -> &ConversationNode {
        // Presence of the start node is checked in new()
        &self.nodes[&self.start]
    }

    pub fn node(&self, id: &str) -> Option<&ConversationNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ConversationNode> {
        self.nodes.values()
    }
}

impl Index<&str> for ConversationGraph {
    type Output = ConversationNode;

    /// Panics if `id` is not a node of this graph
    fn index(&self, id: &str) -> &ConversationNode {
        &self.nodes[id]
    }
}
