//! JSON flow documents

use super::{ConversationGraph, ConversationNode, GraphError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk form of a conversation graph
///
/// ```json
/// {
///   "name": "acolhimento",
///   "start": "initial",
///   "nodes": [
///     { "id": "initial", "prompt": "Olá!", "choices": ["Oi"], "transitions": { "1": "fim" } },
///     { "id": "fim", "prompt": "Até logo", "side_effect": "dial" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowDocument {
    pub name: String,
    pub start: String,
    pub nodes: Vec<ConversationNode>,
}

impl FlowDocument {
    /// Build and fully validate the graph described by this document
    pub fn into_graph(self) -> Result<ConversationGraph, GraphError> {
        let graph = ConversationGraph::new(self.name, self.start, self.nodes)?;
        graph.validate()?;
        Ok(graph)
    }
}

impl ConversationGraph {
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        let document: FlowDocument = serde_json::from_str(json)?;
        document.into_graph()
    }

    pub fn from_path(path: &Path) -> Result<Self, GraphError> {
        let json = std::fs::read_to_string(path).map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let graph = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), flow = %graph.name(), nodes = graph.len(), "Loaded flow file");
        Ok(graph)
    }

    /// Export back to the document form, nodes sorted by id
    pub fn to_document(&self) -> FlowDocument {
        let mut nodes: Vec<ConversationNode> = self.nodes().cloned().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        FlowDocument {
            name: self.name().to_string(),
            start: self.start_id().to_string(),
            nodes,
        }
    }
}
