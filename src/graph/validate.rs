//! Load-time schema checks for conversation graphs

use super::ConversationGraph;
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use thiserror::Error;

/// A single authoring defect found by [`ConversationGraph::validate`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphDefect {
    #[error("node {node}: choice {index} has no transition")]
    MissingTransition { node: String, index: usize },
    #[error("node {node}: transition {index} has no matching choice")]
    OrphanTransition { node: String, index: usize },
    #[error("node {node}: choice {index} points to unknown node {target}")]
    DanglingTarget {
        node: String,
        index: usize,
        target: String,
    },
}

/// Errors building or loading a conversation graph
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("conversation graph has no nodes")]
    Empty,
    #[error("duplicate node id: {0}")]
    DuplicateNode(String),
    #[error("start node {0} does not exist")]
    MissingStart(String),
    #[error("invalid conversation graph {name}: {}", join_defects(.defects))]
    Invalid {
        name: String,
        defects: Vec<GraphDefect>,
    },
    #[error("failed to read flow file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse flow document: {0}")]
    Parse(#[from] serde_json::Error),
}

fn join_defects(defects: &[GraphDefect]) -> String {
    defects
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ConversationGraph {
    /// Check every node's choices and transitions, reporting all defects at once
    pub fn validate(&self) -> Result<(), GraphError> {
        let defects = self.defects();

        for id in self.unreachable_nodes() {
            tracing::warn!(flow = %self.name(), node = %id, "Node is unreachable from start");
        }

        if defects.is_empty() {
            Ok(())
        } else {
            Err(GraphError::Invalid {
                name: self.name().to_string(),
                defects,
            })
        }
    }

    /// Collect authoring defects, sorted by node id for stable output
    pub fn defects(&self) -> Vec<GraphDefect> {
        let mut nodes: Vec<_> = self.nodes().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let mut defects = Vec::new();
        for node in nodes {
            for index in 1..=node.choices.len() {
                match node.transitions.get(&index) {
                    None => defects.push(GraphDefect::MissingTransition {
                        node: node.id.clone(),
                        index,
                    }),
                    Some(target) if !self.contains(target) => {
                        defects.push(GraphDefect::DanglingTarget {
                            node: node.id.clone(),
                            index,
                            target: target.clone(),
                        });
                    }
                    Some(_) => {}
                }
            }

            for &index in node.transitions.keys() {
                if index == 0 || index > node.choices.len() {
                    defects.push(GraphDefect::OrphanTransition {
                        node: node.id.clone(),
                        index,
                    });
                }
            }
        }
        defects
    }

    /// Ids of nodes no path from the start node reaches
    pub fn unreachable_nodes(&self) -> Vec<&str> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue = VecDeque::from([self.start_id()]);

        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(node) = self.node(id) {
                queue.extend(node.transitions.values().map(String::as_str));
            }
        }

        let mut unreachable: Vec<&str> = self
            .nodes()
            .map(|n| n.id.as_str())
            .filter(|id| !seen.contains(id))
            .collect();
        unreachable.sort_unstable();
        unreachable
    }
}
