//! Registry of named, validated flows

use super::{flows, ConversationGraph, GraphError};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Named conversation graphs, loaded once at startup and shared read-only
#[derive(Debug, Clone, Default)]
pub struct FlowLibrary {
    flows: BTreeMap<String, Arc<ConversationGraph>>,
}

impl FlowLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library holding the built-in flows
    pub fn builtin() -> Result<Self, GraphError> {
        let mut library = Self::new();
        for graph in [flows::acolhimento()?, flows::crise()?] {
            graph.validate()?;
            library.insert(graph);
        }
        Ok(library)
    }

    /// Add a flow, returning the one it replaced
    pub fn insert(&mut self, graph: ConversationGraph) -> Option<Arc<ConversationGraph>> {
        self.flows.insert(graph.name().to_string(), Arc::new(graph))
    }

    /// Load every `*.json` file in `dir`. Any invalid file fails the whole load.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, GraphError> {
        let io_error = |source| GraphError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let graph = ConversationGraph::from_path(&path)?;
            let name = graph.name().to_string();
            if self.insert(graph).is_some() {
                tracing::info!(flow = %name, path = %path.display(), "Flow file overrides existing flow");
            }
            loaded += 1;
        }
        Ok(loaded)
    }

    pub fn get(&self, name: &str) -> Option<Arc<ConversationGraph>> {
        self.flows.get(name).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ConversationGraph>> {
        self.flows.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.flows.keys().map(String::as_str).collect()
    }
}
