//! Runtime state of one guided conversation

use super::transition::{transition, TransitionError, TransitionResult};
use super::Effect;
use crate::graph::{ConversationGraph, ConversationNode, SideEffect};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Who emitted a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Assistant,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
}

impl TranscriptEntry {
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }
}

/// What changed after a choice was accepted
#[allow(dead_code)] // API completeness
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUpdate {
    pub node_id: String,
    pub prompt: String,
    pub choices: Vec<String>,
    pub side_effect: Option<SideEffect>,
    pub terminal: bool,
    pub effects: Vec<Effect>,
}

/// One user's traversal of a conversation graph
///
/// The transcript is append-only and `current` always names a node of
/// `graph`: it starts at the start node and only moves along transitions
/// whose target was looked up successfully.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    graph: Arc<ConversationGraph>,
    current: String,
    transcript: Vec<TranscriptEntry>,
}

impl ConversationSession {
    /// New session positioned at the graph's start node
    pub fn start(graph: Arc<ConversationGraph>) -> Self {
        let start = graph.start_node();
        let current = start.id.clone();
        let transcript = vec![TranscriptEntry::assistant(&start.prompt)];
        Self {
            graph,
            current,
            transcript,
        }
    }

    /// Advance by a 1-based choice index.
    ///
    /// On error the session is left untouched.
    pub fn select_choice(&mut self, choice: usize) -> Result<SessionUpdate, TransitionError> {
        let TransitionResult {
            next_node,
            entries,
            effects,
        } = transition(self, choice)?;

        // transition() checked the target exists
        self.transcript.extend(entries);
        self.current = next_node;

        let node = self.current_node();
        Ok(SessionUpdate {
            node_id: node.id.clone(),
            prompt: node.prompt.clone(),
            choices: node.choices.clone(),
            side_effect: effects.iter().find_map(Effect::side_effect).cloned(),
            terminal: node.is_terminal(),
            effects,
        })
    }

    pub fn is_terminal(&self) -> bool {
        self.current_node().is_terminal()
    }

    pub fn current_node_id(&self) -> &str {
        &self.current
    }

    pub fn current_node(&self) -> &ConversationNode {
        &self.graph[self.current.as_str()]
    }

    pub fn choices(&self) -> &[String] {
        &self.current_node().choices
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn graph(&self) -> &Arc<ConversationGraph> {
        &self.graph
    }
}
