//! Pure transition function
//!
//! Given a session and a 1-based choice, compute the next node, the
//! transcript entries to append and the effects for the host. Nothing here
//! mutates the session or performs I/O.

use super::{ConversationSession, Effect, TranscriptEntry};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub next_node: String,
    pub entries: Vec<TranscriptEntry>,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(next_node: impl Into<String>) -> Self {
        Self {
            next_node: next_node.into(),
            entries: vec![],
            effects: vec![],
        }
    }

    pub fn with_entry(mut self, entry: TranscriptEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("choice {index} is not available at node {node} ({available} choices)")]
    InvalidChoice {
        node: String,
        index: usize,
        available: usize,
    },
    #[error("node {node} has no valid transition for choice {index}{}", describe_target(.target))]
    BrokenGraph {
        node: String,
        index: usize,
        /// `None` when the transition entry itself is missing
        target: Option<String>,
    },
}

fn describe_target(target: &Option<String>) -> String {
    match target {
        Some(id) => format!(" (unknown node {id})"),
        None => String::new(),
    }
}

/// Pure transition function
pub fn transition(
    session: &ConversationSession,
    choice: usize,
) -> Result<TransitionResult, TransitionError> {
    let node = session.current_node();

    let label = node
        .choice_label(choice)
        .ok_or_else(|| TransitionError::InvalidChoice {
            node: node.id.clone(),
            index: choice,
            available: node.choices.len(),
        })?;

    let target_id = node
        .transitions
        .get(&choice)
        .ok_or_else(|| TransitionError::BrokenGraph {
            node: node.id.clone(),
            index: choice,
            target: None,
        })?;

    let target = session
        .graph()
        .node(target_id)
        .ok_or_else(|| TransitionError::BrokenGraph {
            node: node.id.clone(),
            index: choice,
            target: Some(target_id.clone()),
        })?;

    let mut result = TransitionResult::new(&target.id)
        .with_entry(TranscriptEntry::user(label))
        .with_entry(TranscriptEntry::assistant(&target.prompt));

    if let Some(effect) = &target.side_effect {
        result = result.with_effect(Effect::Perform(effect.clone()));
    }
    if target.is_terminal() {
        result = result.with_effect(Effect::ConversationEnded);
    }

    Ok(result)
}
