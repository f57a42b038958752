//! Conversation node types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Tag instructing the host to perform a platform action when a node activates
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SideEffect {
    /// Place a call to the configured crisis line
    Dial,
    /// Any tag the engine does not know; the host decides what to do with it
    Other(String),
}

impl SideEffect {
    pub fn tag(&self) -> &str {
        match self {
            SideEffect::Dial => "dial",
            SideEffect::Other(tag) => tag,
        }
    }
}

impl From<String> for SideEffect {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "dial" => SideEffect::Dial,
            _ => SideEffect::Other(tag),
        }
    }
}

impl From<SideEffect> for String {
    fn from(effect: SideEffect) -> Self {
        match effect {
            SideEffect::Dial => "dial".to_string(),
            SideEffect::Other(tag) => tag,
        }
    }
}

impl fmt::Display for SideEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A single point in a scripted dialogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationNode {
    pub id: String,
    /// Text the assistant shows when this node becomes active
    pub prompt: String,
    /// Option labels, addressed by 1-based index
    #[serde(default)]
    pub choices: Vec<String>,
    /// 1-based choice index -> id of the next node
    #[serde(default)]
    pub transitions: BTreeMap<usize, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side_effect: Option<SideEffect>,
}

impl ConversationNode {
    pub fn new(id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            choices: Vec::new(),
            transitions: BTreeMap::new(),
            side_effect: None,
        }
    }

    /// Append a choice leading to `target`; its index is the next free 1-based slot
    pub fn choice(mut self, label: impl Into<String>, target: impl Into<String>) -> Self {
        self.choices.push(label.into());
        self.transitions.insert(self.choices.len(), target.into());
        self
    }

    pub fn with_side_effect(mut self, effect: SideEffect) -> Self {
        self.side_effect = Some(effect);
        self
    }

    /// A node with no choices ends the conversation
    pub fn is_terminal(&self) -> bool {
        self.choices.is_empty()
    }

    /// Label of a 1-based choice index
    pub fn choice_label(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.choices.get(i))
            .map(String::as_str)
    }
}
