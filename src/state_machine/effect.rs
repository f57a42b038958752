//! Effects produced by state transitions

use crate::graph::SideEffect;

/// Effects for the host to execute after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// The node just entered carries a side-effect tag
    Perform(SideEffect),

    /// The node just entered has no choices left
    ConversationEnded,
}

impl Effect {
    pub fn side_effect(&self) -> Option<&SideEffect> {
        match self {
            Effect::Perform(effect) => Some(effect),
            Effect::ConversationEnded => None,
        }
    }
}
