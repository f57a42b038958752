//! Guided conversation engine
//!
//! Elm-style: a pure `transition` computes the next node, transcript entries
//! and effects; the session applies them; the host executes the effects.

mod effect;
mod session;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
#[allow(unused_imports)] // Public API re-exports
pub use session::{ConversationSession, SessionUpdate, Speaker, TranscriptEntry};
#[allow(unused_imports)]
pub use transition::{transition, TransitionError, TransitionResult};
