//! Per-conversation host: applies choices and executes their effects

use super::traits::Dialer;
use super::RuntimeError;
use crate::graph::{ConversationGraph, SideEffect};
use crate::state_machine::{ConversationSession, Effect, TranscriptEntry, TransitionError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shown when the graph cannot continue from the chosen option
pub const CLOSING_MESSAGE: &str = "Obrigado por conversar comigo. Se precisar, estou aqui.";

/// Immutable configuration of one conversation
#[derive(Debug, Clone)]
pub struct ConvContext {
    pub conversation_id: String,
    pub flow: String,
    /// Number dialed for the `dial` tag
    pub crisis_line: String,
    pub created_at: DateTime<Utc>,
}

impl ConvContext {
    pub fn new(
        conversation_id: impl Into<String>,
        flow: impl Into<String>,
        crisis_line: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            flow: flow.into(),
            crisis_line: crisis_line.into(),
            created_at: Utc::now(),
        }
    }
}

/// Why a conversation stopped accepting choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// A terminal node was reached
    Completed,
    /// A transition pointed at a node that does not exist
    BrokenGraph,
}

/// Platform action the client should perform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientAction {
    Dial { number: String },
}

/// Snapshot of a conversation for the client
#[derive(Debug, Clone, Serialize)]
pub struct ConversationView {
    pub id: String,
    pub flow: String,
    pub current_node_id: String,
    pub prompt: String,
    pub choices: Vec<String>,
    pub terminal: bool,
    pub ended: Option<EndReason>,
    pub transcript: Vec<TranscriptEntry>,
    /// Actions produced by the step that returned this view; empty on reads
    pub actions: Vec<ClientAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Generic conversation runtime that can work with any dialer implementation
pub struct ConversationRuntime<D: Dialer + ?Sized + 'static> {
    context: ConvContext,
    session: ConversationSession,
    dialer: Arc<D>,
    ended: Option<EndReason>,
    notice: Option<String>,
    /// Last mount or choice, for idle eviction
    last_activity: Instant,
}

impl<D: Dialer + ?Sized + 'static> ConversationRuntime<D> {
    /// Mount a conversation at the graph's start node.
    ///
    /// Returns the runtime and the actions of the start node, if it has any.
    pub fn start(
        context: ConvContext,
        graph: Arc<ConversationGraph>,
        dialer: Arc<D>,
    ) -> (Self, Vec<ClientAction>) {
        let session = ConversationSession::start(graph);
        tracing::info!(
            conv_id = %context.conversation_id,
            flow = %context.flow,
            node = %session.current_node_id(),
            "Conversation started"
        );

        let mut runtime = Self {
            context,
            session,
            dialer,
            ended: None,
            notice: None,
            last_activity: Instant::now(),
        };

        let mut effects: Vec<Effect> = runtime
            .session
            .current_node()
            .side_effect
            .clone()
            .map(Effect::Perform)
            .into_iter()
            .collect();
        if runtime.session.is_terminal() {
            effects.push(Effect::ConversationEnded);
        }
        let actions = runtime.execute_effects(effects);

        (runtime, actions)
    }

    pub fn ended(&self) -> Option<EndReason> {
        self.ended
    }

    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }

    /// Apply a 1-based choice.
    ///
    /// A broken transition is recovered here: the conversation ends with
    /// [`CLOSING_MESSAGE`] instead of failing the request.
    pub fn select_choice(&mut self, choice: usize) -> Result<Vec<ClientAction>, RuntimeError> {
        if self.ended.is_some() {
            return Err(RuntimeError::Ended(self.context.conversation_id.clone()));
        }
        self.last_activity = Instant::now();

        match self.session.select_choice(choice) {
            Ok(update) => {
                tracing::info!(
                    conv_id = %self.context.conversation_id,
                    choice,
                    node = %update.node_id,
                    terminal = update.terminal,
                    "Choice applied"
                );
                Ok(self.execute_effects(update.effects))
            }
            Err(e @ TransitionError::InvalidChoice { .. }) => {
                tracing::debug!(conv_id = %self.context.conversation_id, error = %e, "Rejected choice");
                Err(e.into())
            }
            Err(e @ TransitionError::BrokenGraph { .. }) => {
                tracing::error!(
                    conv_id = %self.context.conversation_id,
                    flow = %self.context.flow,
                    error = %e,
                    "Conversation graph is broken; ending conversation"
                );
                self.ended = Some(EndReason::BrokenGraph);
                self.notice = Some(CLOSING_MESSAGE.to_string());
                Ok(Vec::new())
            }
        }
    }

    fn execute_effects(&mut self, effects: Vec<Effect>) -> Vec<ClientAction> {
        let mut actions = Vec::new();
        for effect in effects {
            match effect {
                Effect::Perform(SideEffect::Dial) => {
                    self.spawn_dial();
                    actions.push(ClientAction::Dial {
                        number: self.context.crisis_line.clone(),
                    });
                }
                Effect::Perform(SideEffect::Other(tag)) => {
                    tracing::debug!(conv_id = %self.context.conversation_id, tag = %tag, "Ignoring unhandled side effect");
                }
                Effect::ConversationEnded => {
                    tracing::info!(conv_id = %self.context.conversation_id, "Conversation completed");
                    self.ended = Some(EndReason::Completed);
                }
            }
        }
        actions
    }

    /// Fire-and-forget: the result is logged, never awaited or retried
    fn spawn_dial(&self) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(conv_id = %self.context.conversation_id, "No async runtime; dial skipped");
            return;
        };

        let dialer = Arc::clone(&self.dialer);
        let conv_id = self.context.conversation_id.clone();
        let number = self.context.crisis_line.clone();
        handle.spawn(async move {
            if let Err(e) = dialer.dial(&conv_id, &number).await {
                tracing::error!(conv_id = %conv_id, error = %e, "Dial failed");
            }
        });
    }

    /// Current state with the given step actions attached
    pub fn view(&self, actions: Vec<ClientAction>) -> ConversationView {
        let node = self.session.current_node();
        ConversationView {
            id: self.context.conversation_id.clone(),
            flow: self.context.flow.clone(),
            current_node_id: node.id.clone(),
            prompt: node.prompt.clone(),
            choices: node.choices.clone(),
            terminal: node.is_terminal(),
            ended: self.ended,
            transcript: self.session.transcript().to_vec(),
            actions,
            notice: self.notice.clone(),
            created_at: self.context.created_at,
        }
    }
}
