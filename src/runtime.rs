//! Runtime for hosting guided conversations
//!
//! Each conversation gets its own `ConversationRuntime` behind its own lock;
//! runtimes never share mutable state. Mounting creates one, unmounting drops it.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

#[allow(unused_imports)] // Public API re-exports
pub use executor::{
    ClientAction, ConvContext, ConversationRuntime, ConversationView, EndReason, CLOSING_MESSAGE,
};
pub use traits::*;

use crate::graph::FlowLibrary;
use crate::state_machine::TransitionError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

/// Type alias for production runtime with a type-erased dialer
pub type ProductionRuntime = ConversationRuntime<dyn Dialer>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("unknown flow: {0}")]
    UnknownFlow(String),
    #[error("conversation not found: {0}")]
    NotFound(String),
    #[error("conversation {0} has ended")]
    Ended(String),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Manager for all live conversations
pub struct RuntimeManager {
    flows: FlowLibrary,
    dialer: Arc<dyn Dialer>,
    crisis_line: String,
    runtimes: RwLock<HashMap<String, Arc<Mutex<ProductionRuntime>>>>,
}

impl RuntimeManager {
    pub fn new(flows: FlowLibrary, dialer: Arc<dyn Dialer>, crisis_line: impl Into<String>) -> Self {
        Self {
            flows,
            dialer,
            crisis_line: crisis_line.into(),
            runtimes: RwLock::new(HashMap::new()),
        }
    }

    pub fn flows(&self) -> &FlowLibrary {
        &self.flows
    }

    /// Mount a new conversation on `flow`
    pub async fn create(&self, flow: &str) -> Result<ConversationView, RuntimeError> {
        let graph = self
            .flows
            .get(flow)
            .ok_or_else(|| RuntimeError::UnknownFlow(flow.to_string()))?;

        let id = uuid::Uuid::new_v4().to_string();
        let context = ConvContext::new(&id, flow, &self.crisis_line);
        let (runtime, actions) = ConversationRuntime::start(context, graph, self.dialer.clone());
        let view = runtime.view(actions);

        self.runtimes
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(runtime)));
        Ok(view)
    }

    async fn get(&self, id: &str) -> Result<Arc<Mutex<ProductionRuntime>>, RuntimeError> {
        self.runtimes
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RuntimeError::NotFound(id.to_string()))
    }

    pub async fn view(&self, id: &str) -> Result<ConversationView, RuntimeError> {
        let runtime = self.get(id).await?;
        let runtime = runtime.lock().await;
        Ok(runtime.view(Vec::new()))
    }

    pub async fn select_choice(
        &self,
        id: &str,
        choice: usize,
    ) -> Result<ConversationView, RuntimeError> {
        let runtime = self.get(id).await?;
        let mut runtime = runtime.lock().await;
        let actions = runtime.select_choice(choice)?;
        Ok(runtime.view(actions))
    }

    /// Unmount a conversation; its session is dropped
    pub async fn discard(&self, id: &str) -> Result<(), RuntimeError> {
        if self.runtimes.write().await.remove(id).is_none() {
            return Err(RuntimeError::NotFound(id.to_string()));
        }
        let active = self.active_count().await;
        tracing::info!(conv_id = %id, active, "Conversation discarded");
        Ok(())
    }

    /// Drop conversations whose last activity is at least `idle_timeout` ago.
    ///
    /// Runtimes locked by an in-flight request are skipped. Returns how many
    /// were evicted.
    pub async fn evict_idle(&self, idle_timeout: Duration) -> usize {
        let now = Instant::now();
        let mut idle = Vec::new();

        {
            let runtimes = self.runtimes.read().await;
            for (id, runtime) in runtimes.iter() {
                if let Ok(runtime) = runtime.try_lock() {
                    if runtime.idle_for(now) >= idle_timeout {
                        idle.push(id.clone());
                    }
                }
            }
        }

        if idle.is_empty() {
            return 0;
        }

        let mut runtimes = self.runtimes.write().await;
        for id in &idle {
            tracing::info!(conv_id = %id, "Evicting idle conversation");
            runtimes.remove(id);
        }
        idle.len()
    }

    /// Periodically evict idle conversations until the manager is dropped
    pub fn spawn_eviction(manager: &Arc<Self>, every: Duration, idle_timeout: Duration) {
        let manager = Arc::downgrade(manager);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(every).await;
                let Some(manager) = manager.upgrade() else {
                    tracing::debug!("RuntimeManager dropped, eviction task exiting");
                    break;
                };
                manager.evict_idle(idle_timeout).await;
            }
        });
    }

    pub async fn active_count(&self) -> usize {
        self.runtimes.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::flows;
    use crate::runtime::testing::MockDialer;
    use std::time::Duration;

    fn test_manager() -> (RuntimeManager, Arc<MockDialer>) {
        let dialer = Arc::new(MockDialer::new());
        let manager = RuntimeManager::new(FlowLibrary::builtin().unwrap(), dialer.clone(), "188");
        (manager, dialer)
    }

    #[tokio::test]
    async fn test_create_and_view() {
        let (manager, _) = test_manager();

        let created = manager.create(flows::ACOLHIMENTO).await.unwrap();
        assert_eq!(created.current_node_id, flows::INITIAL);
        assert_eq!(created.transcript.len(), 1);

        let viewed = manager.view(&created.id).await.unwrap();
        assert_eq!(viewed.transcript, created.transcript);
        assert_eq!(manager.active_count().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_flow() {
        let (manager, _) = test_manager();
        let result = manager.create("diario").await;
        assert!(matches!(result, Err(RuntimeError::UnknownFlow(name)) if name == "diario"));
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let (manager, _) = test_manager();
        let a = manager.create(flows::ACOLHIMENTO).await.unwrap();
        let b = manager.create(flows::ACOLHIMENTO).await.unwrap();

        manager.select_choice(&a.id, 2).await.unwrap();

        let b = manager.view(&b.id).await.unwrap();
        assert_eq!(b.current_node_id, flows::INITIAL);
        assert_eq!(b.transcript.len(), 1);
    }

    #[tokio::test]
    async fn test_select_choice_dials_through_manager() {
        let (manager, dialer) = test_manager();
        let conv = manager.create(flows::CRISE).await.unwrap();

        let view = manager.select_choice(&conv.id, 2).await.unwrap();

        assert_eq!(view.current_node_id, flows::LIGAR_CVV);
        assert_eq!(view.actions.len(), 1);
        let call = dialer.next_call(Duration::from_secs(1)).await.unwrap();
        assert_eq!(call.conversation_id, conv.id);
        assert!(manager.view(&conv.id).await.unwrap().actions.is_empty());
    }

    #[tokio::test]
    async fn test_discard() {
        let (manager, _) = test_manager();
        let conv = manager.create(flows::ACOLHIMENTO).await.unwrap();

        manager.discard(&conv.id).await.unwrap();

        assert_eq!(manager.active_count().await, 0);
        assert!(matches!(manager.view(&conv.id).await, Err(RuntimeError::NotFound(_))));
        assert!(matches!(manager.discard(&conv.id).await, Err(RuntimeError::NotFound(_))));
    }

    #[test]
    fn test_manager_futures_are_send() {
        fn assert_send<T: Send>(_: T) {}
        let (manager, _) = test_manager();
        assert_send(manager.discard("missing"));
        assert_send(manager.evict_idle(Duration::ZERO));
    }

    #[tokio::test]
    async fn test_evict_idle() {
        let (manager, _) = test_manager();
        let ended = manager.create(flows::ACOLHIMENTO).await.unwrap();
        for choice in [2, 1, 1, 1, 1] {
            manager.select_choice(&ended.id, choice).await.unwrap();
        }
        let fresh = manager.create(flows::CRISE).await.unwrap();

        assert_eq!(manager.evict_idle(Duration::from_secs(3600)).await, 0);
        assert_eq!(manager.active_count().await, 2);

        assert_eq!(manager.evict_idle(Duration::ZERO).await, 2);
        assert_eq!(manager.active_count().await, 0);
        assert!(matches!(manager.view(&fresh.id).await, Err(RuntimeError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_eviction_skips_busy_conversation() {
        let (manager, _) = test_manager();
        let conv = manager.create(flows::ACOLHIMENTO).await.unwrap();

        let runtime = manager.get(&conv.id).await.unwrap();
        let guard = runtime.lock().await;
        assert_eq!(manager.evict_idle(Duration::ZERO).await, 0);
        drop(guard);

        assert_eq!(manager.evict_idle(Duration::ZERO).await, 1);
    }
}
