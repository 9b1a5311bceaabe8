//! Memoised provider handles, keyed by model identifier.
//!
//! Absent key = uninitialised.  Initialisation runs outside the lock; when two
//! requests race on the same identifier the first insert wins and the loser's
//! handle is dropped.  Failures are memoised too and never retried.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use crate::provider::{ChatModel, ModelProvider};

#[derive(Clone)]
enum HandleState {
    Ready(Arc<dyn ChatModel>),
    Failed(String),
}

impl HandleState {
    fn to_result(&self) -> Result<Arc<dyn ChatModel>, String> {
        match self {
            HandleState::Ready(handle) => Ok(Arc::clone(handle)),
            HandleState::Failed(reason) => Err(reason.clone()),
        }
    }
}

pub struct ModelRegistry {
    provider: Arc<dyn ModelProvider>,
    handles: RwLock<HashMap<String, HandleState>>,
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.handles.read().map(|h| h.len()).unwrap_or(0);
        write!(f, "ModelRegistry({count} handles)")
    }
}

impl ModelRegistry {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            handles: RwLock::new(HashMap::new()),
        }
    }

    /// Return the handle for `model`, initialising it on first use.
    ///
    /// The error is the recorded initialisation failure.
    pub async fn get_or_init(&self, model: &str) -> Result<Arc<dyn ChatModel>, String> {
        if let Some(state) = self.lookup(model) {
            return state.to_result();
        }

        let state = match self.provider.open(model).await {
            Ok(handle) => {
                info!(model, "initialised model handle");
                HandleState::Ready(handle)
            }
            Err(e) => {
                warn!(model, error = %e, "failed to initialise model handle");
                HandleState::Failed(e.to_string())
            }
        };

        let mut handles = self.handles.write().unwrap_or_else(PoisonError::into_inner);
        handles.entry(model.to_owned()).or_insert(state).to_result()
    }

    /// Identifiers in the ready state, sorted.
    pub fn ready_models(&self) -> Vec<String> {
        let handles = self.handles.read().unwrap_or_else(PoisonError::into_inner);
        let mut ready: Vec<String> = handles
            .iter()
            .filter(|(_, state)| matches!(state, HandleState::Ready(_)))
            .map(|(id, _)| id.clone())
            .collect();
        ready.sort();
        ready
    }

    fn lookup(&self, model: &str) -> Option<HandleState> {
        let handles = self.handles.read().unwrap_or_else(PoisonError::into_inner);
        handles.get(model).cloned()
    }
}
