use std::sync::Arc;

use tokio::sync::Mutex;

use crate::batch::BatchScorer;

pub struct HandlerState<S, C> {
    pub scorer: Arc<BatchScorer<S, C>>,

    /// Held for the duration of a run; a trigger that cannot take it gets 409.
    pub run_guard: Arc<Mutex<()>>,
}

impl<S, C> Clone for HandlerState<S, C> {
    fn clone(&self) -> Self {
        Self {
            scorer: Arc::clone(&self.scorer),
            run_guard: Arc::clone(&self.run_guard),
        }
    }
}

impl<S, C> HandlerState<S, C> {
    pub fn new(scorer: BatchScorer<S, C>) -> Self {
        Self {
            scorer: Arc::new(scorer),
            run_guard: Arc::new(Mutex::new(())),
        }
    }
}
