use tokio::sync::watch;

/// Per-cycle execution context handed to every gatherer.
///
/// Carries the agent identity and a cooperative cancellation signal. The
/// core never inspects anything else in it; gatherers may use the agent id
/// for logging and should return promptly once cancellation is observed.
#[derive(Clone)]
pub struct ExecutionContext {
    agent_id: String,
    cancel: watch::Receiver<bool>,
}

/// Cancels the collection cycle the paired [`ExecutionContext`] belongs to.
///
/// Dropping the handle without calling [`CancelHandle::cancel`] leaves the
/// cycle running to completion.
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

impl ExecutionContext {
    /// Creates a context for one collection cycle together with the handle
    /// that can cancel it.
    pub fn new(agent_id: impl Into<String>) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                agent_id: agent_id.into(),
                cancel: rx,
            },
            CancelHandle { tx },
        )
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// Whether the cycle has been cancelled. Cheap enough to poll inside
    /// collection loops.
    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Resolves once the cycle is cancelled. Never resolves if the
    /// [`CancelHandle`] is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.cancel.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // Handle dropped without cancelling; this cycle can no
                // longer be cancelled.
                std::future::pending::<()>().await;
            }
        }
    }
}
