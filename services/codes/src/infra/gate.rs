use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;

/// Process-wide arbitration point for operations that change `is_used`.
///
/// Allocation, reset and clear each run their transaction inside [`WriteGate::run`], so at
/// most one of them touches the code table at a time. Clones share the same lock.
#[derive(Clone, Default)]
pub struct WriteGate {
    lock: Arc<Mutex<()>>,
}

impl WriteGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `op` while holding the gate. Waiters are served in FIFO order.
    pub async fn run<F, T>(&self, op: F) -> T
    where
        F: Future<Output = T>,
    {
        let _guard = self.lock.lock().await;
        op.await
    }
}
