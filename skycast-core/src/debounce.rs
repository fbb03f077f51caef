use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// Trailing-edge debouncer with a single pending task.
///
/// Each [`schedule`](Debouncer::schedule) cancels the task armed before it (if its timer
/// has not fired yet) and arms a new one that delivers `msg` on `tx` after `wait`.
/// A message that was already delivered is never recalled.
#[derive(Debug)]
pub struct Debouncer<T> {
    wait: Duration,
    tx: UnboundedSender<T>,
    pending: Option<CancellationToken>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(wait: Duration, tx: UnboundedSender<T>) -> Self {
        Self { wait, tx, pending: None }
    }

    pub fn schedule(&mut self, msg: T) {
        self.cancel();

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let tx = self.tx.clone();
        let wait = self.wait;

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(wait) => {
                    // Receiver gone means the controller shut down.
                    let _ = tx.send(msg);
                }
            }
        });

        self.pending = Some(token);
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}
