//! Dispatch adapters
//!
//! The direct-call reference dispatcher lives in `sluice-core`; this
//! module adds the adapters an application actually deploys with: a
//! recording dispatcher for tests and audits, and a queue dispatcher that
//! bridges released intents into an async consumer.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use sluice_core::{Dispatcher, Intent, SluiceError, SluiceResult};

/// Dispatcher that records intents instead of executing them
///
/// Clones share the same log, so a test can keep one handle and hand the
/// other to a boundary.
#[derive(Debug, Clone, Default)]
pub struct RecordingDispatcher {
    log: Arc<Mutex<Vec<Intent>>>,
}

impl RecordingDispatcher {
    /// Create an empty recording dispatcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded intents, in dispatch order
    pub fn recorded(&self) -> Vec<Intent> {
        self.log.lock().clone()
    }

    /// Names of the recorded intents, in dispatch order
    pub fn recorded_names(&self) -> Vec<String> {
        self.log.lock().iter().map(|i| i.name().to_string()).collect()
    }

    /// Number of dispatches so far
    pub fn len(&self) -> usize {
        self.log.lock().len()
    }

    /// True when nothing has been dispatched
    pub fn is_empty(&self) -> bool {
        self.log.lock().is_empty()
    }
}

impl Dispatcher for RecordingDispatcher {
    fn dispatch(&self, intent: &Intent) -> SluiceResult<()> {
        self.log.lock().push(intent.clone());
        Ok(())
    }
}

/// Dispatcher that forwards intents into a queue
///
/// The release loop stays synchronous; an async consumer drains the
/// receiving end and performs or forwards the work. This is the adapter
/// shape for external task-queue back-ends.
#[derive(Debug, Clone)]
pub struct QueueDispatcher {
    sender: tokio::sync::mpsc::UnboundedSender<Intent>,
}

impl QueueDispatcher {
    /// Create a dispatcher and the receiver its intents arrive on
    pub fn new() -> (Self, tokio::sync::mpsc::UnboundedReceiver<Intent>) {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Dispatcher for QueueDispatcher {
    fn dispatch(&self, intent: &Intent) -> SluiceResult<()> {
        debug!(intent = %intent, "forwarding intent to queue");
        self.sender
            .send(intent.clone())
            .map_err(|_| SluiceError::dispatch(format!("queue receiver gone for '{}'", intent.name())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_core::{EffectArgs, FnEffect};

    fn named(name: &str) -> Intent {
        Intent::new(FnEffect::shared(name, |_| Ok(())), EffectArgs::new())
    }

    #[test]
    fn recording_dispatcher_shares_log_across_clones() {
        let recorder = RecordingDispatcher::new();
        let handle = recorder.clone();

        recorder.dispatch(&named("a")).unwrap();
        handle.dispatch(&named("b")).unwrap();

        assert_eq!(recorder.recorded_names(), vec!["a", "b"]);
        assert_eq!(handle.len(), 2);
    }

    #[test]
    fn queue_dispatcher_delivers_to_receiver() {
        let (dispatcher, mut receiver) = QueueDispatcher::new();
        dispatcher.dispatch(&named("queued")).unwrap();

        let received = receiver.try_recv().unwrap();
        assert_eq!(received.name(), "queued");
    }

    #[test]
    fn queue_dispatcher_fails_without_receiver() {
        let (dispatcher, receiver) = QueueDispatcher::new();
        drop(receiver);

        let err = dispatcher.dispatch(&named("orphan")).unwrap_err();
        assert!(matches!(err, SluiceError::Dispatch { .. }));
    }
}
