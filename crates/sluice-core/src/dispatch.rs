//! Dispatcher protocol and the direct-call reference implementation
//!
//! A dispatcher is the external collaborator that finally performs a
//! released intent. The engine treats a dispatch as an opaque synchronous
//! step: the call must return before the next intent is attempted, and a
//! dispatch error propagates immediately (fail-fast, no retry).

use std::fmt;

use tracing::debug;

use crate::errors::SluiceResult;
use crate::intent::Intent;

/// Executes one admitted intent at release time
pub trait Dispatcher: Send + Sync + fmt::Debug {
    /// Perform or forward the side effect described by `intent`.
    ///
    /// Errors propagate out of the boundary's release; remaining queued
    /// intents are not attempted.
    fn dispatch(&self, intent: &Intent) -> SluiceResult<()>;
}

/// Reference dispatcher: invokes the effect in-process
///
/// Calls `intent.effect().invoke(args)` directly and ignores dispatch
/// options entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectDispatcher;

impl Dispatcher for DirectDispatcher {
    fn dispatch(&self, intent: &Intent) -> SluiceResult<()> {
        debug!(intent = %intent, "dispatching directly");
        intent.effect().invoke(intent.args())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{EffectArgs, FnEffect};
    use crate::errors::SluiceError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn direct_dispatcher_invokes_with_captured_args() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen2 = Arc::clone(&seen);
        let effect = FnEffect::shared("record", move |args| {
            let value = args.positional_args()[0].as_u64().unwrap_or(0);
            seen2.store(value as usize, Ordering::SeqCst);
            Ok(())
        });

        let intent = Intent::new(effect, EffectArgs::new().with_arg(json!(42)));
        DirectDispatcher.dispatch(&intent).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 42);
    }

    #[test]
    fn direct_dispatcher_propagates_effect_errors() {
        let effect = FnEffect::shared("explode", |_| Err(SluiceError::dispatch("broker down")));
        let intent = Intent::new(effect, EffectArgs::new());
        assert!(DirectDispatcher.dispatch(&intent).is_err());
    }
}
