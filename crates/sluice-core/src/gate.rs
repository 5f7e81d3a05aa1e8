//! Gate protocol - pluggable admission and release policy
//!
//! Gates are per-intent boolean filters. They see every intent twice: once
//! at admission (where they may reject it outright) and once at release
//! (where they decide whether it dispatches). Gates can filter intents but
//! never reorder them, which keeps FIFO dispatch order true by
//! construction.

use std::fmt;

use crate::errors::SluiceResult;
use crate::intent::Intent;

/// Policy gate consulted at admission and again at release
///
/// Both methods have permissive defaults, so a gate only overrides the
/// decision point it cares about.
///
/// Gates must never request effects themselves; a `request()` made from
/// inside either callback fails with a usage error.
pub trait Gate: Send + Sync + fmt::Debug {
    /// Called when an intent is about to enter a boundary's buffer.
    ///
    /// Return a [`PolicyViolation`](crate::SluiceError::PolicyViolation)
    /// error to reject the intent; it is then never buffered. Use for
    /// observation or hard admission-time blocks.
    fn on_admit(&self, intent: &Intent) -> SluiceResult<()> {
        let _ = intent;
        Ok(())
    }

    /// Called at release time for each buffered intent.
    ///
    /// Return `true` to let the intent dispatch, `false` to silently drop
    /// it.
    fn releases(&self, intent: &Intent) -> bool {
        let _ = intent;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{EffectArgs, FnEffect};

    #[derive(Debug)]
    struct DefaultGate;
    impl Gate for DefaultGate {}

    #[test]
    fn default_gate_admits_and_releases() {
        let intent = Intent::builder(FnEffect::shared("noop", |_| Ok(())))
            .args(EffectArgs::new())
            .build();
        let gate = DefaultGate;
        assert!(gate.on_admit(&intent).is_ok());
        assert!(gate.releases(&intent));
    }
}
