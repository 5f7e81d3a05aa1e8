//! Composite gate - an explicit list-of-members combinator
//!
//! Members are consulted in the order given. Admission stops at the first
//! rejection; release requires unanimity and short-circuits on the first
//! `false`.

use std::sync::Arc;

use sluice_core::{Gate, Intent, SluiceResult};

/// Gate combining several member gates (all must allow)
#[derive(Debug, Clone, Default)]
pub struct CompositeGate {
    members: Vec<Arc<dyn Gate>>,
}

impl CompositeGate {
    /// Create a composite over the given members
    pub fn new(members: Vec<Arc<dyn Gate>>) -> Self {
        Self { members }
    }

    /// Append a member gate
    pub fn with(mut self, gate: Arc<dyn Gate>) -> Self {
        self.members.push(gate);
        self
    }

    /// The member gates in evaluation order
    pub fn members(&self) -> &[Arc<dyn Gate>] {
        &self.members
    }
}

impl Gate for CompositeGate {
    fn on_admit(&self, intent: &Intent) -> SluiceResult<()> {
        for member in &self.members {
            member.on_admit(intent)?;
        }
        Ok(())
    }

    fn releases(&self, intent: &Intent) -> bool {
        self.members.iter().all(|member| member.releases(intent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AllowAll, AssertNoEffects, BlockNames, DenyAll};
    use assert_matches::assert_matches;
    use sluice_core::{EffectArgs, FnEffect, SluiceError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn named(name: &str) -> Intent {
        Intent::new(FnEffect::shared(name, |_| Ok(())), EffectArgs::new())
    }

    #[test]
    fn empty_composite_allows_everything() {
        let gate = CompositeGate::default();
        let intent = named("noop");
        assert!(gate.on_admit(&intent).is_ok());
        assert!(gate.releases(&intent));
    }

    #[test]
    fn admission_stops_at_first_rejection() {
        let gate = CompositeGate::new(vec![Arc::new(AllowAll), Arc::new(AssertNoEffects)]);
        let err = gate.on_admit(&named("noop")).unwrap_err();
        assert_matches!(err, SluiceError::PolicyViolation { .. });
    }

    #[test]
    fn release_requires_unanimity() {
        let gate = CompositeGate::new(vec![
            Arc::new(BlockNames::new(["send_email"])),
            Arc::new(AllowAll),
        ]);
        assert!(!gate.releases(&named("send_email")));
        assert!(gate.releases(&named("send_sms")));
    }

    #[derive(Debug)]
    struct Counting(Arc<AtomicUsize>);
    impl Gate for Counting {
        fn releases(&self, _intent: &Intent) -> bool {
            self.0.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    #[test]
    fn release_short_circuits_after_first_false() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = CompositeGate::new(vec![
            Arc::new(DenyAll),
            Arc::new(Counting(Arc::clone(&calls))),
        ]);

        assert!(!gate.releases(&named("noop")));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
