//! Assertion gate - any request is a policy violation
//!
//! Used in scopes that must stay effect-free, typically tests and
//! read-only code paths. Rejection happens at admission so the caller
//! sees the violation at the request site, not later at release.

use sluice_core::{Gate, Intent, SluiceError, SluiceResult};

/// Gate that rejects every intent at admission
#[derive(Debug, Clone, Copy, Default)]
pub struct AssertNoEffects;

impl Gate for AssertNoEffects {
    fn on_admit(&self, intent: &Intent) -> SluiceResult<()> {
        Err(SluiceError::policy_violation(format!(
            "unexpected side effect: {}. No side effects are allowed in this boundary",
            intent.name()
        )))
    }

    // Unreachable: on_admit always rejects, so nothing is ever buffered.
    fn releases(&self, intent: &Intent) -> bool {
        let _ = intent;
        false
    }
}
