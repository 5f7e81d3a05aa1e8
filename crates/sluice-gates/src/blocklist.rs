//! Name-blocklist gate
//!
//! Blocks specific effects by name. By default blocked intents are
//! admitted and silently dropped at release; `reject_on_admit(true)`
//! moves the rejection to the request site so callers find out
//! immediately.

use std::collections::HashSet;

use sluice_core::{Gate, Intent, SluiceError, SluiceResult};

/// Gate that blocks a fixed set of effect names
#[derive(Debug, Clone)]
pub struct BlockNames {
    blocked: HashSet<String>,
    reject_on_admit: bool,
}

impl BlockNames {
    /// Create a blocklist over the given effect names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            blocked: names.into_iter().map(Into::into).collect(),
            reject_on_admit: false,
        }
    }

    /// Reject blocked intents at admission instead of dropping at release
    pub fn reject_on_admit(mut self, reject: bool) -> Self {
        self.reject_on_admit = reject;
        self
    }

    /// True if this gate blocks the given effect name
    pub fn blocks(&self, name: &str) -> bool {
        self.blocked.contains(name)
    }
}

impl Gate for BlockNames {
    fn on_admit(&self, intent: &Intent) -> SluiceResult<()> {
        if self.reject_on_admit && self.blocks(intent.name()) {
            return Err(SluiceError::policy_violation(format!(
                "effect '{}' is blocked and cannot be requested",
                intent.name()
            )));
        }
        Ok(())
    }

    fn releases(&self, intent: &Intent) -> bool {
        !self.blocks(intent.name())
    }
}
