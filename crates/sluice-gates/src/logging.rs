//! Observation gate - logs intents at release, allows everything

use sluice_core::{Gate, Intent};
use tracing::info;

/// Gate that logs each intent as it is released
///
/// Allows every intent through; purely an observation point. An optional
/// label distinguishes multiple logging gates in the same process.
#[derive(Debug, Clone, Default)]
pub struct LogOnRelease {
    label: Option<String>,
}

impl LogOnRelease {
    /// Create an unlabeled logging gate
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a label included in every log line
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }
}

impl Gate for LogOnRelease {
    fn releases(&self, intent: &Intent) -> bool {
        info!(
            intent = %intent,
            origin = intent.origin().unwrap_or("-"),
            label = self.label.as_deref().unwrap_or("-"),
            "releasing intent"
        );
        true
    }
}
