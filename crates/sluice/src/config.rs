//! Process-wide configuration defaults
//!
//! Optional convenience surface: applications set their preferred gate,
//! dispatcher, and hooks once at startup, and every boundary built
//! without explicit parts picks them up. Explicit arguments always win.
//! Fully resettable for test isolation.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use sluice_core::{DirectDispatcher, Dispatcher, Gate};
use sluice_gates::AllowAll;

use crate::hooks::{BoundaryHooks, CaptureAllHooks};

/// Overridable defaults consulted by [`Boundary::builder`](crate::Boundary::builder)
///
/// `None` fields mean "use the built-in default": [`AllowAll`],
/// [`DirectDispatcher`], and [`CaptureAllHooks`].
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    /// Default boundary gate
    pub gate: Option<Arc<dyn Gate>>,
    /// Default dispatcher
    pub dispatcher: Option<Arc<dyn Dispatcher>>,
    /// Default decision hooks
    pub hooks: Option<Arc<dyn BoundaryHooks>>,
}

static DEFAULTS: Lazy<RwLock<Configuration>> = Lazy::new(|| RwLock::new(Configuration::default()));

/// Merge the given configuration into the process defaults.
///
/// Only `Some` fields are applied; existing settings for the other fields
/// are kept. Call once at application startup.
pub fn configure(update: Configuration) {
    let mut defaults = DEFAULTS.write();
    if update.gate.is_some() {
        defaults.gate = update.gate;
    }
    if update.dispatcher.is_some() {
        defaults.dispatcher = update.dispatcher;
    }
    if update.hooks.is_some() {
        defaults.hooks = update.hooks;
    }
}

/// Restore the built-in defaults. Primarily for test isolation.
pub fn reset_configuration() {
    *DEFAULTS.write() = Configuration::default();
}

/// Snapshot of the current process defaults
pub fn current_configuration() -> Configuration {
    DEFAULTS.read().clone()
}

pub(crate) fn default_gate() -> Arc<dyn Gate> {
    DEFAULTS
        .read()
        .gate
        .clone()
        .unwrap_or_else(|| Arc::new(AllowAll))
}

pub(crate) fn default_dispatcher() -> Arc<dyn Dispatcher> {
    DEFAULTS
        .read()
        .dispatcher
        .clone()
        .unwrap_or_else(|| Arc::new(DirectDispatcher))
}

pub(crate) fn default_hooks() -> Arc<dyn BoundaryHooks> {
    DEFAULTS
        .read()
        .hooks
        .clone()
        .unwrap_or_else(|| Arc::new(CaptureAllHooks))
}
