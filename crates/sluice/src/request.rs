//! The request entry point
//!
//! [`request`] (and the [`EffectRequest`] builder behind it) is the only
//! call domain code makes to defer a side effect. It resolves the active
//! boundary from the ambient context, snapshots the local-gate stack into
//! a fresh [`Intent`], runs the boundary gate's admission check, and
//! appends to the buffer.

use std::sync::Arc;

use serde_json::Value;

use sluice_core::{Effect, EffectArgs, Intent, SluiceError, SluiceResult};

use crate::context;

/// Request a side effect with the given arguments.
///
/// Shorthand for building an [`EffectRequest`] and calling
/// [`submit`](EffectRequest::submit). Use the builder directly when the
/// request needs an origin tag or dispatch options.
///
/// # Errors
///
/// - [`SluiceError::Usage`] when called from inside a gate callback -
///   gates may judge intents but must never create them.
/// - [`SluiceError::NoBoundary`] when no boundary is active. Intentional:
///   there is no implicit default boundary.
/// - [`SluiceError::PolicyViolation`] when the boundary gate rejects the
///   intent at admission; it is then never buffered.
pub fn request(effect: Arc<dyn Effect>, args: EffectArgs) -> SluiceResult<()> {
    EffectRequest::new(effect).args(args).submit()
}

/// Builder for a side-effect request with optional metadata
pub struct EffectRequest {
    effect: Arc<dyn Effect>,
    args: EffectArgs,
    origin: Option<String>,
    dispatch_options: Option<serde_json::Map<String, Value>>,
}

impl EffectRequest {
    /// Start a request for the given effect
    pub fn new(effect: Arc<dyn Effect>) -> Self {
        Self {
            effect,
            args: EffectArgs::new(),
            origin: None,
            dispatch_options: None,
        }
    }

    /// Set all captured arguments at once
    pub fn args(mut self, args: EffectArgs) -> Self {
        self.args = args;
        self
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args = self.args.with_arg(value);
        self
    }

    /// Set a named argument
    pub fn named(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args = self.args.with_named(key, value);
        self
    }

    /// Tag the intent with an origin string for observability.
    ///
    /// Never auto-detected; integrations that know the request path or
    /// task name set this explicitly.
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Set a dispatch option passed through to the dispatcher (delay,
    /// target queue, ...). Dispatchers that do not understand an option
    /// ignore it.
    pub fn dispatch_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.dispatch_options
            .get_or_insert_with(serde_json::Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Build the intent and submit it to the active boundary.
    ///
    /// See [`request`] for the error contract.
    pub fn submit(self) -> SluiceResult<()> {
        if context::in_gate() {
            return Err(SluiceError::usage(
                "cannot request an effect from within a gate callback; \
                 gates may judge intents but must not create them",
            ));
        }

        // Local gates are metadata, not control flow: the snapshot records
        // what was in force at request time and is evaluated at release.
        let local_gates = context::snapshot_local_gates();

        let mut builder = Intent::builder(self.effect)
            .args(self.args)
            .local_gates(local_gates);
        if let Some(origin) = self.origin {
            builder = builder.origin(origin);
        }
        if let Some(options) = self.dispatch_options {
            builder = builder.dispatch_options(options);
        }
        let intent = builder.build();

        match context::current_boundary() {
            Some(boundary) => boundary.admit(intent),
            None => Err(SluiceError::no_boundary(format!(
                "cannot request '{}' without an active boundary; \
                 wrap the calling code in a scoped run",
                intent.name()
            ))),
        }
    }
}
