//! Intent - the inert record of one requested side effect
//!
//! An intent captures everything about a side-effect request at the moment
//! it was made: the effect, its arguments, optional dispatch options and
//! origin tag, and a snapshot of the local gates that were in force. The
//! record is immutable and cheap to clone; equality is identity-based
//! because arguments may be arbitrary values with no meaningful
//! comparison.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::effect::{Effect, EffectArgs};
use crate::gate::Gate;

/// Identity token for an intent, stable across clones of the same record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntentId(usize);

/// Immutable record of one requested side effect
///
/// Cloning an `Intent` clones a handle to the same record; use
/// [`same_intent`](Intent::same_intent) or [`id`](Intent::id) for identity
/// checks. Intents are deliberately not comparable by value.
#[derive(Clone)]
pub struct Intent {
    inner: Arc<IntentInner>,
}

struct IntentInner {
    effect: Arc<dyn Effect>,
    args: EffectArgs,
    origin: Option<String>,
    dispatch_options: Option<Map<String, Value>>,
    local_gates: Vec<Arc<dyn Gate>>,
}

impl Intent {
    /// Start building an intent for the given effect
    pub fn builder(effect: Arc<dyn Effect>) -> IntentBuilder {
        IntentBuilder {
            effect,
            args: EffectArgs::new(),
            origin: None,
            dispatch_options: None,
            local_gates: Vec::new(),
        }
    }

    /// Build an intent with arguments and no optional metadata
    pub fn new(effect: Arc<dyn Effect>, args: EffectArgs) -> Self {
        Self::builder(effect).args(args).build()
    }

    /// The effect this intent defers
    pub fn effect(&self) -> &Arc<dyn Effect> {
        &self.inner.effect
    }

    /// The effect's name, as used by blocklists and logging
    pub fn name(&self) -> &str {
        self.inner.effect.name()
    }

    /// Arguments captured at request time
    pub fn args(&self) -> &EffectArgs {
        &self.inner.args
    }

    /// Caller-supplied origin tag, if any. Never auto-derived.
    pub fn origin(&self) -> Option<&str> {
        self.inner.origin.as_deref()
    }

    /// Free-form options passed through to the dispatcher (delay, target
    /// queue, ...). Dispatchers that do not understand them ignore them.
    pub fn dispatch_options(&self) -> Option<&Map<String, Value>> {
        self.inner.dispatch_options.as_ref()
    }

    /// Snapshot of the local gates in force when this intent was
    /// requested, outermost first. Captured once, never re-evaluated
    /// against a different stack.
    pub fn local_gates(&self) -> &[Arc<dyn Gate>] {
        &self.inner.local_gates
    }

    /// Evaluate only the captured local gates, innermost first.
    ///
    /// Inspection and audit helper. A `true` result does not mean the
    /// intent will dispatch: the owning boundary's gate, the capture
    /// negotiation, and dispatch itself are all still ahead of it.
    pub fn passes_local_gates(&self) -> bool {
        self.inner
            .local_gates
            .iter()
            .rev()
            .all(|gate| gate.releases(self))
    }

    /// Identity token for this record
    pub fn id(&self) -> IntentId {
        IntentId(Arc::as_ptr(&self.inner) as *const () as usize)
    }

    /// True when both handles refer to the same record
    pub fn same_intent(&self, other: &Intent) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Display for Intent {
    /// Renders the deferred call signature: `name(args, key=value)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.inner.args)
    }
}

impl fmt::Debug for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("Intent");
        dbg.field("name", &self.name()).field("args", &self.inner.args);
        if let Some(origin) = &self.inner.origin {
            dbg.field("origin", origin);
        }
        if let Some(options) = &self.inner.dispatch_options {
            dbg.field("dispatch_options", options);
        }
        if !self.inner.local_gates.is_empty() {
            dbg.field("local_gates", &self.inner.local_gates.len());
        }
        dbg.finish()
    }
}

/// Builder for [`Intent`] records
pub struct IntentBuilder {
    effect: Arc<dyn Effect>,
    args: EffectArgs,
    origin: Option<String>,
    dispatch_options: Option<Map<String, Value>>,
    local_gates: Vec<Arc<dyn Gate>>,
}

impl IntentBuilder {
    /// Set the captured arguments
    pub fn args(mut self, args: EffectArgs) -> Self {
        self.args = args;
        self
    }

    /// Set the origin tag
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Set a single dispatch option
    pub fn dispatch_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.dispatch_options
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Replace all dispatch options
    pub fn dispatch_options(mut self, options: Map<String, Value>) -> Self {
        self.dispatch_options = Some(options);
        self
    }

    /// Set the local-gate snapshot, outermost first
    pub fn local_gates(mut self, gates: Vec<Arc<dyn Gate>>) -> Self {
        self.local_gates = gates;
        self
    }

    /// Finalize the immutable record
    pub fn build(self) -> Intent {
        Intent {
            inner: Arc::new(IntentInner {
                effect: self.effect,
                args: self.args,
                origin: self.origin,
                dispatch_options: self.dispatch_options,
                local_gates: self.local_gates,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::FnEffect;
    use serde_json::json;

    fn noop() -> Arc<dyn Effect> {
        FnEffect::shared("noop", |_| Ok(()))
    }

    #[test]
    fn identity_not_value_equality() {
        let a = Intent::new(noop(), EffectArgs::new());
        let b = Intent::new(noop(), EffectArgs::new());
        let a2 = a.clone();

        assert!(a.same_intent(&a2));
        assert!(!a.same_intent(&b));
        assert_eq!(a.id(), a2.id());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn display_shows_call_signature() {
        let intent = Intent::builder(FnEffect::shared("send_email", |_| Ok(())))
            .args(EffectArgs::new().with_arg(json!(123)).with_named("cc", json!("ops")))
            .build();
        assert_eq!(intent.to_string(), r#"send_email(123, cc="ops")"#);
    }

    #[test]
    fn builder_captures_metadata() {
        let intent = Intent::builder(noop())
            .origin("checkout_handler")
            .dispatch_option("queue", json!("email"))
            .dispatch_option("countdown", json!(30))
            .build();

        assert_eq!(intent.origin(), Some("checkout_handler"));
        let options = intent.dispatch_options().unwrap();
        assert_eq!(options.get("queue"), Some(&json!("email")));
        assert_eq!(options.get("countdown"), Some(&json!(30)));
    }

    #[derive(Debug)]
    struct RefuseNamed(&'static str);
    impl Gate for RefuseNamed {
        fn releases(&self, intent: &Intent) -> bool {
            intent.name() != self.0
        }
    }

    #[test]
    fn local_gate_snapshot_is_evaluated_innermost_first() {
        let gates: Vec<Arc<dyn Gate>> =
            vec![Arc::new(RefuseNamed("other")), Arc::new(RefuseNamed("noop"))];
        let intent = Intent::builder(noop()).local_gates(gates).build();

        assert_eq!(intent.local_gates().len(), 2);
        assert!(!intent.passes_local_gates());

        let intent = Intent::builder(noop())
            .local_gates(vec![Arc::new(RefuseNamed("other")) as Arc<dyn Gate>])
            .build();
        assert!(intent.passes_local_gates());
    }
}
