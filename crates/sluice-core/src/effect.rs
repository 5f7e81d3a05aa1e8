//! Effect references and their captured arguments
//!
//! An [`Effect`] is the opaque operation an intent refers to: something
//! with a stable name (used by blocklists and logging) that the direct
//! dispatcher can invoke with the captured arguments. Arguments are plain
//! JSON values so intents stay inert, cloneable, and loggable regardless
//! of what the effect ultimately does with them.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::SluiceResult;

/// An operation that an intent defers
///
/// Implementations identify themselves by name and know how to perform
/// the deferred work when handed the arguments captured at request time.
/// Only the direct-call dispatcher invokes effects in-process; queue-style
/// dispatchers typically serialize the name and arguments instead.
pub trait Effect: Send + Sync {
    /// Stable name for this effect, used by blocklists and logging
    fn name(&self) -> &str;

    /// Perform the effect with the arguments captured at request time
    fn invoke(&self, args: &EffectArgs) -> SluiceResult<()>;
}

/// Arguments captured for an effect at request time
///
/// Positional arguments and named arguments, both as JSON values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectArgs {
    positional: Vec<Value>,
    named: Map<String, Value>,
}

impl EffectArgs {
    /// Create an empty argument set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an argument set from positional values
    pub fn positional(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            positional: values.into_iter().collect(),
            named: Map::new(),
        }
    }

    /// Append a positional argument
    pub fn with_arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a named argument
    pub fn with_named(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(key.into(), value.into());
        self
    }

    /// Positional arguments in request order
    pub fn positional_args(&self) -> &[Value] {
        &self.positional
    }

    /// Named arguments
    pub fn named_args(&self) -> &Map<String, Value> {
        &self.named
    }

    /// Look up a named argument
    pub fn named_arg(&self, key: &str) -> Option<&Value> {
        self.named.get(key)
    }

    /// True when no arguments were captured
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

impl fmt::Display for EffectArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for value in &self.positional {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
            first = false;
        }
        for (key, value) in &self.named {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{key}={value}")?;
            first = false;
        }
        Ok(())
    }
}

/// Adapts a closure into an [`Effect`] with an explicit name
///
/// The name is never derived from the closure itself; callers supply the
/// identifier that gates and logs will see.
pub struct FnEffect {
    name: String,
    body: Box<dyn Fn(&EffectArgs) -> SluiceResult<()> + Send + Sync>,
}

impl FnEffect {
    /// Wrap a closure under the given effect name
    pub fn new(
        name: impl Into<String>,
        body: impl Fn(&EffectArgs) -> SluiceResult<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            body: Box::new(body),
        }
    }

    /// Wrap a closure and return it ready for use in a request
    pub fn shared(
        name: impl Into<String>,
        body: impl Fn(&EffectArgs) -> SluiceResult<()> + Send + Sync + 'static,
    ) -> Arc<dyn Effect> {
        Arc::new(Self::new(name, body))
    }
}

impl Effect for FnEffect {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, args: &EffectArgs) -> SluiceResult<()> {
        (self.body)(args)
    }
}

impl fmt::Debug for FnEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnEffect").field("name", &self.name).finish()
    }
}
