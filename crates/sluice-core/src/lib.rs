//! # Sluice Core - intent data model and policy/dispatch traits
//!
//! The inert pieces of the sluice system: the [`Intent`] record, the
//! [`Effect`] and [`Gate`] and [`Dispatcher`] traits that form the seams
//! to user code, and the unified [`SluiceError`] type. The buffering
//! engine itself lives in the `sluice` crate; built-in gates live in
//! `sluice-gates`.

pub mod dispatch;
pub mod effect;
pub mod errors;
pub mod gate;
pub mod intent;

pub use dispatch::{DirectDispatcher, Dispatcher};
pub use effect::{Effect, EffectArgs, FnEffect};
pub use errors::{SluiceError, SluiceResult};
pub use gate::Gate;
pub use intent::{Intent, IntentBuilder, IntentId};
