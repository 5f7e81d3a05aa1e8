#![deny(clippy::await_holding_lock)]
//! # Sluice - policy-gated lifecycle boundary for side effects
//!
//! Buffer side effects. Control what escapes.
//!
//! Domain code calls [`request`] to defer a side effect instead of
//! performing it. The request becomes an inert [`Intent`] in the buffer of
//! the ambient [`Boundary`]; nothing executes until the boundary is
//! released, and a released boundary applies its [`Gate`] to every intent
//! before handing the survivors to a [`Dispatcher`] in strict FIFO order.
//! Aborting a boundary discards its buffer without dispatching anything.
//!
//! This keeps effects from firing before the operation that justified them
//! (a database transaction, a request handler) has actually succeeded, and
//! gives operators one choke point to observe, filter, or disable outgoing
//! effects.
//!
//! ```
//! use std::sync::Arc;
//! use sluice::prelude::*;
//!
//! fn do_stuff() -> SluiceResult<()> {
//!     request(FnEffect::shared("send_email", |_| Ok(())), EffectArgs::new())
//! }
//!
//! // Nothing escapes a deny-all boundary.
//! let boundary = Boundary::new(Arc::new(DenyAll));
//! boundary.run(|| do_stuff()).unwrap();
//!
//! // Outside a boundary, requests fail instead of silently dropping.
//! assert!(matches!(do_stuff(), Err(SluiceError::NoBoundary { .. })));
//! ```
//!
//! Nested boundaries negotiate through the capture protocol: by default an
//! outer boundary absorbs everything an inner one tries to flush, so the
//! outermost lifecycle keeps full authority. See
//! [`BoundaryHooks`](hooks::BoundaryHooks) for the opt-outs.

pub mod boundary;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod hooks;
pub mod prelude;
pub mod request;
pub mod scope;

pub use boundary::{Boundary, BoundaryBuilder, Lifecycle};
pub use config::{configure, current_configuration, reset_configuration, Configuration};
pub use context::{current_boundary, with_local_gate};
pub use hooks::{BoundaryHooks, CaptureAllHooks, IndependentHooks};
pub use request::{request, EffectRequest};
pub use scope::{run_scoped, ScopedFuture, ScopedFutureExt};

pub use sluice_core::{
    DirectDispatcher, Dispatcher, Effect, EffectArgs, FnEffect, Gate, Intent, IntentId,
    SluiceError, SluiceResult,
};
