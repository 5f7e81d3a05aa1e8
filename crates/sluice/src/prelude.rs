//! Sluice prelude.
//!
//! Curated re-exports for typical usage without spelling out the
//! individual crates and modules.

pub use crate::boundary::{Boundary, BoundaryBuilder, Lifecycle};
pub use crate::config::{configure, reset_configuration, Configuration};
pub use crate::context::{current_boundary, with_local_gate};
pub use crate::dispatch::{QueueDispatcher, RecordingDispatcher};
pub use crate::hooks::{BoundaryHooks, CaptureAllHooks, IndependentHooks};
pub use crate::request::{request, EffectRequest};
pub use crate::scope::{run_scoped, ScopedFuture, ScopedFutureExt};

pub use sluice_core::{
    DirectDispatcher, Dispatcher, Effect, EffectArgs, FnEffect, Gate, Intent, SluiceError,
    SluiceResult,
};
pub use sluice_gates::{AllowAll, AssertNoEffects, BlockNames, CompositeGate, DenyAll, LogOnRelease};
