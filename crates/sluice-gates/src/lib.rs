//! # Sluice Gates - built-in policy gates
//!
//! The standard gate set for sluice boundaries:
//!
//! - [`AllowAll`] / [`DenyAll`] - unconditional allow or silent drop
//! - [`AssertNoEffects`] - any request is a policy violation
//! - [`BlockNames`] - name blocklist, droppable or rejecting
//! - [`LogOnRelease`] - observation point, allows everything
//! - [`CompositeGate`] - explicit list-of-members combinator
//!
//! All gates implement [`sluice_core::Gate`] and can serve as either a
//! boundary gate or a local gate.

pub mod assertive;
pub mod blocklist;
pub mod composite;
pub mod logging;
pub mod passthrough;

pub use assertive::AssertNoEffects;
pub use blocklist::BlockNames;
pub use composite::CompositeGate;
pub use logging::LogOnRelease;
pub use passthrough::{AllowAll, DenyAll};
