//! Unconditional gates
//!
//! `AllowAll` is the default boundary gate. `DenyAll` admits everything
//! but releases nothing - useful for dry runs and tests that want the
//! buffer populated without any effect escaping.

use sluice_core::{Gate, Intent};

/// Gate that admits and releases every intent
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Gate for AllowAll {}

/// Gate that admits every intent and releases none
///
/// Requests succeed and the buffer fills normally; at release time every
/// intent is silently dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl Gate for DenyAll {
    fn releases(&self, intent: &Intent) -> bool {
        let _ = intent;
        false
    }
}
