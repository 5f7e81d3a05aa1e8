//! Boundary extension hooks
//!
//! Two decisions are delegated to a hooks object rather than hard-coded:
//! whether a scoped run commits or discards on exit, and how much
//! authority an ancestor keeps over a releasing descendant's intents.
//! Both have conservative defaults; override them for alternate
//! commit/rollback policies (e.g. HTTP-status-driven) or for nested
//! boundaries that should flush independently.

use sluice_core::{Intent, SluiceError};

use crate::boundary::Boundary;

/// Decision hooks attached to a boundary
pub trait BoundaryHooks: Send + Sync + std::fmt::Debug {
    /// Decide the terminal transition when a scoped run exits.
    ///
    /// `error` is the error the caller's code returned, or `None` on
    /// normal completion. Return `true` to release (dispatch intents),
    /// `false` to abort (discard them).
    ///
    /// Default: release on success, abort on error.
    fn should_release(&self, error: Option<&SluiceError>) -> bool {
        error.is_none()
    }

    /// Called while a descendant boundary releases, innermost ancestor
    /// first.
    ///
    /// `candidates` are the intents the descendant still wants to flush.
    /// Return the subset this ancestor allows through; anything missing
    /// from the returned list is captured into this ancestor's buffer and
    /// removed from the descendant's flush. The candidate slice is
    /// read-only; returning intents that were not in it is undefined.
    ///
    /// `descendant` is always the boundary that is releasing, which in
    /// multi-level nesting is not necessarily the immediate child -
    /// intermediate boundaries have not exited yet.
    ///
    /// Default: capture everything (return an empty list). The outer
    /// boundary keeps full authority over effects produced inside it
    /// unless it explicitly opts out.
    fn before_descendant_release(&self, descendant: &Boundary, candidates: &[Intent]) -> Vec<Intent> {
        let _ = descendant;
        let _ = candidates;
        Vec::new()
    }
}

/// Default hooks: release on success, capture all descendant intents
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureAllHooks;

impl BoundaryHooks for CaptureAllHooks {}

/// Hooks for boundaries whose descendants flush independently
///
/// `before_descendant_release` returns the candidates unchanged, so inner
/// boundaries dispatch their own intents at their own release.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndependentHooks;

impl BoundaryHooks for IndependentHooks {
    fn before_descendant_release(&self, _descendant: &Boundary, candidates: &[Intent]) -> Vec<Intent> {
        candidates.to_vec()
    }
}
