//! Boundary - the buffering and lifecycle unit
//!
//! A boundary owns a FIFO buffer of intents, moves through the lifecycle
//! `Open -> Active -> (Released | Aborted)`, and implements the
//! nested-capture protocol against its ancestor chain. Reaching a
//! terminal state happens exactly once; after that the buffer is
//! immutable.
//!
//! A boundary is exclusively owned by the logical unit of work that
//! created it. Interior state is mutex-protected so capture from a
//! releasing descendant is memory-safe, but concurrent mutation from
//! multiple units is not a supported pattern.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, warn};

use sluice_core::{Dispatcher, Gate, Intent, IntentId, SluiceError, SluiceResult};

use crate::config;
use crate::context;
use crate::hooks::BoundaryHooks;

/// Lifecycle states of a [`Boundary`]
///
/// `Released` and `Aborted` are terminal and mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Created, or deactivated and awaiting its terminal transition
    Open,
    /// Currently the ambient target for new requests
    Active,
    /// Flushed: surviving intents were handed to the dispatcher
    Released,
    /// Discarded: buffered intents were dropped without dispatch
    Aborted,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::Open
    }
}

impl Lifecycle {
    /// True for `Released` and `Aborted`
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Released | Self::Aborted)
    }
}

/// The buffering and lifecycle unit for side-effect intents
///
/// Cloning a `Boundary` clones a handle to the same unit; use
/// [`same_boundary`](Boundary::same_boundary) for identity checks.
pub struct Boundary {
    inner: Arc<BoundaryInner>,
}

impl Clone for Boundary {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct BoundaryInner {
    gate: Arc<dyn Gate>,
    dispatcher: Arc<dyn Dispatcher>,
    hooks: Arc<dyn BoundaryHooks>,
    state: Mutex<BoundaryState>,
}

#[derive(Default)]
struct BoundaryState {
    lifecycle: Lifecycle,
    buffer: Vec<Intent>,
    captured: Vec<Intent>,
    /// Enclosing boundary at activation time; non-owning by design so a
    /// forgotten descendant handle cannot keep an ancestor alive.
    parent: Option<Weak<BoundaryInner>>,
    /// Ambient slot value displaced by `activate`, restored by
    /// `deactivate`.
    saved_prior: Option<Option<Boundary>>,
    own_cache: Option<Vec<Intent>>,
}

impl Boundary {
    /// Create a boundary with the given gate; dispatcher and hooks come
    /// from the process-wide configuration defaults
    pub fn new(gate: Arc<dyn Gate>) -> Self {
        Self::builder().gate(gate).build()
    }

    /// Start building a boundary; unset parts fall back to the
    /// process-wide configuration defaults
    pub fn builder() -> BoundaryBuilder {
        BoundaryBuilder::default()
    }

    /// Boundary-level gate
    pub fn gate(&self) -> &Arc<dyn Gate> {
        &self.inner.gate
    }

    /// Dispatcher used at release
    pub fn dispatcher(&self) -> &Arc<dyn Dispatcher> {
        &self.inner.dispatcher
    }

    /// Decision hooks
    pub fn hooks(&self) -> &Arc<dyn BoundaryHooks> {
        &self.inner.hooks
    }

    /// Current lifecycle state
    pub fn lifecycle(&self) -> Lifecycle {
        self.inner.state.lock().lifecycle
    }

    /// True while this boundary is the ambient target for new requests
    pub fn is_active(&self) -> bool {
        self.lifecycle() == Lifecycle::Active
    }

    /// True once released
    pub fn is_released(&self) -> bool {
        self.lifecycle() == Lifecycle::Released
    }

    /// True once aborted
    pub fn is_aborted(&self) -> bool {
        self.lifecycle() == Lifecycle::Aborted
    }

    /// Snapshot of the buffered intents, in admission order
    pub fn intents(&self) -> Vec<Intent> {
        self.inner.state.lock().buffer.clone()
    }

    /// Intents captured from descendant boundaries, in capture order
    pub fn captured_intents(&self) -> Vec<Intent> {
        self.inner.state.lock().captured.clone()
    }

    /// Intents requested directly against this boundary (buffer minus
    /// captures)
    pub fn own_intents(&self) -> Vec<Intent> {
        let mut st = self.inner.state.lock();
        if st.own_cache.is_none() {
            let captured: HashSet<IntentId> = st.captured.iter().map(Intent::id).collect();
            let own = st
                .buffer
                .iter()
                .filter(|intent| !captured.contains(&intent.id()))
                .cloned()
                .collect();
            st.own_cache = Some(own);
        }
        st.own_cache.clone().unwrap_or_default()
    }

    /// True when both handles refer to the same boundary
    pub fn same_boundary(&self, other: &Boundary) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Make this boundary the ambient target for requests on the current
    /// logical task.
    ///
    /// Captures the enclosing boundary (the displaced slot value) as this
    /// boundary's parent for the nested-capture protocol. Fails with a
    /// state error if already active or already terminal. Must be paired
    /// with [`deactivate`](Boundary::deactivate) before release or abort.
    pub fn activate(&self) -> SluiceResult<()> {
        let prior = context::current_boundary();
        self.mark_active(prior.as_ref())?;
        let displaced = context::swap_current(Some(self.clone()));
        self.inner.state.lock().saved_prior = Some(displaced);
        debug!(boundary = ?self, "boundary activated");
        Ok(())
    }

    /// Stop being the ambient target, restoring the previously active
    /// boundary (or none).
    ///
    /// Fails with a state error if this boundary is not active.
    pub fn deactivate(&self) -> SluiceResult<()> {
        let saved = {
            let mut st = self.inner.state.lock();
            if st.lifecycle != Lifecycle::Active {
                return Err(SluiceError::state("boundary is not active"));
            }
            st.lifecycle = Lifecycle::Open;
            st.saved_prior.take()
        };
        if let Some(prior) = saved {
            context::set_current(prior);
        }
        debug!(boundary = ?self, "boundary deactivated");
        Ok(())
    }

    /// Lifecycle-only activation used by the scoped-future wrapper, which
    /// manages the ambient slot itself (per poll).
    pub(crate) fn mark_active(&self, parent: Option<&Boundary>) -> SluiceResult<()> {
        let mut st = self.inner.state.lock();
        match st.lifecycle {
            Lifecycle::Active => Err(SluiceError::state("boundary is already active")),
            Lifecycle::Released | Lifecycle::Aborted => Err(SluiceError::state(
                "cannot activate a released or aborted boundary",
            )),
            Lifecycle::Open => {
                st.parent = parent.map(|b| Arc::downgrade(&b.inner));
                st.lifecycle = Lifecycle::Active;
                Ok(())
            }
        }
    }

    /// Lifecycle-only deactivation, counterpart of `mark_active`
    pub(crate) fn mark_inactive(&self) -> SluiceResult<()> {
        let mut st = self.inner.state.lock();
        if st.lifecycle != Lifecycle::Active {
            return Err(SluiceError::state("boundary is not active"));
        }
        st.lifecycle = Lifecycle::Open;
        Ok(())
    }

    /// Admit an intent into the buffer.
    ///
    /// Runs the boundary gate's `on_admit` with the in-gate flag set; a
    /// policy violation rejects the intent and it is never buffered.
    pub(crate) fn admit(&self, intent: Intent) -> SluiceResult<()> {
        if self.lifecycle().is_terminal() {
            return Err(SluiceError::state(
                "cannot admit intents into a released or aborted boundary",
            ));
        }

        {
            let _gate_eval = context::enter_gate_eval();
            self.inner.gate.on_admit(&intent)?;
        }

        let mut st = self.inner.state.lock();
        if st.lifecycle.is_terminal() {
            return Err(SluiceError::state(
                "cannot admit intents into a released or aborted boundary",
            ));
        }
        debug!(intent = %intent, "intent admitted");
        st.buffer.push(intent);
        st.own_cache = None;
        Ok(())
    }

    /// Flush: negotiate nested capture, filter through gates, dispatch
    /// the survivors in FIFO order.
    ///
    /// The boundary is marked `Released` *before* any dispatch runs, so a
    /// dispatcher failure cannot leave it retryable - some intents may
    /// already have executed. A dispatcher error propagates immediately
    /// and the remaining intents are not attempted (fail-fast, no
    /// rollback).
    ///
    /// Returns the intents that were handed to the dispatcher.
    pub fn release(&self) -> SluiceResult<Vec<Intent>> {
        let (candidates, parent) = {
            let mut st = self.inner.state.lock();
            match st.lifecycle {
                Lifecycle::Released => {
                    return Err(SluiceError::state("boundary has already been released"))
                }
                Lifecycle::Aborted => {
                    return Err(SluiceError::state("cannot release an aborted boundary"))
                }
                Lifecycle::Active => {
                    return Err(SluiceError::state(
                        "cannot release while active; deactivate first",
                    ))
                }
                Lifecycle::Open => {}
            }
            st.lifecycle = Lifecycle::Released;
            (st.buffer.clone(), st.parent.clone())
        };

        let survivors = self.negotiate_with_ancestors(parent, candidates);

        // Capture moved intents out; the terminal buffer holds only what
        // this boundary still owned when the negotiation finished.
        {
            let mut st = self.inner.state.lock();
            st.buffer = survivors.clone();
            st.own_cache = None;
        }

        let to_dispatch = {
            let _gate_eval = context::enter_gate_eval();
            survivors
                .into_iter()
                .filter(|intent| {
                    intent
                        .local_gates()
                        .iter()
                        .rev()
                        .all(|gate| gate.releases(intent))
                        && self.inner.gate.releases(intent)
                })
                .collect::<Vec<_>>()
        };

        debug!(
            dispatching = to_dispatch.len(),
            "boundary released, dispatching survivors"
        );

        for intent in &to_dispatch {
            if let Err(error) = self.inner.dispatcher.dispatch(intent) {
                warn!(intent = %intent, error = %error, "dispatch failed, abandoning remaining intents");
                return Err(error);
            }
        }

        Ok(to_dispatch)
    }

    /// Discard all buffered intents without dispatching.
    ///
    /// Returns the discarded intents for inspection or logging.
    pub fn abort(&self) -> SluiceResult<Vec<Intent>> {
        let mut st = self.inner.state.lock();
        match st.lifecycle {
            Lifecycle::Aborted => {
                return Err(SluiceError::state("boundary has already been aborted"))
            }
            Lifecycle::Released => {
                return Err(SluiceError::state("cannot abort a released boundary"))
            }
            Lifecycle::Active => {
                return Err(SluiceError::state(
                    "cannot abort while active; deactivate first",
                ))
            }
            Lifecycle::Open => {}
        }
        st.lifecycle = Lifecycle::Aborted;
        let discarded = std::mem::take(&mut st.buffer);
        st.own_cache = None;
        debug!(discarded = discarded.len(), "boundary aborted");
        Ok(discarded)
    }

    /// Walk the ancestor chain, innermost first, offering `candidates` to
    /// each ancestor's `before_descendant_release`.
    ///
    /// Anything an ancestor does not return is captured: moved into that
    /// ancestor's buffer and removed from consideration by outer
    /// ancestors. Returns the intents this boundary may still flush. A
    /// parent whose state has already been dropped ends the negotiation;
    /// the remaining candidates flush. An ancestor that already reached a
    /// terminal state is skipped without being offered anything: its
    /// buffer is immutable and it will never dispatch again, so letting
    /// it capture would strand the intents.
    fn negotiate_with_ancestors(
        &self,
        parent: Option<Weak<BoundaryInner>>,
        candidates: Vec<Intent>,
    ) -> Vec<Intent> {
        let mut survivors = candidates;
        let mut next_parent = parent;

        while let Some(weak) = next_parent {
            let Some(inner) = weak.upgrade() else {
                break;
            };
            let ancestor = Boundary { inner };

            let skip_to = {
                let st = ancestor.inner.state.lock();
                st.lifecycle.is_terminal().then(|| st.parent.clone())
            };
            if let Some(parent_of_terminal) = skip_to {
                debug!(ancestor = ?ancestor, "skipping terminal ancestor in capture walk");
                next_parent = parent_of_terminal;
                continue;
            }

            let allowed = ancestor
                .inner
                .hooks
                .before_descendant_release(self, &survivors);

            let allowed_ids: HashSet<IntentId> = allowed.iter().map(Intent::id).collect();
            let captured: Vec<Intent> = survivors
                .iter()
                .filter(|intent| !allowed_ids.contains(&intent.id()))
                .cloned()
                .collect();

            if !captured.is_empty() {
                debug!(captured = captured.len(), "ancestor captured descendant intents");
                let mut st = ancestor.inner.state.lock();
                st.captured.extend(captured.iter().cloned());
                st.buffer.extend(captured);
                st.own_cache = None;
            }

            survivors = allowed;
            next_parent = ancestor.inner.state.lock().parent.clone();
        }

        survivors
    }
}

impl Default for Boundary {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.inner.state.lock();
        f.debug_struct("Boundary")
            .field("lifecycle", &st.lifecycle)
            .field("buffered", &st.buffer.len())
            .field("captured", &st.captured.len())
            .finish()
    }
}

/// Builder for [`Boundary`]
#[derive(Default)]
pub struct BoundaryBuilder {
    gate: Option<Arc<dyn Gate>>,
    dispatcher: Option<Arc<dyn Dispatcher>>,
    hooks: Option<Arc<dyn BoundaryHooks>>,
}

impl BoundaryBuilder {
    /// Set the boundary-level gate
    pub fn gate(mut self, gate: Arc<dyn Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Set the dispatcher used at release
    pub fn dispatcher(mut self, dispatcher: Arc<dyn Dispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Set the decision hooks
    pub fn hooks(mut self, hooks: Arc<dyn BoundaryHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Build the boundary, filling unset parts from the process-wide
    /// configuration defaults
    pub fn build(self) -> Boundary {
        Boundary {
            inner: Arc::new(BoundaryInner {
                gate: self.gate.unwrap_or_else(config::default_gate),
                dispatcher: self.dispatcher.unwrap_or_else(config::default_dispatcher),
                hooks: self.hooks.unwrap_or_else(config::default_hooks),
                state: Mutex::new(BoundaryState::default()),
            }),
        }
    }
}
