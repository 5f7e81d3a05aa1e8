//! Ambient context propagation
//!
//! Per-logical-task slots that let `request()` find the current boundary
//! without explicit parameter threading. Three slots follow the same
//! isolation contract: the active boundary, the "currently evaluating a
//! gate" flag, and the local-gate stack.
//!
//! Each OS thread owns an independent logical copy of every slot
//! (`std::thread_local!`), never a process-wide shared cell, so
//! concurrently executing units of work cannot observe each other's
//! boundary. Cooperative tasks get the same guarantee from
//! [`ScopedFuture`](crate::scope::ScopedFuture), which enters the slot on
//! every poll and restores the prior value before returning to the
//! executor.

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use sluice_core::Gate;

use crate::boundary::Boundary;

thread_local! {
    static CURRENT_BOUNDARY: RefCell<Option<Boundary>> = const { RefCell::new(None) };
    static IN_GATE: Cell<bool> = const { Cell::new(false) };
    static LOCAL_GATES: RefCell<Vec<Arc<dyn Gate>>> = const { RefCell::new(Vec::new()) };
}

/// The boundary currently receiving requests on this logical task, if any
pub fn current_boundary() -> Option<Boundary> {
    CURRENT_BOUNDARY.with(|slot| slot.borrow().clone())
}

/// Replace the current-boundary slot, returning the prior value.
///
/// Callers must restore the returned value when their interval ends;
/// activation/deactivation and the scoped-future poll wrapper are the only
/// users.
pub(crate) fn swap_current(next: Option<Boundary>) -> Option<Boundary> {
    CURRENT_BOUNDARY.with(|slot| slot.replace(next))
}

/// Restore a previously saved slot value
pub(crate) fn set_current(value: Option<Boundary>) {
    CURRENT_BOUNDARY.with(|slot| *slot.borrow_mut() = value);
}

/// True while a gate callback is running on this logical task
pub(crate) fn in_gate() -> bool {
    IN_GATE.with(Cell::get)
}

/// Marks the current task as evaluating gates until dropped.
///
/// While the guard lives, `request()` fails with a usage error: gates may
/// judge intents but must never create them.
pub(crate) struct GateEvalGuard {
    prior: bool,
}

pub(crate) fn enter_gate_eval() -> GateEvalGuard {
    let prior = IN_GATE.with(|flag| flag.replace(true));
    GateEvalGuard { prior }
}

impl Drop for GateEvalGuard {
    fn drop(&mut self) {
        let prior = self.prior;
        IN_GATE.with(|flag| flag.set(prior));
    }
}

/// Snapshot the local-gate stack, outermost first
pub(crate) fn snapshot_local_gates() -> Vec<Arc<dyn Gate>> {
    LOCAL_GATES.with(|stack| stack.borrow().clone())
}

/// Run `body` with an extra local gate pushed onto the ambient stack.
///
/// Does not create a new buffer: intents requested during `body` still go
/// to the enclosing boundary, but they snapshot the pushed gate and apply
/// it at release time. The stack is restored when `body` returns or
/// panics.
pub fn with_local_gate<T>(gate: Arc<dyn Gate>, body: impl FnOnce() -> T) -> T {
    LOCAL_GATES.with(|stack| stack.borrow_mut().push(gate));
    let _guard = LocalGateGuard;
    body()
}

struct LocalGateGuard;

impl Drop for LocalGateGuard {
    fn drop(&mut self) {
        LOCAL_GATES.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}
