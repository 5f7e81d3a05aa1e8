//! Scoped runs - activate, run, then release or abort exactly once
//!
//! [`Boundary::run`] wraps a synchronous closure; [`ScopedFuture`] wraps a
//! future for cooperative tasks. Both deactivate the boundary when the
//! caller's code finishes and then consult
//! [`BoundaryHooks::should_release`](crate::hooks::BoundaryHooks::should_release)
//! to pick the terminal transition. A panic or a cancelled future
//! abandons the boundary: ambient state is restored, nothing dispatches.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tracing::warn;

use sluice_core::{SluiceError, SluiceResult};

use crate::boundary::Boundary;
use crate::context;

impl Boundary {
    /// Activate this boundary, run `body`, deactivate, then release or
    /// abort per the boundary's hooks.
    ///
    /// The default hooks release on `Ok` and abort on `Err`. The closure's
    /// error is returned to the caller even when the terminal transition
    /// itself fails; a release failure after a successful body surfaces as
    /// the run's error.
    pub fn run<T>(&self, body: impl FnOnce() -> SluiceResult<T>) -> SluiceResult<T> {
        self.activate()?;

        let guard = DeactivateOnUnwind { boundary: self };
        let result = body();
        std::mem::forget(guard);

        self.deactivate()?;

        let release = self.hooks().should_release(result.as_ref().err());
        let terminal = if release { self.release() } else { self.abort() };

        match (result, terminal) {
            (Ok(value), Ok(_)) => Ok(value),
            (Ok(_), Err(terminal_err)) => Err(terminal_err),
            // The body's own error wins over a failed terminal transition.
            (Err(body_err), terminal) => {
                if let Err(terminal_err) = terminal {
                    warn!(error = %terminal_err, "terminal transition failed after scoped body error");
                }
                Err(body_err)
            }
        }
    }
}

/// Create a boundary from the process-wide defaults and run `body` inside
/// it.
///
/// The common entry point for code that does not need a custom gate or
/// dispatcher; see [`Boundary::builder`] for the explicit form.
pub fn run_scoped<T>(body: impl FnOnce() -> SluiceResult<T>) -> SluiceResult<T> {
    Boundary::default().run(body)
}

/// Restores ambient state if the scoped body panics. Forgotten on the
/// normal path; the boundary is abandoned, never released.
struct DeactivateOnUnwind<'a> {
    boundary: &'a Boundary,
}

impl Drop for DeactivateOnUnwind<'_> {
    fn drop(&mut self) {
        if let Err(error) = self.boundary.deactivate() {
            warn!(error = %error, "failed to deactivate boundary while unwinding");
        }
    }
}

/// A future running inside a boundary.
///
/// Every poll installs the boundary in the ambient slot and restores the
/// prior value before returning to the executor, so tasks interleaved on
/// the same thread never observe each other's boundary. When the inner
/// future completes, the boundary is deactivated and released or aborted
/// per its hooks. Dropping the future mid-flight abandons the boundary
/// with clean ambient state.
pub struct ScopedFuture<T> {
    inner: Pin<Box<dyn Future<Output = SluiceResult<T>> + Send>>,
    boundary: Boundary,
    started: bool,
    finished: bool,
}

impl<T> ScopedFuture<T> {
    /// Wrap `future` so it runs inside `boundary`
    pub fn new(
        boundary: Boundary,
        future: impl Future<Output = SluiceResult<T>> + Send + 'static,
    ) -> Self {
        Self {
            inner: Box::pin(future),
            boundary,
            started: false,
            finished: false,
        }
    }

    /// The boundary this future runs inside
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    fn finish(&mut self, result: SluiceResult<T>) -> SluiceResult<T> {
        self.finished = true;
        if let Err(error) = self.boundary.mark_inactive() {
            return Err(error);
        }

        let release = self.boundary.hooks().should_release(result.as_ref().err());
        let terminal = if release {
            self.boundary.release()
        } else {
            self.boundary.abort()
        };

        match (result, terminal) {
            (Ok(value), Ok(_)) => Ok(value),
            (Ok(_), Err(terminal_err)) => Err(terminal_err),
            (Err(body_err), terminal) => {
                if let Err(terminal_err) = terminal {
                    warn!(error = %terminal_err, "terminal transition failed after scoped future error");
                }
                Err(body_err)
            }
        }
    }
}

impl<T> Future for ScopedFuture<T> {
    type Output = SluiceResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(Err(SluiceError::usage(
                "scoped future polled after completion",
            )));
        }

        let prior = context::swap_current(Some(this.boundary.clone()));

        if !this.started {
            // First poll: record the enclosing boundary (if any) as parent
            // and enter the Active interval.
            if let Err(error) = this.boundary.mark_active(prior.as_ref()) {
                context::set_current(prior);
                this.finished = true;
                return Poll::Ready(Err(error));
            }
            this.started = true;
        }

        let polled = this.inner.as_mut().poll(cx);
        context::set_current(prior);

        match polled {
            Poll::Pending => Poll::Pending,
            Poll::Ready(result) => Poll::Ready(this.finish(result)),
        }
    }
}

impl<T> Drop for ScopedFuture<T> {
    fn drop(&mut self) {
        // Cancelled mid-boundary: the ambient slot is already clean (every
        // poll restores it), the buffered intents are abandoned.
        if self.started && !self.finished {
            if let Err(error) = self.boundary.mark_inactive() {
                warn!(error = %error, "failed to close boundary of cancelled scoped future");
            }
        }
    }
}

/// Extension trait attaching [`ScopedFuture`] to any compatible future
pub trait ScopedFutureExt<T>: Future<Output = SluiceResult<T>> + Send + Sized + 'static {
    /// Run this future inside `boundary`
    fn in_boundary(self, boundary: Boundary) -> ScopedFuture<T> {
        ScopedFuture::new(boundary, self)
    }
}

impl<T, F> ScopedFutureExt<T> for F where F: Future<Output = SluiceResult<T>> + Send + Sized + 'static {}
