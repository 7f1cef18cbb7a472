//! Context variables backed by per-execution-context frames.
//!
//! Every execution context owns a frame mapping variable ids to values.
//! Frames live in a tokio task-local while a [`ContextVar::scope`] future is
//! being polled, and in a thread-local otherwise. A scope starts from a copy
//! of the frame that was current when it was created, so nested scopes
//! inherit values but never write back into their parent.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{trace, warn};

use crate::error::ContextError;

type Slot = Arc<dyn Any + Send + Sync>;

static NEXT_VAR_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_FRAME_ID: AtomicU64 = AtomicU64::new(1);

/// Values visible to one execution context.
struct Frame {
    id: u64,
    values: HashMap<u64, Slot>,
}

impl Frame {
    fn empty() -> Self {
        Self {
            id: NEXT_FRAME_ID.fetch_add(1, Ordering::Relaxed),
            values: HashMap::new(),
        }
    }

    fn fork(&self) -> Self {
        Self {
            id: NEXT_FRAME_ID.fetch_add(1, Ordering::Relaxed),
            values: self.values.clone(),
        }
    }
}

tokio::task_local! {
    static TASK_FRAME: RefCell<Frame>;
}

thread_local! {
    static THREAD_FRAME: RefCell<Frame> = RefCell::new(Frame::empty());
}

/// Refuse writes that would land in a thread frame shared by every task on
/// this worker. Inside a tokio runtime only a scope gives a private frame.
fn ensure_private_frame(name: &'static str) -> Result<(), ContextError> {
    if TASK_FRAME.try_with(|_| ()).is_err() && tokio::runtime::Handle::try_current().is_ok() {
        return Err(ContextError::NoScope { name });
    }
    Ok(())
}

/// Run `f` against the frame of the calling execution context.
///
/// `f` must not call back into this module; values displaced from the frame
/// are returned to the caller and dropped outside the borrow.
fn with_frame<R>(f: impl FnOnce(&mut Frame) -> R) -> R {
    if TASK_FRAME.try_with(|_| ()).is_ok() {
        TASK_FRAME.with(|frame| f(&mut frame.borrow_mut()))
    } else {
        THREAD_FRAME.with(|frame| f(&mut frame.borrow_mut()))
    }
}

/// A value slot scoped to the current execution context.
///
/// Values are shared as `Arc<T>`, so `get` never clones the value itself.
pub struct ContextVar<T> {
    id: u64,
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> ContextVar<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            id: NEXT_VAR_ID.fetch_add(1, Ordering::Relaxed),
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Install `value` for the calling execution context.
    ///
    /// The returned token remembers the previous value and must be handed
    /// back to [`reset`](Self::reset). Prefer [`enter`](Self::enter) or
    /// [`scope`](Self::scope), which cannot forget to.
    ///
    /// On a tokio runtime this fails with [`ContextError::NoScope`] unless
    /// called inside [`scope`](Self::scope) or [`sync_scope`](Self::sync_scope):
    /// tasks sharing a worker thread would otherwise share the value.
    pub fn set(&self, value: T) -> Result<Token<T>, ContextError> {
        ensure_private_frame(self.name)?;
        let value: Slot = Arc::new(value);
        let (frame_id, previous) =
            with_frame(|frame| (frame.id, frame.values.insert(self.id, value)));

        trace!(var = self.name, frame = frame_id, "context var set");

        Ok(Token {
            var_id: self.id,
            frame_id,
            previous,
            _marker: PhantomData,
        })
    }

    /// Current value, or [`ContextError::Unset`].
    pub fn get(&self) -> Result<Arc<T>, ContextError> {
        self.try_get().ok_or(ContextError::Unset { name: self.name })
    }

    pub fn try_get(&self) -> Option<Arc<T>> {
        let slot = with_frame(|frame| frame.values.get(&self.id).cloned())?;
        slot.downcast::<T>().ok()
    }

    pub fn is_set(&self) -> bool {
        with_frame(|frame| frame.values.contains_key(&self.id))
    }

    /// Undo the `set` that produced `token`, restoring whatever was current
    /// immediately before it (possibly nothing).
    pub fn reset(&self, token: Token<T>) -> Result<(), ContextError> {
        if token.var_id != self.id {
            return Err(ContextError::ForeignToken { name: self.name });
        }

        let Token { frame_id, previous, .. } = token;
        let displaced = with_frame(|frame| {
            if frame.id != frame_id {
                return Err(ContextError::WrongContext { name: self.name });
            }
            Ok(match previous {
                Some(prev) => frame.values.insert(self.id, prev),
                None => frame.values.remove(&self.id),
            })
        })?;
        drop(displaced);

        trace!(var = self.name, frame = frame_id, "context var reset");
        Ok(())
    }

    /// Install `value` until the returned guard is dropped.
    ///
    /// The guard resets on every exit path: normal return, `?`, and unwinding.
    pub fn enter(&self, value: T) -> Result<ContextGuard<'_, T>, ContextError> {
        Ok(ContextGuard {
            var: self,
            token: Some(self.set(value)?),
        })
    }

    /// Run `future` in a fresh execution context with `value` installed.
    ///
    /// The new context starts as a copy of the caller's. It is discarded when
    /// the future completes or is dropped, so nothing set inside can outlive
    /// the scope, including when the future is cancelled mid-flight.
    pub fn scope<F>(&self, value: T, future: F) -> impl Future<Output = F::Output> + use<T, F>
    where
        F: Future,
    {
        let frame = self.forked_with(value);
        TASK_FRAME.scope(RefCell::new(frame), future)
    }

    /// Synchronous counterpart of [`scope`](Self::scope).
    pub fn sync_scope<R>(&self, value: T, f: impl FnOnce() -> R) -> R {
        let frame = self.forked_with(value);
        TASK_FRAME.sync_scope(RefCell::new(frame), f)
    }

    fn forked_with(&self, value: T) -> Frame {
        let mut frame = with_frame(|frame| frame.fork());
        frame.values.insert(self.id, Arc::new(value));
        trace!(var = self.name, frame = frame.id, "context scope entered");
        frame
    }
}

impl<T> fmt::Debug for ContextVar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextVar")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

/// Receipt for a [`ContextVar::set`]. Consumed by [`ContextVar::reset`].
#[must_use = "pass the token to `ContextVar::reset` or the value leaks into later work"]
pub struct Token<T> {
    var_id: u64,
    frame_id: u64,
    previous: Option<Slot>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Token<T> {
    /// Whether a value was installed before the matching `set`.
    pub fn had_previous(&self) -> bool {
        self.previous.is_some()
    }
}

impl<T> fmt::Debug for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("var_id", &self.var_id)
            .field("frame_id", &self.frame_id)
            .field("had_previous", &self.previous.is_some())
            .finish()
    }
}

/// Resets its variable when dropped. Returned by [`ContextVar::enter`].
#[must_use = "dropping the guard immediately resets the variable"]
pub struct ContextGuard<'a, T: Send + Sync + 'static> {
    var: &'a ContextVar<T>,
    token: Option<Token<T>>,
}

impl<T: Send + Sync + 'static> ContextGuard<'_, T> {
    /// Reset now and report the outcome instead of logging it.
    pub fn release(mut self) -> Result<(), ContextError> {
        match self.token.take() {
            Some(token) => self.var.reset(token),
            None => Ok(()),
        }
    }
}

impl<T: Send + Sync + 'static> Drop for ContextGuard<'_, T> {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            if let Err(e) = self.var.reset(token) {
                warn!(var = self.var.name, "failed to reset context var: {e}");
            }
        }
    }
}
