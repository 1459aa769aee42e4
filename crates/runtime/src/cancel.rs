use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Monotonically increasing request number.
///
/// Only the *active* generation of a [`GenerationCell`] may act on the shared
/// state; every older generation is superseded and must stop at its next
/// checkpoint.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

#[derive(Debug)]
struct Slot<S> {
    latest: u64,
    active: Option<u64>,
    state: S,
}

/// Shared state plus a generation counter behind one mutex.
///
/// `begin` supersedes whatever generation was active, `cancel` ends it without
/// starting a new one. All waits are condition-variable waits that wake up as
/// soon as the generation they belong to stops being active.
///
/// The lock is only held for the duration of a closure passed to one of the
/// accessors, so callers can never hold it across a blocking call.
#[derive(Debug)]
pub struct GenerationCell<S> {
    slot: Mutex<Slot<S>>,
    changed: Condvar,
}

impl<S> GenerationCell<S> {
    pub fn new(state: S) -> Self {
        Self {
            slot: Mutex::new(Slot {
                latest: 0,
                active: None,
                state,
            }),
            changed: Condvar::new(),
        }
    }

    /// Start a new generation, superseding the active one (if any).
    pub fn begin(&self) -> Generation {
        self.begin_with(|_| ())
    }

    /// Like [`GenerationCell::begin`], applying `f` under the same lock.
    pub fn begin_with(&self, f: impl FnOnce(&mut S)) -> Generation {
        let generation = {
            let mut slot = self.slot.lock();
            slot.latest = slot.latest.wrapping_add(1);
            slot.active = Some(slot.latest);
            f(&mut slot.state);
            Generation(slot.latest)
        };
        self.changed.notify_all();
        generation
    }

    /// End the active generation. Returns the generation that was active.
    ///
    /// Calling this with nothing active is a no-op.
    pub fn cancel_with(&self, f: impl FnOnce(&mut S)) -> Option<Generation> {
        let previous = {
            let mut slot = self.slot.lock();
            let previous = slot.active.take().map(Generation);
            f(&mut slot.state);
            previous
        };
        self.changed.notify_all();
        previous
    }

    /// End `generation` if it is still the active one.
    pub fn finish_with(&self, generation: Generation, f: impl FnOnce(&mut S)) -> bool {
        let finished = {
            let mut slot = self.slot.lock();
            if slot.active == Some(generation.0) {
                slot.active = None;
                f(&mut slot.state);
                true
            } else {
                false
            }
        };
        if finished {
            self.changed.notify_all();
        }
        finished
    }

    pub fn is_active(&self, generation: Generation) -> bool {
        self.slot.lock().active == Some(generation.0)
    }

    pub fn active(&self) -> Option<Generation> {
        self.slot.lock().active.map(Generation)
    }

    /// Mutate the state on behalf of `generation`.
    ///
    /// Returns `None` without running `f` if the generation was superseded.
    pub fn update<R>(&self, generation: Generation, f: impl FnOnce(&mut S) -> R) -> Option<R> {
        let out = {
            let mut slot = self.slot.lock();
            if slot.active != Some(generation.0) {
                return None;
            }
            f(&mut slot.state)
        };
        self.changed.notify_all();
        Some(out)
    }

    /// Mutate the state regardless of which generation is active.
    ///
    /// Meant for cleanup paths that must run even after being superseded.
    pub fn update_always<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let out = f(&mut self.slot.lock().state);
        self.changed.notify_all();
        out
    }

    /// Read the state together with the active generation.
    pub fn read<R>(&self, f: impl FnOnce(Option<Generation>, &S) -> R) -> R {
        let slot = self.slot.lock();
        f(slot.active.map(Generation), &slot.state)
    }

    /// Block while `generation` is active and `condition` holds.
    ///
    /// Returns `true` if the condition cleared while the generation was still
    /// active, `false` if the generation was superseded or cancelled.
    pub fn wait_while(&self, generation: Generation, mut condition: impl FnMut(&S) -> bool) -> bool {
        let mut slot = self.slot.lock();
        while slot.active == Some(generation.0) && condition(&slot.state) {
            self.changed.wait(&mut slot);
        }
        slot.active == Some(generation.0)
    }

    /// Sleep up to `timeout`, waking early if `generation` stops being active.
    ///
    /// Returns `true` if the generation is no longer active.
    pub fn wait_cancelled_for(&self, generation: Generation, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut slot = self.slot.lock();
        while slot.active == Some(generation.0) {
            if self.changed.wait_until(&mut slot, deadline).timed_out() {
                break;
            }
        }
        slot.active != Some(generation.0)
    }
}

impl<S: Send + 'static> GenerationCell<S> {
    /// A token that reports cancellation once `generation` is no longer active.
    pub fn token(self: &Arc<Self>, generation: Generation) -> CancellationToken {
        CancellationToken {
            source: Source::Generation(Arc::clone(self) as Arc<dyn Supersedable>, generation),
        }
    }
}

/// Anything that can tell whether a generation is still the active one.
pub trait Supersedable: Send + Sync {
    fn is_current(&self, generation: Generation) -> bool;
}

impl<S: Send> Supersedable for GenerationCell<S> {
    fn is_current(&self, generation: Generation) -> bool {
        self.is_active(generation)
    }
}

#[derive(Clone)]
enum Source {
    Never,
    Cancelled,
    Generation(Arc<dyn Supersedable>, Generation),
}

/// Cooperative cancellation handed to long-running calls.
///
/// Callees poll [`CancellationToken::is_cancelled`] between units of work and
/// return early once it flips. Nothing is interrupted forcibly.
#[derive(Clone)]
pub struct CancellationToken {
    source: Source,
}

impl CancellationToken {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        Self {
            source: Source::Never,
        }
    }

    /// A token that is already cancelled.
    pub fn cancelled() -> Self {
        Self {
            source: Source::Cancelled,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        match &self.source {
            Source::Never => false,
            Source::Cancelled => true,
            Source::Generation(source, generation) => !source.is_current(*generation),
        }
    }

    pub fn generation(&self) -> Option<Generation> {
        match &self.source {
            Source::Generation(_, generation) => Some(*generation),
            Source::Never | Source::Cancelled => None,
        }
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("generation", &self.generation())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
