//! Async derivations with stale-result suppression
//!
//! There is no cancellation: every input change starts a new computation and
//! superseded ones run to completion. Each run carries a sequence number and
//! only a result newer than the last applied one is kept.

use crate::reactive::graph::{untracked, Derived, Source};
use crate::reactive::scheduler::Scheduler;
use futures::future::FutureExt;
use std::cell::Cell;
use std::fmt::Display;
use std::future::Future;
use std::rc::Rc;

struct AsyncInner<T> {
    output: Source<Option<T>>,
    started: Cell<u64>,
    applied: Cell<u64>,
}

impl<T: Clone + 'static> AsyncInner<T> {
    fn next_sequence(&self) -> u64 {
        let sequence = self.started.get() + 1;
        self.started.set(sequence);
        sequence
    }

    fn apply(&self, sequence: u64, value: T) {
        if sequence <= self.applied.get() {
            tracing::debug!(
                sequence,
                applied = self.applied.get(),
                "discarding stale async result"
            );
            return;
        }
        self.applied.set(sequence);
        self.output.set(Some(value));
    }
}

/// A reactive value computed asynchronously from an input
pub struct AsyncComputed<T> {
    inner: Rc<AsyncInner<T>>,
    derived: Derived<Option<T>>,
}

impl<T> Clone for AsyncComputed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            derived: self.derived.clone(),
        }
    }
}

impl<T: Clone + 'static> AsyncComputed<T> {
    /// `input` is evaluated as a tracked reactive read; whenever what it read
    /// changes, the next read of this value starts `compute` on its result.
    pub fn new<S, F, Fut, E>(
        scheduler: Rc<dyn Scheduler>,
        input: impl Fn() -> S + 'static,
        compute: F,
    ) -> Self
    where
        S: 'static,
        F: Fn(S) -> Fut + 'static,
        Fut: Future<Output = Result<T, E>> + 'static,
        E: Display + 'static,
    {
        let inner = Rc::new(AsyncInner {
            output: Source::new(None),
            started: Cell::new(0),
            applied: Cell::new(0),
        });

        let launcher = {
            let inner = inner.clone();
            Derived::new(move || {
                let state = input();
                let sequence = inner.next_sequence();
                let pending = untracked(|| compute(state));

                let weak = Rc::downgrade(&inner);
                scheduler.spawn(
                    async move {
                        match pending.await {
                            Ok(value) => {
                                if let Some(inner) = weak.upgrade() {
                                    inner.apply(sequence, value);
                                }
                            }
                            Err(e) => {
                                tracing::warn!(sequence, "async computation failed: {}", e);
                            }
                        }
                    }
                    .boxed_local(),
                );
                sequence
            })
        };

        let derived = {
            let inner = inner.clone();
            Derived::new(move || {
                launcher.get();
                inner.output.get()
            })
        };

        Self { inner, derived }
    }

    /// Freshest applied result, `None` until one succeeds
    pub fn get(&self) -> Option<T> {
        self.derived.get()
    }

    /// Sequence number of the most recently started computation
    pub fn latest_started(&self) -> u64 {
        self.inner.started.get()
    }

    /// Sequence number of the result currently exposed, 0 if none
    pub fn latest_applied(&self) -> u64 {
        self.inner.applied.get()
    }
}
