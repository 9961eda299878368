//! Deferred task execution for the reactive adapters
//!
//! Adapters never run follow-up work inline: idle checks and async
//! derivations are handed to a [`Scheduler`] and run after the current turn.

use futures::executor::{LocalPool, LocalSpawner};
use futures::future::{FutureExt, LocalBoxFuture};
use futures::task::LocalSpawnExt;

/// Single-threaded executor seam used by the adapters
pub trait Scheduler {
    /// Run `task` after the current turn, never synchronously
    fn defer(&self, task: Box<dyn FnOnce()>);

    /// Drive `future` to completion on the local executor
    fn spawn(&self, future: LocalBoxFuture<'static, ()>);
}

/// Scheduler backed by a `futures` [`LocalPool`].
///
/// Deferred work only runs when the owner drives the pool, e.g. with
/// `run_until_stalled`, which makes turn boundaries explicit.
#[derive(Clone)]
pub struct LocalPoolScheduler {
    spawner: LocalSpawner,
}

impl LocalPoolScheduler {
    pub fn new(pool: &LocalPool) -> Self {
        Self {
            spawner: pool.spawner(),
        }
    }
}

impl Scheduler for LocalPoolScheduler {
    fn defer(&self, task: Box<dyn FnOnce()>) {
        self.spawn(async move { task() }.boxed_local());
    }

    fn spawn(&self, future: LocalBoxFuture<'static, ()>) {
        if let Err(e) = self.spawner.spawn_local(future) {
            tracing::error!("local pool rejected task: {}", e);
        }
    }
}

/// Scheduler backed by `tokio::task::spawn_local`.
///
/// Must be used from inside a `tokio::task::LocalSet`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn defer(&self, task: Box<dyn FnOnce()>) {
        tokio::task::spawn_local(async move { task() });
    }

    fn spawn(&self, future: LocalBoxFuture<'static, ()>) {
        tokio::task::spawn_local(future);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_local_pool_defers_until_driven() {
        let mut pool = LocalPool::new();
        let scheduler = LocalPoolScheduler::new(&pool);
        let ran = Rc::new(Cell::new(false));

        let flag = ran.clone();
        scheduler.defer(Box::new(move || flag.set(true)));
        assert!(!ran.get());

        pool.run_until_stalled();
        assert!(ran.get());
    }

    #[tokio::test]
    async fn test_tokio_scheduler_runs_after_yield() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let ran = Rc::new(Cell::new(false));
                let flag = ran.clone();
                TokioScheduler.defer(Box::new(move || flag.set(true)));
                assert!(!ran.get());

                tokio::task::yield_now().await;
                assert!(ran.get());
            })
            .await;
    }
}
