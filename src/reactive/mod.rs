//! Minimal reactive substrate
//!
//! Pull-based values that a rendering layer reads synchronously, plus two
//! adapters that bridge push-based sources into them:
//!
//! - [`Source`] / [`Derived`]: mutable cells and memoized, auto-tracked
//!   computations over them.
//! - [`ListeningSignal`]: subscribes to an external source only while
//!   someone keeps reading it.
//! - [`AsyncComputed`]: runs an async computation per input change and keeps
//!   the freshest result by sequence number.
//!
//! Everything here is single threaded (`Rc`/`RefCell`); deferred work goes
//! through a [`Scheduler`].

pub mod graph;
pub mod scheduler;
pub mod listening;
pub mod async_computed;

pub use graph::{untracked, Derived, Source};
pub use scheduler::{LocalPoolScheduler, Scheduler, TokioScheduler};
pub use listening::{ListeningSignal, Teardown, Updater};
pub use async_computed::AsyncComputed;
