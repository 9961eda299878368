//! Lazy bridge from push-based sources into the reactive graph
//!
//! A [`ListeningSignal`] subscribes to its source on the first read and keeps
//! the subscription only while someone keeps reading. Each pushed value
//! schedules an idle check; if the value was not read before the check runs,
//! the subscription is released and the signal goes back to `None`.

use crate::reactive::graph::{untracked, Derived, Source};
use crate::reactive::scheduler::Scheduler;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Releases the external resource acquired by a setup function
pub type Teardown = Box<dyn FnOnce()>;

/// Subscription bookkeeping
#[derive(Default)]
struct AdapterState {
    subscribed: bool,
    teardown: Option<Teardown>,
    /// Incremented for every setup call; stale updates and checks compare against it
    generation: u64,
    /// Incremented whenever the derived value is re-read after a change
    reads: u64,
}

struct ListeningInner<T> {
    setup: Box<dyn Fn(Updater<T>) -> Teardown>,
    scheduler: Rc<dyn Scheduler>,
    value: Source<Option<T>>,
    state: RefCell<AdapterState>,
    setup_count: Cell<usize>,
}

impl<T: Clone + 'static> ListeningInner<T> {
    fn ensure_subscribed(self: &Rc<Self>) {
        let generation = {
            let mut state = self.state.borrow_mut();
            if state.subscribed {
                return;
            }
            state.subscribed = true;
            state.generation += 1;
            state.generation
        };

        self.setup_count.set(self.setup_count.get() + 1);
        tracing::debug!(generation, "subscribing to external source");

        let updater = Updater {
            inner: Rc::downgrade(self),
            generation,
        };
        let teardown = untracked(|| (self.setup)(updater));

        let mut state = self.state.borrow_mut();
        if state.subscribed && state.generation == generation {
            state.teardown = Some(teardown);
        } else {
            drop(state);
            teardown();
        }
    }

    fn note_read(&self) {
        self.state.borrow_mut().reads += 1;
    }

    fn push(self: &Rc<Self>, generation: u64, value: T) {
        let reads_at_update = {
            let state = self.state.borrow();
            if !state.subscribed || state.generation != generation {
                tracing::trace!(generation, "ignoring update from released subscription");
                return;
            }
            state.reads
        };

        self.value.set(Some(value));

        let weak = Rc::downgrade(self);
        self.scheduler.defer(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.idle_check(generation, reads_at_update);
            }
        }));
    }

    fn idle_check(&self, generation: u64, reads_at_update: u64) {
        let teardown = {
            let mut state = self.state.borrow_mut();
            if !state.subscribed || state.generation != generation || state.reads != reads_at_update
            {
                return;
            }
            state.subscribed = false;
            state.teardown.take()
        };

        tracing::debug!(generation, "no reads since last update, releasing source");
        self.value.set(None);
        if let Some(teardown) = teardown {
            teardown();
        }
    }
}

impl<T> Drop for ListeningInner<T> {
    fn drop(&mut self) {
        if let Some(teardown) = self.state.get_mut().teardown.take() {
            teardown();
        }
    }
}

/// Entry point handed to a setup function for pushing new values.
///
/// Updates arriving after the subscription was released are ignored.
pub struct Updater<T> {
    inner: Weak<ListeningInner<T>>,
    generation: u64,
}

impl<T> Clone for Updater<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            generation: self.generation,
        }
    }
}

impl<T: Clone + 'static> Updater<T> {
    pub fn update(&self, value: T) {
        if let Some(inner) = self.inner.upgrade() {
            inner.push(self.generation, value);
        }
    }
}

/// A reactive value fed by an external push source, subscribed on demand
pub struct ListeningSignal<T> {
    inner: Rc<ListeningInner<T>>,
    derived: Derived<Option<T>>,
}

impl<T> Clone for ListeningSignal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            derived: self.derived.clone(),
        }
    }
}

impl<T: Clone + 'static> ListeningSignal<T> {
    /// Wrap `setup`, which subscribes to the source, forwards every value to
    /// the given [`Updater`], and returns the matching teardown.
    pub fn new(
        scheduler: Rc<dyn Scheduler>,
        setup: impl Fn(Updater<T>) -> Teardown + 'static,
    ) -> Self {
        let inner = Rc::new(ListeningInner {
            setup: Box::new(setup),
            scheduler,
            value: Source::new(None),
            state: RefCell::new(AdapterState::default()),
            setup_count: Cell::new(0),
        });

        let derived = {
            let inner = inner.clone();
            Derived::new(move || {
                inner.ensure_subscribed();
                inner.note_read();
                inner.value.get()
            })
        };

        Self { inner, derived }
    }

    /// Latest pushed value, or `None` if the source has not produced one yet
    pub fn get(&self) -> Option<T> {
        self.derived.get()
    }

    pub fn is_subscribed(&self) -> bool {
        self.inner.state.borrow().subscribed
    }

    /// How many times the source has been subscribed
    pub fn setup_count(&self) -> usize {
        self.inner.setup_count.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::scheduler::LocalPoolScheduler;
    use futures::executor::LocalPool;

    /// Records what the adapter did to a fake source
    #[derive(Clone)]
    struct Probe<T> {
        updater: Rc<RefCell<Option<Updater<T>>>>,
        setups: Rc<Cell<usize>>,
        teardowns: Rc<Cell<usize>>,
    }

    impl<T: Clone + 'static> Probe<T> {
        fn push(&self, value: T) {
            let updater = self.updater.borrow().clone();
            updater.expect("source is subscribed").update(value);
        }
    }

    fn listening<T: Clone + 'static>(pool: &LocalPool) -> (ListeningSignal<T>, Probe<T>) {
        let probe = Probe {
            updater: Rc::new(RefCell::new(None)),
            setups: Rc::new(Cell::new(0)),
            teardowns: Rc::new(Cell::new(0)),
        };
        let scheduler: Rc<dyn Scheduler> = Rc::new(LocalPoolScheduler::new(pool));

        let p = probe.clone();
        let signal = ListeningSignal::new(scheduler, move |updater| {
            p.setups.set(p.setups.get() + 1);
            *p.updater.borrow_mut() = Some(updater);
            let p = p.clone();
            Box::new(move || {
                p.teardowns.set(p.teardowns.get() + 1);
                p.updater.borrow_mut().take();
            })
        });

        (signal, probe)
    }

    #[test]
    fn test_no_setup_before_first_read() {
        let pool = LocalPool::new();
        let (signal, probe) = listening::<i32>(&pool);

        assert_eq!(probe.setups.get(), 0);
        assert!(!signal.is_subscribed());
    }

    #[test]
    fn test_subscribe_once() {
        let mut pool = LocalPool::new();
        let (signal, probe) = listening::<i32>(&pool);

        for _ in 0..10 {
            assert_eq!(signal.get(), None);
        }
        assert_eq!(probe.setups.get(), 1);

        probe.push(3);
        for _ in 0..10 {
            assert_eq!(signal.get(), Some(3));
        }
        pool.run_until_stalled();

        assert_eq!(probe.setups.get(), 1);
        assert_eq!(signal.setup_count(), 1);
        assert!(signal.is_subscribed());
    }

    #[test]
    fn test_shared_by_multiple_consumers() {
        let mut pool = LocalPool::new();
        let (signal, probe) = listening::<i32>(&pool);

        let doubled = {
            let signal = signal.clone();
            Derived::new(move || signal.get().map(|v| v * 2))
        };
        let described = {
            let signal = signal.clone();
            Derived::new(move || format!("{:?}", signal.get()))
        };

        assert_eq!(doubled.get(), None);
        assert_eq!(described.get(), "None");
        probe.push(21);
        assert_eq!(doubled.get(), Some(42));
        assert_eq!(described.get(), "Some(21)");
        pool.run_until_stalled();

        assert_eq!(probe.setups.get(), 1);
        assert_eq!(probe.teardowns.get(), 0);
    }

    #[test]
    fn test_idle_check_is_deferred() {
        let mut pool = LocalPool::new();
        let (signal, probe) = listening::<i32>(&pool);

        signal.get();
        probe.push(1);
        assert_eq!(probe.teardowns.get(), 0);
        assert!(signal.is_subscribed());

        pool.run_until_stalled();
        assert_eq!(probe.teardowns.get(), 1);
    }

    #[test]
    fn test_teardown_on_idle() {
        let mut pool = LocalPool::new();
        let (signal, probe) = listening::<i32>(&pool);

        signal.get();
        probe.push(7);
        pool.run_until_stalled();

        assert_eq!(probe.teardowns.get(), 1);
        assert!(!signal.is_subscribed());

        // Next read subscribes again and starts without a value
        assert_eq!(signal.get(), None);
        assert_eq!(probe.setups.get(), 2);
        assert!(signal.is_subscribed());

        pool.run_until_stalled();
        assert_eq!(probe.teardowns.get(), 1);
    }

    #[test]
    fn test_no_teardown_on_active_use() {
        let mut pool = LocalPool::new();
        let (signal, probe) = listening::<i32>(&pool);

        signal.get();
        probe.push(1);
        assert_eq!(signal.get(), Some(1));
        pool.run_until_stalled();

        assert_eq!(probe.teardowns.get(), 0);
        assert!(signal.is_subscribed());
        assert_eq!(signal.get(), Some(1));
    }

    #[test]
    fn test_rapid_update_read_cycles_keep_subscription() {
        let mut pool = LocalPool::new();
        let (signal, probe) = listening::<i32>(&pool);

        signal.get();
        probe.push(1);
        assert_eq!(signal.get(), Some(1));
        probe.push(2);
        assert_eq!(signal.get(), Some(2));
        pool.run_until_stalled();

        assert_eq!(probe.teardowns.get(), 0);
        assert_eq!(probe.setups.get(), 1);
    }

    #[test]
    fn test_unread_final_update_releases() {
        let mut pool = LocalPool::new();
        let (signal, probe) = listening::<i32>(&pool);

        signal.get();
        probe.push(1);
        assert_eq!(signal.get(), Some(1));
        probe.push(2);
        pool.run_until_stalled();

        assert_eq!(probe.teardowns.get(), 1);
        assert!(!signal.is_subscribed());
    }

    #[test]
    fn test_stale_check_ignored_after_resubscribe() {
        let mut pool = LocalPool::new();
        let (signal, probe) = listening::<i32>(&pool);

        signal.get();
        probe.push(1);
        pool.run_until_stalled();
        assert_eq!(probe.teardowns.get(), 1);

        signal.get();
        probe.push(2);
        assert_eq!(signal.get(), Some(2));
        pool.run_until_stalled();

        assert_eq!(probe.teardowns.get(), 1);
        assert_eq!(probe.setups.get(), 2);
    }

    #[test]
    fn test_update_after_release_is_ignored() {
        let mut pool = LocalPool::new();
        let (signal, probe) = listening::<i32>(&pool);

        signal.get();
        let old_updater = probe.updater.borrow().clone().unwrap();
        old_updater.update(1);
        pool.run_until_stalled();
        assert!(!signal.is_subscribed());

        old_updater.update(99);
        assert_eq!(signal.get(), None);
    }

    #[test]
    fn test_error_values_pass_through() {
        let mut pool = LocalPool::new();
        let (signal, probe) = listening::<Result<f64, String>>(&pool);

        signal.get();
        probe.push(Err("permission denied".to_string()));
        assert_eq!(signal.get(), Some(Err("permission denied".to_string())));
        pool.run_until_stalled();
        assert!(signal.is_subscribed());
    }

    #[test]
    fn test_reads_during_setup_are_not_dependencies() {
        let pool = LocalPool::new();
        let scheduler: Rc<dyn Scheduler> = Rc::new(LocalPoolScheduler::new(&pool));
        let rate = Source::new(10);

        let signal = {
            let rate = rate.clone();
            ListeningSignal::<i32>::new(scheduler, move |_updater| {
                let _ = rate.get();
                Box::new(|| {})
            })
        };
        let runs = Rc::new(Cell::new(0));
        let consumer = {
            let (signal, runs) = (signal.clone(), runs.clone());
            Derived::new(move || {
                runs.set(runs.get() + 1);
                signal.get()
            })
        };

        assert_eq!(consumer.get(), None);
        rate.set(20);
        assert_eq!(consumer.get(), None);
        assert_eq!(runs.get(), 1);
        assert_eq!(signal.setup_count(), 1);
    }

    #[test]
    fn test_drop_releases_subscription() {
        let pool = LocalPool::new();
        let (signal, probe) = listening::<i32>(&pool);

        signal.get();
        assert_eq!(probe.teardowns.get(), 0);
        drop(signal);
        assert_eq!(probe.teardowns.get(), 1);
    }
}
