//! Dependency-tracked reactive values
//!
//! A [`Source`] is a mutable cell with a version counter. A [`Derived`] runs a
//! closure under a tracking frame, remembers every value it read together with
//! the version it saw, and recomputes on the next read only if one of those
//! versions moved. Nothing is pushed: staleness is discovered when pulled.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Anything a derived computation can depend on
trait Node {
    /// Bring the node up to date and report its version
    fn current_version(&self) -> u64;
}

#[derive(Clone)]
struct Dependency {
    node: Rc<dyn Node>,
    version: u64,
}

thread_local! {
    /// One frame per derived computation currently evaluating.
    /// `None` frames come from [`untracked`] and swallow reads.
    static FRAMES: RefCell<Vec<Option<Vec<Dependency>>>> = RefCell::new(Vec::new());
}

/// Pops the frame it pushed, also when the computation panics
struct FrameGuard;

impl FrameGuard {
    fn push(frame: Option<Vec<Dependency>>) -> Self {
        FRAMES.with(|frames| frames.borrow_mut().push(frame));
        FrameGuard
    }

    fn finish(self) -> Vec<Dependency> {
        let deps = FRAMES.with(|frames| frames.borrow_mut().pop().flatten());
        std::mem::forget(self);
        deps.unwrap_or_default()
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        FRAMES.with(|frames| {
            frames.borrow_mut().pop();
        });
    }
}

fn track(node: Rc<dyn Node>, version: u64) {
    FRAMES.with(|frames| {
        if let Some(Some(deps)) = frames.borrow_mut().last_mut() {
            deps.push(Dependency { node, version });
        }
    });
}

/// Run `f` without recording any reads as dependencies
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    let guard = FrameGuard::push(None);
    let result = f();
    drop(guard);
    result
}

struct SourceInner<T> {
    value: RefCell<T>,
    version: Cell<u64>,
}

impl<T> Node for SourceInner<T> {
    fn current_version(&self) -> u64 {
        self.version.get()
    }
}

/// A mutable reactive cell
pub struct Source<T> {
    inner: Rc<SourceInner<T>>,
}

impl<T> Clone for Source<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> Source<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(SourceInner {
                value: RefCell::new(value),
                version: Cell::new(0),
            }),
        }
    }

    /// Borrow the value, recording the read in the active computation
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        track(self.inner.clone(), self.inner.version.get());
        f(&self.inner.value.borrow())
    }

    /// Borrow the value without recording a dependency
    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replace the value. Every call counts as a change.
    pub fn set(&self, value: T) {
        *self.inner.value.borrow_mut() = value;
        self.bump();
    }

    /// Mutate the value in place
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = f(&mut self.inner.value.borrow_mut());
        self.bump();
        result
    }

    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    fn bump(&self) {
        self.inner.version.set(self.inner.version.get() + 1);
    }
}

impl<T: Clone + 'static> Source<T> {
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    pub fn get_untracked(&self) -> T {
        self.with_untracked(T::clone)
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for Source<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("value", &*self.inner.value.borrow())
            .field("version", &self.inner.version.get())
            .finish()
    }
}

struct Memo<T> {
    value: T,
    deps: Vec<Dependency>,
}

struct DerivedInner<T> {
    compute: Box<dyn Fn() -> T>,
    memo: RefCell<Option<Memo<T>>>,
    version: Cell<u64>,
}

impl<T> DerivedInner<T> {
    fn is_stale(&self) -> bool {
        // Clone the dependency list so that refreshing a dependency never
        // observes this node's memo borrowed.
        let deps = match self.memo.borrow().as_ref() {
            None => return true,
            Some(memo) => memo.deps.clone(),
        };
        deps.iter()
            .any(|dep| dep.node.current_version() != dep.version)
    }

    fn refresh(&self) {
        if !self.is_stale() {
            return;
        }

        let guard = FrameGuard::push(Some(Vec::new()));
        let value = (self.compute)();
        let deps = guard.finish();

        *self.memo.borrow_mut() = Some(Memo { value, deps });
        self.version.set(self.version.get() + 1);
    }
}

impl<T> Node for DerivedInner<T> {
    fn current_version(&self) -> u64 {
        self.refresh();
        self.version.get()
    }
}

/// A memoized computation over other reactive values.
///
/// Evaluation is lazy: nothing runs until the first read.
pub struct Derived<T> {
    inner: Rc<DerivedInner<T>>,
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> Derived<T> {
    pub fn new(compute: impl Fn() -> T + 'static) -> Self {
        Self {
            inner: Rc::new(DerivedInner {
                compute: Box::new(compute),
                memo: RefCell::new(None),
                version: Cell::new(0),
            }),
        }
    }

    /// Borrow the up-to-date value, recording the read in the active computation
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.refresh();
        track(self.inner.clone(), self.inner.version.get());

        let memo = self.inner.memo.borrow();
        let memo = memo.as_ref().expect("refresh always leaves a memoized value");
        f(&memo.value)
    }

    /// Number of evaluations so far
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }
}

impl<T: Clone + 'static> Derived<T> {
    pub fn get(&self) -> T {
        self.with(T::clone)
    }
}

impl<T: 'static> fmt::Debug for Derived<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Derived")
            .field("version", &self.inner.version.get())
            .field("evaluated", &self.inner.memo.borrow().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_get_set() {
        let source = Source::new(1);
        assert_eq!(source.get(), 1);
        assert_eq!(source.version(), 0);

        source.set(5);
        assert_eq!(source.get(), 5);
        assert_eq!(source.version(), 1);

        source.update(|v| *v += 1);
        assert_eq!(source.get(), 6);
        assert_eq!(source.version(), 2);
    }

    #[test]
    fn test_derived_is_lazy_and_memoized() {
        let runs = Rc::new(Cell::new(0));
        let source = Source::new(2);

        let doubled = {
            let runs = runs.clone();
            let source = source.clone();
            Derived::new(move || {
                runs.set(runs.get() + 1);
                source.get() * 2
            })
        };

        assert_eq!(runs.get(), 0);
        assert_eq!(doubled.get(), 4);
        assert_eq!(doubled.get(), 4);
        assert_eq!(runs.get(), 1);

        source.set(10);
        assert_eq!(runs.get(), 1);
        assert_eq!(doubled.get(), 20);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_derived_chain_tracks_through_levels() {
        let source = Source::new(1);
        let plus_one = {
            let source = source.clone();
            Derived::new(move || source.get() + 1)
        };
        let times_ten = {
            let plus_one = plus_one.clone();
            Derived::new(move || plus_one.get() * 10)
        };

        assert_eq!(times_ten.get(), 20);
        source.set(4);
        assert_eq!(times_ten.get(), 50);
        assert_eq!(plus_one.version(), 2);
    }

    #[test]
    fn test_untracked_read_does_not_invalidate() {
        let tracked = Source::new(1);
        let ignored = Source::new(100);
        let runs = Rc::new(Cell::new(0));

        let sum = {
            let tracked = tracked.clone();
            let ignored = ignored.clone();
            let runs = runs.clone();
            Derived::new(move || {
                runs.set(runs.get() + 1);
                tracked.get() + untracked(|| ignored.get())
            })
        };

        assert_eq!(sum.get(), 101);
        ignored.set(200);
        assert_eq!(sum.get(), 101);
        assert_eq!(runs.get(), 1);

        tracked.set(2);
        assert_eq!(sum.get(), 202);
    }

    #[test]
    fn test_dependencies_are_dynamic() {
        let use_left = Source::new(true);
        let left = Source::new("left");
        let right = Source::new("right");
        let runs = Rc::new(Cell::new(0));

        let pick = {
            let (use_left, left, right, runs) =
                (use_left.clone(), left.clone(), right.clone(), runs.clone());
            Derived::new(move || {
                runs.set(runs.get() + 1);
                if use_left.get() {
                    left.get()
                } else {
                    right.get()
                }
            })
        };

        assert_eq!(pick.get(), "left");
        right.set("RIGHT");
        assert_eq!(pick.get(), "left");
        assert_eq!(runs.get(), 1);

        use_left.set(false);
        assert_eq!(pick.get(), "RIGHT");
        left.set("LEFT");
        assert_eq!(pick.get(), "RIGHT");
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_reads_outside_derived_are_not_tracked() {
        let source = Source::new(vec![1, 2, 3]);
        let total = source.with(|v| v.iter().sum::<i32>());
        assert_eq!(total, 6);
        FRAMES.with(|frames| assert!(frames.borrow().is_empty()));
    }
}
