//! Push source trait and the bridge into the reactive graph

use crate::reactive::{ListeningSignal, Scheduler, Teardown};
use std::rc::Rc;

/// Callback invoked for every value a source produces
pub type Listener<T> = Rc<dyn Fn(T)>;

/// Listener registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u32);

impl ListenerHandle {
    pub fn new(id: u32) -> Self {
        ListenerHandle(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Abstraction over push-based sensor APIs (orientation events, position watches)
pub trait EventSource<T> {
    /// Start delivering values to `listener`
    fn register_listener(&self, listener: Listener<T>) -> ListenerHandle;

    /// Stop delivering values; returns false for unknown handles
    fn unregister_listener(&self, handle: ListenerHandle) -> bool;
}

/// Bridge a push source into a lazily subscribed reactive value
pub fn listen<T, S>(scheduler: Rc<dyn Scheduler>, source: Rc<S>) -> ListeningSignal<T>
where
    T: Clone + 'static,
    S: EventSource<T> + ?Sized + 'static,
{
    ListeningSignal::new(scheduler, move |updater| {
        let handle = source.register_listener(Rc::new(move |value: T| updater.update(value)));
        let source = source.clone();
        let teardown: Teardown = Box::new(move || {
            if !source.unregister_listener(handle) {
                tracing::warn!(handle = handle.id(), "listener already removed from source");
            }
        });
        teardown
    })
}
