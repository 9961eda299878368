//! Manually driven event source for testing and development

use crate::sensors::source::{EventSource, Listener, ListenerHandle};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// Event source that emits whatever the caller hands it
pub struct ManualSource<T> {
    listeners: RefCell<HashMap<ListenerHandle, Listener<T>>>,
    listener_counter: Cell<u32>,
    registrations: Cell<usize>,
    emitted: Cell<usize>,
}

impl<T: Clone> ManualSource<T> {
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(HashMap::new()),
            listener_counter: Cell::new(0),
            registrations: Cell::new(0),
            emitted: Cell::new(0),
        }
    }

    /// Deliver `value` to every registered listener.
    ///
    /// Returns the number of listeners reached.
    pub fn emit(&self, value: T) -> usize {
        // Listeners may unregister while being called
        let listeners: Vec<Listener<T>> = self.listeners.borrow().values().cloned().collect();
        for listener in &listeners {
            listener(value.clone());
        }
        self.emitted.set(self.emitted.get() + 1);
        listeners.len()
    }

    /// Number of currently registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Number of registrations over the source's lifetime
    pub fn registration_count(&self) -> usize {
        self.registrations.get()
    }

    pub fn emitted_count(&self) -> usize {
        self.emitted.get()
    }
}

impl<T: Clone> Default for ManualSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> EventSource<T> for ManualSource<T> {
    fn register_listener(&self, listener: Listener<T>) -> ListenerHandle {
        self.listener_counter.set(self.listener_counter.get() + 1);
        let handle = ListenerHandle::new(self.listener_counter.get());
        self.listeners.borrow_mut().insert(handle, listener);
        self.registrations.set(self.registrations.get() + 1);
        handle
    }

    fn unregister_listener(&self, handle: ListenerHandle) -> bool {
        self.listeners.borrow_mut().remove(&handle).is_some()
    }
}
