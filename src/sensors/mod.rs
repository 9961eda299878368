//! Sensor abstraction layer
//!
//! Device sensors are push based: they call registered listeners whenever a
//! reading arrives. This module describes those sources and bridges them into
//! [`ListeningSignal`](crate::reactive::ListeningSignal)s so that readers only
//! keep a sensor running while they actually look at it.

pub mod source;
pub mod orientation;
pub mod geolocation;
pub mod mock;

pub use source::{listen, EventSource, Listener, ListenerHandle};
pub use orientation::{compass_heading, OrientationEvent};
pub use geolocation::{to_reading, GeoFix, GeoUpdate, LocationReading, SourceError, SourceErrorKind};
pub use mock::ManualSource;
