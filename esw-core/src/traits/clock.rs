//! Monotonic time source

use crate::clock::Timestamp;

/// Trait for the platform millisecond clock
pub trait Clock {
    /// Current time
    fn now(&self) -> Timestamp;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
