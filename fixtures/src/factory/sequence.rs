use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::entities::FieldValue;

type Formatter = Box<dyn Fn(u64) -> FieldValue + Send + Sync>;

/// Produces `f(1)`, `f(2)`, ... Safe to share between concurrent tests.
pub struct Sequence {
    counter: AtomicU64,
    format: Formatter,
}

impl Sequence {
    pub fn new<F, T>(format: F) -> Self
    where
        F: Fn(u64) -> T + Send + Sync + 'static,
        T: Into<FieldValue>,
    {
        Self {
            counter: AtomicU64::new(0),
            format: Box::new(move |n| format(n).into()),
        }
    }

    pub fn next_value(&self) -> FieldValue {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        (self.format)(n)
    }

    /// Number of values handed out so far
    pub fn position(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }

    /// Start again from 1
    pub fn rewind(&self) {
        self.counter.store(0, Ordering::Relaxed);
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("position", &self.position())
            .finish_non_exhaustive()
    }
}
