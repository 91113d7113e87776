//! Request input used to hydrate records

use crate::Attributes;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Source of the current request's input and its session
pub trait InputSource: Send + Sync {
    /// Every input value of the current request
    fn all(&self) -> Attributes;

    /// Whether a session is available to flash input into
    fn has_session(&self) -> bool;

    /// Keep the current input for the next request
    fn flash(&self);
}

/// Fixed input, for tests and for running outside a request
#[derive(Debug, Default)]
pub struct StaticInput {
    input: Attributes,
    session: bool,
    flashes: AtomicUsize,
}

impl StaticInput {
    pub fn new(input: Attributes) -> Self {
        Self {
            input,
            session: false,
            flashes: AtomicUsize::new(0),
        }
    }

    /// Pretend a session is active
    pub fn with_session(mut self) -> Self {
        self.session = true;
        self
    }

    /// How many times input was flashed
    pub fn flash_count(&self) -> usize {
        self.flashes.load(Ordering::SeqCst)
    }
}

impl InputSource for StaticInput {
    fn all(&self) -> Attributes {
        self.input.clone()
    }

    fn has_session(&self) -> bool {
        self.session
    }

    fn flash(&self) {
        self.flashes.fetch_add(1, Ordering::SeqCst);
    }
}
