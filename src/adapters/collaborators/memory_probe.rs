//! Memory probe returning a caller-set reading.

use std::sync::{Mutex, PoisonError};

use crate::ports::MemoryProbe;

/// Probe whose reading is set explicitly by the host application.
#[derive(Debug, Default)]
pub struct FixedMemoryProbe {
    reading: Mutex<Option<f64>>,
}

impl FixedMemoryProbe {
    pub fn new(reading: Option<f64>) -> Self {
        Self {
            reading: Mutex::new(reading),
        }
    }

    pub fn set(&self, reading: Option<f64>) {
        *self.reading.lock().unwrap_or_else(PoisonError::into_inner) = reading;
    }
}

impl MemoryProbe for FixedMemoryProbe {
    fn sample(&self) -> Option<f64> {
        *self.reading.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
