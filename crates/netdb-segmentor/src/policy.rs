//! Isolation switch
//!
//! Read on every resolution so it can be flipped at runtime. Turning
//! isolation off only changes where future resolutions land; existing client
//! partitions stay registered and intact.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub struct IsolationPolicy {
    enabled: AtomicBool,
}

impl IsolationPolicy {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Returns the previous setting
    pub fn set_enabled(&self, enabled: bool) -> bool {
        self.enabled.swap(enabled, Ordering::AcqRel)
    }
}

impl Default for IsolationPolicy {
    fn default() -> Self {
        Self::new(true)
    }
}
