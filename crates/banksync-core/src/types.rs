//! Shared identifiers and small value types
//!
//! These are the vocabulary every window, host adapter and scheduler entry
//! agrees on. Nothing here knows about paging or selection.

use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

static NEXT_WINDOW_ID: AtomicU32 = AtomicU32::new(1);

/// Identifies one window for host event routing and follow-up scheduling
///
/// Ids are process-unique and never reused, so a late host event for a
/// discarded window can never be applied to a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(u32);

impl WindowId {
    /// Allocate a fresh id
    pub fn next() -> Self {
        Self(NEXT_WINDOW_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value (for logging and host-side bookkeeping)
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

/// RGB color as reported by the host (components 0.0-1.0)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl Color {
    pub const fn new(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue }
    }

    /// True for the all-zero color hosts use for "no color"
    pub fn is_off(&self) -> bool {
        self.red == 0.0 && self.green == 0.0 && self.blue == 0.0
    }
}

/// Read-only view of another window's host-reported item count
///
/// The effect-track window uses this to place its positions after the main
/// tracks without holding a reference to the main window itself.
#[derive(Debug, Clone, Default)]
pub struct ItemCountProbe(Arc<AtomicUsize>);

impl ItemCountProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last item count published by the owning window
    pub fn get(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn publish(&self, count: usize) {
        self.0.store(count, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_ids_are_unique() {
        let a = WindowId::next();
        let b = WindowId::next();
        assert_ne!(a, b);
        assert!(b.raw() > a.raw());
        assert_eq!(format!("{}", a), format!("w{}", a.raw()));
    }

    #[test]
    fn test_probe_shares_count() {
        let probe = ItemCountProbe::new();
        let reader = probe.clone();
        assert_eq!(reader.get(), 0);
        probe.publish(16);
        assert_eq!(reader.get(), 16);
    }

    #[test]
    fn test_color_off() {
        assert!(Color::default().is_off());
        assert!(!Color::new(0.5, 0.0, 0.0).is_off());
    }
}
