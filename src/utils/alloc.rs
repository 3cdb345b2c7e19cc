//! Heap accounting for in-process measurements.
//!
//! [`PeakAllocator`] wraps the system allocator and tracks live and peak heap
//! bytes. It only takes effect once installed as the `#[global_allocator]`,
//! which the `edgebench` binary does. Without it [`measure_peak`] falls back
//! to the resident set size of the current process.

use std::{
    alloc::{GlobalAlloc, Layout, System},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

static CURRENT: AtomicUsize = AtomicUsize::new(0);
static PEAK: AtomicUsize = AtomicUsize::new(0);
static INSTALLED: AtomicBool = AtomicBool::new(false);

pub struct PeakAllocator;

impl PeakAllocator {
    fn grow(size: usize) {
        INSTALLED.store(true, Ordering::Relaxed);
        let now = CURRENT.fetch_add(size, Ordering::Relaxed) + size;
        PEAK.fetch_max(now, Ordering::Relaxed);
    }

    fn shrink(size: usize) {
        CURRENT.fetch_sub(size, Ordering::Relaxed);
    }
}

unsafe impl GlobalAlloc for PeakAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            Self::grow(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc_zeroed(layout);
        if !ptr.is_null() {
            Self::grow(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        Self::shrink(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = System.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            if new_size > layout.size() {
                Self::grow(new_size - layout.size());
            } else {
                Self::shrink(layout.size() - new_size);
            }
        }
        new_ptr
    }
}

/// Whether [`PeakAllocator`] is serving allocations in this process.
pub fn is_installed() -> bool {
    INSTALLED.load(Ordering::Relaxed)
}

/// Live heap bytes.
pub fn current() -> usize {
    CURRENT.load(Ordering::Relaxed)
}

/// Highest live heap bytes since the last [`reset_peak`].
pub fn peak() -> usize {
    PEAK.load(Ordering::Relaxed)
}

pub fn reset_peak() {
    PEAK.store(current(), Ordering::Relaxed);
}

/// Run `f` and report how many bytes it added at its heap high-water mark.
///
/// Allocations made by other threads in the meantime are counted as well.
pub fn measure_peak<T>(f: impl FnOnce() -> T) -> (T, u64) {
    if is_installed() {
        let baseline = current();
        reset_peak();
        let result = f();
        (result, peak().saturating_sub(baseline) as u64)
    } else {
        let before = super::sys::current_process_rss().unwrap_or(0);
        let result = f();
        let after = super::sys::current_process_rss().unwrap_or(0);
        (result, after.saturating_sub(before))
    }
}
