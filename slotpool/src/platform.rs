//! Implementation of the Platform and Configuration traits over the system allocator.

use std::alloc::{GlobalAlloc, Layout, System};
use std::ptr::NonNull;

use slotpool_core::{Configuration, Platform, PowerOf2};

/// Implementation of the Configuration trait for the system-backed registry.
#[derive(Default)]
pub struct SystemConfiguration;

impl Configuration for SystemConfiguration {
    //  4 KB
    //
    //  Safety:
    //  -   4096 is a power of 2.
    const SLAB_SIZE: PowerOf2 = unsafe { PowerOf2::new_unchecked(4096) };
}

/// Implementation of the Platform trait over the system allocator.
///
/// Memory is requested from `std::alloc::System` directly, rather than the registered global
/// allocator, so that a `SlotAllocator` installed via `#[global_allocator]` never routes back
/// into itself.
#[derive(Default)]
pub struct SystemPlatform;

impl SystemPlatform {
    /// Creates an instance.
    pub const fn new() -> Self { Self }
}

impl Platform for SystemPlatform {
    unsafe fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        debug_assert!(layout.size() % layout.align() == 0,
            "Incorrect size: {} % {} != 0", layout.size(), layout.align());

        NonNull::new(System.alloc(layout))
    }

    unsafe fn deallocate(&self, pointer: NonNull<u8>, layout: Layout) {
        System.dealloc(pointer.as_ptr(), layout);
    }
}
