//! Test doubles shared by the API tests.

use core::{
    alloc::Layout,
    ptr::NonNull,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use super::Platform;

//  A Platform backed by the std allocator, counting acquisitions and releases.
//
//  Can be switched into an "exhausted" mode, in which every acquisition fails.
#[derive(Default)]
pub(crate) struct TestPlatform {
    allocated: AtomicUsize,
    deallocated: AtomicUsize,
    last_size: AtomicUsize,
    exhausted: AtomicBool,
}

impl TestPlatform {
    pub(crate) fn new() -> Self { Self::default() }

    //  Number of successful acquisitions so far.
    pub(crate) fn allocations(&self) -> usize { self.allocated.load(Ordering::Relaxed) }

    //  Number of acquisitions not yet released.
    pub(crate) fn outstanding(&self) -> usize {
        self.allocations() - self.deallocated.load(Ordering::Relaxed)
    }

    //  Size, in bytes, of the most recent acquisition.
    pub(crate) fn last_size(&self) -> usize { self.last_size.load(Ordering::Relaxed) }

    //  Makes all further acquisitions fail.
    pub(crate) fn exhaust(&self) { self.exhausted.store(true, Ordering::Relaxed); }
}

impl Platform for TestPlatform {
    unsafe fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        assert!(layout.size() % layout.align() == 0);

        if self.exhausted.load(Ordering::Relaxed) {
            return None;
        }

        let pointer = NonNull::new(std::alloc::alloc(layout))?;

        self.allocated.fetch_add(1, Ordering::Relaxed);
        self.last_size.store(layout.size(), Ordering::Relaxed);

        Some(pointer)
    }

    unsafe fn deallocate(&self, pointer: NonNull<u8>, layout: Layout) {
        self.deallocated.fetch_add(1, Ordering::Relaxed);

        std::alloc::dealloc(pointer.as_ptr(), layout);
    }
}
