//! Platform
//!
//! The Platform trait is the allocator's only view of its environment: the general-purpose
//! allocator from which slabs are acquired, and to which requests too large for any pool are
//! delegated. By abstracting it, the pools can run over the system allocator, `mmap`, or a test
//! double counting acquisitions.

use core::{
    alloc::Layout,
    ptr::NonNull,
};

/// Abstraction of the general-purpose allocator backing the pools.
pub trait Platform {
    /// Allocates a fresh block of memory as per the specified layout.
    ///
    /// Returns `None` if the allocation request cannot be satisfied; the pools treat this as
    /// resource exhaustion and propagate the failure to their caller.
    ///
    /// #   Safety
    ///
    /// The caller may assume that if a pointer is returned then:
    /// -   The number of usable bytes is greater than or equal to `layout.size()`.
    /// -   The pointer is at least aligned to `layout.align()`.
    ///
    /// `allocate` assumes that:
    /// -   `layout.size()` is a multiple of `layout.align()`.
    /// -   `layout.align()` is non-zero, and is a power of 2.
    unsafe fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Deallocates the supplied block of memory.
    ///
    /// #   Safety
    ///
    /// The caller should no longer reference the memory after calling this function.
    ///
    /// `deallocate` assumes that:
    /// -   `pointer` was allocated by this instance of `Platform`, with `layout` as argument.
    /// -   `deallocate` is called exactly once per successful `allocate`.
    unsafe fn deallocate(&self, pointer: NonNull<u8>, layout: Layout);
}
