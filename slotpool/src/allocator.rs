//! Allocator

use std::alloc::{GlobalAlloc, Layout, System};
use std::ptr::{self, NonNull};

use slotpool_core::{PoolRegistry, ALIGNMENT};

use crate::{SystemConfiguration, SystemPlatform};

/// Fixed-size-slot pool allocator.
///
/// A zero-sized front-end over a process-wide registry: one pool per size class up to
/// `MAX_POOLED_SIZE` bytes, shared by all threads, plus the system-allocator fallback beyond
/// that range.
#[derive(Default)]
pub struct SlotAllocator;

impl SlotAllocator {
    /// Creates an instance.
    pub const fn new() -> Self { Self }

    /// Allocates `size` bytes of memory, aligned on at least the alignment granularity.
    ///
    /// Returns `None` if `size` is 0, or if the system allocator is exhausted.
    pub fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        REGISTRY.allocate(size)
    }

    /// Deallocates the memory located at `pointer`.
    ///
    /// #   Safety
    ///
    /// -   Assumes `pointer` has been returned by a prior call to `allocate`, with this very
    ///     `size` as argument.
    /// -   Assumes `pointer` has not been deallocated since its allocation.
    /// -   Assumes the memory pointed by `pointer` is no longer in use.
    pub unsafe fn deallocate(&self, pointer: NonNull<u8>, size: usize) {
        REGISTRY.deallocate(pointer, size);
    }

    /// Moves `value` into pooled storage.
    ///
    /// Returns `None` when storage could not be obtained: on exhaustion, when `T` is zero-sized,
    /// or when `T` requires an alignment stricter than the granularity; `value` is then dropped.
    pub fn create<T>(&self, value: T) -> Option<NonNull<T>> {
        REGISTRY.create(value)
    }

    /// Drops the pointed-to value in place, and reclaims its storage; a `None` pointer is a
    /// no-op.
    ///
    /// #   Safety
    ///
    /// -   Assumes `pointer`, if any, has been returned by a prior call to `create::<T>`.
    /// -   Assumes the value has not been destroyed since its creation.
    pub unsafe fn destroy<T>(&self, pointer: Option<NonNull<T>>) {
        REGISTRY.destroy(pointer);
    }
}

unsafe impl GlobalAlloc for SlotAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        //  Slots only guarantee granularity alignment; stricter layouts bypass the pools.
        if layout.align() > ALIGNMENT.value() {
            return System.alloc(layout);
        }

        self.allocate(layout.size()).map(|pointer| pointer.as_ptr()).unwrap_or(ptr::null_mut())
    }

    unsafe fn dealloc(&self, pointer: *mut u8, layout: Layout) {
        if layout.align() > ALIGNMENT.value() {
            return System.dealloc(pointer, layout);
        }

        if let Some(pointer) = NonNull::new(pointer) {
            self.deallocate(pointer, layout.size());
        }
    }
}

//
//  Implementation
//

type Registry = PoolRegistry<'static, SystemConfiguration, SystemPlatform>;

//  System platform; slabs and large objects alike come from here.
static PLATFORM: SystemPlatform = SystemPlatform::new();

//  Process-wide registry: one pool per size class, lazily constructed, shared by all threads.
static REGISTRY: Registry = PoolRegistry::new(&PLATFORM);
