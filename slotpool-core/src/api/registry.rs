//! PoolRegistry
//!
//! A fixed table of pools spanning the supported size range: a request is routed to the pool
//! whose size class matches, or directly to the platform when it exceeds the pooled range.
//!
//! Each pool is constructed lazily, exactly once, on the first use of its size class, and shared
//! by every caller of that size class from then on. The registry is an explicit value rather
//! than ambient global state, so that each test, or each application domain, can own an isolated
//! instance.

use core::{
    alloc::Layout,
    marker::PhantomData,
    mem,
    num::NonZeroUsize,
    ptr::{self, NonNull},
};

use spin::Once;

use crate::api::{Configuration, Platform, Pool, SizeClass, ALIGNMENT};

/// Maximum size, in bytes, served from pools.
///
/// Larger requests are delegated directly to the platform, and do not involve any pool.
pub const MAX_POOLED_SIZE: usize = 512;

/// Number of pools in a registry: one per size class up to `MAX_POOLED_SIZE`.
pub const NUMBER_POOLS: usize = MAX_POOLED_SIZE / ALIGNMENT.value();

/// PoolRegistry
///
/// One pool per size class, plus the platform fallback for anything beyond the pooled range.
pub struct PoolRegistry<'a, C, P: Platform> {
    platform: &'a P,
    pools: [Once<Pool<'a, P>>; NUMBER_POOLS],
    _configuration: PhantomData<C>,
}

impl<'a, C, P> PoolRegistry<'a, C, P>
    where
        C: Configuration,
        P: Platform,
{
    /// Creates a registry; pools are constructed lazily, on first use of their size class.
    pub const fn new(platform: &'a P) -> Self {
        let pools = [
            //  Line 0: up to 128 bytes.
            once(), once(), once(), once(), once(), once(), once(), once(),
            once(), once(), once(), once(), once(), once(), once(), once(),
            //  Line 1: up to 256 bytes.
            once(), once(), once(), once(), once(), once(), once(), once(),
            once(), once(), once(), once(), once(), once(), once(), once(),
            //  Line 2: up to 384 bytes.
            once(), once(), once(), once(), once(), once(), once(), once(),
            once(), once(), once(), once(), once(), once(), once(), once(),
            //  Line 3: up to 512 bytes.
            once(), once(), once(), once(), once(), once(), once(), once(),
            once(), once(), once(), once(), once(), once(), once(), once(),
        ];

        Self { platform, pools, _configuration: PhantomData, }
    }

    /// Allocates `size` bytes, aligned on the alignment granularity.
    ///
    /// Returns `None` if `size` is 0, or if the platform cannot satisfy the request.
    pub fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        let size = NonZeroUsize::new(size)?;

        if size.get() > MAX_POOLED_SIZE {
            let layout = Self::large_layout(size)?;

            //  Safety:
            //  -   The layout size is a multiple of its alignment, which is a power of 2.
            return unsafe { self.platform.allocate(layout) };
        }

        self.pool(SizeClass::from_size(size)).allocate()
    }

    /// Deallocates `size` bytes located at `pointer`.
    ///
    /// The routing decision mirrors `allocate`, so that the memory is returned to the pool, or
    /// platform, that produced it; the registry stores no per-allocation metadata.
    ///
    /// #   Safety
    ///
    /// -   Assumes that `pointer` was returned by a call to `allocate` on this registry, with
    ///     this very `size` as argument.
    /// -   Assumes that `pointer` has not been deallocated since that allocation.
    /// -   Assumes that the memory pointed to by `pointer` is no longer in use.
    pub unsafe fn deallocate(&self, pointer: NonNull<u8>, size: usize) {
        let size = match NonZeroUsize::new(size) {
            Some(size) => size,
            None => return,
        };

        if size.get() > MAX_POOLED_SIZE {
            if let Some(layout) = Self::large_layout(size) {
                //  Safety:
                //  -   `pointer` was allocated by this platform with this very layout, as
                //      `large_layout` is deterministic in `size`.
                self.platform.deallocate(pointer, layout);
            }

            return;
        }

        //  Safety:
        //  -   `pointer` was allocated by this pool, as the routing mirrors `allocate`.
        self.pool(SizeClass::from_size(size)).deallocate(pointer);
    }

    /// Moves `value` into pooled storage.
    ///
    /// Returns `None` when storage could not be obtained: on platform exhaustion, when `T` is
    /// zero-sized, or when `T` requires an alignment stricter than the granularity (slots only
    /// guarantee granularity alignment); `value` is then dropped in place.
    pub fn create<T>(&self, value: T) -> Option<NonNull<T>> {
        if mem::align_of::<T>() > ALIGNMENT.value() {
            return None;
        }

        let storage = self.allocate(mem::size_of::<T>())?;
        let pointer = storage.cast::<T>();

        //  Safety:
        //  -   `storage` spans at least `size_of::<T>()` bytes, exclusively owned.
        //  -   `storage` is aligned on the granularity, which suffices for `T`, as per the check
        //      above.
        unsafe { ptr::write(pointer.as_ptr(), value) };

        Some(pointer)
    }

    /// Drops the pointed-to value in place, and reclaims its storage.
    ///
    /// A `None` pointer is a no-op.
    ///
    /// #   Safety
    ///
    /// -   Assumes that `pointer`, if any, was returned by a call to `create::<T>` on this
    ///     registry.
    /// -   Assumes that the value has not been destroyed since its creation.
    pub unsafe fn destroy<T>(&self, pointer: Option<NonNull<T>>) {
        let pointer = match pointer {
            Some(pointer) => pointer,
            None => return,
        };

        //  Safety:
        //  -   `pointer` holds a live `T`, as per this function's contract.
        ptr::drop_in_place(pointer.as_ptr());

        self.deallocate(pointer.cast(), mem::size_of::<T>());
    }

    //  Internal: the pool serving `class`, constructed on its first use.
    //
    //  Concurrent first uses of a class race; `Once` arbitrates, and every caller converges on
    //  the single winning instance.
    fn pool(&self, class: SizeClass) -> &Pool<'a, P> {
        debug_assert!(class.value() < NUMBER_POOLS);

        self.pools[class.value()].call_once(|| {
            //  Safety:
            //  -   A slot size is at least `ALIGNMENT`, hence not 0.
            let slot_size = unsafe { NonZeroUsize::new_unchecked(class.slot_size()) };

            Pool::with_slab_size(self.platform, slot_size, C::SLAB_SIZE.value())
        })
    }

    //  Internal: the layout of an allocation beyond the pooled range.
    //
    //  Deterministic in `size`, so that the deallocation path reconstructs the exact layout of
    //  the allocation path.
    fn large_layout(size: NonZeroUsize) -> Option<Layout> {
        let mask = ALIGNMENT.value() - 1;
        let size = size.get().checked_add(mask)? & !mask;

        //  Safety:
        //  -   `size` is a multiple of `ALIGNMENT`, which is a power of 2.
        Some(unsafe { Layout::from_size_align_unchecked(size, ALIGNMENT.value()) })
    }
}

//  Internal: a pool table entry, yet to be constructed.
const fn once<'a, P: Platform>() -> Once<Pool<'a, P>> { Once::new() }

// mod tests
