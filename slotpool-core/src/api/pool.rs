//! Pool
//!
//! A pool of fixed-size slots, all of a single size class, carved from slabs acquired from the
//! Platform.
//!
//! Allocation follows a strict order:
//!
//! -   Fast path: pop a reclaimed slot from the lock-free free list.
//! -   Cruise path: carve the next never-used slot from the current slab, bumping a cursor.
//! -   Expansion path: acquire a fresh slab from the platform, then carve from it.
//!
//! The cruise and expansion paths are serialized by a mutex, so that two threads exhausting the
//! current slab simultaneously cannot race to acquire redundant slabs; the fast path never takes
//! the lock.

use core::{
    alloc::Layout,
    num::NonZeroUsize,
    ptr::{self, NonNull},
};

use spin::Mutex;

use crate::{
    api::{Platform, ALIGNMENT},
    internals::{free_list::FreeList, slab::SlabHeader},
    utils,
};

/// Default slab size, in bytes.
pub const DEFAULT_SLAB_SIZE: usize = 4096;

/// Pool
///
/// A pool of slots of a single size class. The slot size is fixed at construction, for the
/// lifetime of the pool; slabs are acquired lazily, on first demand, and released only when the
/// pool is dropped.
pub struct Pool<'a, P: Platform> {
    //  General allocator from which slabs are acquired, and to which they are released on drop.
    platform: &'a P,
    //  Size of the slots, in bytes; a multiple of the alignment granularity.
    slot_size: usize,
    //  Size of the slabs, in bytes; a multiple of the alignment granularity.
    slab_size: usize,
    //  Reclaimed slots awaiting reuse; the only state mutated outside the lock.
    free_list: FreeList,
    //  Slab chain and bump cursor; mutated only with the lock held.
    bump: Mutex<Bump>,
}

impl<'a, P: Platform> Pool<'a, P> {
    /// Creates a pool serving slots of `slot_size` bytes, with the default slab size.
    pub fn new(platform: &'a P, slot_size: NonZeroUsize) -> Self {
        Self::with_slab_size(platform, slot_size, DEFAULT_SLAB_SIZE)
    }

    /// Creates a pool serving slots of `slot_size` bytes, carved from slabs of `slab_size` bytes.
    ///
    /// Both sizes are rounded up to a multiple of the alignment granularity; the slot size is
    /// then fixed for the lifetime of the pool.
    ///
    /// #   Panics
    ///
    /// If `slab_size` cannot accommodate the slab header followed by a single slot.
    pub fn with_slab_size(platform: &'a P, slot_size: NonZeroUsize, slab_size: usize) -> Self {
        let slot_size = ALIGNMENT.round_up(slot_size.get());
        let slab_size = ALIGNMENT.round_up(slab_size);

        assert!(SlabHeader::overhead() + slot_size <= slab_size,
            "slab_size {} cannot accommodate a header and a {}-byte slot", slab_size, slot_size);

        Self {
            platform,
            slot_size,
            slab_size,
            free_list: FreeList::new(),
            bump: Mutex::new(Bump::new()),
        }
    }

    /// Returns the size of the slots, in bytes.
    pub fn slot_size(&self) -> usize { self.slot_size }

    /// Allocates one slot.
    ///
    /// Reclaimed slots are reused first, most recently freed first; only when the free list is
    /// empty is a slot carved from the current slab, and only when the current slab is exhausted
    /// is a new slab acquired from the platform.
    ///
    /// Returns `None` only if a new slab is needed and the platform cannot supply it.
    pub fn allocate(&self) -> Option<NonNull<u8>> {
        //  Fast path.
        if let Some(slot) = self.free_list.pop() {
            return Some(slot);
        }

        self.allocate_carve()
    }

    /// Deallocates one slot, making it available for reuse.
    ///
    /// #   Safety
    ///
    /// -   Assumes that `pointer` was returned by a call to `allocate` on this pool.
    /// -   Assumes that `pointer` has not been deallocated since that allocation.
    /// -   Assumes that the memory pointed to by `pointer` is no longer in use.
    pub unsafe fn deallocate(&self, pointer: NonNull<u8>) {
        debug_assert!(utils::is_sufficiently_aligned_for(pointer, ALIGNMENT));

        //  Safety:
        //  -   `pointer` spans `self.slot_size >= ALIGNMENT` bytes, suitably aligned.
        //  -   `pointer` is exclusively owned, as per this function's contract.
        //  -   The slot belongs to a slab owned by this pool, which outlives the free list.
        self.free_list.push(pointer);
    }

    //  Internal: carve a never-used slot, growing the slab chain if need be.
    fn allocate_carve(&self) -> Option<NonNull<u8>> {
        let mut bump = self.bump.lock();

        if bump.is_exhausted() {
            self.grow(&mut bump)?;
        }

        //  Safety:
        //  -   `bump` holds at least one uncarved slot, as per the check above.
        Some(unsafe { bump.carve(self.slot_size) })
    }

    //  Internal: acquire a fresh slab, chain it, and point the cursor at its carvable area.
    //
    //  The lock held by the caller establishes the happens-before relationship between the
    //  slab's construction and any slot later taken from it.
    #[cold]
    #[inline(never)]
    fn grow(&self, bump: &mut Bump) -> Option<()> {
        //  Safety:
        //  -   The layout size is a multiple of its alignment, which is a power of 2.
        let slab = unsafe { self.platform.allocate(self.slab_layout()) }?;

        //  Safety:
        //  -   `slab` is fresh, exclusively owned, and spans at least `overhead()` bytes.
        //  -   `slab` is aligned on the alignment granularity, as requested from the platform.
        unsafe { SlabHeader::initialize(slab, bump.chain) };

        bump.chain = Some(slab.cast());

        //  Safety:
        //  -   `slab` spans `self.slab_size` bytes, suitably aligned.
        //  -   `self.slot_size` is a non-zero multiple of the granularity, and the constructor
        //      checked that the slab accommodates the header plus one slot.
        let (cursor, boundary) = unsafe { SlabHeader::carve(slab, self.slab_size, self.slot_size) };

        bump.cursor = cursor;
        bump.boundary = boundary;

        Some(())
    }

    fn slab_layout(&self) -> Layout {
        //  Safety:
        //  -   `self.slab_size` is a multiple of `ALIGNMENT`, as per the constructor.
        //  -   `ALIGNMENT` is a power of 2.
        unsafe { Layout::from_size_align_unchecked(self.slab_size, ALIGNMENT.value()) }
    }
}

impl<'a, P: Platform> Drop for Pool<'a, P> {
    fn drop(&mut self) {
        let layout = self.slab_layout();

        let mut chain = self.bump.get_mut().chain.take();

        while let Some(slab) = chain {
            //  Read the link before releasing the memory it lives in.
            //
            //  Safety:
            //  -   `slab` heads a slab owned by this pool, hence holds a valid header.
            chain = unsafe { slab.as_ref() }.next();

            //  Safety:
            //  -   `slab` was acquired from `self.platform` with `layout` as argument.
            //  -   No slot of the slab is referenced anymore, as per the drop contract.
            unsafe { self.platform.deallocate(slab.cast(), layout) };
        }
    }
}

//  Safety:
//  -   The slab chain and bump cursor are only mutated with the `bump` lock held.
//  -   The free-list head is only mutated atomically.
//  -   The slabs are exclusively owned by the pool, and released only on drop.
unsafe impl<'a, P: Platform + Sync> Send for Pool<'a, P> {}

//  Safety:
//  -   As above.
unsafe impl<'a, P: Platform + Sync> Sync for Pool<'a, P> {}

//  Slab chain head and bump cursor: the slab-growth serialization region.
struct Bump {
    //  Head of the chain of owned slabs; each slab links to the previously acquired one.
    chain: Option<NonNull<SlabHeader>>,
    //  First never-carved slot of the current slab.
    cursor: *mut u8,
    //  One past the last carvable slot of the current slab.
    boundary: *mut u8,
}

impl Bump {
    const fn new() -> Self {
        Self { chain: None, cursor: ptr::null_mut(), boundary: ptr::null_mut(), }
    }

    //  When the cursor reaches the boundary, the bump path is exhausted, and only growth or
    //  free-list reuse can serve further allocations.
    fn is_exhausted(&self) -> bool { self.cursor == self.boundary }

    //  #   Safety
    //
    //  -   Assumes `!self.is_exhausted()`.
    unsafe fn carve(&mut self, slot_size: usize) -> NonNull<u8> {
        debug_assert!(!self.is_exhausted());

        let slot = self.cursor;

        //  Safety:
        //  -   `self.cursor + slot_size <= self.boundary`, still within the slab.
        self.cursor = self.cursor.add(slot_size);

        //  Safety:
        //  -   `slot` lies within a slab, hence is non-null.
        NonNull::new_unchecked(slot)
    }
}

// mod tests
