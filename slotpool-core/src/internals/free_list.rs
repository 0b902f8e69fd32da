//! A lock-free, intrusively-linked stack of reclaimed slots.
//!
//! Freed slots are pushed onto the stack, and popped for reuse before any slab carving occurs.
//! Reuse is therefore LIFO: the most recently freed slot is handed back out first, while it is
//! still likely to be cache-resident.
//!
//! #   Warning
//!
//! This is the textbook compare-and-swap stack, and it carries the textbook reclamation hazard:
//! `pop` reads the `next` field of the current head, and a concurrent `pop` may already have
//! returned that very slot to a caller by the time the read happens. The design accepts the
//! hazard: slots are only ever pushed back onto the list of their owning pool, and never released
//! to the general allocator individually, which bounds the blast radius of a stale read. It is
//! NOT ABA-safe under adversarial pop/push/pop interleavings of the same slot; this remains an
//! open risk of the design, not an oversight.
//!
//! #   Safety
//!
//! The stack assumes that the slots pushed onto it:
//!
//! -   Span at least one pointer-sized, pointer-aligned word.
//! -   Are exclusively owned by the pusher, which relinquishes ownership.
//! -   Will outlive the stack.

use core::{
    ptr::{self, NonNull},
    sync::atomic::{AtomicPtr, Ordering},
};

use crate::utils::{self, PowerOf2};

//  A reclaimed slot. The first word of the slot's storage is repurposed as the link to the next
//  reclaimed slot; slots are never constructed anywhere but in place, inside `push`.
#[repr(C)]
struct FreeSlot {
    next: AtomicPtr<FreeSlot>,
}

/// FreeList
pub(crate) struct FreeList(AtomicPtr<FreeSlot>);

impl FreeList {
    /// Creates an empty instance of the FreeList.
    pub(crate) const fn new() -> Self { Self(AtomicPtr::new(ptr::null_mut())) }

    /// Pops the most recently pushed slot, if any.
    ///
    /// The returned pointer, if any, is guaranteed to be exclusively owned by the caller.
    pub(crate) fn pop(&self) -> Option<NonNull<u8>> {
        //  Acquire, to observe the `next` written by the push that published this head.
        let mut head = self.0.load(Ordering::Acquire);

        loop {
            let slot = NonNull::new(head)?;

            //  WARNING:
            //
            //  A concurrent pop may have already handed `slot` to another caller, making this
            //  read racy against the new owner's writes; see the module-level hazard note.
            //
            //  DO NOT WRITE through `slot` before the exchange below succeeds.
            //
            //  Safety:
            //  -   `head` was published by a prior push, hence points to slot storage.
            let next = unsafe { slot.as_ref() }.next.load(Ordering::Relaxed);

            match self.0.compare_exchange_weak(head, next, Ordering::Acquire, Ordering::Acquire) {
                Ok(_) => return Some(slot.cast()),
                Err(current) => head = current,
            }
        }
    }

    /// Pushes a slot on top of the stack.
    ///
    /// #   Safety
    ///
    /// -   Assumes that `slot` spans at least one pointer-sized word, aligned for a pointer.
    /// -   Assumes that the caller exclusively owns `slot`, and relinquishes that ownership.
    /// -   Assumes that `slot` outlives the stack.
    pub(crate) unsafe fn push(&self, slot: NonNull<u8>) {
        debug_assert!(utils::is_sufficiently_aligned_for(slot, PowerOf2::align_of::<FreeSlot>()));

        let slot: NonNull<FreeSlot> = slot.cast();

        //  Claim the storage: the slot's first word now holds the link.
        ptr::write(slot.as_ptr(), FreeSlot { next: AtomicPtr::new(ptr::null_mut()) });

        let mut head = self.0.load(Ordering::Relaxed);

        loop {
            slot.as_ref().next.store(head, Ordering::Relaxed);

            //  Release, so that a popping thread acquiring the new head observes `next`.
            match self.0.compare_exchange_weak(head, slot.as_ptr(), Ordering::Release, Ordering::Relaxed) {
                Ok(_) => return,
                Err(current) => head = current,
            }
        }
    }

    /// Checks whether the stack is empty, or not.
    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool { self.0.load(Ordering::Relaxed).is_null() }
}

// mod tests
