//! Size classes.
//!
//! Pooled allocations are bucketed by size: a request is rounded up to the next multiple of the
//! alignment granularity, and each multiple is its own size class, served by its own pool.
//!
//! The mapping here is pure arithmetic, spanning sizes up to `MAX_BYTES`; how many of those
//! classes are actually provisioned with pools is up to the registry.

use core::num::NonZeroUsize;

use crate::utils::PowerOf2;

/// Alignment granularity of pooled allocations, in bytes.
///
/// Every slot size is a multiple of the granularity, which guarantees that any slot satisfies the
/// platform's minimum alignment for scalar types, and that a freed slot is large enough to hold
/// the forwarding pointer of the reclamation list.
//  Safety:
//  -   8 is a power of 2.
pub const ALIGNMENT: PowerOf2 = unsafe { PowerOf2::new_unchecked(8) };

/// Upper bound, in bytes, of the sizes the class mapping spans.
pub const MAX_BYTES: usize = 256 * 1024;

/// Number of distinct size classes covering `[1, MAX_BYTES]`.
pub const NUMBER_CLASSES: usize = MAX_BYTES / ALIGNMENT.value();

/// SizeClass
///
/// The zero-based index of the pool serving allocations of a given size.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct SizeClass(usize);

impl SizeClass {
    /// Rounds `size` up to the nearest multiple of the alignment granularity.
    pub const fn round_up(size: usize) -> usize { ALIGNMENT.round_up(size) }

    /// Creates an instance based on the requested size of the allocation.
    ///
    /// The mapping is monotonically non-decreasing in `size`:
    ///
    /// -   1-8 -> 0
    /// -   9-16 -> 1
    /// -   17-24 -> 2
    /// -   ...
    /// -   505-512 -> 63
    pub fn from_size(size: NonZeroUsize) -> Self {
        let size = if size.get() < ALIGNMENT.value() { ALIGNMENT.value() } else { size.get() };

        Self(Self::round_up(size) / ALIGNMENT - 1)
    }

    /// Returns the underlying index.
    pub const fn value(&self) -> usize { self.0 }

    /// Returns the slot size, in bytes, served by the pool at this index.
    ///
    /// This is the exact inverse of `from_size`: the pool at index `i` serves slots of
    /// `(i + 1) * ALIGNMENT` bytes.
    pub const fn slot_size(&self) -> usize { (self.0 + 1) * ALIGNMENT.value() }
}

#[cfg(test)]
mod tests {

use super::*;

fn class(size: usize) -> usize {
    SizeClass::from_size(NonZeroUsize::new(size).unwrap()).value()
}

#[test]
fn size_class_round_up() {
    for size in 1..=1024usize {
        let rounded = SizeClass::round_up(size);

        assert!(rounded >= size);
        assert!(rounded < size + ALIGNMENT.value());
        assert_eq!(0, rounded % ALIGNMENT);
    }
}

#[test]
fn size_class_from_size() {
    assert_eq!(0, class(1));
    assert_eq!(0, class(7));
    assert_eq!(0, class(8));
    assert_eq!(1, class(9));
    assert_eq!(1, class(16));
    assert_eq!(2, class(17));
    assert_eq!(2, class(24));
    assert_eq!(63, class(505));
    assert_eq!(63, class(512));
    assert_eq!(64, class(513));
    assert_eq!(NUMBER_CLASSES - 1, class(MAX_BYTES));
}

#[test]
fn size_class_monotonic() {
    let mut previous = class(1);

    for size in 2..=1024usize {
        let current = class(size);

        assert!(current >= previous, "class({}) = {} < {}", size, current, previous);

        previous = current;
    }
}

#[test]
fn size_class_slot_size_inverse() {
    for index in 0..128usize {
        let slot_size = SizeClass(index).slot_size();

        assert_eq!(index, class(slot_size));
        assert_eq!(index, class(slot_size - ALIGNMENT.value() + 1));
    }
}

}
