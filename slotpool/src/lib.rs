#![deny(missing_docs)]

//! A fixed-size-slot pool allocator library.
//!
//! The type `SlotAllocator` serves small allocations from process-wide, per-size-class pools of
//! fixed-size slots, and falls back to the system allocator beyond the pooled range.
//!
//! #   Warning
//!
//! Frees are keyed by the original request size: `deallocate` must receive the very size passed
//! to the matching `allocate`, as no per-allocation metadata is stored. The typed
//! `create`/`destroy` pair handles this bookkeeping for a single value at a time.

mod allocator;
mod platform;

pub use allocator::SlotAllocator;
pub use platform::{SystemConfiguration, SystemPlatform};

pub use slotpool_core::{ALIGNMENT, MAX_POOLED_SIZE};
