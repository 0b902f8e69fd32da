#![no_std]

#![deny(missing_docs)]

//! Building blocks for a fixed-size-slot pool allocator.
//!
//! slotpool-core serves small, frequently recycled allocations from per-size-class pools. Each
//! pool grows by carving large blocks of raw memory ("slabs") into fixed-size slots, and recycles
//! freed slots through a lock-free reclamation list. It contains:
//! -   A platform trait, used to acquire raw slabs of memory to be carved up, and to serve
//!     allocations too large for any pool.
//! -   A pool type and a registry routing a requested byte size to the pool owning its size
//!     class, leaving it up to the user to arrange registries as desired in memory.

#[cfg(test)]
extern crate std;

mod api;
mod internals;
mod utils;

pub use api::*;
