//! The configuration of slotpool-core.
//!
//! A single Configuration type should be shared between a registry and all code routing through
//! it, so that every pool of the registry carves slabs of the same size.

use crate::utils::PowerOf2;

/// Configuration
///
/// Compile-time constants shared by all pools of a registry.
pub trait Configuration {
    /// The size of the slabs carved into slots, for pools owned by a registry.
    ///
    /// Must accommodate the slab header followed by at least one slot of the largest pooled size
    /// class; the working configuration uses 4096 bytes.
    const SLAB_SIZE: PowerOf2;
}
