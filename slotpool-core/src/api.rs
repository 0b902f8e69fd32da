//! The API of slotpool-core.

mod configuration;
mod platform;
mod pool;
mod registry;
mod size_class;

#[cfg(test)]
mod test;

pub use core::alloc::Layout;

pub use configuration::Configuration;
pub use platform::Platform;
pub use pool::{Pool, DEFAULT_SLAB_SIZE};
pub use registry::{PoolRegistry, MAX_POOLED_SIZE, NUMBER_POOLS};
pub use size_class::{SizeClass, ALIGNMENT, MAX_BYTES, NUMBER_CLASSES};

pub use crate::utils::PowerOf2;
