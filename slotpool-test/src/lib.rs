//! Test tooling for the slotpool crates.

mod lockstep;

pub use lockstep::{Lockstep, LockstepBuilder};
