//! Configuration types
//!
//! Board-agnostic flight tunables. The firmware validates and embeds them at
//! build time.

pub mod flight;

pub use flight::*;
