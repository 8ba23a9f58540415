//! Chute Hardware Abstraction Layer
//!
//! Interfaces between the board-agnostic flight logic and the chip it runs
//! on. Chip crates implement these traits; `chute-core` only ever sees the
//! traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  chute-firmware (tasks, boot sequence)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  chute-core (state machine, event log)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  chute-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  chute-hal-rp2040                       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Interfaces
//!
//! - [`gpio::OutputPin`] - LED and beacon outputs
//! - [`watchdog::Watchdog`] - Liveness timer and reset cause
//! - [`block::BlockDevice`], [`block::BlockStorageAdapter`] - Flash partition access
//! - [`storage::LogStore`] - Append-only log file contract
//! - [`queue::SequentialLogStore`] - `LogStore` on a sequential-storage queue
//!   (feature `sequential-storage`)

#![no_std]
#![deny(unsafe_code)]

pub mod block;
pub mod gpio;
#[cfg(feature = "sequential-storage")]
pub mod queue;
pub mod storage;
pub mod watchdog;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key traits at crate root for convenience
pub use block::{BlockDevice, BlockError, BlockGeometry, BlockStorageAdapter, PhysicalFlash};
pub use gpio::OutputPin;
#[cfg(feature = "sequential-storage")]
pub use queue::SequentialLogStore;
pub use storage::{ChunkReader, LogStore, StoreError, LOG_FILE_NAME};
pub use watchdog::{ResetCause, Watchdog};
