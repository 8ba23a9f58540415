//! Log store contract
//!
//! The flight log lives in a single append-only file on a wear-leveled
//! store. This trait is the narrow slice of filesystem behaviour the event
//! log needs: mount, format, append, sync and a sequential read-back. Wear
//! leveling and block relocation stay inside the implementation.

use core::future::Future;

use crate::block::BlockError;

/// Name of the one file the store holds
pub const LOG_FILE_NAME: &str = "flight_log";

/// Errors reported by a log store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Operation needs a mounted store
    NotMounted,
    /// On-flash structures are missing or inconsistent
    Corrupted,
    /// No room left for the write
    Full,
    /// Caller buffer cannot hold the stored chunk
    BufferTooSmall,
    /// Underlying flash operation failed
    Io,
}

impl From<BlockError> for StoreError {
    fn from(_: BlockError) -> Self {
        StoreError::Io
    }
}

/// Sequential reader over the stored file
///
/// Readers start at offset 0 and only move forward.
pub trait ChunkReader {
    /// Copy the next stored chunk into `buf`
    ///
    /// # Returns
    /// The chunk length, or `None` once the file is exhausted.
    fn next_chunk(
        &mut self,
        buf: &mut [u8],
    ) -> impl Future<Output = Result<Option<usize>, StoreError>>;
}

/// Append-only file on a wear-leveled store
///
/// Implementations own the open file: `write` always lands at the current
/// end of file and `size` reports the bytes stored so far.
pub trait LogStore {
    /// Reader borrowing the store for the duration of a read-back
    type Reader<'a>: ChunkReader
    where
        Self: 'a;

    /// Attach to the existing on-flash structures
    ///
    /// Fails with [`StoreError::Corrupted`] when the partition holds no
    /// valid store (first boot, or damage).
    fn mount(&mut self) -> impl Future<Output = Result<(), StoreError>>;

    /// Wipe the partition and lay down an empty store
    ///
    /// Leaves the store unmounted.
    fn format(&mut self) -> impl Future<Output = Result<(), StoreError>>;

    /// Append `data` at the end of the file
    ///
    /// # Returns
    /// The number of bytes accepted, which may be less than `data.len()`.
    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<usize, StoreError>>;

    /// Make every accepted write durable
    fn sync(&mut self) -> impl Future<Output = Result<(), StoreError>>;

    /// Bytes currently stored in the file
    fn size(&self) -> usize;

    /// Open a reader positioned at offset 0
    fn reader(&mut self) -> impl Future<Output = Result<Self::Reader<'_>, StoreError>>;
}
