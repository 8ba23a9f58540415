//! Log store on a sequential-storage queue
//!
//! Each appended chunk becomes one queue item. The queue does the wear
//! leveling across the partition's erase blocks and detects torn or
//! corrupted pages on mount.
//!
//! The first erase block holds only a format marker. The queue accepts
//! any page contents it cannot parse as free space, so without the marker
//! a partition full of unrelated data would mount as an empty log.

use core::ops::Range;

use embedded_storage_async::nor_flash::{MultiwriteNorFlash, NorFlash, ReadNorFlash};
use sequential_storage::cache::NoCache;
use sequential_storage::queue::{self, QueueIterator};

use crate::block::BlockDevice;
use crate::storage::{ChunkReader, LogStore, StoreError};

/// Read buffer for one queue item (record plus word padding)
const SCRATCH_SIZE: usize = 64;

/// Written to the start of the partition once `format` has erased it
pub const FORMAT_MARKER: [u8; 8] = *b"CHUTLOG1";

fn map_error<E>(error: sequential_storage::Error<E>) -> StoreError {
    match error {
        sequential_storage::Error::FullStorage => StoreError::Full,
        sequential_storage::Error::Corrupted { .. } => StoreError::Corrupted,
        sequential_storage::Error::BufferTooSmall(_) => StoreError::BufferTooSmall,
        _ => StoreError::Io,
    }
}

/// [`LogStore`] backed by a queue spanning all but the marker block
pub struct SequentialLogStore<S> {
    flash: S,
    range: Range<u32>,
    cache: NoCache,
    mounted: bool,
    size: usize,
}

impl<S: MultiwriteNorFlash + BlockDevice> SequentialLogStore<S> {
    pub fn new(flash: S) -> Self {
        let range = S::ERASE_SIZE as u32..flash.geometry().capacity();
        Self {
            flash,
            range,
            cache: NoCache::new(),
            mounted: false,
            size: 0,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn into_inner(self) -> S {
        self.flash
    }
}

impl<S: MultiwriteNorFlash + BlockDevice> LogStore for SequentialLogStore<S> {
    type Reader<'a>
        = SequentialReader<'a, S>
    where
        Self: 'a;

    async fn mount(&mut self) -> Result<(), StoreError> {
        self.mounted = false;

        let mut marker = [0u8; FORMAT_MARKER.len()];
        ReadNorFlash::read(&mut self.flash, 0, &mut marker)
            .await
            .map_err(|_| StoreError::Io)?;
        if marker != FORMAT_MARKER {
            return Err(StoreError::Corrupted);
        }

        let mut scratch = [0u8; SCRATCH_SIZE];
        let mut items = queue::iter(&mut self.flash, self.range.clone(), &mut self.cache)
            .await
            .map_err(map_error)?;

        let mut size = 0;
        while let Some(item) = items.next(&mut scratch).await.map_err(map_error)? {
            size += item.len();
        }

        self.size = size;
        self.mounted = true;
        Ok(())
    }

    async fn format(&mut self) -> Result<(), StoreError> {
        self.mounted = false;
        self.size = 0;
        sequential_storage::erase_all(&mut self.flash, 0..self.range.end)
            .await
            .map_err(map_error)?;
        // Last, so an interrupted format still fails the next mount
        NorFlash::write(&mut self.flash, 0, &FORMAT_MARKER)
            .await
            .map_err(|_| StoreError::Io)
    }

    async fn write(&mut self, data: &[u8]) -> Result<usize, StoreError> {
        if !self.mounted {
            return Err(StoreError::NotMounted);
        }
        queue::push(
            &mut self.flash,
            self.range.clone(),
            &mut self.cache,
            data,
            false,
        )
        .await
        .map_err(map_error)?;

        self.size += data.len();
        Ok(data.len())
    }

    async fn sync(&mut self) -> Result<(), StoreError> {
        if !self.mounted {
            return Err(StoreError::NotMounted);
        }
        self.flash.sync().map_err(StoreError::from)
    }

    fn size(&self) -> usize {
        self.size
    }

    async fn reader(&mut self) -> Result<SequentialReader<'_, S>, StoreError> {
        if !self.mounted {
            return Err(StoreError::NotMounted);
        }
        let items = queue::iter(&mut self.flash, self.range.clone(), &mut self.cache)
            .await
            .map_err(map_error)?;
        Ok(SequentialReader {
            items,
            scratch: [0; SCRATCH_SIZE],
        })
    }
}

/// Oldest-first reader over queue items
pub struct SequentialReader<'a, S: MultiwriteNorFlash> {
    items: QueueIterator<'a, S, NoCache>,
    scratch: [u8; SCRATCH_SIZE],
}

impl<S: MultiwriteNorFlash> ChunkReader for SequentialReader<'_, S> {
    async fn next_chunk(&mut self, buf: &mut [u8]) -> Result<Option<usize>, StoreError> {
        let Some(item) = self.items.next(&mut self.scratch).await.map_err(map_error)? else {
            return Ok(None);
        };
        let len = item.len();
        if buf.len() < len {
            return Err(StoreError::BufferTooSmall);
        }
        buf[..len].copy_from_slice(&item);
        Ok(Some(len))
    }
}
