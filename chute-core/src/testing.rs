//! In-memory doubles shared by the unit tests

use chute_hal::{ChunkReader, LogStore, OutputPin, ResetCause, StoreError, Watchdog};
use embedded_hal_async::delay::DelayNs;
use heapless::Vec;

use crate::event_log::RECORD_SIZE;

pub const MAX_CHUNKS: usize = 32;

/// RAM-backed log store with scriptable failures
#[derive(Default)]
pub struct RamStore {
    pub chunks: Vec<Vec<u8, RECORD_SIZE>, MAX_CHUNKS>,
    pub mounted: bool,
    /// Number of upcoming mount attempts that fail
    pub failing_mounts: u8,
    pub fail_format: bool,
    /// Accept only this many bytes per write
    pub write_limit: Option<usize>,
    pub fail_writes: bool,
    pub formats: u8,
    pub syncs: u8,
}

impl RamStore {
    pub fn corrupted() -> Self {
        Self {
            failing_mounts: 1,
            ..Self::default()
        }
    }
}

pub struct RamReader<'a> {
    chunks: &'a [Vec<u8, RECORD_SIZE>],
    next: usize,
}

impl ChunkReader for RamReader<'_> {
    async fn next_chunk(&mut self, buf: &mut [u8]) -> Result<Option<usize>, StoreError> {
        let Some(chunk) = self.chunks.get(self.next) else {
            return Ok(None);
        };
        if buf.len() < chunk.len() {
            return Err(StoreError::BufferTooSmall);
        }
        buf[..chunk.len()].copy_from_slice(chunk);
        self.next += 1;
        Ok(Some(chunk.len()))
    }
}

impl LogStore for RamStore {
    type Reader<'a> = RamReader<'a>;

    async fn mount(&mut self) -> Result<(), StoreError> {
        if self.failing_mounts > 0 {
            self.failing_mounts -= 1;
            return Err(StoreError::Corrupted);
        }
        self.mounted = true;
        Ok(())
    }

    async fn format(&mut self) -> Result<(), StoreError> {
        self.formats += 1;
        if self.fail_format {
            return Err(StoreError::Io);
        }
        self.chunks.clear();
        self.mounted = false;
        Ok(())
    }

    async fn write(&mut self, data: &[u8]) -> Result<usize, StoreError> {
        if !self.mounted {
            return Err(StoreError::NotMounted);
        }
        if self.fail_writes {
            return Err(StoreError::Io);
        }
        let take = self.write_limit.unwrap_or(data.len()).min(data.len());
        let chunk = Vec::from_slice(&data[..take]).map_err(|_| StoreError::BufferTooSmall)?;
        self.chunks.push(chunk).map_err(|_| StoreError::Full)?;
        Ok(take)
    }

    async fn sync(&mut self) -> Result<(), StoreError> {
        self.syncs += 1;
        Ok(())
    }

    fn size(&self) -> usize {
        self.chunks.iter().map(|c| c.len()).sum()
    }

    async fn reader(&mut self) -> Result<RamReader<'_>, StoreError> {
        if !self.mounted {
            return Err(StoreError::NotMounted);
        }
        Ok(RamReader {
            chunks: &self.chunks,
            next: 0,
        })
    }
}

/// Output pin that counts rising edges
#[derive(Debug, Default)]
pub struct MockPin {
    pub high: bool,
    pub rising_edges: u32,
}

impl OutputPin for MockPin {
    fn set_level(&mut self, high: bool) {
        if high && !self.high {
            self.rising_edges += 1;
        }
        self.high = high;
    }

    fn level(&self) -> bool {
        self.high
    }
}

/// Watchdog that records every call
#[derive(Debug)]
pub struct MockWatchdog {
    pub cause: ResetCause,
    pub timeout_ms: Option<u32>,
    pub feeds: u32,
}

impl MockWatchdog {
    pub fn new(cause: ResetCause) -> Self {
        Self {
            cause,
            timeout_ms: None,
            feeds: 0,
        }
    }
}

impl Watchdog for MockWatchdog {
    fn start(&mut self, timeout_ms: u32) {
        self.timeout_ms = Some(timeout_ms);
    }

    fn feed(&mut self) {
        self.feeds += 1;
    }

    fn reset_cause(&self) -> ResetCause {
        self.cause
    }
}

/// Delay that only accumulates elapsed time
#[derive(Debug, Default)]
pub struct MockDelay {
    pub elapsed_ns: u64,
}

impl MockDelay {
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns / 1_000_000
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += ns as u64;
    }
}
