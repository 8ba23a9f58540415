//! Append-only flight log on a mounted store

use chute_hal::{ChunkReader, LogStore, StoreError};

use super::record::{LogEvent, RECORD_SIZE};

/// Event log errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LogError {
    /// Store could not be mounted, even after reformatting
    Mount(StoreError),
    /// Store rejected a write, sync or read
    Io(StoreError),
    /// Store accepted fewer bytes than a full record
    ShortWrite(usize),
    /// Log was already closed
    Closed,
}

/// Handle to the open flight log
///
/// Owns the store and its append cursor from mount until [`close`](Self::close).
pub struct EventLog<S: LogStore> {
    store: S,
    reformatted: bool,
    closed: bool,
}

impl<S: LogStore> EventLog<S> {
    /// Mount the store, reformatting once if it holds no valid log
    ///
    /// A mount failure after the reformat is final.
    pub async fn open_or_create(mut store: S) -> Result<Self, LogError> {
        let mut reformatted = false;
        if store.mount().await.is_err() {
            store.format().await.map_err(LogError::Mount)?;
            reformatted = true;
            store.mount().await.map_err(LogError::Mount)?;
        }

        Ok(Self {
            store,
            reformatted,
            closed: false,
        })
    }

    /// Mount an existing log without ever formatting
    ///
    /// For read-only consumers that must not destroy what they came to read.
    pub async fn open(mut store: S) -> Result<Self, LogError> {
        store.mount().await.map_err(LogError::Mount)?;
        Ok(Self {
            store,
            reformatted: false,
            closed: false,
        })
    }

    /// Whether opening had to wipe the store
    pub fn was_reformatted(&self) -> bool {
        self.reformatted
    }

    /// Bytes currently logged
    pub fn size(&self) -> usize {
        self.store.size()
    }

    /// Append one record and sync it to flash
    ///
    /// The sync runs even when the write came up short.
    pub async fn append(&mut self, event: &LogEvent) -> Result<usize, LogError> {
        if self.closed {
            return Err(LogError::Closed);
        }

        let written = self.store.write(&event.to_bytes()).await;
        let synced = self.store.sync().await;

        let written = written.map_err(LogError::Io)?;
        synced.map_err(LogError::Io)?;
        if written < RECORD_SIZE {
            return Err(LogError::ShortWrite(written));
        }
        Ok(written)
    }

    /// Sequential reader over every stored record
    pub async fn read_all(&mut self) -> Result<LogReader<'_, S>, LogError> {
        if self.closed {
            return Err(LogError::Closed);
        }
        let remaining = self.store.size();
        let chunks = self.store.reader().await.map_err(LogError::Io)?;
        Ok(LogReader { chunks, remaining })
    }

    /// Final sync; later appends and reads fail with [`LogError::Closed`]
    pub async fn close(&mut self) -> Result<(), LogError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.store.sync().await.map_err(LogError::Io)
    }

    /// Give the store back
    pub fn into_store(self) -> S {
        self.store
    }
}

/// Forward-only reader of raw records
///
/// Yields one 16-byte buffer per call until the size captured at creation
/// has been consumed.
pub struct LogReader<'a, S: LogStore + 'a> {
    chunks: S::Reader<'a>,
    remaining: usize,
}

impl<S: LogStore> LogReader<'_, S> {
    /// Next raw record, or `None` at end of log
    pub async fn next(&mut self) -> Option<Result<[u8; RECORD_SIZE], LogError>> {
        if self.remaining == 0 {
            return None;
        }

        let mut buf = [0u8; RECORD_SIZE];
        match self.chunks.next_chunk(&mut buf).await {
            Ok(Some(len)) if len == RECORD_SIZE => {
                self.remaining = self.remaining.saturating_sub(len);
                Some(Ok(buf))
            }
            Ok(Some(len)) => {
                self.remaining = 0;
                Some(Err(LogError::ShortWrite(len)))
            }
            Ok(None) => {
                self.remaining = 0;
                None
            }
            Err(e) => {
                self.remaining = 0;
                Some(Err(LogError::Io(e)))
            }
        }
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}
