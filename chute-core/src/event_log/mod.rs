//! Checksummed flight log
//!
//! Records are fixed 16-byte frames appended to the single log file and
//! synced after every write, so a flight cut short by a crash keeps
//! everything up to the last completed record.

pub mod log;
pub mod record;
pub mod summary;

pub use log::{EventLog, LogError, LogReader};
pub use record::{
    checksum, AccelSample, LogEvent, LogKind, RecordError, CHECKSUM_OFFSET, RECORD_SIZE,
};
pub use summary::DumpSummary;
