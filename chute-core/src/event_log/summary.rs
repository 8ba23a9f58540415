//! Tally of a read-back pass over the log

use super::record::{LogEvent, RecordError, RECORD_SIZE};

/// What a full pass over the log found
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DumpSummary {
    pub records: u32,
    pub bad_checksums: u32,
    pub undecodable: u32,
}

impl DumpSummary {
    /// Count one raw record and decode it without rejecting bad checksums
    ///
    /// # Returns
    /// The decoded event and whether its checksum matched.
    pub fn tally(&mut self, raw: &[u8; RECORD_SIZE]) -> Result<(LogEvent, bool), RecordError> {
        self.records += 1;
        match LogEvent::from_bytes_unverified(raw) {
            Ok(event) => {
                let ok = event.verify();
                if !ok {
                    self.bad_checksums += 1;
                }
                Ok((event, ok))
            }
            Err(e) => {
                self.undecodable += 1;
                Err(e)
            }
        }
    }

    /// Bytes covered by the counted records
    pub fn bytes(&self) -> usize {
        self.records as usize * RECORD_SIZE
    }

    /// Whether the pass read back everything the store reported
    pub fn accounts_for(&self, size: usize) -> bool {
        self.bytes() == size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::{AccelSample, EventLog, LogKind, CHECKSUM_OFFSET};
    use crate::testing::RamStore;
    use embassy_futures::block_on;
    use heapless::Vec;

    fn regular(ts: u64) -> LogEvent {
        LogEvent::new(ts, LogKind::Regular, AccelSample::new(1, 2, 3))
    }

    async fn summarize(store: RamStore) -> (DumpSummary, usize) {
        let mut log = EventLog::open(store).await.unwrap();
        let size = log.size();
        let mut summary = DumpSummary::default();
        let mut reader = log.read_all().await.unwrap();
        while let Some(Ok(raw)) = reader.next().await {
            let _ = summary.tally(&raw);
        }
        (summary, size)
    }

    fn store_with(chunks: &[&[u8]]) -> RamStore {
        let mut store = RamStore::default();
        for chunk in chunks {
            store.chunks.push(Vec::from_slice(chunk).unwrap()).unwrap();
        }
        store
    }

    #[test]
    fn test_complete_pass_accounts_for_size() {
        let a = regular(1).to_bytes();
        let b = regular(2).to_bytes();
        let (summary, size) = block_on(summarize(store_with(&[&a, &b])));
        assert_eq!(summary.records, 2);
        assert_eq!(summary.bad_checksums, 0);
        assert!(summary.accounts_for(size));
    }

    #[test]
    fn test_torn_tail_is_a_mismatch() {
        let a = regular(1).to_bytes();
        let b = regular(2).to_bytes();
        let (summary, size) = block_on(summarize(store_with(&[&a, &b[..5]])));
        assert_eq!(summary.records, 1);
        assert_eq!(size, RECORD_SIZE + 5);
        assert!(!summary.accounts_for(size));
    }

    #[test]
    fn test_bad_checksum_counted_and_decoded() {
        let mut raw = regular(9).to_bytes();
        raw[CHECKSUM_OFFSET] ^= 0xFF;
        let mut summary = DumpSummary::default();
        let (event, ok) = summary.tally(&raw).unwrap();
        assert!(!ok);
        assert_eq!(event.timestamp_us, 9);
        assert_eq!(summary.bad_checksums, 1);
        assert_eq!(summary.undecodable, 0);
    }
}
