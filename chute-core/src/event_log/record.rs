//! Flight record format
//!
//! Every record is 16 bytes, little-endian, packed:
//!
//! ```text
//! offset  0        8     9        11       13       15
//!         ├────────┼─────┼────────┼────────┼────────┼──────────┤
//!         │ ts u64 │kind │ ax i16 │ ay i16 │ az i16 │ xor  u8  │
//! ```
//!
//! The checksum is the XOR of bytes 0..15 and is fixed when the record is
//! built. Serialization writes the stored value back out unchanged.

/// Encoded record length in bytes
pub const RECORD_SIZE: usize = 16;

/// Offset of the checksum byte
pub const CHECKSUM_OFFSET: usize = RECORD_SIZE - 1;

/// ADXL345 full-resolution scale
pub const G_PER_LSB: f32 = 0.004;

/// Standard gravity in m/s²
pub const STANDARD_GRAVITY: f32 = 9.80665;

/// Errors decoding a stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// Kind byte is not a known record kind
    UnknownKind(u8),
    /// Stored checksum does not match the record bytes
    ChecksumMismatch { stored: u8, computed: u8 },
}

/// Record kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LogKind {
    /// Cold boot
    Boot = 0x01,
    /// Free-fall detected, latch released
    PeakAcceleration = 0x02,
    /// Periodic healthy sample
    Regular = 0x03,
    /// Boot after a watchdog reset
    WatchdogReboot = 0x04,
    /// Accelerometer stopped answering or lost its configuration
    SensorConnectionError = 0x05,
}

impl LogKind {
    /// Wire code of this kind
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode a wire code
    pub fn from_code(code: u8) -> Result<Self, RecordError> {
        match code {
            0x01 => Ok(LogKind::Boot),
            0x02 => Ok(LogKind::PeakAcceleration),
            0x03 => Ok(LogKind::Regular),
            0x04 => Ok(LogKind::WatchdogReboot),
            0x05 => Ok(LogKind::SensorConnectionError),
            other => Err(RecordError::UnknownKind(other)),
        }
    }

    /// Short label used by the log dump
    pub const fn label(self) -> &'static str {
        match self {
            LogKind::Boot => "boot",
            LogKind::PeakAcceleration => "peak",
            LogKind::Regular => "regular",
            LogKind::WatchdogReboot => "watchdog",
            LogKind::SensorConnectionError => "sensor-error",
        }
    }
}

/// Raw three-axis accelerometer sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelSample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl AccelSample {
    /// All-zero sample, used by records that carry no measurement
    pub const ZERO: Self = Self { x: 0, y: 0, z: 0 };

    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }

    /// Convert to m/s² per axis
    pub fn to_ms2(self) -> [f32; 3] {
        let scale = G_PER_LSB * STANDARD_GRAVITY;
        [
            self.x as f32 * scale,
            self.y as f32 * scale,
            self.z as f32 * scale,
        ]
    }
}

/// XOR-fold of `bytes`
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

/// One flight record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LogEvent {
    /// Microseconds since boot
    pub timestamp_us: u64,
    pub kind: LogKind,
    pub accel: AccelSample,
    checksum: u8,
}

impl LogEvent {
    /// Build a record and seal its checksum
    pub fn new(timestamp_us: u64, kind: LogKind, accel: AccelSample) -> Self {
        let mut event = Self {
            timestamp_us,
            kind,
            accel,
            checksum: 0,
        };
        let bytes = event.to_bytes();
        event.checksum = checksum(&bytes[..CHECKSUM_OFFSET]);
        event
    }

    /// Record with zeroed acceleration
    pub fn marker(timestamp_us: u64, kind: LogKind) -> Self {
        Self::new(timestamp_us, kind, AccelSample::ZERO)
    }

    /// Checksum sealed at construction (or read from flash)
    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    /// True when the stored checksum matches the record contents
    pub fn verify(&self) -> bool {
        let bytes = self.to_bytes();
        checksum(&bytes[..CHECKSUM_OFFSET]) == self.checksum
    }

    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        out[0..8].copy_from_slice(&self.timestamp_us.to_le_bytes());
        out[8] = self.kind.code();
        out[9..11].copy_from_slice(&self.accel.x.to_le_bytes());
        out[11..13].copy_from_slice(&self.accel.y.to_le_bytes());
        out[13..15].copy_from_slice(&self.accel.z.to_le_bytes());
        out[CHECKSUM_OFFSET] = self.checksum;
        out
    }

    /// Decode and verify a stored record
    pub fn from_bytes(bytes: &[u8; RECORD_SIZE]) -> Result<Self, RecordError> {
        let event = Self::from_bytes_unverified(bytes)?;
        let computed = checksum(&bytes[..CHECKSUM_OFFSET]);
        if computed != event.checksum {
            return Err(RecordError::ChecksumMismatch {
                stored: event.checksum,
                computed,
            });
        }
        Ok(event)
    }

    /// Decode a stored record keeping whatever checksum it carries
    ///
    /// Only the kind byte is validated. Use [`verify`](Self::verify) to check
    /// integrity afterwards.
    pub fn from_bytes_unverified(bytes: &[u8; RECORD_SIZE]) -> Result<Self, RecordError> {
        let mut ts = [0u8; 8];
        ts.copy_from_slice(&bytes[0..8]);
        let axis = |at: usize| i16::from_le_bytes([bytes[at], bytes[at + 1]]);

        Ok(Self {
            timestamp_us: u64::from_le_bytes(ts),
            kind: LogKind::from_code(bytes[8])?,
            accel: AccelSample::new(axis(9), axis(11), axis(13)),
            checksum: bytes[CHECKSUM_OFFSET],
        })
    }
}
