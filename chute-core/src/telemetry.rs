//! Sensor health polling
//!
//! Each flight-loop tick samples the accelerometer and reads back its
//! interrupt-enable register. A sensor that browned out or came loose reads
//! back zero (or nothing at all), which would silently disable free-fall
//! detection.

use portable_atomic::{AtomicU64, Ordering};

use crate::event_log::AccelSample;
use crate::state::SensorHealth;
use crate::traits::{Accelerometer, SensorError};

/// Most recent good sample, shared between tasks
pub struct SampleCell(AtomicU64);

impl Default for SampleCell {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleCell {
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn store(&self, sample: AccelSample) {
        let packed = (sample.x as u16 as u64)
            | (sample.y as u16 as u64) << 16
            | (sample.z as u16 as u64) << 32;
        self.0.store(packed, Ordering::Release);
    }

    pub fn load(&self) -> AccelSample {
        let packed = self.0.load(Ordering::Acquire);
        AccelSample::new(
            packed as u16 as i16,
            (packed >> 16) as u16 as i16,
            (packed >> 32) as u16 as i16,
        )
    }
}

/// Compare the interrupt-enable readback with what the driver programmed
pub fn assess(readback: Result<u8, SensorError>, expected: u8) -> SensorHealth {
    match readback {
        Ok(value) if value == expected => SensorHealth::Healthy,
        _ => SensorHealth::Faulted,
    }
}

/// One tick's worth of sensor polling
///
/// A failed sample read leaves `cell` untouched, so the returned sample is
/// always the last one that was actually measured.
pub async fn poll<A: Accelerometer>(sensor: &mut A, cell: &SampleCell) -> (SensorHealth, AccelSample) {
    if let Ok(sample) = sensor.read_sample().await {
        cell.store(sample);
    }
    let readback = sensor.interrupt_enable().await;
    (assess(readback, sensor.expected_interrupts()), cell.load())
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use proptest::prelude::*;

    struct ScriptedSensor {
        sample: Result<AccelSample, SensorError>,
        int_enable: Result<u8, SensorError>,
    }

    impl Accelerometer for ScriptedSensor {
        async fn read_sample(&mut self) -> Result<AccelSample, SensorError> {
            self.sample
        }

        async fn interrupt_source(&mut self) -> Result<u8, SensorError> {
            Ok(0)
        }

        async fn interrupt_enable(&mut self) -> Result<u8, SensorError> {
            self.int_enable
        }

        fn expected_interrupts(&self) -> u8 {
            0x04
        }
    }

    #[test]
    fn test_assess() {
        assert_eq!(assess(Ok(0x04), 0x04), SensorHealth::Healthy);
        assert_eq!(assess(Ok(0x00), 0x04), SensorHealth::Faulted);
        assert_eq!(assess(Err(SensorError::Bus), 0x04), SensorHealth::Faulted);
    }

    #[test]
    fn test_healthy_poll_updates_sample() {
        let cell = SampleCell::new();
        let mut sensor = ScriptedSensor {
            sample: Ok(AccelSample::new(1, 2, 250)),
            int_enable: Ok(0x04),
        };
        let (health, sample) = block_on(poll(&mut sensor, &cell));
        assert_eq!(health, SensorHealth::Healthy);
        assert_eq!(sample, AccelSample::new(1, 2, 250));
    }

    #[test]
    fn test_fault_keeps_last_known_sample() {
        let cell = SampleCell::new();
        cell.store(AccelSample::new(-7, 8, 260));
        let mut sensor = ScriptedSensor {
            sample: Err(SensorError::Bus),
            int_enable: Err(SensorError::Bus),
        };
        let (health, sample) = block_on(poll(&mut sensor, &cell));
        assert_eq!(health, SensorHealth::Faulted);
        assert_eq!(sample, AccelSample::new(-7, 8, 260));
    }

    #[test]
    fn test_register_mismatch_reports_fresh_sample() {
        let cell = SampleCell::new();
        let mut sensor = ScriptedSensor {
            sample: Ok(AccelSample::new(3, 3, 3)),
            int_enable: Ok(0x00),
        };
        let (health, sample) = block_on(poll(&mut sensor, &cell));
        assert_eq!(health, SensorHealth::Faulted);
        assert_eq!(sample, AccelSample::new(3, 3, 3));
    }

    proptest! {
        #[test]
        fn test_sample_cell_preserves_sign(x in any::<i16>(), y in any::<i16>(), z in any::<i16>()) {
            let cell = SampleCell::new();
            cell.store(AccelSample::new(x, y, z));
            prop_assert_eq!(cell.load(), AccelSample::new(x, y, z));
        }
    }
}
