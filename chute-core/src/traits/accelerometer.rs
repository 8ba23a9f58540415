//! Accelerometer driver trait

use core::future::Future;

use crate::event_log::AccelSample;

/// Errors talking to the accelerometer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Bus transaction failed or timed out
    Bus,
    /// Device answered with an unexpected identity
    DeviceMissing,
}

/// Three-axis accelerometer with a free-fall interrupt
pub trait Accelerometer {
    /// Read the current raw sample
    fn read_sample(&mut self) -> impl Future<Output = Result<AccelSample, SensorError>>;

    /// Read and clear the latched interrupt sources
    fn interrupt_source(&mut self) -> impl Future<Output = Result<u8, SensorError>>;

    /// Read the interrupt-enable register
    fn interrupt_enable(&mut self) -> impl Future<Output = Result<u8, SensorError>>;

    /// Interrupt-enable value the driver programmed at setup
    fn expected_interrupts(&self) -> u8;
}
