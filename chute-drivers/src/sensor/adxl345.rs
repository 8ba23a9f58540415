//! ADXL345 accelerometer over async I2C
//!
//! Configured for free-fall detection: ±16 g full resolution, the free-fall
//! interrupt routed to INT1, measurement mode on. Reading `INT_SOURCE`
//! clears the latched interrupt.

use embedded_hal_async::i2c::I2c;

use chute_core::config::FreeFallConfig;
use chute_core::event_log::AccelSample;
use chute_core::traits::{Accelerometer, SensorError};

/// Default address with SDO/ALT tied low
pub const DEFAULT_ADDRESS: u8 = 0x53;

/// Expected DEVID value
pub const DEVICE_ID: u8 = 0xE5;

/// Free-fall bit in INT_ENABLE / INT_MAP / INT_SOURCE
pub const INT_FREE_FALL: u8 = 0x04;

mod reg {
    pub const DEVID: u8 = 0x00;
    pub const THRESH_FF: u8 = 0x28;
    pub const TIME_FF: u8 = 0x29;
    pub const POWER_CTL: u8 = 0x2D;
    pub const INT_ENABLE: u8 = 0x2E;
    pub const INT_MAP: u8 = 0x2F;
    pub const INT_SOURCE: u8 = 0x30;
    pub const DATA_FORMAT: u8 = 0x31;
    pub const DATAX0: u8 = 0x32;
}

/// POWER_CTL measure bit
const MEASURE: u8 = 0x08;

/// DATA_FORMAT: full resolution, ±16 g
const RANGE_16G_FULL_RES: u8 = 0x0B;

pub struct Adxl345<I2C> {
    i2c: I2C,
    address: u8,
    enabled_interrupts: u8,
}

impl<I2C: I2c> Adxl345<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            enabled_interrupts: INT_FREE_FALL,
        }
    }

    /// Verify the part and program free-fall detection
    pub async fn init(&mut self, free_fall: &FreeFallConfig) -> Result<(), SensorError> {
        if self.read_register(reg::DEVID).await? != DEVICE_ID {
            return Err(SensorError::DeviceMissing);
        }

        self.write_register(reg::DATA_FORMAT, RANGE_16G_FULL_RES).await?;
        self.write_register(reg::THRESH_FF, free_fall.threshold_register()).await?;
        self.write_register(reg::TIME_FF, free_fall.duration_register()).await?;
        // 0 in INT_MAP routes to INT1
        self.write_register(reg::INT_MAP, 0x00).await?;
        self.write_register(reg::INT_ENABLE, self.enabled_interrupts).await?;
        self.write_register(reg::POWER_CTL, MEASURE).await?;

        // Drop anything latched before setup
        self.read_register(reg::INT_SOURCE).await?;
        Ok(())
    }

    pub async fn read_register(&mut self, register: u8) -> Result<u8, SensorError> {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(self.address, &[register], &mut value)
            .await
            .map_err(|_| SensorError::Bus)?;
        Ok(value[0])
    }

    pub async fn write_register(&mut self, register: u8, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &[register, value])
            .await
            .map_err(|_| SensorError::Bus)
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> Accelerometer for Adxl345<I2C> {
    async fn read_sample(&mut self) -> Result<AccelSample, SensorError> {
        let mut buf = [0u8; 6];
        self.i2c
            .write_read(self.address, &[reg::DATAX0], &mut buf)
            .await
            .map_err(|_| SensorError::Bus)?;

        Ok(AccelSample::new(
            i16::from_le_bytes([buf[0], buf[1]]),
            i16::from_le_bytes([buf[2], buf[3]]),
            i16::from_le_bytes([buf[4], buf[5]]),
        ))
    }

    async fn interrupt_source(&mut self) -> Result<u8, SensorError> {
        self.read_register(reg::INT_SOURCE).await
    }

    async fn interrupt_enable(&mut self) -> Result<u8, SensorError> {
        self.read_register(reg::INT_ENABLE).await
    }

    fn expected_interrupts(&self) -> u8 {
        self.enabled_interrupts
    }
}
