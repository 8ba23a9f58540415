//! On-board flash for the flight log
//!
//! The top 1 MiB of the 2 MiB QSPI flash holds the log partition; firmware
//! code and data must stay below it (see `memory.x`).

use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE, PAGE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;

use chute_hal::{BlockError, BlockStorageAdapter, PhysicalFlash, SequentialLogStore};

/// Flash chip size on the Pico
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Log partition size
pub const LOG_PARTITION_SIZE: usize = 1024 * 1024;

/// Chip offset of the log partition
pub const LOG_PARTITION_START: u32 = (FLASH_SIZE - LOG_PARTITION_SIZE) as u32;

/// Erase blocks in the log partition
pub const LOG_BLOCK_COUNT: u32 = (LOG_PARTITION_SIZE / ERASE_SIZE) as u32;

/// Log store over the whole log partition
pub type RpLogStore = SequentialLogStore<BlockStorageAdapter<RpFlash<'static>>>;

/// Blocking flash driver
///
/// The RP2040 executes from this same flash, so every program or erase
/// stalls the core until it completes.
pub struct RpFlash<'d> {
    flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>,
}

impl<'d> RpFlash<'d> {
    pub fn new(flash: Peri<'d, FLASH>) -> Self {
        Self {
            flash: Flash::new_blocking(flash),
        }
    }
}

impl PhysicalFlash for RpFlash<'_> {
    const PAGE_SIZE: u32 = PAGE_SIZE as u32;
    const SECTOR_SIZE: u32 = ERASE_SIZE as u32;

    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), BlockError> {
        self.flash
            .blocking_read(address, buf)
            .map_err(|_| BlockError::Device)
    }

    fn program(&mut self, address: u32, data: &[u8]) -> Result<(), BlockError> {
        self.flash
            .blocking_write(address, data)
            .map_err(|_| BlockError::Device)
    }

    fn erase_sector(&mut self, address: u32) -> Result<(), BlockError> {
        self.flash
            .blocking_erase(address, address + ERASE_SIZE as u32)
            .map_err(|_| BlockError::Device)
    }
}

/// Unmounted log store on the log partition
pub fn log_store(flash: Peri<'static, FLASH>) -> RpLogStore {
    let adapter = BlockStorageAdapter::new(RpFlash::new(flash), LOG_PARTITION_START, LOG_BLOCK_COUNT);
    SequentialLogStore::new(adapter)
}
