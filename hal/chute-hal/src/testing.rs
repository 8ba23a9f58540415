//! In-memory doubles shared by the unit tests

use crate::block::{BlockError, PhysicalFlash};

pub const PAGE: u32 = 256;
pub const SECTOR: u32 = 4096;

/// NOR flash emulation in RAM, `SECTORS` erase sectors long
pub struct RamFlash<const SECTORS: usize> {
    pub cells: [[u8; SECTOR as usize]; SECTORS],
    /// First programs issued, as (chip address, length)
    pub programs: heapless::Vec<(u32, usize), 16>,
}

impl<const SECTORS: usize> RamFlash<SECTORS> {
    pub fn new() -> Self {
        Self {
            cells: [[0xFF; SECTOR as usize]; SECTORS],
            programs: heapless::Vec::new(),
        }
    }

    fn cell(&mut self, address: usize) -> &mut u8 {
        &mut self.cells[address / SECTOR as usize][address % SECTOR as usize]
    }

    /// Byte at a chip address
    pub fn byte(&self, address: usize) -> u8 {
        self.cells[address / SECTOR as usize][address % SECTOR as usize]
    }
}

impl<const SECTORS: usize> PhysicalFlash for RamFlash<SECTORS> {
    const PAGE_SIZE: u32 = PAGE;
    const SECTOR_SIZE: u32 = SECTOR;

    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), BlockError> {
        for (i, out) in buf.iter_mut().enumerate() {
            *out = self.byte(address as usize + i);
        }
        Ok(())
    }

    fn program(&mut self, address: u32, data: &[u8]) -> Result<(), BlockError> {
        let start = address as usize;
        assert_eq!(
            start / PAGE as usize,
            (start + data.len() - 1) / PAGE as usize,
            "program crossed a page boundary"
        );
        for (i, byte) in data.iter().enumerate() {
            *self.cell(start + i) &= *byte;
        }
        let _ = self.programs.push((address, data.len()));
        Ok(())
    }

    fn erase_sector(&mut self, address: u32) -> Result<(), BlockError> {
        assert_eq!(address % SECTOR, 0, "unaligned sector erase");
        self.cells[(address / SECTOR) as usize].fill(0xFF);
        Ok(())
    }
}
