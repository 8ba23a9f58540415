//! Block device geometry and the flash adapter
//!
//! The storage library addresses its partition as a linear range of bytes
//! split into erase blocks. [`BlockStorageAdapter`] maps those requests onto
//! the physical flash primitives of the chip. Program and erase run with
//! interrupts masked: flash is unreadable while the operation is in flight,
//! so nothing may execute from it in the meantime.

use embedded_storage_async::nor_flash::{
    ErrorType, MultiwriteNorFlash, NorFlash, NorFlashError, NorFlashErrorKind, ReadNorFlash,
};

/// Erase cycles per block before data should be relocated
pub const BLOCK_CYCLES: u32 = 500;

/// Lookahead window of the block allocator
pub const LOOKAHEAD_SIZE: u32 = 16;

/// Word size used for linear writes (one record header word)
pub const WRITE_WORD: usize = 4;

/// Fixed layout of a flash partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlockGeometry {
    /// Minimum read granularity in bytes
    pub read_size: u32,
    /// Program granularity (hardware page)
    pub prog_size: u32,
    /// Erase granularity (hardware sector)
    pub block_size: u32,
    /// Number of blocks in the partition
    pub block_count: u32,
    /// Write cycles per block before relocation
    pub block_cycles: u32,
    /// Cache size, one erase sector
    pub cache_size: u32,
    /// Allocator lookahead in bytes
    pub lookahead_size: u32,
}

impl BlockGeometry {
    /// Geometry for a partition of `block_count` sectors on flash `F`
    pub const fn for_flash<F: PhysicalFlash>(block_count: u32) -> Self {
        Self {
            read_size: 1,
            prog_size: F::PAGE_SIZE,
            block_size: F::SECTOR_SIZE,
            block_count,
            block_cycles: BLOCK_CYCLES,
            cache_size: F::SECTOR_SIZE,
            lookahead_size: LOOKAHEAD_SIZE,
        }
    }

    /// Total partition size in bytes
    pub const fn capacity(&self) -> u32 {
        self.block_size * self.block_count
    }

    /// Translate a block-relative request into a partition-relative address
    pub fn locate(&self, block: u32, offset: u32, len: usize) -> Result<u32, BlockError> {
        if block >= self.block_count {
            return Err(BlockError::OutOfBounds);
        }
        let len = u32::try_from(len).map_err(|_| BlockError::OutOfBounds)?;
        match offset.checked_add(len) {
            Some(end) if end <= self.block_size => Ok(block * self.block_size + offset),
            _ => Err(BlockError::OutOfBounds),
        }
    }
}

/// Errors from block-level flash access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlockError {
    /// Request falls outside the partition or its block
    OutOfBounds,
    /// Request is not aligned to the required granularity
    NotAligned,
    /// The flash controller reported a failure
    Device,
}

impl NorFlashError for BlockError {
    fn kind(&self) -> NorFlashErrorKind {
        match self {
            BlockError::OutOfBounds => NorFlashErrorKind::OutOfBounds,
            BlockError::NotAligned => NorFlashErrorKind::NotAligned,
            BlockError::Device => NorFlashErrorKind::Other,
        }
    }
}

/// Raw vendor flash primitives
///
/// Addresses are offsets from the start of the flash chip. `program` is
/// never asked to cross a page boundary and `erase_sector` is always given
/// a sector-aligned address.
pub trait PhysicalFlash {
    /// Program page size in bytes
    const PAGE_SIZE: u32;
    /// Erase sector size in bytes
    const SECTOR_SIZE: u32;

    /// Copy `buf.len()` bytes starting at `address`
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), BlockError>;

    /// Program `data` into erased flash at `address`
    fn program(&mut self, address: u32, data: &[u8]) -> Result<(), BlockError>;

    /// Erase the sector starting at `address`
    fn erase_sector(&mut self, address: u32) -> Result<(), BlockError>;
}

/// Block-addressed storage operations
pub trait BlockDevice {
    /// Partition layout
    fn geometry(&self) -> &BlockGeometry;

    /// Read from `block` at byte `offset`
    fn read(&mut self, block: u32, offset: u32, buf: &mut [u8]) -> Result<(), BlockError>;

    /// Program `data` into `block` at byte `offset`
    fn program(&mut self, block: u32, offset: u32, data: &[u8]) -> Result<(), BlockError>;

    /// Erase a whole block
    fn erase(&mut self, block: u32) -> Result<(), BlockError>;

    /// Flush anything buffered between calls
    fn sync(&mut self) -> Result<(), BlockError>;
}

/// Flash partition exposed as a block device and as NOR flash
///
/// `base` is the chip offset of the first partition byte and must be
/// sector-aligned.
pub struct BlockStorageAdapter<F> {
    flash: F,
    base: u32,
    geometry: BlockGeometry,
}

impl<F: PhysicalFlash> BlockStorageAdapter<F> {
    /// Wrap `flash`, exposing `block_count` sectors starting at `base`
    pub fn new(flash: F, base: u32, block_count: u32) -> Self {
        Self {
            flash,
            base,
            geometry: BlockGeometry::for_flash::<F>(block_count),
        }
    }

    /// Release the underlying flash driver
    pub fn into_inner(self) -> F {
        self.flash
    }

    /// Program a partition-relative range, one page at a time
    fn program_pages(&mut self, address: u32, data: &[u8]) -> Result<(), BlockError> {
        let page = F::PAGE_SIZE;
        let mut address = address;
        let mut rest = data;

        while !rest.is_empty() {
            let room = (page - address % page) as usize;
            let (chunk, tail) = rest.split_at(room.min(rest.len()));
            let target = self.base + address;
            let flash = &mut self.flash;
            critical_section::with(|_| flash.program(target, chunk))?;
            address += chunk.len() as u32;
            rest = tail;
        }

        Ok(())
    }
}

/// Walk a linear partition range block by block
///
/// `f` receives the block index, the offset inside that block and the
/// matching range of the caller's buffer.
fn walk_spans(
    geometry: &BlockGeometry,
    offset: u32,
    len: usize,
    mut f: impl FnMut(u32, u32, core::ops::Range<usize>) -> Result<(), BlockError>,
) -> Result<(), BlockError> {
    let block_size = geometry.block_size;
    let end = (offset as usize)
        .checked_add(len)
        .ok_or(BlockError::OutOfBounds)?;
    if end > geometry.capacity() as usize {
        return Err(BlockError::OutOfBounds);
    }

    let mut done = 0usize;
    while done < len {
        let linear = offset + done as u32;
        let block = linear / block_size;
        let within = linear % block_size;
        let span = ((block_size - within) as usize).min(len - done);
        f(block, within, done..done + span)?;
        done += span;
    }

    Ok(())
}

impl<F: PhysicalFlash> BlockDevice for BlockStorageAdapter<F> {
    fn geometry(&self) -> &BlockGeometry {
        &self.geometry
    }

    fn read(&mut self, block: u32, offset: u32, buf: &mut [u8]) -> Result<(), BlockError> {
        let address = self.geometry.locate(block, offset, buf.len())?;
        self.flash.read(self.base + address, buf)
    }

    fn program(&mut self, block: u32, offset: u32, data: &[u8]) -> Result<(), BlockError> {
        let address = self.geometry.locate(block, offset, data.len())?;
        self.program_pages(address, data)
    }

    fn erase(&mut self, block: u32) -> Result<(), BlockError> {
        let size = self.geometry.block_size as usize;
        let address = self.geometry.locate(block, 0, size)?;
        let target = self.base + address;
        let flash = &mut self.flash;
        critical_section::with(|_| flash.erase_sector(target))
    }

    fn sync(&mut self) -> Result<(), BlockError> {
        // Programs are written through; nothing is held back
        Ok(())
    }
}

impl<F: PhysicalFlash> ErrorType for BlockStorageAdapter<F> {
    type Error = BlockError;
}

impl<F: PhysicalFlash> ReadNorFlash for BlockStorageAdapter<F> {
    const READ_SIZE: usize = 1;

    async fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let geometry = self.geometry;
        walk_spans(&geometry, offset, bytes.len(), |block, within, range| {
            BlockDevice::read(&mut *self, block, within, &mut bytes[range])
        })
    }

    fn capacity(&self) -> usize {
        self.geometry.capacity() as usize
    }
}

impl<F: PhysicalFlash> NorFlash for BlockStorageAdapter<F> {
    const WRITE_SIZE: usize = WRITE_WORD;
    const ERASE_SIZE: usize = F::SECTOR_SIZE as usize;

    async fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        let block_size = self.geometry.block_size;
        if from % block_size != 0 || to % block_size != 0 {
            return Err(BlockError::NotAligned);
        }
        if from > to || to > self.geometry.capacity() {
            return Err(BlockError::OutOfBounds);
        }
        for block in from / block_size..to / block_size {
            BlockDevice::erase(self, block)?;
        }
        Ok(())
    }

    async fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        if offset as usize % WRITE_WORD != 0 || bytes.len() % WRITE_WORD != 0 {
            return Err(BlockError::NotAligned);
        }
        let geometry = self.geometry;
        walk_spans(&geometry, offset, bytes.len(), |block, within, range| {
            BlockDevice::program(&mut *self, block, within, &bytes[range])
        })
    }
}

// NOR program only clears bits
impl<F: PhysicalFlash> MultiwriteNorFlash for BlockStorageAdapter<F> {}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    use crate::testing::{RamFlash, PAGE, SECTOR};

    /// Two-sector partition placed after the first chip sector
    fn adapter() -> BlockStorageAdapter<RamFlash<3>> {
        BlockStorageAdapter::new(RamFlash::new(), SECTOR, 2)
    }

    #[test]
    fn test_geometry_matches_flash() {
        let adapter = adapter();
        let geometry = adapter.geometry();
        assert_eq!(geometry.read_size, 1);
        assert_eq!(geometry.prog_size, PAGE);
        assert_eq!(geometry.block_size, SECTOR);
        assert_eq!(geometry.cache_size, SECTOR);
        assert_eq!(geometry.block_cycles, BLOCK_CYCLES);
        assert_eq!(geometry.lookahead_size, LOOKAHEAD_SIZE);
        assert_eq!(geometry.capacity(), 2 * SECTOR);
    }

    #[test]
    fn test_locate_rejects_out_of_bounds() {
        let geometry = BlockGeometry::for_flash::<RamFlash<3>>(2);
        assert_eq!(geometry.locate(1, 16, 4), Ok(SECTOR + 16));
        assert_eq!(geometry.locate(2, 0, 1), Err(BlockError::OutOfBounds));
        assert_eq!(geometry.locate(0, SECTOR - 2, 4), Err(BlockError::OutOfBounds));
        assert_eq!(geometry.locate(0, u32::MAX, 1), Err(BlockError::OutOfBounds));
    }

    #[test]
    fn test_program_splits_at_page_boundary() {
        let mut adapter = adapter();
        let data = [0x5Au8; 20];
        BlockDevice::program(&mut adapter, 0, 250, &data).unwrap();

        let mut back = [0u8; 20];
        BlockDevice::read(&mut adapter, 0, 250, &mut back).unwrap();
        assert_eq!(back, data);

        let flash = adapter.into_inner();
        assert_eq!(flash.programs.as_slice(), &[(SECTOR + 250, 6), (SECTOR + 256, 14)]);
        // Sector below the partition is untouched
        assert!(flash.cells[0].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_erase_restores_erased_state() {
        let mut adapter = adapter();
        BlockDevice::program(&mut adapter, 1, 0, &[0u8; 8]).unwrap();
        BlockDevice::erase(&mut adapter, 1).unwrap();
        BlockDevice::sync(&mut adapter).unwrap();

        let mut back = [0u8; 8];
        BlockDevice::read(&mut adapter, 1, 0, &mut back).unwrap();
        assert_eq!(back, [0xFF; 8]);
        assert_eq!(BlockDevice::erase(&mut adapter, 2), Err(BlockError::OutOfBounds));
    }

    #[test]
    fn test_nor_write_rejects_misaligned() {
        let mut adapter = adapter();
        assert_eq!(
            block_on(NorFlash::write(&mut adapter, 2, &[0u8; 4])),
            Err(BlockError::NotAligned)
        );
        assert_eq!(
            block_on(NorFlash::write(&mut adapter, 0, &[0u8; 3])),
            Err(BlockError::NotAligned)
        );
    }

    #[test]
    fn test_nor_access_spans_blocks() {
        let mut adapter = adapter();
        let data = [1u8, 2, 3, 4, 5, 6, 7, 8];
        block_on(NorFlash::write(&mut adapter, SECTOR - 4, &data)).unwrap();

        let mut back = [0u8; 8];
        block_on(ReadNorFlash::read(&mut adapter, SECTOR - 4, &mut back)).unwrap();
        assert_eq!(back, data);

        let mut tail = [0u8; 4];
        BlockDevice::read(&mut adapter, 1, 0, &mut tail).unwrap();
        assert_eq!(tail, [5, 6, 7, 8]);
    }

    #[test]
    fn test_nor_read_past_capacity_fails() {
        let mut adapter = adapter();
        let mut buf = [0u8; 8];
        assert_eq!(
            block_on(ReadNorFlash::read(&mut adapter, 2 * SECTOR - 4, &mut buf)),
            Err(BlockError::OutOfBounds)
        );
        assert_eq!(ReadNorFlash::capacity(&adapter), 2 * SECTOR as usize);
    }

    #[test]
    fn test_nor_erase_requires_sector_alignment() {
        let mut adapter = adapter();
        assert_eq!(
            block_on(NorFlash::erase(&mut adapter, 0, 100)),
            Err(BlockError::NotAligned)
        );
        assert_eq!(
            block_on(NorFlash::erase(&mut adapter, 0, 3 * SECTOR)),
            Err(BlockError::OutOfBounds)
        );

        block_on(NorFlash::write(&mut adapter, 8, &[0u8; 4])).unwrap();
        block_on(NorFlash::erase(&mut adapter, 0, SECTOR)).unwrap();
        let mut back = [0u8; 4];
        block_on(ReadNorFlash::read(&mut adapter, 8, &mut back)).unwrap();
        assert_eq!(back, [0xFF; 4]);
    }
}
