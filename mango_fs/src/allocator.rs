//! Sector allocator: LIFO free list threaded through the freed sectors,
//! with a bump pointer for never-allocated space.

use crate::device::{BlockDevice, SECTOR_SIZE, Sector};
use crate::{FsError, MangoFs};

impl<D: BlockDevice> MangoFs<D> {
    /// Pops the free-list head if the list is non-empty (the freed sector's
    /// first four bytes hold the next head), otherwise takes the bump
    /// pointer. Fails with `DiskFull` when every sector is accounted for.
    pub fn sector_alloc(&mut self) -> Result<u32, FsError> {
        let mut sb = self.read_superblock()?;

        if sb.used >= sb.sectors {
            return Err(FsError::DiskFull);
        }
        sb.used += 1;

        if sb.free_list != 0 {
            let sector = sb.free_list;

            let mut buf: Sector = [0; SECTOR_SIZE];
            self.device().read_sector(sector, &mut buf)?;
            sb.free_list = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);

            self.write_superblock(&sb)?;
            return Ok(sector);
        }

        let sector = sb.free;
        sb.free += 1;
        self.write_superblock(&sb)?;
        Ok(sector)
    }

    /// Pushes the sector onto the free list: the old head is written into
    /// the sector's first four bytes and the sector becomes the new head.
    pub fn sector_free(&mut self, sector: u32) -> Result<(), FsError> {
        let mut sb = self.read_superblock()?;

        let mut buf: Sector = [0; SECTOR_SIZE];
        buf[..4].copy_from_slice(&sb.free_list.to_le_bytes());
        self.device().write_sector(sector, &buf)?;

        sb.free_list = sector;
        sb.used -= 1;
        self.write_superblock(&sb)?;
        Ok(())
    }
}
