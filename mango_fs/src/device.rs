use thiserror::Error;

pub const SECTOR_SIZE: usize = 512;

/// One 512-byte disk sector.
pub type Sector = [u8; SECTOR_SIZE];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IoErr {
    #[error("The device is unavailable")]
    Unavailable,
    #[error("Sector is out of range")]
    SectorOutOfRange,
    #[error("The drive reported an error")]
    DriveError,
    #[error("The IO process timed out")]
    IoTimeout,
}

/// Synchronous 512-byte sector access by LBA.
///
/// One sector per request, blocking until the transfer completes. Writes are
/// durable when the call returns (the PIO implementation issues FLUSH before
/// reporting success).
pub trait BlockDevice {
    fn read_sector(&mut self, lba: u32, buf: &mut Sector) -> Result<(), IoErr>;
    fn write_sector(&mut self, lba: u32, buf: &Sector) -> Result<(), IoErr>;

    /// Total addressable sectors as reported by IDENTIFY.
    fn sector_count(&mut self) -> u32;
}
