//! PIO PATA driver for the primary IDE channel: one 512-byte sector per
//! request, synchronous busy-wait, 28-bit LBA.

use lazy_static::lazy_static;
use mango_fs::MangoFs;
use spin::Mutex;
use terminal::log;
use x86_64::instructions::port::{
    Port, PortGeneric, PortReadOnly, PortWriteOnly, ReadOnlyAccess, ReadWriteAccess,
    WriteOnlyAccess,
};

pub mod pio;

pub const PATA_PRIMARY_BASE: u16 = 0x1F0;

pub mod offsets {
    pub const DATA: u16 = 0;
    pub const ERROR: u16 = 1;
    pub const SECTOR_COUNT: u16 = 2;
    pub const LBA_LOW: u16 = 3;
    pub const LBA_MID: u16 = 4;
    pub const LBA_HIGH: u16 = 5;
    pub const DRIVE: u16 = 6;
    pub const STATUS: u16 = 7;
    pub const COMMAND: u16 = 7;
}

pub mod cmd {
    pub const READ_SECTORS: u8 = 0x20;
    pub const WRITE_SECTORS: u8 = 0x30;
    pub const FLUSH_CACHE: u8 = 0xE7;
    pub const IDENTITY: u8 = 0xEC;

    /// Drive-select values for the master device.
    pub const START_IDENTIFY: u8 = 0xA0;
    pub const LBA28: u8 = 0xE0;
}

pub mod status {
    pub const ERR: u8 = 1 << 0;
    pub const DRQ: u8 = 1 << 3;
    pub const BSY: u8 = 1 << 7;
}

pub enum PataIdentErr {
    DeviceNonExist,
    DeviceNotAta,
    Error,
}

pub struct PataDevice {
    pub identified: bool,
    pub lba28_sector_count: u32,

    pub data_port: PortGeneric<u16, ReadWriteAccess>,
    pub error_port: PortGeneric<u8, ReadOnlyAccess>,
    pub sector_count_port: PortGeneric<u8, ReadWriteAccess>,
    pub lba_low_port: PortGeneric<u8, ReadWriteAccess>,
    pub lba_mid_port: PortGeneric<u8, ReadWriteAccess>,
    pub lba_high_port: PortGeneric<u8, ReadWriteAccess>,
    pub drive_port: PortGeneric<u8, ReadWriteAccess>,
    pub status_port: PortGeneric<u8, ReadOnlyAccess>,
    pub cmd_port: PortGeneric<u8, WriteOnlyAccess>,
}

impl PataDevice {
    pub fn new(base_port: u16) -> Self {
        PataDevice {
            identified: false,
            lba28_sector_count: 0,

            data_port: Port::new(base_port + offsets::DATA),
            error_port: PortReadOnly::new(base_port + offsets::ERROR),
            sector_count_port: Port::new(base_port + offsets::SECTOR_COUNT),
            lba_low_port: Port::new(base_port + offsets::LBA_LOW),
            lba_mid_port: Port::new(base_port + offsets::LBA_MID),
            lba_high_port: Port::new(base_port + offsets::LBA_HIGH),
            drive_port: Port::new(base_port + offsets::DRIVE),
            status_port: PortReadOnly::new(base_port + offsets::STATUS),
            cmd_port: PortWriteOnly::new(base_port + offsets::COMMAND),
        }
    }

    pub fn identify(&mut self) -> Result<(), PataIdentErr> {
        log!("identify: starting device identification");

        unsafe {
            self.drive_port.write(cmd::START_IDENTIFY);
            self.sector_count_port.write(0);
            self.lba_low_port.write(0);
            self.lba_mid_port.write(0);
            self.lba_high_port.write(0);
            self.cmd_port.write(cmd::IDENTITY);
        }

        let first_status = unsafe { self.status_port.read() };
        if first_status == 0 || first_status == 0xFF {
            log!("identify: no drive (status {:#x})", first_status);
            return Err(PataIdentErr::DeviceNonExist);
        }

        // settle delay
        for _ in 0..14 {
            unsafe { self.status_port.read() };
        }

        loop {
            unsafe {
                if self.lba_mid_port.read() != 0 || self.lba_high_port.read() != 0 {
                    log!("identify: device is not ATA");
                    return Err(PataIdentErr::DeviceNotAta);
                }

                let status = self.status_port.read();
                if status & status::ERR != 0 {
                    log!("identify: error bit set ({:#x})", self.error_port.read());
                    return Err(PataIdentErr::Error);
                }
                if status & status::DRQ != 0 {
                    break;
                }
            }
        }

        let mut buf = [0u16; 256];
        for word in buf.iter_mut() {
            *word = unsafe { self.data_port.read() };
        }

        self.identified = true;
        self.lba28_sector_count = (buf[60] as u32) | ((buf[61] as u32) << 16);

        log!(
            "identify: {} sectors ({} MB)",
            self.lba28_sector_count,
            self.lba28_sector_count as u64 * 512 / (1024 * 1024)
        );
        Ok(())
    }
}

lazy_static! {
    /// The one mounted file system, backed by the primary PATA device.
    /// Only the cooperative main path may lock this; interrupt handlers
    /// never touch the disk.
    pub static ref FILE_SYSTEM: Mutex<MangoFs<PataDevice>> =
        Mutex::new(MangoFs::new(PataDevice::new(PATA_PRIMARY_BASE)));
}

/// Identifies the primary drive; a missing or non-ATA device is fatal.
pub fn init_primary() {
    let mut fs = FILE_SYSTEM.lock();
    match fs.device().identify() {
        Ok(()) => {}
        Err(PataIdentErr::DeviceNonExist) => panic!("no primary drive"),
        Err(PataIdentErr::DeviceNotAta) => panic!("incompatible storage device"),
        Err(PataIdentErr::Error) => panic!("primary drive reported an error"),
    }
}
