//! The Mango on-disk file system.
//!
//! Fixed 512-byte sectors: a superblock at sector 2048, one node sector per
//! file or folder (the root at 2049), and 508-byte-payload data blocks
//! chained through a `next` link. Freed sectors go on a LIFO free list
//! threaded through the freed sectors themselves.
//!
//! The crate is device-agnostic: everything runs against the
//! [`device::BlockDevice`] trait, so the kernel drives it over PIO ATA and
//! the tests over an in-memory disk.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod allocator;
pub mod create;
pub mod delete;
pub mod device;
pub mod node;
pub mod path;
pub mod read;
pub mod stream;
pub mod structs;
pub mod write;

use thiserror::Error;

use crate::device::BlockDevice;
use crate::structs::SECTOR_ROOT;

pub use crate::device::{IoErr, SECTOR_SIZE, Sector};
pub use crate::stream::{FileStream, StreamMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FsError {
    #[error("Device error: {0}")]
    Io(#[from] IoErr),
    #[error("Disk is not formatted")]
    NotFormatted,
    #[error("Disk full")]
    DiskFull,
    #[error("No such file or folder")]
    NotFound,
    #[error("Not a folder")]
    NotAFolder,
    #[error("Not a file")]
    NotAFile,
    #[error("A file or folder with that name already exists")]
    AlreadyExists,
    #[error("Invalid path")]
    BadPath,
    #[error("Name is too long")]
    NameTooLong,
    #[error("The root folder cannot be deleted")]
    RootProtected,
    #[error("The stream mode does not permit this operation")]
    InvalidMode,
}

/// The mounted file system: a block device plus the process-wide current
/// directory used as the starting point for relative paths.
pub struct MangoFs<D: BlockDevice> {
    device: D,
    current: u32,
}

impl<D: BlockDevice> MangoFs<D> {
    pub fn new(device: D) -> Self {
        MangoFs {
            device,
            current: SECTOR_ROOT,
        }
    }

    pub fn device(&mut self) -> &mut D {
        &mut self.device
    }

    /// Sector of the current directory node.
    pub fn current_dir(&self) -> u32 {
        self.current
    }
}
