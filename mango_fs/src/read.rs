//! Whole-file reads: concatenate the chained 508-byte payloads.

use alloc::string::String;
use alloc::vec::Vec;

use crate::device::BlockDevice;
use crate::{FsError, MangoFs};

impl<D: BlockDevice> MangoFs<D> {
    /// Reads every payload byte of the file's block chain, in chain order.
    /// The buffer length is always `size × 508`.
    pub fn file_read_blocks(&mut self, sector: u32) -> Result<Vec<u8>, FsError> {
        self.ensure_formatted()?;

        let node = self.read_node(sector)?;
        if !node.is_file() {
            return Err(FsError::NotAFile);
        }

        let mut buffer = Vec::with_capacity(node.size as usize * crate::structs::BLOCK_PAYLOAD);
        let mut current = node.first_block;
        while current != 0 {
            let block = self.read_block(current)?;
            buffer.extend_from_slice(&block.data);
            current = block.next;
        }

        Ok(buffer)
    }

    /// Reads the file's logical content: the payload bytes up to the first
    /// NUL terminator.
    pub fn file_read(&mut self, sector: u32) -> Result<String, FsError> {
        let raw = self.file_read_blocks(sector)?;
        let len = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(String::from_utf8_lossy(&raw[..len]).into_owned())
    }
}
