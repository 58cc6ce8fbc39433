//! Whole-file writes: stream bytes into the block chain in 508-byte
//! chunks, extending the chain on demand.
//!
//! Writes never truncate: a shorter write leaves the trailing blocks
//! chained. A NUL terminator is written directly after the payload so the
//! logical end of the content stays well-defined; bytes past it are dead.

use bytemuck::Zeroable;

use crate::device::BlockDevice;
use crate::structs::{BLOCK_PAYLOAD, DataBlock};
use crate::{FsError, MangoFs};

impl<D: BlockDevice> MangoFs<D> {
    /// Overwrites the file's content from the start of its first block.
    pub fn file_write(&mut self, sector: u32, data: &[u8], now: u64) -> Result<(), FsError> {
        self.ensure_formatted()?;

        let mut node = self.read_node(sector)?;
        if !node.is_file() {
            return Err(FsError::NotAFile);
        }

        let mut written = 0;
        let mut current = node.first_block;

        loop {
            let mut block = self.read_block(current)?;

            let chunk = (data.len() - written).min(BLOCK_PAYLOAD);
            block.data[..chunk].copy_from_slice(&data[written..written + chunk]);
            if chunk < BLOCK_PAYLOAD {
                block.data[chunk] = 0;
            }
            written += chunk;

            if written == data.len() {
                self.write_block(current, &block)?;
                if chunk == BLOCK_PAYLOAD && block.next != 0 {
                    // payload ended exactly at a block boundary; terminate
                    // in the stale successor
                    let mut tail = self.read_block(block.next)?;
                    tail.data[0] = 0;
                    self.write_block(block.next, &tail)?;
                }
                break;
            }

            if block.next == 0 {
                let new_block = self.sector_alloc()?;
                self.write_block(new_block, &DataBlock::zeroed())?;

                block.next = new_block;
                self.write_block(current, &block)?;

                node.size += 1;
                self.write_node(sector, &node)?;

                current = new_block;
            } else {
                self.write_block(current, &block)?;
                current = block.next;
            }
        }

        node.time_changed = now;
        self.write_node(sector, &node)?;
        Ok(())
    }
}
