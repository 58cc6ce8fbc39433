//! Mode-tagged byte streams over a file's block chain.
//!
//! A stream is a cursor `(node, seek, mode)`. Content is NUL-terminated
//! text: `getc` reports the terminator without advancing past it, `putc`
//! keeps a terminator after the last written byte, and streams never shrink
//! a file.

use alloc::string::String;

use bytemuck::Zeroable;

use crate::device::BlockDevice;
use crate::structs::{BLOCK_PAYLOAD, DataBlock};
use crate::{FsError, MangoFs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    Read,
    Write,
    Append,
}

pub struct FileStream {
    node: u32,
    seek: usize,
    mode: StreamMode,
}

impl<D: BlockDevice> MangoFs<D> {
    /// Opens a stream on a file. `Read` and `Write` start at offset zero;
    /// `Append` seeks to the first NUL in the final block's payload.
    pub fn open(&mut self, path: &str, mode: StreamMode) -> Result<FileStream, FsError> {
        self.ensure_formatted()?;

        let sector = self.resolve_path(path)?;
        let node = self.read_node(sector)?;
        if !node.is_file() {
            return Err(FsError::NotAFile);
        }

        let seek = if mode == StreamMode::Append {
            let mut current = node.first_block;
            let mut block = self.read_block(current)?;
            while block.next != 0 {
                current = block.next;
                block = self.read_block(current)?;
            }

            let used = block
                .data
                .iter()
                .position(|&b| b == 0)
                .unwrap_or(BLOCK_PAYLOAD);
            (node.size as usize - 1) * BLOCK_PAYLOAD + used
        } else {
            0
        };

        Ok(FileStream {
            node: sector,
            seek,
            mode,
        })
    }
}

impl FileStream {
    pub fn seek(&self) -> usize {
        self.seek
    }

    /// Walks the chain to the block holding byte `index × 508`.
    fn block_sector_at<D: BlockDevice>(
        &self,
        fs: &mut MangoFs<D>,
        index: usize,
    ) -> Result<Option<u32>, FsError> {
        let node = fs.read_node(self.node)?;
        let mut current = node.first_block;
        for _ in 0..index {
            if current == 0 {
                return Ok(None);
            }
            current = fs.read_block(current)?.next;
        }
        Ok(if current == 0 { None } else { Some(current) })
    }

    /// Reads the byte under the cursor, advancing only when it is not the
    /// NUL terminator. Returns `0` at end of content.
    pub fn getc<D: BlockDevice>(&mut self, fs: &mut MangoFs<D>) -> Result<u8, FsError> {
        if self.mode != StreamMode::Read {
            return Err(FsError::InvalidMode);
        }

        let Some(sector) = self.block_sector_at(fs, self.seek / BLOCK_PAYLOAD)? else {
            return Ok(0);
        };
        let block = fs.read_block(sector)?;

        let byte = block.data[self.seek % BLOCK_PAYLOAD];
        if byte != 0 {
            self.seek += 1;
        }
        Ok(byte)
    }

    /// Like [`FileStream::getc`] but never advances.
    pub fn peek<D: BlockDevice>(&mut self, fs: &mut MangoFs<D>) -> Result<u8, FsError> {
        if self.mode != StreamMode::Read {
            return Err(FsError::InvalidMode);
        }

        let Some(sector) = self.block_sector_at(fs, self.seek / BLOCK_PAYLOAD)? else {
            return Ok(0);
        };
        let block = fs.read_block(sector)?;
        Ok(block.data[self.seek % BLOCK_PAYLOAD])
    }

    /// Writes one byte at the cursor. Writing over the old terminator moves
    /// it one byte forward; filling a block's final byte chains a fresh
    /// block so the terminator always has somewhere to live.
    pub fn putc<D: BlockDevice>(&mut self, fs: &mut MangoFs<D>, c: u8) -> Result<(), FsError> {
        if self.mode == StreamMode::Read {
            return Err(FsError::InvalidMode);
        }

        let index = self.seek / BLOCK_PAYLOAD;
        let sector = match self.block_sector_at(fs, index)? {
            Some(sector) => sector,
            // appending right after a completely full final block
            None => self.extend_chain(fs)?,
        };

        let mut block = fs.read_block(sector)?;
        let at = self.seek % BLOCK_PAYLOAD;

        if block.data[at] == 0 {
            if at == BLOCK_PAYLOAD - 1 {
                if block.next == 0 {
                    let new_block = fs.sector_alloc()?;
                    fs.write_block(new_block, &DataBlock::zeroed())?;
                    block.next = new_block;

                    let mut node = fs.read_node(self.node)?;
                    node.size += 1;
                    fs.write_node(self.node, &node)?;
                }
            } else {
                block.data[at + 1] = 0;
            }
        }

        block.data[at] = c;
        self.seek += 1;
        fs.write_block(sector, &block)?;
        Ok(())
    }

    /// Chains one zeroed block after the current last block.
    fn extend_chain<D: BlockDevice>(&self, fs: &mut MangoFs<D>) -> Result<u32, FsError> {
        let mut node = fs.read_node(self.node)?;

        let mut current = node.first_block;
        let mut block = fs.read_block(current)?;
        while block.next != 0 {
            current = block.next;
            block = fs.read_block(current)?;
        }

        let new_block = fs.sector_alloc()?;
        fs.write_block(new_block, &DataBlock::zeroed())?;

        block.next = new_block;
        fs.write_block(current, &block)?;

        node.size += 1;
        fs.write_node(self.node, &node)?;
        Ok(new_block)
    }

    /// Fills `dest` with up to `dest.len() - 1` content bytes, stopping at
    /// the terminator, and NUL-terminates. Returns the byte count read.
    pub fn read<D: BlockDevice>(
        &mut self,
        fs: &mut MangoFs<D>,
        dest: &mut [u8],
    ) -> Result<usize, FsError> {
        if dest.is_empty() {
            return Ok(0);
        }

        let mut i = 0;
        while i < dest.len() - 1 {
            let c = self.getc(fs)?;
            if c == 0 {
                break;
            }
            dest[i] = c;
            i += 1;
        }
        dest[i] = 0;
        Ok(i)
    }

    /// Reads the remaining content to a string.
    pub fn read_to_string<D: BlockDevice>(
        &mut self,
        fs: &mut MangoFs<D>,
    ) -> Result<String, FsError> {
        let mut out = String::new();
        loop {
            let c = self.getc(fs)?;
            if c == 0 {
                return Ok(out);
            }
            out.push(c as char);
        }
    }

    pub fn write<D: BlockDevice>(
        &mut self,
        fs: &mut MangoFs<D>,
        src: &[u8],
    ) -> Result<(), FsError> {
        for &c in src {
            self.putc(fs, c)?;
        }
        Ok(())
    }
}
