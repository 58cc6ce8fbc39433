//! Typed sector accessors and the name tree: node loads and stores, path
//! resolution, and the current-directory cell.
//!
//! Nodes refer to each other by `u32` sector number, the same representation
//! the disk uses. A load accessor performs no validation; callers must only
//! read sectors they know hold live nodes.

use alloc::string::String;
use alloc::vec::Vec;

use crate::device::{BlockDevice, SECTOR_SIZE, Sector};
use crate::structs::{
    DataBlock, FILE_MAGIC, FLAG_FOLDER, FS_VERSION, Node, SECTOR_ROOT, SECTOR_SUPERBLOCK,
    SuperBlock,
};
use crate::{FsError, MangoFs};

impl<D: BlockDevice> MangoFs<D> {
    pub fn read_superblock(&mut self) -> Result<SuperBlock, FsError> {
        let mut buf: Sector = [0; SECTOR_SIZE];
        self.device().read_sector(SECTOR_SUPERBLOCK, &mut buf)?;
        Ok(bytemuck::pod_read_unaligned(
            &buf[..size_of::<SuperBlock>()],
        ))
    }

    pub fn write_superblock(&mut self, sb: &SuperBlock) -> Result<(), FsError> {
        let mut buf: Sector = [0; SECTOR_SIZE];
        buf[..size_of::<SuperBlock>()].copy_from_slice(bytemuck::bytes_of(sb));
        self.device().write_sector(SECTOR_SUPERBLOCK, &buf)?;
        Ok(())
    }

    pub fn read_node(&mut self, sector: u32) -> Result<Node, FsError> {
        let mut buf: Sector = [0; SECTOR_SIZE];
        self.device().read_sector(sector, &mut buf)?;
        Ok(bytemuck::pod_read_unaligned(&buf[..size_of::<Node>()]))
    }

    pub fn write_node(&mut self, sector: u32, node: &Node) -> Result<(), FsError> {
        let mut buf: Sector = [0; SECTOR_SIZE];
        buf[..size_of::<Node>()].copy_from_slice(bytemuck::bytes_of(node));
        self.device().write_sector(sector, &buf)?;
        Ok(())
    }

    pub fn read_block(&mut self, sector: u32) -> Result<DataBlock, FsError> {
        let mut buf: Sector = [0; SECTOR_SIZE];
        self.device().read_sector(sector, &mut buf)?;
        Ok(bytemuck::pod_read_unaligned(&buf))
    }

    pub fn write_block(&mut self, sector: u32, block: &DataBlock) -> Result<(), FsError> {
        self.device().write_sector(sector, bytemuck::cast_ref(block))?;
        Ok(())
    }

    pub fn is_formatted(&mut self) -> Result<bool, FsError> {
        Ok(self.read_superblock()?.is_formatted())
    }

    pub(crate) fn ensure_formatted(&mut self) -> Result<(), FsError> {
        if self.is_formatted()? {
            Ok(())
        } else {
            Err(FsError::NotFormatted)
        }
    }

    /// Writes a fresh superblock and an empty root folder, resetting the
    /// current directory to the root. Formatting twice yields an identical
    /// disk state.
    pub fn format(&mut self, now: u64) -> Result<(), FsError> {
        let sectors = self.device().sector_count();
        let sb = SuperBlock {
            magic: FILE_MAGIC,
            version: FS_VERSION,
            sectors,
            used: 2, // superblock + root
            free: SECTOR_ROOT + 1,
            free_list: 0,
        };
        self.write_superblock(&sb)?;

        let mut root = Node {
            time_created: now,
            time_changed: now,
            parent: 0,
            child_head: 0,
            child_next: 0,
            size: 0,
            first_block: 0,
            name: [0; 32],
            flags: FLAG_FOLDER,
        };
        root.set_name("root")?;
        self.write_node(SECTOR_ROOT, &root)?;

        self.current = SECTOR_ROOT;
        Ok(())
    }

    /// Moves the current directory; the target must be a folder.
    pub fn set_current_dir(&mut self, sector: u32) -> Result<(), FsError> {
        if !self.read_node(sector)?.is_folder() {
            return Err(FsError::NotAFolder);
        }
        self.current = sector;
        Ok(())
    }

    /// Moves to the parent of the current directory. At the root this is a
    /// no-op and reports `false`.
    pub fn go_up(&mut self) -> Result<bool, FsError> {
        let node = self.read_node(self.current)?;
        if node.parent == 0 {
            return Ok(false);
        }
        self.current = node.parent;
        Ok(true)
    }

    /// Finds a child of `parent` by exact name, any kind.
    pub fn child_by_name(&mut self, parent: u32, name: &str) -> Result<Option<u32>, FsError> {
        let parent_node = self.read_node(parent)?;

        let mut current = parent_node.child_head;
        while current != 0 {
            let node = self.read_node(current)?;
            if node.name() == name {
                return Ok(Some(current));
            }
            current = node.child_next;
        }

        Ok(None)
    }

    /// Finds a file child of `parent` by name.
    pub fn file_get(&mut self, parent: u32, name: &str) -> Result<Option<u32>, FsError> {
        match self.child_by_name(parent, name)? {
            Some(sector) if self.read_node(sector)?.is_file() => Ok(Some(sector)),
            _ => Ok(None),
        }
    }

    /// Finds a folder child of `parent` by name.
    pub fn folder_get(&mut self, parent: u32, name: &str) -> Result<Option<u32>, FsError> {
        match self.child_by_name(parent, name)? {
            Some(sector) if self.read_node(sector)?.is_folder() => Ok(Some(sector)),
            _ => Ok(None),
        }
    }

    /// Resolves a `/`-delimited path to a node sector.
    ///
    /// Absolute paths start at the root, relative paths at the current
    /// directory. Empty segments (including a trailing slash) are skipped;
    /// an entirely empty path is invalid.
    pub fn resolve_path(&mut self, path: &str) -> Result<u32, FsError> {
        if path.is_empty() {
            return Err(FsError::BadPath);
        }

        let mut current = if path.starts_with('/') {
            SECTOR_ROOT
        } else {
            self.current
        };

        for segment in path.split('/') {
            if segment.is_empty() {
                continue;
            }
            current = self
                .child_by_name(current, segment)?
                .ok_or(FsError::NotFound)?;
        }

        Ok(current)
    }

    /// Rebuilds the absolute path of a node by walking `parent` links up to
    /// the root.
    pub fn abspath(&mut self, mut sector: u32) -> Result<String, FsError> {
        if sector == SECTOR_ROOT {
            return Ok(String::from("/"));
        }

        let mut segments: Vec<String> = Vec::new();
        while sector != 0 && sector != SECTOR_ROOT {
            let node = self.read_node(sector)?;
            segments.push(String::from(node.name()));
            sector = node.parent;
        }

        let mut out = String::new();
        for segment in segments.iter().rev() {
            out.push('/');
            out.push_str(segment);
        }
        Ok(out)
    }
}
