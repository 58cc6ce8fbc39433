//! File and folder creation.
//!
//! A new node's sector contents are fully written out before the node is
//! linked into its parent's sibling list, so a crash mid-create leaves at
//! worst an orphaned sector, never a dangling tree edge.

use bytemuck::Zeroable;

use crate::device::BlockDevice;
use crate::structs::{DataBlock, FLAG_FILE, FLAG_FOLDER, Node};
use crate::{FsError, MangoFs};

impl<D: BlockDevice> MangoFs<D> {
    /// Creates an empty file under `parent`, returning its node sector.
    /// The file starts with one zeroed data block.
    pub fn file_create(&mut self, parent: u32, name: &str, now: u64) -> Result<u32, FsError> {
        self.ensure_formatted()?;

        let parent_node = self.read_node(parent)?;
        if !parent_node.is_folder() {
            return Err(FsError::NotAFolder);
        }
        if self.child_by_name(parent, name)?.is_some() {
            return Err(FsError::AlreadyExists);
        }

        let node_sector = self.sector_alloc()?;
        let data_sector = match self.sector_alloc() {
            Ok(sector) => sector,
            Err(err) => {
                self.sector_free(node_sector)?;
                return Err(err);
            }
        };

        let mut node = Node::zeroed();
        node.time_created = now;
        node.time_changed = now;
        node.parent = parent;
        node.flags = FLAG_FILE;
        node.first_block = data_sector;
        node.size = 1;
        node.set_name(name)?;

        self.write_block(data_sector, &DataBlock::zeroed())?;
        self.write_node(node_sector, &node)?;
        self.link_child(parent, node_sector)?;

        Ok(node_sector)
    }

    /// Creates an empty folder under `parent`, returning its node sector.
    pub fn folder_create(&mut self, parent: u32, name: &str, now: u64) -> Result<u32, FsError> {
        self.ensure_formatted()?;

        let parent_node = self.read_node(parent)?;
        if !parent_node.is_folder() {
            return Err(FsError::NotAFolder);
        }
        if self.child_by_name(parent, name)?.is_some() {
            return Err(FsError::AlreadyExists);
        }

        let node_sector = self.sector_alloc()?;

        let mut node = Node::zeroed();
        node.time_created = now;
        node.time_changed = now;
        node.parent = parent;
        node.flags = FLAG_FOLDER;
        node.set_name(name)?;

        self.write_node(node_sector, &node)?;
        self.link_child(parent, node_sector)?;

        Ok(node_sector)
    }

    /// Appends `child` at the tail of the parent's sibling list.
    fn link_child(&mut self, parent: u32, child: u32) -> Result<(), FsError> {
        let mut parent_node = self.read_node(parent)?;

        if parent_node.child_head == 0 {
            parent_node.child_head = child;
            self.write_node(parent, &parent_node)?;
            return Ok(());
        }

        let mut current = parent_node.child_head;
        let mut current_node = self.read_node(current)?;
        while current_node.child_next != 0 {
            current = current_node.child_next;
            current_node = self.read_node(current)?;
        }

        current_node.child_next = child;
        self.write_node(current, &current_node)?;
        Ok(())
    }
}
