//! File and folder deletion.
//!
//! The node is unlinked from its parent before any of its sectors are
//! freed, so a crash mid-delete leaves at worst leaked sectors, never a
//! parent pointing at a freed node.

use alloc::string::String;

use crate::device::BlockDevice;
use crate::structs::SECTOR_ROOT;
use crate::{FsError, MangoFs};

impl<D: BlockDevice> MangoFs<D> {
    /// Deletes a file child of `parent`: unlink, then free the data chain,
    /// then the node sector.
    pub fn file_delete(&mut self, parent: u32, name: &str) -> Result<(), FsError> {
        self.ensure_formatted()?;

        let sector = self.child_by_name(parent, name)?.ok_or(FsError::NotFound)?;
        let node = self.read_node(sector)?;
        if !node.is_file() {
            return Err(FsError::NotAFile);
        }

        self.unlink_child(parent, sector)?;

        let mut current = node.first_block;
        while current != 0 {
            let next = self.read_block(current)?.next;
            self.sector_free(current)?;
            current = next;
        }

        self.sector_free(sector)?;
        Ok(())
    }

    /// Deletes a folder child of `parent` and its entire subtree. The root
    /// has no parent and can never be deleted through here.
    pub fn folder_delete(&mut self, parent: u32, name: &str) -> Result<(), FsError> {
        self.ensure_formatted()?;

        let sector = self.child_by_name(parent, name)?.ok_or(FsError::NotFound)?;
        if sector == SECTOR_ROOT {
            return Err(FsError::RootProtected);
        }
        let node = self.read_node(sector)?;
        if !node.is_folder() {
            return Err(FsError::NotAFolder);
        }

        self.unlink_child(parent, sector)?;

        while let Some((child_name, child_is_folder)) = self.first_child(sector)? {
            if child_is_folder {
                self.folder_delete(sector, &child_name)?;
            } else {
                self.file_delete(sector, &child_name)?;
            }
        }

        self.sector_free(sector)?;
        Ok(())
    }

    fn first_child(&mut self, folder: u32) -> Result<Option<(String, bool)>, FsError> {
        let folder_node = self.read_node(folder)?;
        if folder_node.child_head == 0 {
            return Ok(None);
        }
        let child = self.read_node(folder_node.child_head)?;
        Ok(Some((String::from(child.name()), child.is_folder())))
    }

    /// Drops `child` from the parent's sibling list, patching either the
    /// parent's `child_head` or the previous sibling's `child_next`.
    fn unlink_child(&mut self, parent: u32, child: u32) -> Result<(), FsError> {
        let mut parent_node = self.read_node(parent)?;
        let child_node = self.read_node(child)?;

        if parent_node.child_head == child {
            parent_node.child_head = child_node.child_next;
            self.write_node(parent, &parent_node)?;
            return Ok(());
        }

        let mut current = parent_node.child_head;
        while current != 0 {
            let mut current_node = self.read_node(current)?;
            if current_node.child_next == child {
                current_node.child_next = child_node.child_next;
                self.write_node(current, &current_node)?;
                return Ok(());
            }
            current = current_node.child_next;
        }

        Err(FsError::NotFound)
    }
}
