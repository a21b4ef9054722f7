//! rewriting and reading the logical content of an inode

use log::debug;

use crate::utils::fs_size_calculator;

use super::{FileStorage, FsError, Image, Inode, Result, BLOCK_SIZE, DIRECT_POINTERS};

impl<I: Image> FileStorage<I> {
    /// replace the whole content of inode `index` with `data` and persist the record
    ///
    /// blocks the inode already owns are overwritten in place, missing ones are allocated,
    /// and blocks beyond the new size are released. Capacity is checked up front,
    /// so a rejected rewrite leaves both the container and `inode` untouched.
    pub(crate) fn rewrite(&mut self, index: u16, inode: &mut Inode, data: &[u8]) -> Result<()> {
        let needed = fs_size_calculator::blocks_for(data.len());
        if needed > DIRECT_POINTERS {
            return Err(FsError::FileTooLarge { size: data.len() });
        }
        let owned = inode
            .direct_blocks
            .iter()
            .take_while(|block| **block != 0)
            .count();
        if needed.saturating_sub(owned) > self.free_blocks().len() {
            return Err(FsError::StorageExhausted("blocks"));
        }
        debug!(
            "rewriting inode {index}: {} bytes, {owned} -> {needed} blocks",
            data.len()
        );

        for (slot, chunk) in data.chunks(BLOCK_SIZE).enumerate() {
            if slot < owned {
                self.write_block(inode.direct_blocks[slot], chunk)?;
            } else {
                inode.direct_blocks[slot] = self.allocate_block(chunk)?;
            }
        }
        for slot in needed..owned {
            let block = std::mem::take(&mut inode.direct_blocks[slot]);
            self.free_block(block)?;
        }
        if let Some(sentinel) = inode.direct_blocks.get_mut(needed) {
            *sentinel = 0;
        }
        inode.file_size = data.len() as u32;
        self.set_inode(index, inode)
    }
}

/// a sequential reader over the logical bytes of one inode
pub struct FileReader<'a, I: Image> {
    storage: &'a FileStorage<I>,
    inode: &'a Inode,
    /// next logical byte to read
    pub position: u32,
}

impl<'a, I: Image> FileReader<'a, I> {
    pub fn new(storage: &'a FileStorage<I>, inode: &'a Inode) -> Self {
        FileReader {
            storage,
            inode,
            position: 0,
        }
    }

    /// bytes left before the logical end of the inode
    pub fn remaining(&self) -> usize {
        self.inode.file_size.saturating_sub(self.position) as usize
    }

    /// read up to `dest.len()` bytes, never past the logical size
    /// # Return
    /// the number of bytes read, 0 at the end of the content
    pub fn read_some(&mut self, dest: &mut [u8]) -> Result<usize> {
        let len = dest.len().min(self.remaining());
        let mut done = 0;
        while done < len {
            let block_index = self.position as usize / BLOCK_SIZE;
            let offset_in_block = self.position as usize % BLOCK_SIZE;
            let step = (len - done).min(BLOCK_SIZE - offset_in_block);
            let block = self.inode.direct_blocks[block_index];
            if block == 0 {
                return Err(FsError::Corrupted(format!(
                    "slot {block_index} is empty inside the logical size"
                )));
            }
            let offset = fs_size_calculator::block_offset(block) + offset_in_block as u64;
            self.storage.read_at(offset, &mut dest[done..done + step])?;
            self.position += step as u32;
            done += step;
        }
        Ok(done)
    }

    /// read everything from the current position to the logical end
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        let mut content = vec![0u8; self.remaining()];
        self.read_some(&mut content)?;
        Ok(content)
    }
}

impl<'a, I: Image> std::io::Read for FileReader<'a, I> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.read_some(buf).map_err(|e| match e {
            FsError::Io(e) => e,
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        })
    }
}
