use serde::{Deserialize, Serialize};

use crate::utils::{fs_size_calculator, traits::OnDiskRecord};

use super::{
    FsError, Result, BLOCK_SIZE, FS_MAGIC, INODE_SIZE, MAX_CAPACITY, MIN_CAPACITY,
    SUPERBLOCK_SIZE,
};

/// The superblock of this filesystem, the first bytes of block 0
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuperBlock {
    /// size of one inode table record
    pub inode_size: u16,
    /// blocks in the container, including superblock and inode table
    pub block_count: u16,
    /// magic number
    pub magic: i32,
}

impl SuperBlock {
    /// describe a container of `capacity` bytes, rounded down to whole blocks
    pub fn new(capacity: u64) -> Result<Self> {
        if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&capacity) {
            return Err(FsError::InvalidCapacity(capacity));
        }
        Ok(SuperBlock {
            inode_size: INODE_SIZE as u16,
            block_count: fs_size_calculator::whole_blocks(capacity) as u16,
            magic: FS_MAGIC,
        })
    }

    /// check that a superblock read from disk describes a container we understand
    pub fn validate(&self, image_len: u64) -> Result<()> {
        if self.magic != FS_MAGIC {
            return Err(FsError::Corrupted(format!(
                "bad magic number {}, expected {FS_MAGIC}",
                self.magic
            )));
        }
        if self.inode_size as usize != INODE_SIZE {
            return Err(FsError::Corrupted(format!(
                "inode records of {} bytes are not supported",
                self.inode_size
            )));
        }
        if (self.block_count as u64) * (BLOCK_SIZE as u64) < MIN_CAPACITY {
            return Err(FsError::Corrupted(format!(
                "{} blocks are too few to hold a filesystem",
                self.block_count
            )));
        }
        if self.byte_len() > image_len {
            return Err(FsError::Corrupted(format!(
                "superblock claims {} bytes but the container holds {image_len}",
                self.byte_len()
            )));
        }
        Ok(())
    }

    /// container size in bytes
    pub fn byte_len(&self) -> u64 {
        self.block_count as u64 * BLOCK_SIZE as u64
    }
}

impl OnDiskRecord for SuperBlock {
    const SIZE: usize = SUPERBLOCK_SIZE;
}
