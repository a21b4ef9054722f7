//! This module contains functions to calculate the size of different fs components

use crate::fs::{BLOCK_SIZE, DIR_ENTRY_SIZE, DIR_HEADER_SIZE};

/// count the whole blocks that fit in a container
/// # Arguments
/// - `capacity`: the container size in bytes
/// # Return
/// the number of blocks, the trailing partial block is dropped
/// # Example
/// ```
/// use flatfs::utils::fs_size_calculator::whole_blocks;
/// assert_eq!(whole_blocks(131072), 128);
/// assert_eq!(whole_blocks(2047), 1);
/// ```
pub const fn whole_blocks(capacity: u64) -> u64 {
    capacity / BLOCK_SIZE as u64
}

/// calculate how many blocks hold a given amount of logical bytes
/// # Arguments
/// - `size`: the logical size of an inode's content
/// # Return
/// `ceil(size / BLOCK_SIZE)`
/// # Example
/// ```
/// use flatfs::utils::fs_size_calculator::blocks_for;
/// assert_eq!(blocks_for(0), 0);
/// assert_eq!(blocks_for(1), 1);
/// assert_eq!(blocks_for(1024), 1);
/// assert_eq!(blocks_for(1025), 2);
/// ```
pub const fn blocks_for(size: usize) -> usize {
    size.div_ceil(BLOCK_SIZE)
}

/// calculate the logical size of a directory
/// # Arguments
/// - `entries`: the number of entries in the directory
/// # Return
/// the size of the count header plus every entry
/// # Example
/// ```
/// use flatfs::utils::fs_size_calculator::directory_size;
/// assert_eq!(directory_size(0), 2);
/// assert_eq!(directory_size(3), 50);
/// ```
pub const fn directory_size(entries: usize) -> usize {
    DIR_HEADER_SIZE + entries * DIR_ENTRY_SIZE
}

/// byte offset of a block inside the container
/// # Example
/// ```
/// use flatfs::utils::fs_size_calculator::block_offset;
/// assert_eq!(block_offset(2), 2048);
/// ```
pub const fn block_offset(block: u16) -> u64 {
    block as u64 * BLOCK_SIZE as u64
}
