//! our flat-container filesystem
pub mod content;
pub mod directory;
pub mod error;
pub mod filekind;
pub mod free_list;
pub mod fs_layout;
pub mod image;
pub mod inode;
pub mod path;
pub mod superblock;
mod fs_api_impl;
pub use content::*;
pub use directory::*;
pub use error::*;
pub use filekind::*;
pub(crate) use free_list::*;
pub use fs_api_impl::*;
pub use fs_layout::*;
pub use image::*;
pub use inode::*;
pub use superblock::*;

/// size of every addressable unit of the container
pub const BLOCK_SIZE: usize = 1024;
pub const FS_MAGIC: i32 = 1337;
pub const SUPERBLOCK_SIZE: usize = 8;

/// the inode table lives in block 1
pub const INODE_TABLE_BLOCK: u16 = 1;
pub const INODE_SIZE: usize = 32;
pub const MAX_INODES: usize = BLOCK_SIZE / INODE_SIZE;
pub const ROOT_INODE: u16 = 0;

/// first content block of the root directory, pre-assigned by `format`
pub const ROOT_DATA_BLOCK: u16 = 2;
/// first block handed out by the block allocator
pub const FIRST_FREE_BLOCK: u16 = 3;

pub const DIRECT_POINTERS: usize = 12;
/// the largest logical size an inode can hold without indirect blocks
pub const MAX_FILE_BYTES: usize = DIRECT_POINTERS * BLOCK_SIZE - 1;

/// fixed name buffer of a directory entry, NUL terminated
pub const NAME_MAX_LENGTH: usize = 14;
pub const DIR_ENTRY_SIZE: usize = 2 + NAME_MAX_LENGTH;
/// the `u16` entry count that prefixes directory content
pub const DIR_HEADER_SIZE: usize = 2;

/// superblock, inode table and the root directory block
pub const MIN_CAPACITY: u64 = 3 * BLOCK_SIZE as u64;
pub const MAX_CAPACITY: u64 = u16::MAX as u64 * BLOCK_SIZE as u64;
