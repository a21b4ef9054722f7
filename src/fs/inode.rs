use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::utils::{fs_size_calculator, traits::OnDiskRecord};

use super::{filekind::FileKind, DIRECT_POINTERS, INODE_SIZE};

/// one record of the inode table, 32 bytes packed on disk
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inode {
    pub file_kind: FileKind,
    /// logical size of the content in bytes
    pub file_size: u32,
    pub hard_links: u16,
    /// leading non-zero slots hold the content, the next slot is a zero sentinel
    pub direct_blocks: [u16; DIRECT_POINTERS],
}

impl OnDiskRecord for Inode {
    const SIZE: usize = INODE_SIZE;
}

impl Inode {
    /// a fresh record with one link and no blocks
    pub fn new(file_kind: FileKind) -> Self {
        Inode {
            file_kind,
            hard_links: 1,
            ..Inode::default()
        }
    }

    pub fn is_dir(&self) -> bool {
        self.file_kind == FileKind::Directory
    }

    pub fn is_regular_file(&self) -> bool {
        self.file_kind == FileKind::File
    }

    /// number of leading slots the current logical size occupies
    pub fn used_blocks(&self) -> usize {
        fs_size_calculator::blocks_for(self.file_size as usize)
    }

    /// the block ids holding this inode's content, in order
    pub fn direct_blocks(&self) -> SmallVec<[u16; DIRECT_POINTERS]> {
        self.direct_blocks
            .iter()
            .take(self.used_blocks().min(DIRECT_POINTERS))
            .copied()
            .collect()
    }
}
