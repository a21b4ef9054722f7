//! what does our filesystem look like in the container

use crate::{
    fs::{FileKind, Inode},
    utils::{fs_size_calculator, traits::OnDiskRecord},
};

use super::{
    superblock::SuperBlock, FreeList, FsError, Image, Result, BLOCK_SIZE, DIRECT_POINTERS,
    FIRST_FREE_BLOCK, INODE_SIZE, INODE_TABLE_BLOCK, MAX_INODES, ROOT_DATA_BLOCK, ROOT_INODE,
};
use bitvec::prelude::*;
use log::{debug, info, trace};
use std::io::{Cursor, Read, Seek, SeekFrom, Write};

/// it has the following layout:
/// - block 0: superblock, zero padded
/// - block 1: inode table
/// - block 2: first content block of the root directory
/// - blocks 3..: data blocks handed out by the block allocator
#[derive(Debug)]
pub struct FileStorage<I: Image> {
    /// the container this filesystem lives in
    image: I,
    /// the superblock of this filesystem
    superblock: SuperBlock,
    free_blocks: FreeList,
    free_inodes: FreeList,
}

impl<I: Image> FileStorage<I> {
    /// create a pristine filesystem in `image`
    /// # Params
    /// - `image`: the backing store, its previous content is discarded
    /// - `capacity`: container size in bytes, rounded down to whole blocks
    /// # Return
    /// the mounted filesystem, whose root directory is empty
    pub fn format(mut image: I, capacity: u64) -> Result<Self> {
        let superblock = SuperBlock::new(capacity)?;
        info!(
            "formatting a container of {} blocks ({capacity} bytes requested)",
            superblock.block_count
        );
        image.set_len(superblock.byte_len())?;
        let mut fs = FileStorage {
            image,
            superblock,
            free_blocks: FreeList::full("block", FIRST_FREE_BLOCK, superblock.block_count),
            free_inodes: FreeList::full("inode", ROOT_INODE + 1, MAX_INODES as u16),
        };

        // zero every block, then lay down the superblock and the root directory
        fs.write_at(0, &vec![0u8; superblock.byte_len() as usize])?;
        fs.write_at(0, &superblock.to_bytes()?)?;

        let mut root = Inode::new(FileKind::Directory);
        root.direct_blocks[0] = ROOT_DATA_BLOCK;
        root.file_size = fs_size_calculator::directory_size(0) as u32;
        fs.set_inode(ROOT_INODE, &root)?;
        fs.write_block(ROOT_DATA_BLOCK, &0u16.to_le_bytes())?;
        Ok(fs)
    }

    /// open a container created by [FileStorage::format]
    ///
    /// free lists aren't stored in the container, they are rebuilt
    /// by walking the directory tree from the root
    pub fn mount(image: I) -> Result<Self> {
        let mut cursor = Cursor::new(image.bytes());
        let superblock = SuperBlock::read_from(&mut cursor)?;
        superblock.validate(image.len())?;
        info!("mounting a container of {} blocks", superblock.block_count);

        let mut fs = FileStorage {
            image,
            superblock,
            free_blocks: FreeList::full("block", FIRST_FREE_BLOCK, FIRST_FREE_BLOCK),
            free_inodes: FreeList::full("inode", ROOT_INODE + 1, ROOT_INODE + 1),
        };
        let (used_inodes, used_blocks) = fs.scan_tree()?;
        fs.free_blocks = FreeList::from_free_ids(
            "block",
            FIRST_FREE_BLOCK,
            superblock.block_count,
            (FIRST_FREE_BLOCK..superblock.block_count).filter(|b| !used_blocks[*b as usize]),
        );
        fs.free_inodes = FreeList::from_free_ids(
            "inode",
            ROOT_INODE + 1,
            MAX_INODES as u16,
            (ROOT_INODE + 1..MAX_INODES as u16).filter(|i| !used_inodes[*i as usize]),
        );
        debug!(
            "mounted with {} free blocks and {} free inodes",
            fs.free_blocks.len(),
            fs.free_inodes.len()
        );
        Ok(fs)
    }

    /// mark every inode reachable from the root and every block those inodes own
    fn scan_tree(&self) -> Result<(BitVec, BitVec)> {
        let block_count = self.superblock.block_count as usize;
        let mut used_inodes = bitvec![0; MAX_INODES];
        let mut used_blocks = bitvec![0; block_count];
        used_inodes.set(ROOT_INODE as usize, true);

        let mut pending = vec![ROOT_INODE];
        while let Some(index) = pending.pop() {
            let inode = self.get_inode(index)?;
            if inode.used_blocks() > DIRECT_POINTERS {
                return Err(FsError::Corrupted(format!(
                    "inode {index} claims {} bytes",
                    inode.file_size
                )));
            }
            for block in inode.direct_blocks() {
                let block = block as usize;
                if block < ROOT_DATA_BLOCK as usize || block >= block_count || used_blocks[block] {
                    return Err(FsError::Corrupted(format!(
                        "inode {index} references block {block} which is out of range or already owned"
                    )));
                }
                used_blocks.set(block, true);
            }
            match inode.file_kind {
                FileKind::Directory => {
                    for entry in self.read_directory(&inode)?.entries() {
                        let child = entry.inode_id as usize;
                        if child >= MAX_INODES || used_inodes[child] {
                            return Err(FsError::Corrupted(format!(
                                "directory {index} references inode {child} which is out of range or already linked"
                            )));
                        }
                        used_inodes.set(child, true);
                        pending.push(entry.inode_id);
                    }
                }
                FileKind::File => {}
                FileKind::Empty => {
                    return Err(FsError::Corrupted(format!(
                        "inode {index} is linked but empty"
                    )))
                }
            }
        }
        Ok((used_inodes, used_blocks))
    }
}

/// get [SuperBlock] and the backing [Image] of this filesystem
impl<I: Image> FileStorage<I> {
    #[inline]
    pub fn superblock(&self) -> &SuperBlock {
        &self.superblock
    }

    #[inline]
    pub fn image(&self) -> &I {
        &self.image
    }

    /// release the filesystem, handing back the container
    pub fn into_image(self) -> I {
        self.image
    }

    #[inline]
    pub(crate) fn free_blocks(&self) -> &FreeList {
        &self.free_blocks
    }

    #[inline]
    pub(crate) fn free_inodes(&self) -> &FreeList {
        &self.free_inodes
    }
}

/// raw container access, each call uses its own cursor
///
/// cursors over a slice never grow it, so access past the container end fails
impl<I: Image> FileStorage<I> {
    pub(crate) fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let mut cursor = Cursor::new(self.image.bytes());
        cursor.seek(SeekFrom::Start(offset))?;
        cursor.read_exact(buf)?;
        Ok(())
    }

    /// write and flush before returning
    pub(crate) fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        let mut cursor = Cursor::new(self.image.bytes_mut());
        cursor.seek(SeekFrom::Start(offset))?;
        cursor.write_all(data)?;
        cursor.flush()?;
        Ok(self.image.flush_range(offset, data.len())?)
    }
}

/// [Inode] table operations
impl<I: Image> FileStorage<I> {
    #[inline]
    fn inode_seek_position(index: u16) -> u64 {
        fs_size_calculator::block_offset(INODE_TABLE_BLOCK) + index as u64 * INODE_SIZE as u64
    }

    fn check_inode_index(index: u16) -> Result<()> {
        if index as usize >= MAX_INODES {
            return Err(FsError::Corrupted(format!(
                "inode {index} is outside the inode table"
            )));
        }
        Ok(())
    }

    pub fn get_inode(&self, index: u16) -> Result<Inode> {
        Self::check_inode_index(index)?;
        let mut buf = [0u8; INODE_SIZE];
        self.read_at(Self::inode_seek_position(index), &mut buf)?;
        let inode = Inode::from_bytes(&buf)?;
        trace!(
            "inode {index}: {:?} size={} links={}",
            inode.file_kind,
            inode.file_size,
            inode.hard_links
        );
        Ok(inode)
    }

    pub(crate) fn set_inode(&mut self, index: u16, inode: &Inode) -> Result<()> {
        Self::check_inode_index(index)?;
        let bytes = inode.to_bytes()?;
        self.write_at(Self::inode_seek_position(index), &bytes)
    }

    /// take a free inode id and fill it with `content`
    pub(crate) fn allocate_inode(&mut self, kind: FileKind, content: &[u8]) -> Result<u16> {
        let index = self
            .free_inodes
            .pop()
            .ok_or(FsError::StorageExhausted("inodes"))?;
        debug!("allocated inode {index} for a {kind:?}");
        let mut inode = Inode::new(kind);
        if let Err(e) = self.rewrite(index, &mut inode, content) {
            self.free_inodes.push(index)?;
            return Err(e);
        }
        Ok(index)
    }

    /// release an inode together with every block it owns
    pub(crate) fn release_inode(&mut self, index: u16) -> Result<()> {
        let inode = self.get_inode(index)?;
        for block in inode.direct_blocks() {
            self.free_block(block)?;
        }
        self.set_inode(index, &Inode::default())?;
        self.free_inodes.push(index)?;
        debug!("released inode {index}");
        Ok(())
    }
}

/// data block operations
impl<I: Image> FileStorage<I> {
    /// overwrite the leading bytes of a block, the rest of it is left alone
    pub(crate) fn write_block(&mut self, block: u16, data: &[u8]) -> Result<()> {
        debug_assert!(data.len() <= BLOCK_SIZE);
        self.write_at(fs_size_calculator::block_offset(block), data)
    }

    /// take a free block and write `data` at its start
    pub(crate) fn allocate_block(&mut self, data: &[u8]) -> Result<u16> {
        let block = self
            .free_blocks
            .pop()
            .ok_or(FsError::StorageExhausted("blocks"))?;
        debug!("allocated block {block}");
        if let Err(e) = self.write_block(block, data) {
            self.free_blocks.push(block)?;
            return Err(e);
        }
        Ok(block)
    }

    pub(crate) fn free_block(&mut self, block: u16) -> Result<()> {
        debug!("freeing block {block}");
        self.free_blocks.push(block)
    }
}
