use log::{info, warn};

use super::{
    path, FileKind, FileReader, FileStorage, FsError, Image, Inode, Result, BLOCK_SIZE,
    MAX_FILE_BYTES, MAX_INODES, ROOT_INODE,
};

/// what `stat` reports about one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub inode_id: u16,
    pub kind: FileKind,
    /// logical size, the terminator byte of files included
    pub size: u32,
    pub link_count: u16,
    pub blocks: Vec<u16>,
}

impl Metadata {
    fn new(inode_id: u16, inode: &Inode) -> Self {
        Metadata {
            inode_id,
            kind: inode.file_kind,
            size: inode.file_size,
            link_count: inode.hard_links,
            blocks: inode.direct_blocks().to_vec(),
        }
    }
}

/// the statfs view of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    pub block_size: usize,
    pub total_blocks: u16,
    pub free_blocks: usize,
    pub total_inodes: usize,
    pub free_inodes: usize,
}

impl<I: Image> FileStorage<I> {
    /// create `path` and every missing directory above it,
    /// a no-op when all of them already exist
    pub fn mkdir(&mut self, path: &str) -> Result<()> {
        info!("mkdir() called with path: {path}");
        self.resolve(path, true).map(|_| ())
    }

    /// replace the content of the file at `path`, creating it and its parent directories
    ///
    /// content is stored followed by a terminator byte
    pub fn set_file_contents(&mut self, path: &str, content: &[u8]) -> Result<()> {
        info!(
            "set_file_contents() called with path: {path} and {} bytes",
            content.len()
        );
        if content.len() > MAX_FILE_BYTES {
            return Err(FsError::FileTooLarge {
                size: content.len(),
            });
        }
        let (parent_path, name) = path::split_parent(path)?;
        let (parent, mut parent_inode) = self.resolve(parent_path, true)?;
        let mut data = Vec::with_capacity(content.len() + 1);
        data.extend_from_slice(content);
        data.push(0);

        let dir = self.read_directory(&parent_inode)?;
        match dir.entry(name) {
            None => {
                self.add_entry(parent, &mut parent_inode, dir, name, FileKind::File, &data)?;
            }
            Some(index) => {
                let mut inode = self.get_inode(index)?;
                if !inode.is_regular_file() {
                    return Err(FsError::NotAFile(path.to_string()));
                }
                self.rewrite(index, &mut inode, &data)?;
            }
        }
        Ok(())
    }

    /// the content of the file at `path`, without its terminator byte
    pub fn cat(&self, path: &str) -> Result<Vec<u8>> {
        info!("cat() called with path: {path}");
        let (index, inode) = self.find_entry(path)?;
        if !inode.is_regular_file() {
            return Err(FsError::NotAFile(path.to_string()));
        }
        let mut content = FileReader::new(self, &inode).read_all()?;
        if content.last() == Some(&0) {
            content.pop();
        } else {
            warn!("file inode {index} has no terminator byte");
        }
        Ok(content)
    }

    /// remove the file at `path`
    pub fn rm(&mut self, path: &str) -> Result<()> {
        info!("rm() called with path: {path}");
        self.remove(path, FileKind::File)
    }

    /// remove the empty directory at `path`
    pub fn rmdir(&mut self, path: &str) -> Result<()> {
        info!("rmdir() called with path: {path}");
        if path == "/" {
            return Err(FsError::IllegalRootRemoval);
        }
        self.remove(path, FileKind::Directory)
    }

    /// names in the directory at `path`, in insertion order
    ///
    /// at most `max_entries` names are returned, the rest are silently left out
    pub fn ls(&self, path: &str, max_entries: usize) -> Result<Vec<String>> {
        info!("ls() called with path: {path} and max entries: {max_entries}");
        let (_, inode) = self.lookup(path)?;
        Ok(self
            .read_directory(&inode)?
            .entries()
            .iter()
            .take(max_entries)
            .map(|entry| entry.name().into_owned())
            .collect())
    }

    /// describe the file or directory at `path`
    pub fn stat(&self, path: &str) -> Result<Metadata> {
        info!("stat() called with path: {path}");
        let (index, inode) = if path == "/" {
            (ROOT_INODE, self.get_inode(ROOT_INODE)?)
        } else {
            self.find_entry(path)?
        };
        Ok(Metadata::new(index, &inode))
    }

    /// block and inode occupancy
    pub fn usage(&self) -> Usage {
        Usage {
            block_size: BLOCK_SIZE,
            total_blocks: self.superblock().block_count,
            free_blocks: self.free_blocks().len(),
            total_inodes: MAX_INODES,
            free_inodes: self.free_inodes().len(),
        }
    }
}

impl<I: Image> FileStorage<I> {
    /// look up the last component of `path` inside its parent directory
    fn find_entry(&self, path: &str) -> Result<(u16, Inode)> {
        let (parent_path, name) = path::split_parent(path)?;
        let (_, parent_inode) = self.lookup(parent_path)?;
        let index = self
            .read_directory(&parent_inode)?
            .entry(name)
            .ok_or_else(|| FsError::NotFound(path.to_string()))?;
        Ok((index, self.get_inode(index)?))
    }

    /// unlink `path` from its parent and release its inode and blocks
    fn remove(&mut self, path: &str, expected: FileKind) -> Result<()> {
        let (parent_path, name) = path::split_parent(path)?;
        let (parent, mut parent_inode) = self.lookup(parent_path)?;
        let mut dir = self.read_directory(&parent_inode)?;
        let index = dir
            .entry(name)
            .ok_or_else(|| FsError::NotFound(path.to_string()))?;
        let inode = self.get_inode(index)?;
        if inode.file_kind != expected {
            return Err(FsError::WrongType {
                path: path.to_string(),
                expected,
                found: inode.file_kind,
            });
        }
        if inode.is_dir() && !self.read_directory(&inode)?.is_empty() {
            return Err(FsError::DirectoryNotEmpty(path.to_string()));
        }

        self.release_inode(index)?;
        dir.remove(name);
        self.write_directory(parent, &mut parent_inode, &dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{MemoryImage, DIRECT_POINTERS};

    fn formatted(capacity: u64) -> FileStorage<MemoryImage> {
        FileStorage::format(MemoryImage::new(), capacity).expect("format failed")
    }

    #[test]
    fn test_file_round_trip() -> anyhow::Result<()> {
        let mut fs = formatted(131072);
        fs.set_file_contents("/notes.txt", b"hello world")?;
        assert_eq!(fs.cat("/notes.txt")?, b"hello world");

        let meta = fs.stat("/notes.txt")?;
        assert_eq!(meta.kind, FileKind::File);
        assert_eq!(meta.size, 12);
        assert_eq!(meta.link_count, 1);
        Ok(())
    }

    #[test]
    fn test_overwrite_keeps_single_entry() -> anyhow::Result<()> {
        let mut fs = formatted(131072);
        fs.set_file_contents("/d/f", &vec![b'a'; 4000])?;
        let free = fs.usage().free_blocks;
        fs.set_file_contents("/d/f", b"b")?;
        assert_eq!(fs.cat("/d/f")?, b"b");
        assert_eq!(fs.ls("/d", 50)?, vec!["f"]);
        // the three trailing blocks came back
        assert_eq!(fs.usage().free_blocks, free + 3);
        Ok(())
    }

    #[test]
    fn test_largest_file() -> anyhow::Result<()> {
        let mut fs = formatted(131072);
        let content = vec![b'x'; MAX_FILE_BYTES];
        fs.set_file_contents("/big", &content)?;
        assert_eq!(fs.cat("/big")?, content);
        assert_eq!(fs.stat("/big")?.blocks.len(), DIRECT_POINTERS);

        let too_big = vec![b'x'; MAX_FILE_BYTES + 1];
        assert!(matches!(
            fs.set_file_contents("/big", &too_big),
            Err(FsError::FileTooLarge { .. })
        ));
        assert_eq!(fs.cat("/big")?, content);
        Ok(())
    }

    #[test]
    fn test_type_mismatches() -> anyhow::Result<()> {
        let mut fs = formatted(131072);
        fs.mkdir("/dir")?;
        fs.set_file_contents("/file", b"x")?;

        assert!(matches!(
            fs.set_file_contents("/dir", b"x"),
            Err(FsError::NotAFile(_))
        ));
        assert!(matches!(fs.cat("/dir"), Err(FsError::NotAFile(_))));
        assert!(matches!(fs.rm("/dir"), Err(FsError::WrongType { .. })));
        assert!(matches!(fs.rmdir("/file"), Err(FsError::WrongType { .. })));
        assert!(matches!(fs.ls("/file", 10), Err(FsError::NotADirectory(_))));
        assert!(matches!(fs.mkdir("/file"), Err(FsError::NotADirectory(_))));
        Ok(())
    }

    #[test]
    fn test_rm_releases_everything() -> anyhow::Result<()> {
        let mut fs = formatted(131072);
        fs.mkdir("/a")?;
        let before = fs.usage();
        fs.set_file_contents("/a/f", &vec![1u8; 2100])?;
        fs.rm("/a/f")?;
        assert_eq!(fs.usage(), before);
        assert!(fs.ls("/a", 50)?.is_empty());
        assert!(matches!(fs.cat("/a/f"), Err(FsError::NotFound(_))));
        Ok(())
    }

    #[test]
    fn test_rmdir() -> anyhow::Result<()> {
        let mut fs = formatted(131072);
        let before = fs.usage();
        fs.mkdir("/a/b")?;
        assert!(matches!(
            fs.rmdir("/a"),
            Err(FsError::DirectoryNotEmpty(_))
        ));
        assert_eq!(fs.ls("/a", 50)?, vec!["b"]);

        fs.rmdir("/a/b")?;
        fs.rmdir("/a")?;
        assert_eq!(fs.usage(), before);
        assert!(matches!(fs.rmdir("/a"), Err(FsError::NotFound(_))));
        assert!(matches!(fs.rmdir("/"), Err(FsError::IllegalRootRemoval)));
        Ok(())
    }

    #[test]
    fn test_ls_cap_and_order() -> anyhow::Result<()> {
        let mut fs = formatted(131072);
        for name in ["zeta", "alpha", "mid"] {
            fs.set_file_contents(&format!("/{name}"), name.as_bytes())?;
        }
        assert_eq!(fs.ls("/", 50)?, vec!["zeta", "alpha", "mid"]);
        assert_eq!(fs.ls("/", 2)?, vec!["zeta", "alpha"]);
        assert!(fs.ls("/", 0)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_cat_without_terminator_returns_raw_bytes() -> anyhow::Result<()> {
        let mut fs = formatted(131072);
        fs.set_file_contents("/raw", b"x")?;
        let index = fs.stat("/raw")?.inode_id;
        let mut inode = fs.get_inode(index)?;
        fs.rewrite(index, &mut inode, b"raw")?;
        assert_eq!(fs.cat("/raw")?, b"raw");
        Ok(())
    }

    #[test]
    fn test_stat_root()-> anyhow::Result<()> {
        let fs = formatted(131072);
        let meta = fs.stat("/")?;
        assert_eq!(meta.inode_id, ROOT_INODE);
        assert_eq!(meta.kind, FileKind::Directory);
        assert_eq!(meta.size, 2);
        assert_eq!(meta.blocks, vec![2]);
        Ok(())
    }

    #[test]
    fn test_new_file_rolled_back_when_parent_cannot_grow() -> anyhow::Result<()> {
        // 4 blocks: the root block plus one free data block
        let mut fs = formatted(4 * 1024);
        // (1024 - 2) / 16 = 63 entries fill the root block exactly
        let mut root = fs.get_inode(ROOT_INODE)?;
        let mut dir = crate::fs::Directory::default();
        for i in 0..63 {
            dir.insert(ROOT_INODE, &format!("d{i}"));
        }
        fs.write_directory(ROOT_INODE, &mut root, &dir)?;
        let root_entries = fs.ls("/", 100)?;
        let before = fs.usage();
        assert_eq!(before.free_blocks, 1);

        // the new file takes the last block, then the root can't grow
        assert!(matches!(
            fs.set_file_contents("/late", b"x"),
            Err(FsError::StorageExhausted("blocks"))
        ));
        assert_eq!(fs.usage(), before);
        assert_eq!(fs.ls("/", 100)?, root_entries);
        Ok(())
    }
}
