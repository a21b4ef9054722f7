use log::warn;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io::Read;

use crate::utils::{fs_size_calculator, traits::OnDiskRecord};

use super::{
    FileReader, FileStorage, FsError, Image, Inode, Result, DIR_ENTRY_SIZE, NAME_MAX_LENGTH,
};

/// one `(child inode, name)` record of a directory
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry {
    pub inode_id: u16,
    /// ascii, NUL terminated
    name: [u8; NAME_MAX_LENGTH],
}

impl OnDiskRecord for DirEntry {
    const SIZE: usize = DIR_ENTRY_SIZE;
}

impl DirEntry {
    /// `name` must already be a valid component, at most 13 bytes
    pub fn new(inode_id: u16, name: &str) -> Self {
        let mut buf = [0u8; NAME_MAX_LENGTH];
        let len = name.len().min(NAME_MAX_LENGTH - 1);
        buf[..len].copy_from_slice(&name.as_bytes()[..len]);
        DirEntry { inode_id, name: buf }
    }

    /// the significant bytes of the name, up to the first NUL
    pub fn name_bytes(&self) -> &[u8] {
        let end = self
            .name
            .iter()
            .position(|c| *c == 0)
            .unwrap_or(NAME_MAX_LENGTH);
        &self.name[..end]
    }

    pub fn name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.name_bytes())
    }

    pub fn name_eq(&self, name: &str) -> bool {
        self.name_bytes() == name.as_bytes()
    }
}

/// the decoded content of a directory inode, entries in insertion order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Directory {
    entries: Vec<DirEntry>,
}

impl Directory {
    /// look up a child by name
    ///
    /// names are unique in directories written by this crate;
    /// if a container holds duplicates anyway the last one wins
    pub fn entry(&self, name: &str) -> Option<u16> {
        self.position(name).map(|i| self.entries[i].inode_id)
    }

    fn position(&self, name: &str) -> Option<usize> {
        let mut matches = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.name_eq(name))
            .map(|(i, _)| i);
        let first = matches.next()?;
        match matches.last() {
            Some(last) => {
                warn!("directory holds more than one entry named {name:?}");
                Some(last)
            }
            None => Some(first),
        }
    }

    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// append an entry at the end
    pub fn insert(&mut self, inode_id: u16, name: &str) {
        self.entries.push(DirEntry::new(inode_id, name));
    }

    /// drop the entry [Directory::entry] would return for `name`
    pub fn remove(&mut self, name: &str) -> Option<DirEntry> {
        self.position(name).map(|i| self.entries.remove(i))
    }

    /// encode as `{ count: u16, entries: [DirEntry; count] }`
    pub fn encode(&self) -> Result<Vec<u8>> {
        let count = u16::try_from(self.entries.len())
            .map_err(|_| FsError::FileTooLarge {
                size: fs_size_calculator::directory_size(self.entries.len()),
            })?;
        let mut bytes = Vec::with_capacity(fs_size_calculator::directory_size(self.entries.len()));
        bytes.extend_from_slice(&count.to_le_bytes());
        for entry in &self.entries {
            entry.write_to(&mut bytes)?;
        }
        Ok(bytes)
    }

    /// decode from a reader positioned at the count header
    pub fn decode_from<R>(r: &mut R) -> Result<Self>
    where
        R: Read,
    {
        let mut count = [0u8; 2];
        r.read_exact(&mut count)?;
        let count = u16::from_le_bytes(count) as usize;
        let entries = (0..count)
            .map(|_| DirEntry::read_from(r))
            .collect::<Result<Vec<_>>>()?;
        Ok(Directory { entries })
    }
}

/// directory content stored in inodes
impl<I: Image> FileStorage<I> {
    pub fn read_directory(&self, inode: &Inode) -> Result<Directory> {
        let mut reader = FileReader::new(self, inode);
        let mut count = [0u8; 2];
        if reader.read_some(&mut count)? != count.len() {
            return Err(FsError::Corrupted(format!(
                "directory of {} bytes has no entry count",
                inode.file_size
            )));
        }
        let expected = fs_size_calculator::directory_size(u16::from_le_bytes(count) as usize);
        if expected != inode.file_size as usize {
            return Err(FsError::Corrupted(format!(
                "directory of {} bytes announces {} bytes of entries",
                inode.file_size, expected
            )));
        }
        reader.position = 0;
        Directory::decode_from(&mut reader)
    }

    pub(crate) fn write_directory(
        &mut self,
        index: u16,
        inode: &mut Inode,
        dir: &Directory,
    ) -> Result<()> {
        let bytes = dir.encode()?;
        self.rewrite(index, inode, &bytes)
    }
}
