//! slash separated paths, always absolute

use log::{debug, warn};

use super::{
    Directory, FileKind, FileStorage, FsError, Image, Inode, Result, DIR_ENTRY_SIZE,
    NAME_MAX_LENGTH, ROOT_INODE,
};
use crate::utils::fs_size_calculator;

/// check one path component: 1 to 13 ascii bytes, no NUL
pub(crate) fn validate_name<'a>(path: &str, name: &'a str) -> Result<&'a str> {
    if name.is_empty() {
        return Err(FsError::malformed(path, "empty component"));
    }
    if name.len() > NAME_MAX_LENGTH - 1 {
        return Err(FsError::malformed(path, "component longer than 13 bytes"));
    }
    if !name.is_ascii() || name.contains('\0') {
        return Err(FsError::malformed(path, "component is not plain ascii"));
    }
    Ok(name)
}

/// split an absolute path into its components, `/` has none
pub(crate) fn components(path: &str) -> Result<Vec<&str>> {
    let rest = path
        .strip_prefix('/')
        .ok_or_else(|| FsError::malformed(path, "path must start with '/'"))?;
    if rest.is_empty() {
        return Ok(Vec::new());
    }
    rest.split('/').map(|name| validate_name(path, name)).collect()
}

/// split a path into its parent directory and its last component
/// # Example
/// `/a/b/f.txt` gives `("/a/b", "f.txt")`, `/f.txt` gives `("/", "f.txt")`
pub(crate) fn split_parent(path: &str) -> Result<(&str, &str)> {
    if !path.starts_with('/') {
        return Err(FsError::malformed(path, "path must start with '/'"));
    }
    let (parent, name) = path
        .rsplit_once('/')
        .ok_or_else(|| FsError::malformed(path, "path must start with '/'"))?;
    let name = validate_name(path, name)?;
    Ok((if parent.is_empty() { "/" } else { parent }, name))
}

/// path resolution
impl<I: Image> FileStorage<I> {
    /// the child `name` of directory `dir`, which must itself be a directory
    fn child_dir(&self, dir: &Inode, name: &str, walked: &str) -> Result<Option<(u16, Inode)>> {
        let Some(index) = self.read_directory(dir)?.entry(name) else {
            return Ok(None);
        };
        let inode = self.get_inode(index)?;
        if !inode.is_dir() {
            return Err(FsError::NotADirectory(walked.to_string()));
        }
        Ok(Some((index, inode)))
    }

    /// walk `path` from the root without creating anything
    ///
    /// every component, the last one included, must be a directory
    pub fn lookup(&self, path: &str) -> Result<(u16, Inode)> {
        let mut current = (ROOT_INODE, self.get_inode(ROOT_INODE)?);
        let mut walked = String::new();
        for name in components(path)? {
            walked.push('/');
            walked.push_str(name);
            current = self
                .child_dir(&current.1, name, &walked)?
                .ok_or_else(|| FsError::NotFound(walked.clone()))?;
        }
        Ok(current)
    }

    /// walk `path` from the root, creating missing directories when `create_missing` is set
    /// # Return
    /// the inode id and record of the directory `path` names
    pub fn resolve(&mut self, path: &str, create_missing: bool) -> Result<(u16, Inode)> {
        if !create_missing {
            return self.lookup(path);
        }
        let (mut index, mut inode) = (ROOT_INODE, self.get_inode(ROOT_INODE)?);
        let mut walked = String::new();
        for name in components(path)? {
            walked.push('/');
            walked.push_str(name);
            (index, inode) = match self.child_dir(&inode, name, &walked)? {
                Some(child) => child,
                None => {
                    debug!("creating missing directory {walked}");
                    let dir = self.read_directory(&inode)?;
                    let empty = 0u16.to_le_bytes();
                    self.add_entry(index, &mut inode, dir, name, FileKind::Directory, &empty)?
                }
            };
        }
        Ok((index, inode))
    }

    /// allocate a child inode holding `content` and link it into the parent directory
    ///
    /// when the parent can't grow, the child is released again
    pub(crate) fn add_entry(
        &mut self,
        parent: u16,
        parent_inode: &mut Inode,
        mut dir: Directory,
        name: &str,
        kind: FileKind,
        content: &[u8],
    ) -> Result<(u16, Inode)> {
        let child = self.allocate_inode(kind, content)?;
        dir.insert(child, name);
        debug_assert_eq!(
            fs_size_calculator::directory_size(dir.len()),
            parent_inode.file_size as usize + DIR_ENTRY_SIZE
        );
        if let Err(e) = self.write_directory(parent, parent_inode, &dir) {
            warn!("linking {name:?} into inode {parent} failed, releasing inode {child}");
            self.release_inode(child)?;
            return Err(e);
        }
        Ok((child, self.get_inode(child)?))
    }
}
