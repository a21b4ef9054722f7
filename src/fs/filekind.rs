use serde::{Deserialize, Serialize};

/// an enum to describe the type of an inode,
/// stored on disk as its `u16` discriminant
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[serde(into = "u16", try_from = "u16")]
pub enum FileKind {
    /// a free inode table slot
    #[default]
    Empty,
    /// a directory
    Directory,
    /// a regular file
    File,
}

impl From<FileKind> for u16 {
    fn from(kind: FileKind) -> Self {
        match kind {
            FileKind::Empty => 0,
            FileKind::Directory => 1,
            FileKind::File => 2,
        }
    }
}

impl TryFrom<u16> for FileKind {
    type Error = String;
    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FileKind::Empty),
            1 => Ok(FileKind::Directory),
            2 => Ok(FileKind::File),
            other => Err(format!("unknown inode kind {other}")),
        }
    }
}
