//! create our container, or open one created before
use crate::fs::{FileStorage, ImageFile, MAX_CAPACITY, MIN_CAPACITY};
use anyhow::anyhow;
use byte_unit::Byte;
use log::info;
use std::path::Path;

/// create a new container, given the path of the image file and its size
/// # Params
/// - `image_file_path`: the path of the image file, an existing file is overwritten
/// - `file_size`: the size of the container in bytes, rounded down to whole blocks
///
/// # Return
/// the freshly formatted filesystem
pub fn format<P>(image_file_path: P, file_size: u64) -> anyhow::Result<FileStorage<ImageFile>>
where
    P: AsRef<Path>,
{
    // check if specified size fits the 16 bit block ids
    if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&file_size) {
        return Err(anyhow!(format!(
            "container size must be between {} and {}, got {}",
            Byte::from_bytes(MIN_CAPACITY as _).get_appropriate_unit(true),
            Byte::from_bytes(MAX_CAPACITY as _).get_appropriate_unit(true),
            Byte::from_bytes(file_size as _).get_appropriate_unit(true),
        )));
    }
    let image = ImageFile::open(image_file_path.as_ref())?;
    let fs = FileStorage::format(image, file_size)?;
    info!(
        "created {} with {} blocks",
        image_file_path.as_ref().display(),
        fs.superblock().block_count
    );
    Ok(fs)
}

/// open a container created by [format]
pub fn open<P>(image_file_path: P) -> anyhow::Result<FileStorage<ImageFile>>
where
    P: AsRef<Path>,
{
    let path = image_file_path.as_ref();
    if !path.is_file() {
        return Err(anyhow!(
            "{} is not a container, create one with `flatfs format` first",
            path.display()
        ));
    }
    Ok(FileStorage::mount(ImageFile::open(path)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{FileKind, Image, ROOT_INODE};

    #[test]
    fn test_format() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let tmp_file = dir.path().join("new_fs.img");
        let fs = format(&tmp_file, 128 * 1024)?;

        // test if root inode "/" is created correctly
        let inode = fs.get_inode(ROOT_INODE)?;
        assert_eq!(inode.hard_links, 1);
        assert_eq!(inode.file_kind, FileKind::Directory);

        // test if the image file is sized to whole blocks
        assert_eq!(fs.image().len(), 128 * 1024);
        assert_eq!(std::fs::metadata(&tmp_file)?.len(), 128 * 1024);
        assert_eq!(fs.superblock().block_count, 128);
        Ok(())
    }

    #[test]
    fn test_format_rejects_sizes_out_of_range() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let tmp_file = dir.path().join("tiny.img");
        let err = format(&tmp_file, 1024).unwrap_err();
        assert!(err.to_string().contains("container size must be between"));
        assert!(format(&tmp_file, MAX_CAPACITY + 1).is_err());
        assert!(!tmp_file.exists());
        Ok(())
    }

    #[test]
    fn test_open_after_format() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let tmp_file = dir.path().join("fs.img");
        {
            let mut fs = format(&tmp_file, 64 * 1024)?;
            fs.set_file_contents("/docs/readme", b"persisted")?;
        }
        let fs = open(&tmp_file)?;
        assert_eq!(fs.cat("/docs/readme")?, b"persisted");
        assert!(open(dir.path().join("missing.img")).is_err());
        Ok(())
    }
}
