//! the backing store a container lives in

use log::debug;
use memmap2::MmapMut;
use std::{
    fs::{File, OpenOptions},
    path::Path,
};

/// a flat, resizable byte store holding one container
pub trait Image {
    /// current size in bytes
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// grow or shrink the store, new bytes read as zero
    fn set_len(&mut self, len: u64) -> std::io::Result<()>;

    fn bytes(&self) -> &[u8];

    fn bytes_mut(&mut self) -> &mut [u8];

    /// make `len` bytes starting at `offset` durable before returning
    fn flush_range(&self, offset: u64, len: usize) -> std::io::Result<()>;
}

/// a container kept entirely in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryImage {
    data: Vec<u8>,
}

impl MemoryImage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl From<Vec<u8>> for MemoryImage {
    fn from(data: Vec<u8>) -> Self {
        MemoryImage { data }
    }
}

impl Image for MemoryImage {
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn set_len(&mut self, len: u64) -> std::io::Result<()> {
        self.data.resize(len as usize, 0);
        Ok(())
    }

    fn bytes(&self) -> &[u8] {
        &self.data
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn flush_range(&self, _offset: u64, _len: usize) -> std::io::Result<()> {
        Ok(())
    }
}

/// a container stored in a regular file, accessed through a shared memory map
#[derive(Debug)]
pub struct ImageFile {
    file: File,
    /// `None` while the file is empty, zero-length maps are not portable
    mmap: Option<MmapMut>,
}

impl ImageFile {
    /// open the image file for read and write, creating it when missing
    pub fn open<P>(image_path: P) -> std::io::Result<Self>
    where
        P: AsRef<Path>,
    {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(image_path.as_ref())?;
        let mut image = ImageFile { file, mmap: None };
        image.remap()?;
        Ok(image)
    }

    fn remap(&mut self) -> std::io::Result<()> {
        self.mmap = None;
        if self.file.metadata()?.len() > 0 {
            // Safety
            // the container file is owned by this process for the lifetime of the map,
            // nothing else truncates it underneath us
            self.mmap = Some(unsafe { MmapMut::map_mut(&self.file)? });
        }
        Ok(())
    }
}

impl Image for ImageFile {
    fn len(&self) -> u64 {
        self.mmap.as_ref().map_or(0, |m| m.len() as u64)
    }

    fn set_len(&mut self, len: u64) -> std::io::Result<()> {
        debug!("resizing image file to {len} bytes");
        self.mmap = None;
        self.file.set_len(len)?;
        self.file.sync_all()?;
        self.remap()
    }

    fn bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        match self.mmap.as_mut() {
            Some(mmap) => &mut mmap[..],
            None => &mut [],
        }
    }

    fn flush_range(&self, offset: u64, len: usize) -> std::io::Result<()> {
        match self.mmap.as_ref() {
            Some(mmap) => mmap.flush_range(offset as usize, len),
            None => Ok(()),
        }
    }
}
