use std::io::{Read, Write};

use serde::{de::DeserializeOwned, Serialize};

use crate::fs::Result;

/// Trait for fixed-size records stored packed in the container
/// # Note
/// records are encoded with the `bincode` legacy configuration:
/// little endian, fixed width integers and no length prefix on arrays,
/// so the encoded length always equals [OnDiskRecord::SIZE]
pub trait OnDiskRecord: Serialize + DeserializeOwned {
    /// the packed size of the record in bytes
    const SIZE: usize;

    /// serialize into a writer implementing [Write](std::io::Write)
    /// # Returns
    /// The number of bytes written if successful
    fn write_to<W>(&self, w: &mut W) -> Result<usize>
    where
        W: Write,
    {
        let config = bincode::config::legacy();
        Ok(bincode::serde::encode_into_std_write(self, w, config)?)
    }

    /// serialize into a [Vec](std::vec::Vec)
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let config = bincode::config::legacy();
        Ok(bincode::serde::encode_to_vec(self, config)?)
    }

    /// deserialize from a reader implementing [Read](std::io::Read)
    fn read_from<R>(r: &mut R) -> Result<Self>
    where
        R: Read,
    {
        let config = bincode::config::legacy();
        Ok(bincode::serde::decode_from_std_read(r, config)?)
    }

    /// deserialize from the front of a slice
    fn from_bytes(buf: &[u8]) -> Result<Self> {
        let config = bincode::config::legacy();
        let (object, _bytes_read): (Self, usize) = bincode::serde::decode_from_slice(buf, config)?;
        Ok(object)
    }
}
