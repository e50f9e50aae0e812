use std::io::{self, Read, Write};

/// Tunables shared by the tar and zip unpackers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnpackOptions {
    /// Keep at most this many bytes of each regular file.
    pub truncate_file_size: Option<u64>,
    /// Skip symbolic link entries instead of creating them.
    pub ignore_symlinks: bool,
}

impl UnpackOptions {
    /// Copies one entry body, honouring the truncation limit.
    pub(crate) fn copy<R, W>(&self, reader: &mut R, writer: &mut W) -> io::Result<u64>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        match self.truncate_file_size {
            Some(limit) if limit > 0 => io::copy(&mut reader.take(limit), writer),
            _ => io::copy(reader, writer),
        }
    }
}
