//! Block device abstraction. Tools built on `hfs-core` operate through this
//! trait rather than directly against `std::fs::File`, so the same mkfs/
//! fsck logic runs against a real device, a disk image, or (in tests) an
//! in-memory `Cursor<Vec<u8>>`.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{HfsError, Result};

/// A fixed-size, randomly addressable block device. All positions are byte
/// offsets from the start of the device, not block numbers — callers that
/// need block-aligned access multiply by their own block size.
pub trait BlockDevice {
    fn device_size(&self) -> Result<u64>;
    fn pread(&mut self, offset: u64, buf: &mut [u8]) -> Result<()>;
    fn pwrite(&mut self, offset: u64, buf: &[u8]) -> Result<()>;
    fn sync(&mut self) -> Result<()>;
}

/// A device backed by an open file (regular file, disk image, or a real
/// block special file on a Unix system).
pub struct FileDevice {
    file: File,
    size: u64,
}

impl FileDevice {
    /// Open an existing path for read-write device access.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let size = file.metadata()?.len();
        Ok(FileDevice { file, size })
    }

    /// Open read-only, for fsck's dry-run / no-repair mode.
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).open(path)?;
        let size = file.metadata()?.len();
        Ok(FileDevice { file, size })
    }

    /// Create a new regular file of exactly `size` bytes, for mkfs against
    /// a disk image rather than a real device node.
    pub fn create<P: AsRef<Path>>(path: P, size: u64) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).create(true).truncate(true).open(path)?;
        file.set_len(size)?;
        Ok(FileDevice { file, size })
    }
}

impl BlockDevice for FileDevice {
    fn device_size(&self) -> Result<u64> {
        Ok(self.size)
    }

    fn pread(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                HfsError::IoTruncated { expected: buf.len(), actual: 0 }
            } else {
                HfsError::Io(e)
            }
        })
    }

    fn pwrite(&mut self, offset: u64, buf: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(buf)?;
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }
}

impl Read for FileDevice {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for FileDevice {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file.write(buf)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

impl Seek for FileDevice {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.file.seek(pos)
    }
}

/// Implement `BlockDevice` for any in-memory `Cursor<Vec<u8>>`, so tests can
/// exercise mkfs/fsck without touching the filesystem.
impl BlockDevice for std::io::Cursor<Vec<u8>> {
    fn device_size(&self) -> Result<u64> {
        Ok(self.get_ref().len() as u64)
    }

    fn pread(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let data = self.get_ref();
        let start = offset as usize;
        let end = start.checked_add(buf.len()).ok_or(HfsError::OutOfRange { offset, len: data.len() as u64 })?;
        if end > data.len() {
            return Err(HfsError::IoTruncated { expected: buf.len(), actual: data.len().saturating_sub(start) });
        }
        buf.copy_from_slice(&data[start..end]);
        Ok(())
    }

    fn pwrite(&mut self, offset: u64, buf: &[u8]) -> Result<()> {
        let start = offset as usize;
        let end = start + buf.len();
        if end > self.get_ref().len() {
            self.get_mut().resize(end, 0);
        }
        self.get_mut()[start..end].copy_from_slice(buf);
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn cursor_device_roundtrip() {
        let mut dev = Cursor::new(vec![0u8; 16]);
        dev.pwrite(4, &[1, 2, 3, 4]).unwrap();
        let mut out = [0u8; 4];
        dev.pread(4, &mut out).unwrap();
        assert_eq!(out, [1, 2, 3, 4]);
    }

    #[test]
    fn cursor_device_grows_on_write_past_end() {
        let mut dev = Cursor::new(vec![0u8; 4]);
        dev.pwrite(8, &[9]).unwrap();
        assert_eq!(dev.device_size().unwrap(), 9);
    }

    #[test]
    fn cursor_device_read_past_end_is_truncated() {
        let mut dev = Cursor::new(vec![0u8; 4]);
        let mut buf = [0u8; 8];
        assert!(matches!(dev.pread(0, &mut buf), Err(HfsError::IoTruncated { .. })));
    }

    #[test]
    fn file_device_create_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.hfs");
        {
            let mut dev = FileDevice::create(&path, 1024).unwrap();
            dev.pwrite(0, b"hfs+").unwrap();
        }
        let mut dev = FileDevice::open(&path).unwrap();
        assert_eq!(dev.device_size().unwrap(), 1024);
        let mut buf = [0u8; 4];
        dev.pread(0, &mut buf).unwrap();
        assert_eq!(&buf, b"hfs+");
    }
}
