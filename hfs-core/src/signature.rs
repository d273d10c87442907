//! Filesystem signature detection: sniff the two signature bytes at offset
//! 1024 to decide which codec (classic MDB vs HFS+/HFSX header) applies,
//! before any mkfs/fsck tool commits to one.

use std::io::{Read, Seek, SeekFrom};

use crate::error::Result;
use crate::volume::{HFSX_SIGNATURE, HFS_PLUS_SIGNATURE, HFS_SIGNATURE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsType {
    Hfs,
    HfsPlus,
    HfsX,
    Unknown(u16),
}

/// Read the 16-bit signature word at byte offset 1024 and classify it.
/// Does not validate anything beyond the signature; callers still need to
/// run the matching parser to find out if the rest of the structure holds.
pub fn detect<R: Read + Seek>(reader: &mut R) -> Result<FsType> {
    reader.seek(SeekFrom::Start(1024))?;
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    let signature = u16::from_be_bytes(buf);
    Ok(match signature {
        HFS_SIGNATURE => FsType::Hfs,
        HFS_PLUS_SIGNATURE => FsType::HfsPlus,
        HFSX_SIGNATURE => FsType::HfsX,
        other => FsType::Unknown(other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn disk_with_signature(sig: u16) -> Cursor<Vec<u8>> {
        let mut buf = vec![0u8; 2048];
        buf[1024..1026].copy_from_slice(&sig.to_be_bytes());
        Cursor::new(buf)
    }

    #[test]
    fn detects_hfs_plus() {
        let mut d = disk_with_signature(HFS_PLUS_SIGNATURE);
        assert_eq!(detect(&mut d).unwrap(), FsType::HfsPlus);
    }

    #[test]
    fn detects_hfsx() {
        let mut d = disk_with_signature(HFSX_SIGNATURE);
        assert_eq!(detect(&mut d).unwrap(), FsType::HfsX);
    }

    #[test]
    fn detects_classic_hfs() {
        let mut d = disk_with_signature(HFS_SIGNATURE);
        assert_eq!(detect(&mut d).unwrap(), FsType::Hfs);
    }

    #[test]
    fn unknown_signature_is_reported_not_rejected() {
        let mut d = disk_with_signature(0xDEAD);
        assert_eq!(detect(&mut d).unwrap(), FsType::Unknown(0xDEAD));
    }
}
