use byteorder::{BigEndian, ReadBytesExt};
use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::{HfsError, Result};

/// Size in bytes of the on-disk volume header structure.
pub const VOLUME_HEADER_SIZE: usize = 512;

/// HFS+ volume header offset from the start of the partition
pub const VOLUME_HEADER_OFFSET: u64 = 1024;

/// HFS+ signature: "H+" (0x482B)
pub const HFS_PLUS_SIGNATURE: u16 = 0x482B;

/// HFSX signature: "HX" (0x4858) — case-sensitive variant
pub const HFSX_SIGNATURE: u16 = 0x4858;

/// HFS+ volume header version
pub const HFS_PLUS_VERSION: u16 = 4;
pub const HFSX_VERSION: u16 = 5;

/// An extent descriptor: contiguous range of allocation blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtentDescriptor {
    pub start_block: u32,
    pub block_count: u32,
}

/// Fork data: describes a data or resource fork
#[derive(Debug, Clone)]
#[derive(Default)]
pub struct ForkData {
    pub logical_size: u64,
    pub clump_size: u32,
    pub total_blocks: u32,
    pub extents: [ExtentDescriptor; 8],
}


/// The HFS+ Volume Header (512 bytes at offset 1024)
#[derive(Debug, Clone)]
pub struct VolumeHeader {
    pub signature: u16,
    pub version: u16,
    pub attributes: u32,
    pub last_mounted_version: u32,
    pub journal_info_block: u32,
    pub create_date: u32,
    pub modify_date: u32,
    pub backup_date: u32,
    pub checked_date: u32,
    pub file_count: u32,
    pub folder_count: u32,
    pub block_size: u32,
    pub total_blocks: u32,
    pub free_blocks: u32,
    pub next_allocation: u32,
    pub rsrc_clump_size: u32,
    pub data_clump_size: u32,
    pub next_catalog_id: u32,
    pub write_count: u32,
    pub encoding_bitmap: u64,
    pub finder_info: [u32; 8],
    pub allocation_file: ForkData,
    pub extents_file: ForkData,
    pub catalog_file: ForkData,
    pub attributes_file: ForkData,
    pub startup_file: ForkData,
    /// true if this is HFSX (case-sensitive)
    pub is_hfsx: bool,
}

fn read_extent_descriptor<R: Read>(reader: &mut R) -> Result<ExtentDescriptor> {
    Ok(ExtentDescriptor {
        start_block: reader.read_u32::<BigEndian>()?,
        block_count: reader.read_u32::<BigEndian>()?,
    })
}

fn write_extent_descriptor<W: Write>(writer: &mut W, e: &ExtentDescriptor) -> Result<()> {
    writer.write_all(&e.start_block.to_be_bytes())?;
    writer.write_all(&e.block_count.to_be_bytes())?;
    Ok(())
}

fn write_fork_data<W: Write>(writer: &mut W, f: &ForkData) -> Result<()> {
    writer.write_all(&f.logical_size.to_be_bytes())?;
    writer.write_all(&f.clump_size.to_be_bytes())?;
    writer.write_all(&f.total_blocks.to_be_bytes())?;
    for e in &f.extents {
        write_extent_descriptor(writer, e)?;
    }
    Ok(())
}

fn read_fork_data<R: Read>(reader: &mut R) -> Result<ForkData> {
    let logical_size = reader.read_u64::<BigEndian>()?;
    let clump_size = reader.read_u32::<BigEndian>()?;
    let total_blocks = reader.read_u32::<BigEndian>()?;
    let mut extents = [ExtentDescriptor::default(); 8];
    for extent in &mut extents {
        *extent = read_extent_descriptor(reader)?;
    }
    Ok(ForkData {
        logical_size,
        clump_size,
        total_blocks,
        extents,
    })
}

impl VolumeHeader {
    /// Parse the volume header from a reader positioned at the start of the partition
    pub fn parse<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        reader.seek(SeekFrom::Start(VOLUME_HEADER_OFFSET))?;
        Self::decode_from(reader)
    }

    /// Read and decode a volume header from the reader's current position,
    /// without seeking first. Used to read the alternate copy, which lives
    /// at `device_size - 1024` rather than the fixed primary offset.
    pub fn parse_at<R: Read + Seek>(reader: &mut R, offset: u64) -> Result<Self> {
        reader.seek(SeekFrom::Start(offset))?;
        Self::decode_from(reader)
    }

    fn decode_from<R: Read>(reader: &mut R) -> Result<Self> {
        let signature = reader.read_u16::<BigEndian>()?;
        let is_hfsx = match signature {
            HFS_PLUS_SIGNATURE => false,
            HFSX_SIGNATURE => true,
            _ => return Err(HfsError::InvalidSignature(signature)),
        };

        let version = reader.read_u16::<BigEndian>()?;
        match version {
            HFS_PLUS_VERSION | HFSX_VERSION => {}
            _ => return Err(HfsError::UnsupportedVersion(version)),
        }

        let attributes = reader.read_u32::<BigEndian>()?;
        let last_mounted_version = reader.read_u32::<BigEndian>()?;
        let journal_info_block = reader.read_u32::<BigEndian>()?;
        let create_date = reader.read_u32::<BigEndian>()?;
        let modify_date = reader.read_u32::<BigEndian>()?;
        let backup_date = reader.read_u32::<BigEndian>()?;
        let checked_date = reader.read_u32::<BigEndian>()?;
        let file_count = reader.read_u32::<BigEndian>()?;
        let folder_count = reader.read_u32::<BigEndian>()?;
        let block_size = reader.read_u32::<BigEndian>()?;
        let total_blocks = reader.read_u32::<BigEndian>()?;
        let free_blocks = reader.read_u32::<BigEndian>()?;
        let next_allocation = reader.read_u32::<BigEndian>()?;
        let rsrc_clump_size = reader.read_u32::<BigEndian>()?;
        let data_clump_size = reader.read_u32::<BigEndian>()?;
        let next_catalog_id = reader.read_u32::<BigEndian>()?;
        let write_count = reader.read_u32::<BigEndian>()?;
        let encoding_bitmap = reader.read_u64::<BigEndian>()?;

        let mut finder_info = [0u32; 8];
        for fi in &mut finder_info {
            *fi = reader.read_u32::<BigEndian>()?;
        }

        let allocation_file = read_fork_data(reader)?;
        let extents_file = read_fork_data(reader)?;
        let catalog_file = read_fork_data(reader)?;
        let attributes_file = read_fork_data(reader)?;
        let startup_file = read_fork_data(reader)?;

        Ok(VolumeHeader {
            signature,
            version,
            attributes,
            last_mounted_version,
            journal_info_block,
            create_date,
            modify_date,
            backup_date,
            checked_date,
            file_count,
            folder_count,
            block_size,
            total_blocks,
            free_blocks,
            next_allocation,
            rsrc_clump_size,
            data_clump_size,
            next_catalog_id,
            write_count,
            encoding_bitmap,
            finder_info,
            allocation_file,
            extents_file,
            catalog_file,
            attributes_file,
            startup_file,
            is_hfsx,
        })
    }

    /// Encode this header to exactly `VOLUME_HEADER_SIZE` bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(VOLUME_HEADER_SIZE);
        buf.write_all(&self.signature.to_be_bytes())?;
        buf.write_all(&self.version.to_be_bytes())?;
        buf.write_all(&self.attributes.to_be_bytes())?;
        buf.write_all(&self.last_mounted_version.to_be_bytes())?;
        buf.write_all(&self.journal_info_block.to_be_bytes())?;
        buf.write_all(&self.create_date.to_be_bytes())?;
        buf.write_all(&self.modify_date.to_be_bytes())?;
        buf.write_all(&self.backup_date.to_be_bytes())?;
        buf.write_all(&self.checked_date.to_be_bytes())?;
        buf.write_all(&self.file_count.to_be_bytes())?;
        buf.write_all(&self.folder_count.to_be_bytes())?;
        buf.write_all(&self.block_size.to_be_bytes())?;
        buf.write_all(&self.total_blocks.to_be_bytes())?;
        buf.write_all(&self.free_blocks.to_be_bytes())?;
        buf.write_all(&self.next_allocation.to_be_bytes())?;
        buf.write_all(&self.rsrc_clump_size.to_be_bytes())?;
        buf.write_all(&self.data_clump_size.to_be_bytes())?;
        buf.write_all(&self.next_catalog_id.to_be_bytes())?;
        buf.write_all(&self.write_count.to_be_bytes())?;
        buf.write_all(&self.encoding_bitmap.to_be_bytes())?;
        for fi in &self.finder_info {
            buf.write_all(&fi.to_be_bytes())?;
        }
        write_fork_data(&mut buf, &self.allocation_file)?;
        write_fork_data(&mut buf, &self.extents_file)?;
        write_fork_data(&mut buf, &self.catalog_file)?;
        write_fork_data(&mut buf, &self.attributes_file)?;
        write_fork_data(&mut buf, &self.startup_file)?;
        debug_assert_eq!(buf.len(), VOLUME_HEADER_SIZE);
        Ok(buf)
    }

    /// Write this header to both the primary slot (offset 1024) and the
    /// alternate slot at `volume_bytes - 1024`.
    pub fn write<W: Write + Seek>(&self, writer: &mut W, volume_bytes: u64) -> Result<()> {
        let encoded = self.encode()?;
        writer.seek(SeekFrom::Start(VOLUME_HEADER_OFFSET))?;
        writer.write_all(&encoded)?;
        writer.seek(SeekFrom::Start(alternate_header_offset(volume_bytes)))?;
        writer.write_all(&encoded)?;
        Ok(())
    }
}

/// Byte offset of the alternate volume header: exactly `volume_bytes - 1024`,
/// never the last 512-byte sector of the device.
pub fn alternate_header_offset(volume_bytes: u64) -> u64 {
    volume_bytes - 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> VolumeHeader {
        VolumeHeader {
            signature: HFS_PLUS_SIGNATURE,
            version: HFS_PLUS_VERSION,
            attributes: 0,
            last_mounted_version: 0x31302e30,
            journal_info_block: 0,
            create_date: 0,
            modify_date: 0,
            backup_date: 0,
            checked_date: 0,
            file_count: 3,
            folder_count: 2,
            block_size: 4096,
            total_blocks: 1024,
            free_blocks: 900,
            next_allocation: 0,
            rsrc_clump_size: 4096,
            data_clump_size: 4096,
            next_catalog_id: 16,
            write_count: 1,
            encoding_bitmap: 1,
            finder_info: [0; 8],
            allocation_file: ForkData::default(),
            extents_file: ForkData::default(),
            catalog_file: ForkData::default(),
            attributes_file: ForkData::default(),
            startup_file: ForkData::default(),
            is_hfsx: false,
        }
    }

    #[test]
    fn encode_then_parse_preserves_fields() {
        let header = sample_header();
        let encoded = header.encode().unwrap();
        assert_eq!(encoded.len(), VOLUME_HEADER_SIZE);

        let mut cursor = std::io::Cursor::new(encoded);
        let parsed = VolumeHeader::parse(&mut cursor).unwrap();
        assert_eq!(parsed.signature, HFS_PLUS_SIGNATURE);
        assert_eq!(parsed.file_count, 3);
        assert_eq!(parsed.folder_count, 2);
        assert_eq!(parsed.block_size, 4096);
        assert_eq!(parsed.next_catalog_id, 16);
        assert!(!parsed.is_hfsx);
    }

    #[test]
    fn write_places_primary_and_alternate_copies() {
        let header = sample_header();
        let mut cursor = std::io::Cursor::new(vec![0u8; 8192]);
        header.write(&mut cursor, 8192).unwrap();

        cursor.seek(SeekFrom::Start(VOLUME_HEADER_OFFSET)).unwrap();
        let primary = VolumeHeader::parse(&mut cursor).unwrap();
        assert_eq!(primary.total_blocks, 1024);

        cursor.seek(SeekFrom::Start(alternate_header_offset(8192))).unwrap();
        let alternate = VolumeHeader::parse(&mut cursor).unwrap();
        assert_eq!(alternate.total_blocks, 1024);
    }
}
