//! Classic HFS Master Directory Block (MDB): the 16-bit-block-number
//! predecessor to the HFS+ volume header, read and written the same way
//! the header module handles its HFS+ counterpart — byte-level decode at a
//! fixed offset, paired primary/alternate copies.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::codec::{read_pstring, write_pstring};
use crate::error::{HfsError, Result};

/// Classic HFS MDB offset from the start of the volume (logical block 2).
pub const MDB_OFFSET: u64 = 1024;
/// On-disk size of the populated portion of the MDB.
pub const MDB_SIZE: usize = 162;

/// Classic HFS signature: "BD" (0x4244).
pub const HFS_SIGNATURE: u16 = 0x4244;

/// A classic-HFS extent descriptor: 16-bit start block and block count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassicExtent {
    pub start_block: u16,
    pub block_count: u16,
}

pub type ClassicExtentRecord = [ClassicExtent; 3];

fn read_extent<R: Read>(r: &mut R) -> Result<ClassicExtent> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(ClassicExtent {
        start_block: u16::from_be_bytes([b[0], b[1]]),
        block_count: u16::from_be_bytes([b[2], b[3]]),
    })
}

fn write_extent<W: Write>(w: &mut W, e: &ClassicExtent) -> Result<()> {
    w.write_all(&e.start_block.to_be_bytes())?;
    w.write_all(&e.block_count.to_be_bytes())?;
    Ok(())
}

fn read_extent_record<R: Read>(r: &mut R) -> Result<ClassicExtentRecord> {
    Ok([read_extent(r)?, read_extent(r)?, read_extent(r)?])
}

fn write_extent_record<W: Write>(w: &mut W, rec: &ClassicExtentRecord) -> Result<()> {
    for e in rec {
        write_extent(w, e)?;
    }
    Ok(())
}

/// The classic HFS Master Directory Block.
#[derive(Debug, Clone)]
pub struct MasterDirectoryBlock {
    pub create_date: u32,
    pub modify_date: u32,
    pub attributes: u16,
    pub root_file_count: u16,
    pub volume_bitmap_start: u16,
    pub next_allocation: u16,
    pub total_blocks: u16,
    pub block_size: u32,
    pub clump_size: u32,
    pub first_alloc_block: u16,
    pub next_catalog_id: u32,
    pub free_blocks: u16,
    pub volume_name: String,
    pub backup_date: u32,
    pub backup_seq_num: u16,
    pub write_count: u32,
    pub extents_clump_size: u32,
    pub catalog_clump_size: u32,
    pub root_dir_count: u16,
    pub file_count: u32,
    pub folder_count: u32,
    pub finder_info: [u32; 8],
    /// `drEmbedSigWord`: signature of the filesystem embedded in this
    /// volume's embedded-volume extent (e.g. HFS+ wrapped inside HFS), or
    /// 0 if none is embedded.
    pub embed_sig_word: u16,
    /// `drEmbedExtent`: the embedded volume's `{startBlock, blockCount}`.
    pub embed_extent: ClassicExtent,
    pub extents_file_size: u32,
    pub extents_extents: ClassicExtentRecord,
    pub catalog_file_size: u32,
    pub catalog_extents: ClassicExtentRecord,
}

impl MasterDirectoryBlock {
    pub fn parse<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        reader.seek(SeekFrom::Start(MDB_OFFSET))?;
        let mut buf = [0u8; MDB_SIZE];
        reader.read_exact(&mut buf)?;
        Self::decode(&buf)
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < MDB_SIZE {
            return Err(HfsError::IoTruncated { expected: MDB_SIZE, actual: buf.len() });
        }
        let mut r = std::io::Cursor::new(buf);
        let mut u16be = || -> Result<u16> {
            let mut b = [0u8; 2];
            r.read_exact(&mut b)?;
            Ok(u16::from_be_bytes(b))
        };
        let signature = u16be()?;
        if signature != HFS_SIGNATURE {
            return Err(HfsError::InvalidSignature(signature));
        }
        let create_date = read_u32(&mut r)?;
        let modify_date = read_u32(&mut r)?;
        let attributes = read_u16(&mut r)?;
        let root_file_count = read_u16(&mut r)?;
        let volume_bitmap_start = read_u16(&mut r)?;
        let next_allocation = read_u16(&mut r)?;
        let total_blocks = read_u16(&mut r)?;
        let block_size = read_u32(&mut r)?;
        let clump_size = read_u32(&mut r)?;
        let first_alloc_block = read_u16(&mut r)?;
        let next_catalog_id = read_u32(&mut r)?;
        let free_blocks = read_u16(&mut r)?;
        let name_off = r.position() as usize;
        let volume_name = read_pstring(buf, name_off, 28)?;
        r.set_position((name_off + 28) as u64);
        let backup_date = read_u32(&mut r)?;
        let backup_seq_num = read_u16(&mut r)?;
        let write_count = read_u32(&mut r)?;
        let extents_clump_size = read_u32(&mut r)?;
        let catalog_clump_size = read_u32(&mut r)?;
        let root_dir_count = read_u16(&mut r)?;
        let file_count = read_u32(&mut r)?;
        let folder_count = read_u32(&mut r)?;
        let mut finder_info = [0u32; 8];
        for fi in &mut finder_info {
            *fi = read_u32(&mut r)?;
        }
        let embed_sig_word = read_u16(&mut r)?;
        let embed_extent = read_extent(&mut r)?;
        let extents_file_size = read_u32(&mut r)?;
        let extents_extents = read_extent_record(&mut r)?;
        let catalog_file_size = read_u32(&mut r)?;
        let catalog_extents = read_extent_record(&mut r)?;

        Ok(MasterDirectoryBlock {
            create_date,
            modify_date,
            attributes,
            root_file_count,
            volume_bitmap_start,
            next_allocation,
            total_blocks,
            block_size,
            clump_size,
            first_alloc_block,
            next_catalog_id,
            free_blocks,
            volume_name,
            backup_date,
            backup_seq_num,
            write_count,
            extents_clump_size,
            catalog_clump_size,
            root_dir_count,
            file_count,
            folder_count,
            finder_info,
            embed_sig_word,
            embed_extent,
            extents_file_size,
            extents_extents,
            catalog_file_size,
            catalog_extents,
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(MDB_SIZE);
        buf.extend_from_slice(&HFS_SIGNATURE.to_be_bytes());
        buf.extend_from_slice(&self.create_date.to_be_bytes());
        buf.extend_from_slice(&self.modify_date.to_be_bytes());
        buf.extend_from_slice(&self.attributes.to_be_bytes());
        buf.extend_from_slice(&self.root_file_count.to_be_bytes());
        buf.extend_from_slice(&self.volume_bitmap_start.to_be_bytes());
        buf.extend_from_slice(&self.next_allocation.to_be_bytes());
        buf.extend_from_slice(&self.total_blocks.to_be_bytes());
        buf.extend_from_slice(&self.block_size.to_be_bytes());
        buf.extend_from_slice(&self.clump_size.to_be_bytes());
        buf.extend_from_slice(&self.first_alloc_block.to_be_bytes());
        buf.extend_from_slice(&self.next_catalog_id.to_be_bytes());
        buf.extend_from_slice(&self.free_blocks.to_be_bytes());
        let name_off = buf.len();
        buf.resize(buf.len() + 28, 0);
        write_pstring(&mut buf, name_off, 28, &self.volume_name)?;
        buf.extend_from_slice(&self.backup_date.to_be_bytes());
        buf.extend_from_slice(&self.backup_seq_num.to_be_bytes());
        buf.extend_from_slice(&self.write_count.to_be_bytes());
        buf.extend_from_slice(&self.extents_clump_size.to_be_bytes());
        buf.extend_from_slice(&self.catalog_clump_size.to_be_bytes());
        buf.extend_from_slice(&self.root_dir_count.to_be_bytes());
        buf.extend_from_slice(&self.file_count.to_be_bytes());
        buf.extend_from_slice(&self.folder_count.to_be_bytes());
        for fi in &self.finder_info {
            buf.extend_from_slice(&fi.to_be_bytes());
        }
        buf.extend_from_slice(&self.embed_sig_word.to_be_bytes());
        write_extent(&mut buf, &self.embed_extent)?;
        buf.extend_from_slice(&self.extents_file_size.to_be_bytes());
        write_extent_record(&mut buf, &self.extents_extents)?;
        buf.extend_from_slice(&self.catalog_file_size.to_be_bytes());
        write_extent_record(&mut buf, &self.catalog_extents)?;
        debug_assert_eq!(buf.len(), MDB_SIZE);
        Ok(buf)
    }

    /// Write the MDB to both the primary slot and the alternate MDB, which
    /// classic HFS keeps at `volume_bytes - 1024` (the same offset HFS+
    /// uses for its alternate volume header).
    pub fn write<W: Write + Seek>(&self, writer: &mut W, volume_bytes: u64) -> Result<()> {
        let encoded = self.encode()?;
        writer.seek(SeekFrom::Start(MDB_OFFSET))?;
        writer.write_all(&encoded)?;
        writer.seek(SeekFrom::Start(volume_bytes - 1024))?;
        writer.write_all(&encoded)?;
        Ok(())
    }
}

fn read_u16(r: &mut std::io::Cursor<&[u8]>) -> Result<u16> {
    let mut b = [0u8; 2];
    r.read_exact(&mut b)?;
    Ok(u16::from_be_bytes(b))
}

fn read_u32(r: &mut std::io::Cursor<&[u8]>) -> Result<u32> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(u32::from_be_bytes(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample() -> MasterDirectoryBlock {
        MasterDirectoryBlock {
            create_date: 100,
            modify_date: 100,
            attributes: 0,
            root_file_count: 0,
            volume_bitmap_start: 3,
            next_allocation: 0,
            total_blocks: 4000,
            block_size: 512,
            clump_size: 512 * 4,
            first_alloc_block: 10,
            next_catalog_id: 16,
            free_blocks: 3900,
            volume_name: "Untitled".into(),
            backup_date: 0,
            backup_seq_num: 0,
            write_count: 1,
            extents_clump_size: 512 * 4,
            catalog_clump_size: 512 * 4,
            root_dir_count: 0,
            file_count: 0,
            folder_count: 0,
            finder_info: [0; 8],
            embed_sig_word: 0,
            embed_extent: ClassicExtent::default(),
            extents_file_size: 512,
            extents_extents: [ClassicExtent::default(); 3],
            catalog_file_size: 512,
            catalog_extents: [ClassicExtent::default(); 3],
        }
    }

    #[test]
    fn encode_decode_roundtrip() {
        let mdb = sample();
        let encoded = mdb.encode().unwrap();
        assert_eq!(encoded.len(), MDB_SIZE);
        let decoded = MasterDirectoryBlock::decode(&encoded).unwrap();
        assert_eq!(decoded.volume_name, "Untitled");
        assert_eq!(decoded.total_blocks, 4000);
        assert_eq!(decoded.free_blocks, 3900);
    }

    #[test]
    fn write_populates_primary_and_alternate() {
        let mdb = sample();
        let volume_bytes = 4000u64 * 512;
        let mut dev = Cursor::new(vec![0u8; volume_bytes as usize]);
        mdb.write(&mut dev, volume_bytes).unwrap();
        let primary = MasterDirectoryBlock::parse(&mut dev).unwrap();
        assert_eq!(primary.volume_name, "Untitled");
        dev.set_position(volume_bytes - 1024);
        let mut alt_buf = [0u8; MDB_SIZE];
        std::io::Read::read_exact(&mut dev, &mut alt_buf).unwrap();
        let alt = MasterDirectoryBlock::decode(&alt_buf).unwrap();
        assert_eq!(alt.total_blocks, 4000);
    }

    #[test]
    fn rejects_bad_signature() {
        let mut buf = [0u8; MDB_SIZE];
        buf[0] = 0;
        buf[1] = 0;
        assert!(matches!(MasterDirectoryBlock::decode(&buf), Err(HfsError::InvalidSignature(_))));
    }
}
