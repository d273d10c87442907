//! Volume construction: build a fresh classic HFS or HFS+/HFSX volume on a
//! block device from scratch — volume header/MDB, allocation bitmap,
//! Extents Overflow B-tree, and Catalog B-tree seeded with just the root
//! folder.

use std::io::{Read, Seek, Write};

use crate::bitmap::{bitmap_byte_size, AllocationBitmap};
use crate::btree::{self, BTreeHeaderRecord, CNID_ROOT_FOLDER, CNID_ROOT_PARENT};
use crate::codec::{safe_mac_time_now, write_hfs_unistr255, write_u16_be, write_u32_be, UniStr};
use crate::config::FormatOptions;
use crate::error::{HfsError, Result};
use crate::journal::{JournalHeader, JournalInfoBlock, JOURNAL_HEADER_SIZE, JOURNAL_HEADER_MAGIC, JOURNAL_HEADER_ENDIAN};
use crate::volume::{
    ClassicExtent, ExtentDescriptor, ForkData, MasterDirectoryBlock, VolumeHeader,
    ATTR_VOLUME_JOURNALED, ATTR_VOLUME_UNMOUNTED, HFSX_SIGNATURE, HFS_PLUS_SIGNATURE, HFS_PLUS_VERSION, HFSX_VERSION,
};

/// Node size classic HFS B-trees use on disk.
const CLASSIC_NODE_SIZE: u16 = 512;

/// HFS+ default block size: 4096 bytes above 1 GB, 512 bytes at or below it.
pub fn default_block_size(volume_bytes: u64) -> u32 {
    const GB: u64 = 1024 * 1024 * 1024;
    if volume_bytes > GB {
        4096
    } else {
        512
    }
}

/// Format a block device as an HFS+ or HFSX volume.
pub fn format_hfs_plus<D: Read + Write + Seek>(
    device: &mut D,
    volume_bytes: u64,
    now_posix: i64,
    options: &FormatOptions,
) -> Result<VolumeHeader> {
    let block_size = options.block_size.unwrap_or_else(|| default_block_size(volume_bytes));
    if block_size < 512 || !block_size.is_power_of_two() {
        return Err(HfsError::Usage(format!("invalid block size {block_size}")));
    }
    let total_blocks = (volume_bytes / block_size as u64) as u32;
    if total_blocks < 32 {
        return Err(HfsError::Usage("volume too small to format".into()));
    }

    let (now_mac, _overflow) = safe_mac_time_now(now_posix);

    // Layout: block 0-1 reserved for boot blocks, allocation bitmap
    // starting at block 2, then the Extents Overflow B-tree, then the
    // Catalog B-tree, then free space, with the last block reserved for
    // the alternate volume header.
    let bitmap_bytes = bitmap_byte_size(total_blocks);
    let bitmap_blocks = bitmap_bytes.div_ceil(block_size);
    let bitmap_start = 2u32;

    let extents_node_size = 4096u16.min((block_size * 2).max(512) as u16);
    let extents_blocks = (extents_node_size as u32).div_ceil(block_size).max(1);
    let extents_start = bitmap_start + bitmap_blocks;

    let catalog_node_size = 8192u16.min((block_size * 4).max(512) as u16);
    let catalog_blocks = ((catalog_node_size as u32) * 2).div_ceil(block_size).max(2);
    let catalog_start = extents_start + extents_blocks;

    let mut used_end = catalog_start + catalog_blocks;

    // Journal: one block for the Journal Info Block, then a body sized by
    // `journal_size` (default 512 KiB, shrunk to fit small test volumes).
    // Skipped outright if there isn't room left for it.
    let journal_layout = if options.enable_journal {
        let jib_start = used_end;
        let default_body = options.journal_size.unwrap_or(512 * 1024);
        let mut body_blocks = (default_body.max(block_size as u64) as u32).div_ceil(block_size);
        let available = total_blocks.saturating_sub(jib_start + 1 + 1);
        if available < 2 {
            None
        } else {
            body_blocks = body_blocks.min(available);
            let body_start = jib_start + 1;
            used_end = body_start + body_blocks;
            Some((jib_start, body_start, body_blocks))
        }
    } else {
        None
    };

    if used_end + 1 >= total_blocks {
        return Err(HfsError::Usage("volume too small for metadata layout".into()));
    }

    let mut bitmap = AllocationBitmap::new(total_blocks);
    bitmap.set_range(0, bitmap_start, true);
    bitmap.set_range(bitmap_start, bitmap_blocks, true);
    bitmap.set_range(extents_start, extents_blocks, true);
    bitmap.set_range(catalog_start, catalog_blocks, true);
    if let Some((jib_start, body_start, body_blocks)) = journal_layout {
        bitmap.set_range(jib_start, 1, true);
        bitmap.set_range(body_start, body_blocks, true);
    }
    bitmap.set_range(total_blocks - 1, 1, true);

    let extents_fork = single_extent_fork(extents_start, extents_blocks, block_size);
    let catalog_fork = single_extent_fork(catalog_start, catalog_blocks, block_size);
    let allocation_fork = single_extent_fork(bitmap_start, bitmap_blocks, block_size);

    write_empty_btree(device, &extents_fork, block_size, extents_node_size, 0xBC, 10, 2)?;
    write_catalog_btree(device, &catalog_fork, block_size, catalog_node_size, now_mac, options)?;

    let mut attributes = ATTR_VOLUME_UNMOUNTED;
    let journal_info_block = if let Some((jib_start, body_start, body_blocks)) = journal_layout {
        write_journal(device, jib_start, body_start, body_blocks, block_size)?;
        attributes |= ATTR_VOLUME_JOURNALED;
        jib_start
    } else {
        0
    };

    // Allocation bitmap bytes.
    device_write(device, bitmap_start as u64 * block_size as u64, bitmap.as_bytes())?;

    let signature = if options.case_sensitive { HFSX_SIGNATURE } else { HFS_PLUS_SIGNATURE };
    let version = if options.case_sensitive { HFSX_VERSION } else { HFS_PLUS_VERSION };

    let header = VolumeHeader {
        signature,
        version,
        attributes,
        last_mounted_version: 0x31302e30, // "10.0"
        journal_info_block,
        create_date: now_mac,
        modify_date: now_mac,
        backup_date: 0,
        checked_date: now_mac,
        file_count: 0,
        folder_count: 1,
        block_size,
        total_blocks,
        free_blocks: total_blocks - bitmap.count_allocated() as u32,
        next_allocation: used_end,
        rsrc_clump_size: block_size.max(4096),
        data_clump_size: block_size.max(4096),
        next_catalog_id: 16,
        write_count: 1,
        encoding_bitmap: 1,
        finder_info: [0; 8],
        allocation_file: allocation_fork,
        extents_file: extents_fork,
        catalog_file: catalog_fork,
        attributes_file: ForkData::default(),
        startup_file: ForkData::default(),
        is_hfsx: options.case_sensitive,
    };

    header.write(device, volume_bytes)?;
    Ok(header)
}

/// Write a fresh, empty Journal Info Block and Journal Header: `start ==
/// end == 0`, so there is nothing for a checker to replay until the
/// volume is actually mounted read-write and transactions start flowing.
fn write_journal<D: Write + Seek>(
    device: &mut D,
    jib_block: u32,
    body_start_block: u32,
    body_blocks: u32,
    block_size: u32,
) -> Result<()> {
    let body_offset = body_start_block as u64 * block_size as u64;
    let body_size = body_blocks as u64 * block_size as u64;

    let mut jheader = JournalHeader {
        magic: JOURNAL_HEADER_MAGIC,
        endian: JOURNAL_HEADER_ENDIAN,
        start: 0,
        end: 0,
        size: body_size,
        block_list_header_size: crate::journal::BLOCK_LIST_HEADER_SIZE as u32,
        checksum: 0,
        journal_header_size: JOURNAL_HEADER_SIZE as u32,
    };
    jheader.recompute_checksum();
    device_write(device, body_offset, &jheader.encode())?;

    let info = JournalInfoBlock {
        flags: 0,
        device_signature: [0; 8],
        offset: body_offset,
        size: body_size,
    };
    device_write(device, jib_block as u64 * block_size as u64, &info.encode())?;
    Ok(())
}

/// Round `v` up to the next multiple of 512 (0 rounds up to 512).
fn round_up_512(v: u64) -> u32 {
    (v.div_ceil(512).max(1) * 512) as u32
}

/// Classic HFS's default allocation block size: 512 bytes for volumes up
/// to 32 MB, else `round_up_512(device_size / 65_536)` so the 16-bit
/// allocation block count has room to grow with the volume.
fn classic_default_block_size(volume_bytes: u64) -> u32 {
    const MB: u64 = 1024 * 1024;
    if volume_bytes <= 32 * MB {
        512
    } else {
        round_up_512(volume_bytes / 65_536)
    }
}

/// Format a block device as a classic HFS volume.
pub fn format_hfs<D: Read + Write + Seek>(
    device: &mut D,
    volume_bytes: u64,
    now_posix: i64,
    options: &FormatOptions,
) -> Result<MasterDirectoryBlock> {
    let mut block_size = options.block_size.unwrap_or_else(|| classic_default_block_size(volume_bytes)).max(512);
    let mut total_blocks_u64 = volume_bytes / block_size as u64;
    if total_blocks_u64 > u16::MAX as u64 {
        // Total allocation blocks are capped at 65 535; recompute the block
        // size so the volume's full byte length still fits that count.
        block_size = round_up_512(volume_bytes.div_ceil(u16::MAX as u64)).max(block_size);
        total_blocks_u64 = volume_bytes / block_size as u64;
        if total_blocks_u64 > u16::MAX as u64 {
            return Err(HfsError::Usage("volume too large for classic HFS (16-bit block count)".into()));
        }
    }
    let total_blocks = total_blocks_u64 as u16;
    if total_blocks < 32 {
        return Err(HfsError::Usage("volume too small to format".into()));
    }

    let (now_mac, _overflow) = safe_mac_time_now(now_posix);

    let bitmap_bytes = (total_blocks as u32).div_ceil(8);
    let bitmap_blocks = bitmap_bytes.div_ceil(block_size) as u16;
    let bitmap_start = 3u16; // blocks 0-2 are boot blocks + MDB

    // Extents file: 1 block. Catalog file: 4 blocks minimum, growing for
    // large volumes.
    let extents_blocks = 1u16;
    let extents_start = bitmap_start + bitmap_blocks;
    let catalog_blocks = 4u16.max(((total_blocks as u32).div_ceil(250)) as u16);
    let catalog_start = extents_start + extents_blocks;

    let used_end = catalog_start + catalog_blocks;
    if used_end as u32 + 1 >= total_blocks as u32 {
        return Err(HfsError::Usage("volume too small for metadata layout".into()));
    }

    let mut bitmap = AllocationBitmap::new(total_blocks as u32);
    bitmap.set_range(0, bitmap_start as u32, true);
    bitmap.set_range(bitmap_start as u32, bitmap_blocks as u32, true);
    bitmap.set_range(extents_start as u32, extents_blocks as u32, true);
    bitmap.set_range(catalog_start as u32, catalog_blocks as u32, true);
    bitmap.set_range(total_blocks as u32 - 1, 1, true);
    device_write(device, bitmap_start as u64 * block_size as u64, bitmap.as_bytes())?;

    let extents_fork = classic_fork(extents_start, extents_blocks, block_size);
    let catalog_fork = classic_fork(catalog_start, catalog_blocks, block_size);
    write_empty_btree(device, &extents_fork, block_size, CLASSIC_NODE_SIZE, 0xBC, 10, 2)?;
    write_empty_btree(device, &catalog_fork, block_size, CLASSIC_NODE_SIZE, 0xCF, 37, 0)?;

    let mdb = MasterDirectoryBlock {
        create_date: now_mac,
        modify_date: now_mac,
        attributes: 0x0100, // unmounted cleanly
        root_file_count: 0,
        volume_bitmap_start: bitmap_start,
        next_allocation: used_end,
        total_blocks,
        block_size,
        clump_size: block_size * 4,
        first_alloc_block: extents_start,
        next_catalog_id: 16,
        free_blocks: total_blocks - used_end - 1,
        volume_name: options.volume_name.clone(),
        backup_date: 0,
        backup_seq_num: 0,
        write_count: 1,
        extents_clump_size: block_size * 4,
        catalog_clump_size: block_size * 4,
        root_dir_count: 0,
        file_count: 0,
        folder_count: 0,
        finder_info: [0; 8],
        embed_sig_word: 0,
        embed_extent: ClassicExtent::default(),
        extents_file_size: extents_blocks as u32 * block_size,
        extents_extents: [
            ClassicExtent { start_block: extents_start, block_count: extents_blocks },
            ClassicExtent::default(),
            ClassicExtent::default(),
        ],
        catalog_file_size: catalog_blocks as u32 * block_size,
        catalog_extents: [
            ClassicExtent { start_block: catalog_start, block_count: catalog_blocks },
            ClassicExtent::default(),
            ClassicExtent::default(),
        ],
    };

    mdb.write(device, volume_bytes)?;
    Ok(mdb)
}

/// Build the transient `ForkData` the B-tree engine needs to locate a
/// classic HFS system file's single extent. Classic HFS stores extents as
/// 16-bit `(startBlock, blockCount)` pairs in the MDB; the engine works in
/// terms of the HFS+ 32-bit `ForkData` shape, so the conversion is purely
/// in memory and never written back in this form.
fn classic_fork(start_block: u16, block_count: u16, block_size: u32) -> ForkData {
    single_extent_fork(start_block as u32, block_count as u32, block_size)
}

fn single_extent_fork(start_block: u32, block_count: u32, block_size: u32) -> ForkData {
    let mut extents = [ExtentDescriptor::default(); 8];
    extents[0] = ExtentDescriptor { start_block, block_count };
    ForkData {
        logical_size: block_count as u64 * block_size as u64,
        clump_size: block_size,
        total_blocks: block_count,
        extents,
    }
}

fn device_write<D: Write + Seek>(device: &mut D, offset: u64, data: &[u8]) -> Result<()> {
    device.seek(std::io::SeekFrom::Start(offset))?;
    device.write_all(data)?;
    Ok(())
}

/// Write a header-node-only B-tree: no root leaf, just the empty tree a
/// fresh Extents Overflow or (for classic HFS) Catalog file starts as.
fn write_empty_btree<D: Write + Seek>(
    device: &mut D,
    fork: &ForkData,
    block_size: u32,
    node_size: u16,
    key_compare_type: u32,
    max_key_length: u16,
    btree_type: u8,
) -> Result<()> {
    let header = BTreeHeaderRecord {
        tree_depth: 0,
        root_node: 0,
        leaf_records: 0,
        first_leaf_node: 0,
        last_leaf_node: 0,
        node_size,
        max_key_length,
        total_nodes: fork.total_blocks * block_size / node_size as u32,
        free_nodes: fork.total_blocks * block_size / node_size as u32 - 1,
        key_compare_type,
        fork: fork.clone(),
        block_size,
    };
    let mut node_bitmap = vec![0u8; node_size as usize];
    node_bitmap[0] = 0x80; // header node (node 0) is allocated
    let node = btree::encode_header_node(node_size, &header, node_size as u32, btree_type, &node_bitmap)?;
    device.seek(std::io::SeekFrom::Start(fork.extents[0].start_block as u64 * block_size as u64))?;
    device.write_all(&node)?;
    Ok(())
}

fn write_catalog_btree<D: Write + Seek>(
    device: &mut D,
    fork: &ForkData,
    block_size: u32,
    node_size: u16,
    now_mac: u32,
    options: &FormatOptions,
) -> Result<()> {
    let total_nodes = fork.total_blocks * block_size / node_size as u32;
    let header = BTreeHeaderRecord {
        tree_depth: 1,
        root_node: 1,
        leaf_records: 2,
        first_leaf_node: 1,
        last_leaf_node: 1,
        node_size,
        max_key_length: 516,
        total_nodes,
        free_nodes: total_nodes - 2,
        key_compare_type: if options.case_sensitive { 0xBF } else { 0xCF },
        fork: fork.clone(),
        block_size,
    };
    let mut node_bitmap = vec![0u8; node_size as usize];
    node_bitmap[0] = 0xC0; // nodes 0 (header) and 1 (root leaf) allocated
    let header_node = btree::encode_header_node(node_size, &header, node_size as u32, 0, &node_bitmap)?;
    device.seek(std::io::SeekFrom::Start(fork.extents[0].start_block as u64 * block_size as u64))?;
    device.write_all(&header_node)?;

    let leaf = encode_root_leaf(node_size, &options.volume_name, now_mac)?;
    device.write_all(&leaf)?;
    Ok(())
}

/// Encode the single leaf node that seeds a fresh catalog: the root
/// folder's thread record (keyed by the root folder itself, pointing back
/// to the root parent) and its folder record (keyed by `(1, name)`).
fn encode_root_leaf(node_size: u16, volume_name: &str, now_mac: u32) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; node_size as usize];
    // offsets[i] is where record i starts; the final entry is the
    // free-space pointer (one past the last record), per the on-disk
    // offset-table convention `read_node` expects.
    let mut offsets = Vec::new();
    let mut pos = btree::NODE_DESCRIPTOR_SIZE;

    offsets.push(pos as u16);
    pos += encode_thread_record(&mut buf[pos..], CNID_ROOT_FOLDER, CNID_ROOT_PARENT, volume_name)?;

    offsets.push(pos as u16);
    pos += encode_folder_record(&mut buf[pos..], CNID_ROOT_PARENT, volume_name, CNID_ROOT_FOLDER, now_mac)?;

    offsets.push(pos as u16);

    buf[0..4].copy_from_slice(&0u32.to_be_bytes());
    buf[4..8].copy_from_slice(&0u32.to_be_bytes());
    buf[8] = btree::NODE_KIND_LEAF;
    buf[9] = 0;
    buf[10..12].copy_from_slice(&2u16.to_be_bytes());
    buf[12..14].copy_from_slice(&0u16.to_be_bytes());

    // The table is stored in reverse record order, growing backward from
    // the end of the node: record 0's offset lands in the node's very
    // last two bytes, with the free-space pointer nearest the record data.
    let table_size = offsets.len() * 2;
    let table_start = node_size as usize - table_size;
    let mut write_pos = table_start;
    for &off in offsets.iter().rev() {
        buf[write_pos..write_pos + 2].copy_from_slice(&off.to_be_bytes());
        write_pos += 2;
    }

    Ok(buf)
}

/// Encode a thread record: keyed by `(own_id, "")`, pointing back to
/// `(parent_id, name)` so a lookup by CNID alone can recover the full
/// catalog key of whatever owns that CNID.
fn encode_thread_record(buf: &mut [u8], own_id: u32, parent_id: u32, name: &str) -> Result<usize> {
    // Empty-name key: {keyLength:2, parentID:4, nameLength:2=0}.
    let key_len = 6u16;
    write_u16_be(buf, 0, key_len)?;
    write_u32_be(buf, 2, own_id)?;
    write_u16_be(buf, 6, 0)?;
    let mut pos = 2 + key_len as usize;
    if !pos.is_multiple_of(2) {
        pos += 1;
    }
    let uni = UniStr::from_str(name);
    write_u16_be(buf, pos, btree::RECORD_TYPE_FOLDER_THREAD)?;
    write_u16_be(buf, pos + 2, 0)?;
    write_u32_be(buf, pos + 4, parent_id)?;
    write_hfs_unistr255(buf, pos + 8, &uni)?;
    Ok(pos + 10 + uni.code_units.len() * 2)
}

fn encode_folder_record(buf: &mut [u8], parent_id: u32, name: &str, folder_id: u32, now_mac: u32) -> Result<usize> {
    let uni = UniStr::from_str(name);
    let key_len = 6 + uni.code_units.len() * 2;
    write_u16_be(buf, 0, key_len as u16)?;
    write_u32_be(buf, 2, parent_id)?;
    write_hfs_unistr255(buf, 6, &uni)?;
    let mut pos = 2 + key_len;
    if !pos.is_multiple_of(2) {
        pos += 1;
    }
    write_u16_be(buf, pos, btree::RECORD_TYPE_FOLDER)?;
    write_u16_be(buf, pos + 2, 0)?; // flags
    write_u32_be(buf, pos + 4, 0)?; // valence
    write_u32_be(buf, pos + 8, folder_id)?;
    write_u32_be(buf, pos + 12, now_mac)?; // create
    write_u32_be(buf, pos + 16, now_mac)?; // content mod
    write_u32_be(buf, pos + 20, now_mac)?; // attribute mod
    write_u32_be(buf, pos + 24, now_mac)?; // access
    write_u32_be(buf, pos + 28, 0)?; // backup
    // HfsPlusBsdInfo: owner, group, admin_flags, owner_flags, mode, special (16 bytes)
    for i in 0..16 {
        buf[pos + 32 + i] = 0;
    }
    buf[pos + 32 + 10] = 0o40; // upper byte of file_mode: S_IFDIR high bits
    buf[pos + 32 + 11] = 0o755 as u8;
    // user info (16) + finder info (16)
    for i in 0..32 {
        buf[pos + 48 + i] = 0;
    }
    write_u32_be(buf, pos + 80, 0)?; // text encoding
    Ok(pos + 84)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn format_hfs_plus_produces_parseable_header() {
        let volume_bytes = 64u64 * 1024 * 1024;
        let mut dev = Cursor::new(vec![0u8; volume_bytes as usize]);
        let options = FormatOptions { volume_name: "Test Disk".into(), ..Default::default() };
        let header = format_hfs_plus(&mut dev, volume_bytes, 1_700_000_000, &options).unwrap();
        assert_eq!(header.signature, HFS_PLUS_SIGNATURE);
        assert!(header.free_blocks < header.total_blocks);

        dev.set_position(0);
        let reparsed = VolumeHeader::parse(&mut dev).unwrap();
        assert_eq!(reparsed.total_blocks, header.total_blocks);
        assert_eq!(reparsed.folder_count, 1);
    }

    #[test]
    fn format_hfs_produces_parseable_mdb() {
        let volume_bytes = 4u64 * 1024 * 1024;
        let mut dev = Cursor::new(vec![0u8; volume_bytes as usize]);
        let options = FormatOptions { volume_name: "Floppy".into(), use_hfs_plus: false, ..Default::default() };
        let mdb = format_hfs(&mut dev, volume_bytes, 1_700_000_000, &options).unwrap();
        assert_eq!(mdb.volume_name, "Floppy");

        dev.set_position(0);
        let reparsed = MasterDirectoryBlock::parse(&mut dev).unwrap();
        assert_eq!(reparsed.total_blocks, mdb.total_blocks);
    }

    #[test]
    fn rejects_undersized_volume() {
        let volume_bytes = 8192u64;
        let mut dev = Cursor::new(vec![0u8; volume_bytes as usize]);
        let options = FormatOptions::default();
        assert!(format_hfs_plus(&mut dev, volume_bytes, 1_700_000_000, &options).is_err());
    }

    #[test]
    fn journaled_format_sets_attribute_and_writes_empty_journal() {
        let volume_bytes = 16u64 * 1024 * 1024;
        let mut dev = Cursor::new(vec![0u8; volume_bytes as usize]);
        let options = FormatOptions { volume_name: "Journaled".into(), enable_journal: true, ..Default::default() };
        let header = format_hfs_plus(&mut dev, volume_bytes, 1_700_000_000, &options).unwrap();
        assert_ne!(header.journal_info_block, 0);
        assert!(header.attributes & crate::volume::ATTR_VOLUME_JOURNALED != 0);

        let jib_offset = header.journal_info_block as u64 * header.block_size as u64;
        dev.set_position(jib_offset);
        let mut jib_buf = vec![0u8; 52];
        std::io::Read::read_exact(&mut dev, &mut jib_buf).unwrap();
        let info = crate::journal::JournalInfoBlock::decode(&jib_buf).unwrap();
        assert_eq!(info.flags, 0);

        dev.set_position(info.offset);
        let mut jh_buf = vec![0u8; crate::journal::JOURNAL_HEADER_SIZE];
        std::io::Read::read_exact(&mut dev, &mut jh_buf).unwrap();
        let jheader = crate::journal::JournalHeader::decode(&jh_buf).unwrap();
        assert_eq!(jheader.magic, crate::journal::JOURNAL_HEADER_MAGIC);
        assert!(jheader.is_empty());
        assert!(jheader.verify_checksum());
    }

    #[test]
    fn disabling_journal_option_leaves_attribute_clear() {
        let volume_bytes = 4u64 * 1024 * 1024;
        let mut dev = Cursor::new(vec![0u8; volume_bytes as usize]);
        let options = FormatOptions { volume_name: "Plain".into(), enable_journal: false, ..Default::default() };
        let header = format_hfs_plus(&mut dev, volume_bytes, 1_700_000_000, &options).unwrap();
        assert_eq!(header.journal_info_block, 0);
        assert!(header.attributes & crate::volume::ATTR_VOLUME_JOURNALED == 0);
    }
}
