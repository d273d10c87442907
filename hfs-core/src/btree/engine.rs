use byteorder::{BigEndian, ReadBytesExt};
use std::io::{Read, Seek, SeekFrom, Write, Cursor};

use crate::error::{HfsError, Result};
use crate::volume::ForkData;

/// Size in bytes of the on-disk B-tree header record (record 0 of the
/// header node), per the HFS+ B-tree header layout.
pub const HEADER_RECORD_SIZE: usize = 106;
/// Size of the reserved user-data record (record 1 of the header node).
pub const HEADER_USER_DATA_SIZE: usize = 128;
/// Size of a node descriptor preceding every node's records.
pub const NODE_DESCRIPTOR_SIZE: usize = 14;

/// B-tree node kinds
pub const NODE_KIND_LEAF: u8 = 0xFF;   // -1 as i8
pub const NODE_KIND_INDEX: u8 = 0x00;
pub const NODE_KIND_HEADER: u8 = 0x01;
pub const NODE_KIND_MAP: u8 = 0x02;

/// B-tree header record (from the header node, record 0)
#[derive(Debug, Clone)]
pub struct BTreeHeaderRecord {
    pub tree_depth: u16,
    pub root_node: u32,
    pub leaf_records: u32,
    pub first_leaf_node: u32,
    pub last_leaf_node: u32,
    pub node_size: u16,
    pub max_key_length: u16,
    pub total_nodes: u32,
    pub free_nodes: u32,
    pub key_compare_type: u32,
    /// Fork data for computing byte offsets into the B-tree file
    pub fork: ForkData,
    /// Block size of the volume
    pub block_size: u32,
}

/// A B-tree node descriptor (14 bytes at the start of each node)
#[derive(Debug, Clone)]
pub struct NodeDescriptor {
    pub forward_link: u32,
    pub backward_link: u32,
    pub kind: u8,
    pub height: u8,
    pub num_records: u16,
    pub reserved: u16,
}

/// A parsed B-tree node with its raw data
#[derive(Debug)]
pub struct BTreeNode {
    pub descriptor: NodeDescriptor,
    /// Raw node data (node_size bytes)
    pub data: Vec<u8>,
    /// Record offsets (from the offset table at the end of the node)
    pub record_offsets: Vec<u16>,
}

/// Read the B-tree header record from the first node of a fork
pub fn read_btree_header<R: Read + Seek>(
    reader: &mut R,
    fork: &ForkData,
    block_size: u32,
) -> Result<BTreeHeaderRecord> {
    // The header node is always node 0
    let node_data = read_raw_node(reader, fork, block_size, 0, 512)?;

    // First, we need to figure out the real node size from the header record.
    // The node descriptor is 14 bytes, then record 0 is the header record.
    let mut cursor = Cursor::new(&node_data);

    // Parse node descriptor
    let desc = parse_node_descriptor(&mut cursor)?;
    if desc.kind != NODE_KIND_HEADER {
        return Err(HfsError::InvalidBTree(
            format!("expected header node, got kind {}", desc.kind),
        ));
    }

    // Header record starts at offset 14
    let tree_depth = cursor.read_u16::<BigEndian>()?;
    let root_node = cursor.read_u32::<BigEndian>()?;
    let leaf_records = cursor.read_u32::<BigEndian>()?;
    let first_leaf_node = cursor.read_u32::<BigEndian>()?;
    let last_leaf_node = cursor.read_u32::<BigEndian>()?;
    let node_size = cursor.read_u16::<BigEndian>()?;
    let max_key_length = cursor.read_u16::<BigEndian>()?;
    let total_nodes = cursor.read_u32::<BigEndian>()?;
    let free_nodes = cursor.read_u32::<BigEndian>()?;
    let _reserved = cursor.read_u16::<BigEndian>()?;
    let _clump_size = cursor.read_u32::<BigEndian>()?;
    let _btree_type = cursor.read_u8()?;
    let key_compare_type = cursor.read_u8()? as u32;
    let _attributes = cursor.read_u32::<BigEndian>()?;
    // Skip reserved bytes (16 * 4 = 64 bytes)

    Ok(BTreeHeaderRecord {
        tree_depth,
        root_node,
        leaf_records,
        first_leaf_node,
        last_leaf_node,
        node_size,
        max_key_length,
        total_nodes,
        free_nodes,
        key_compare_type,
        fork: fork.clone(),
        block_size,
    })
}

/// Read raw bytes for a node. We read `read_size` bytes at the node's offset.
/// If `read_size` is less than the actual node size, we read what we can
/// (used for initial header read where we don't know node_size yet).
fn read_raw_node<R: Read + Seek>(
    reader: &mut R,
    fork: &ForkData,
    block_size: u32,
    node_number: u32,
    read_size: u16,
) -> Result<Vec<u8>> {
    let byte_offset = compute_fork_offset(fork, block_size, node_number as u64 * read_size as u64)?;
    reader.seek(SeekFrom::Start(byte_offset))?;

    let mut buf = vec![0u8; read_size as usize];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Read and parse a B-tree node
pub fn read_node<R: Read + Seek>(
    reader: &mut R,
    btree_header: &BTreeHeaderRecord,
    node_number: u32,
) -> Result<BTreeNode> {
    let node_size = btree_header.node_size;
    let byte_offset_in_fork = node_number as u64 * node_size as u64;
    let byte_offset = compute_fork_offset(
        &btree_header.fork,
        btree_header.block_size,
        byte_offset_in_fork,
    )?;

    reader.seek(SeekFrom::Start(byte_offset))?;
    let mut data = vec![0u8; node_size as usize];
    reader.read_exact(&mut data)?;

    // Parse the node descriptor
    let mut cursor = Cursor::new(&data);
    let descriptor = parse_node_descriptor(&mut cursor)?;

    // Read the record offset table from the end of the node
    // Offsets are stored as u16 values at the very end, growing backwards
    let num_offsets = descriptor.num_records as usize + 1; // +1 for the free space offset
    let mut record_offsets = Vec::with_capacity(num_offsets);

    for i in 0..num_offsets {
        let offset_pos = node_size as usize - (i + 1) * 2;
        if offset_pos + 1 >= data.len() {
            return Err(HfsError::InvalidBTree("offset table out of bounds".into()));
        }
        let offset = u16::from_be_bytes([data[offset_pos], data[offset_pos + 1]]);
        record_offsets.push(offset);
    }

    Ok(BTreeNode {
        descriptor,
        data,
        record_offsets,
    })
}

impl BTreeNode {
    /// Get the raw bytes for record `index` in this node
    pub fn record_data(&self, index: usize) -> Result<&[u8]> {
        if index >= self.descriptor.num_records as usize {
            return Err(HfsError::InvalidBTree(
                format!("record index {} >= num_records {}", index, self.descriptor.num_records),
            ));
        }
        let start = self.record_offsets[index] as usize;
        let end = self.record_offsets[index + 1] as usize;
        if start > end || end > self.data.len() {
            return Err(HfsError::InvalidBTree(
                format!("invalid record offsets: start={}, end={}, len={}", start, end, self.data.len()),
            ));
        }
        Ok(&self.data[start..end])
    }
}

/// Write a raw node's bytes back to its slot in the fork. `data.len()` must
/// equal `btree_header.node_size`.
pub fn write_node<W: Write + Seek>(
    writer: &mut W,
    btree_header: &BTreeHeaderRecord,
    node_number: u32,
    data: &[u8],
) -> Result<()> {
    if data.len() != btree_header.node_size as usize {
        return Err(HfsError::InvalidBTree(format!(
            "node buffer length {} does not match node_size {}",
            data.len(),
            btree_header.node_size
        )));
    }
    let byte_offset_in_fork = node_number as u64 * btree_header.node_size as u64;
    let byte_offset = compute_fork_offset(&btree_header.fork, btree_header.block_size, byte_offset_in_fork)?;
    writer.seek(SeekFrom::Start(byte_offset))?;
    writer.write_all(data)?;
    Ok(())
}

/// Build a fresh header node: descriptor + header record + blank user-data
/// record + node-allocation bitmap (the "map record"), padded to
/// `node_size` bytes total. `bitmap` is the node-allocation bitmap content;
/// it is truncated or zero-padded to fill the remaining space in the node.
pub fn encode_header_node(
    node_size: u16,
    header: &BTreeHeaderRecord,
    clump_size: u32,
    btree_type: u8,
    bitmap: &[u8],
) -> Result<Vec<u8>> {
    let node_size = node_size as usize;
    let map_offset = NODE_DESCRIPTOR_SIZE + HEADER_RECORD_SIZE + HEADER_USER_DATA_SIZE;
    let offset_table_size = 4 * 2; // 3 records + free-space marker
    if map_offset + offset_table_size > node_size {
        return Err(HfsError::InvalidBTree("node_size too small for header node".into()));
    }
    let map_len = node_size - map_offset - offset_table_size;

    let mut buf = vec![0u8; node_size];
    // Node descriptor: no siblings, kind = header, height 0, 3 records.
    buf[0..4].copy_from_slice(&0u32.to_be_bytes());
    buf[4..8].copy_from_slice(&0u32.to_be_bytes());
    buf[8] = NODE_KIND_HEADER;
    buf[9] = 0;
    buf[10..12].copy_from_slice(&3u16.to_be_bytes());
    buf[12..14].copy_from_slice(&0u16.to_be_bytes());

    let mut off = NODE_DESCRIPTOR_SIZE;
    buf[off..off + 2].copy_from_slice(&header.tree_depth.to_be_bytes());
    off += 2;
    buf[off..off + 4].copy_from_slice(&header.root_node.to_be_bytes());
    off += 4;
    buf[off..off + 4].copy_from_slice(&header.leaf_records.to_be_bytes());
    off += 4;
    buf[off..off + 4].copy_from_slice(&header.first_leaf_node.to_be_bytes());
    off += 4;
    buf[off..off + 4].copy_from_slice(&header.last_leaf_node.to_be_bytes());
    off += 4;
    buf[off..off + 2].copy_from_slice(&header.node_size.to_be_bytes());
    off += 2;
    buf[off..off + 2].copy_from_slice(&header.max_key_length.to_be_bytes());
    off += 2;
    buf[off..off + 4].copy_from_slice(&header.total_nodes.to_be_bytes());
    off += 4;
    buf[off..off + 4].copy_from_slice(&header.free_nodes.to_be_bytes());
    off += 4;
    off += 2; // reserved1
    buf[off..off + 4].copy_from_slice(&clump_size.to_be_bytes());
    off += 4;
    buf[off] = btree_type;
    off += 1;
    buf[off] = header.key_compare_type as u8;
    off += 1;
    off += 4; // attributes (none set)
    off += 64; // reserved3
    debug_assert_eq!(off, NODE_DESCRIPTOR_SIZE + HEADER_RECORD_SIZE);

    let copy_len = bitmap.len().min(map_len);
    buf[map_offset..map_offset + copy_len].copy_from_slice(&bitmap[..copy_len]);

    // Offset table, growing backwards from the end of the node.
    let rec0 = NODE_DESCRIPTOR_SIZE as u16;
    let rec1 = (NODE_DESCRIPTOR_SIZE + HEADER_RECORD_SIZE) as u16;
    let rec2 = map_offset as u16;
    let table_start = node_size - offset_table_size;
    // The map record fills every byte up to the offset table, so the
    // free-space pointer coincides with where the table begins.
    let free_space = table_start as u16;
    buf[table_start..table_start + 2].copy_from_slice(&free_space.to_be_bytes());
    buf[table_start + 2..table_start + 4].copy_from_slice(&rec2.to_be_bytes());
    buf[table_start + 4..table_start + 6].copy_from_slice(&rec1.to_be_bytes());
    buf[table_start + 6..table_start + 8].copy_from_slice(&rec0.to_be_bytes());

    Ok(buf)
}

/// Count set bits in a node-allocation bitmap across the first `total_nodes`
/// bits, used to cross-check a B-tree header's `freeNodes` field.
pub fn count_allocated_nodes(bitmap: &[u8], total_nodes: u32) -> u32 {
    let mut count = 0u32;
    for i in 0..total_nodes {
        let byte = i as usize / 8;
        let bit = 7 - (i % 8);
        if byte < bitmap.len() && (bitmap[byte] >> bit) & 1 == 1 {
            count += 1;
        }
    }
    count
}

/// Walk every leaf record in key order, verifying strict ascent under the
/// given comparator. Returns `(record_count, in_order, cyclic)`; the walk is
/// bounded to `total_nodes` steps so a forward-link cycle is detected rather
/// than looped forever.
pub fn validate_leaf_order<R, F>(
    reader: &mut R,
    btree_header: &BTreeHeaderRecord,
    compare: F,
) -> Result<(u64, bool, bool)>
where
    R: Read + Seek,
    F: Fn(&[u8], &[u8]) -> Result<std::cmp::Ordering>,
{
    let mut count = 0u64;
    let mut in_order = true;
    let mut prev: Option<Vec<u8>> = None;
    let mut node_num = btree_header.first_leaf_node;
    let mut steps = 0u32;

    while node_num != 0 {
        steps += 1;
        if steps > btree_header.total_nodes.max(1) {
            return Ok((count, in_order, true));
        }
        let node = read_node(reader, btree_header, node_num)?;
        if node.descriptor.kind != NODE_KIND_LEAF {
            return Err(HfsError::InvalidBTree("expected leaf node while validating order".into()));
        }
        for i in 0..node.descriptor.num_records as usize {
            let data = node.record_data(i)?;
            if let Some(ref p) = prev {
                if compare(p, data)? != std::cmp::Ordering::Less {
                    in_order = false;
                }
            }
            prev = Some(data.to_vec());
            count += 1;
        }
        node_num = node.descriptor.forward_link;
    }

    Ok((count, in_order, false))
}

fn parse_node_descriptor<R: Read>(reader: &mut R) -> Result<NodeDescriptor> {
    Ok(NodeDescriptor {
        forward_link: reader.read_u32::<BigEndian>()?,
        backward_link: reader.read_u32::<BigEndian>()?,
        kind: reader.read_u8()?,
        height: reader.read_u8()?,
        num_records: reader.read_u16::<BigEndian>()?,
        reserved: reader.read_u16::<BigEndian>()?,
    })
}

/// Compute the absolute byte offset in the volume for a given byte offset within a fork.
/// Walks through the fork's extent descriptors to find the right allocation block.
pub fn compute_fork_offset(
    fork: &ForkData,
    block_size: u32,
    offset_in_fork: u64,
) -> Result<u64> {
    let block_size = block_size as u64;
    let mut remaining = offset_in_fork;

    for extent in &fork.extents {
        if extent.block_count == 0 {
            break;
        }
        let extent_bytes = extent.block_count as u64 * block_size;
        if remaining < extent_bytes {
            let block_within_extent = remaining / block_size;
            let offset_within_block = remaining % block_size;
            let absolute_block = extent.start_block as u64 + block_within_extent;
            return Ok(absolute_block * block_size + offset_within_block);
        }
        remaining -= extent_bytes;
    }

    Err(HfsError::InvalidBTree(
        format!("fork offset {} exceeds extent capacity", offset_in_fork),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::ExtentDescriptor;

    fn single_extent_fork(start: u32, blocks: u32, node_size: u16, total_nodes: u32) -> ForkData {
        let mut extents = [ExtentDescriptor::default(); 8];
        extents[0] = ExtentDescriptor { start_block: start, block_count: blocks };
        ForkData {
            logical_size: total_nodes as u64 * node_size as u64,
            clump_size: 0,
            total_blocks: blocks,
            extents,
        }
    }

    #[test]
    fn header_node_round_trips_through_read_node() {
        let fork = single_extent_fork(2, 1, 512, 1);
        let header = BTreeHeaderRecord {
            tree_depth: 0,
            root_node: 0,
            leaf_records: 0,
            first_leaf_node: 0,
            last_leaf_node: 0,
            node_size: 512,
            max_key_length: 516,
            total_nodes: 1,
            free_nodes: 0,
            key_compare_type: 0xCF,
            fork,
            block_size: 512,
        };
        let bitmap = [0b1000_0000u8];
        let node_bytes = encode_header_node(512, &header, 512, 0, &bitmap).unwrap();
        assert_eq!(node_bytes.len(), 512);

        let mut cursor = std::io::Cursor::new(vec![0u8; 4096]);
        cursor.seek(SeekFrom::Start(1024)).unwrap();
        cursor.write_all(&node_bytes).unwrap();

        let node = read_node(&mut cursor, &header, 0).unwrap();
        assert_eq!(node.descriptor.kind, NODE_KIND_HEADER);
        assert_eq!(node.descriptor.num_records, 3);
        assert_eq!(count_allocated_nodes(&bitmap, 1), 1);
    }

    #[test]
    fn compute_fork_offset_walks_extents() {
        let fork = single_extent_fork(3, 4, 512, 4);
        let off = compute_fork_offset(&fork, 512, 600).unwrap();
        assert_eq!(off, 3 * 512 + 600);
    }

    #[test]
    fn compute_fork_offset_rejects_out_of_range() {
        let fork = single_extent_fork(3, 1, 512, 1);
        assert!(compute_fork_offset(&fork, 512, 10_000).is_err());
    }
}
