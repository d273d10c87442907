//! Attributes B-tree: traversal and structural validation only. The spec
//! does not define semantics for any particular attribute's payload, so
//! this module treats attribute records as opaque blobs keyed by
//! `(fileID, name)` and validates only what the checker needs: that every
//! leaf record parses as a well-formed key plus a recognized record type.

use std::io::{Read, Seek};

use crate::btree::{self, BTreeHeaderRecord};
use crate::codec::{read_hfs_unistr255, read_u32_be};
use crate::error::{HfsError, Result};

pub const ATTR_RECORD_INLINE_DATA: u32 = 0x10;
pub const ATTR_RECORD_FORK_DATA: u32 = 0x20;
pub const ATTR_RECORD_EXTENTS: u32 = 0x30;

/// `{keyLength:2, pad:2, fileID:4, startBlock:4, attrName: unistr255}`.
#[derive(Debug, Clone)]
pub struct AttributeKey {
    pub file_id: u32,
    pub start_block: u32,
    pub name: String,
}

pub fn parse_attribute_key(data: &[u8]) -> Result<AttributeKey> {
    if data.len() < 12 {
        return Err(HfsError::InvalidBTree("attribute key too short".into()));
    }
    let file_id = read_u32_be(data, 4)?;
    let start_block = read_u32_be(data, 8)?;
    let name = read_hfs_unistr255(data, 12)?.to_string_lossy();
    Ok(AttributeKey { file_id, start_block, name })
}

/// Validate that a raw attribute record's type word is one of the three
/// kinds Apple's on-disk format defines (inline data, fork data, extents).
pub fn validate_attribute_record_type(record_type: u32) -> bool {
    matches!(
        record_type,
        ATTR_RECORD_INLINE_DATA | ATTR_RECORD_FORK_DATA | ATTR_RECORD_EXTENTS
    )
}

/// Walk every leaf record of the attributes B-tree, calling `visit` with
/// each record's raw key bytes and raw record-type word. Used by the
/// checker; returns the number of leaf records visited.
pub fn walk_attributes<R, F>(
    reader: &mut R,
    header: &BTreeHeaderRecord,
    mut visit: F,
) -> Result<u64>
where
    R: Read + Seek,
    F: FnMut(&[u8], u32) -> Result<()>,
{
    let mut count = 0u64;
    if header.root_node == 0 {
        return Ok(0);
    }
    let mut node_num = header.first_leaf_node;
    while node_num != 0 {
        let node = btree::read_node(reader, header, node_num)?;
        if node.descriptor.kind != btree::NODE_KIND_LEAF {
            return Err(HfsError::InvalidBTree("expected leaf node in attributes chain".into()));
        }
        for i in 0..node.descriptor.num_records as usize {
            let data = node.record_data(i)?;
            let key = parse_attribute_key(data)?;
            let key_len = crate::codec::read_u16_be(data, 0)? as usize;
            let mut record_offset = 2 + key_len;
            if !record_offset.is_multiple_of(2) {
                record_offset += 1;
            }
            if record_offset + 4 > data.len() {
                return Err(HfsError::InvalidBTree("attribute record missing type word".into()));
            }
            let record_type = read_u32_be(data, record_offset)?;
            let mut key_buf = Vec::new();
            key_buf.extend_from_slice(key.name.as_bytes());
            visit(&key_buf, record_type)?;
            count += 1;
        }
        node_num = node.descriptor.forward_link;
    }
    Ok(count)
}
