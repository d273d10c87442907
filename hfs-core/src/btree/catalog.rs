use crate::codec::validate_unistr;
use crate::error::{Fault, HfsError, Result};
use crate::unicode;

/// Well-known Catalog Node IDs
pub const CNID_ROOT_PARENT: u32 = 1;
pub const CNID_ROOT_FOLDER: u32 = 2;
pub const CNID_EXTENTS_FILE: u32 = 3;
pub const CNID_CATALOG_FILE: u32 = 4;
pub const CNID_BAD_BLOCKS_FILE: u32 = 5;
pub const CNID_ALLOCATION_FILE: u32 = 6;
pub const CNID_STARTUP_FILE: u32 = 7;
pub const CNID_ATTRIBUTES_FILE: u32 = 8;

/// Catalog record types
pub const RECORD_TYPE_FOLDER: u16 = 0x0001;
pub const RECORD_TYPE_FILE: u16 = 0x0002;
pub const RECORD_TYPE_FOLDER_THREAD: u16 = 0x0003;
pub const RECORD_TYPE_FILE_THREAD: u16 = 0x0004;

/// Catalog key: (parentID, nodeName)
#[derive(Debug, Clone)]
pub struct CatalogKey {
    pub parent_id: u32,
    pub node_name: Vec<u16>, // UTF-16 code points
}

/// Parse a catalog key from raw record data.
/// Returns (key, remaining_data_offset) where remaining_data_offset points to the record data after the key.
pub(crate) fn parse_catalog_key(data: &[u8]) -> Result<(CatalogKey, usize)> {
    if data.len() < 6 {
        return Err(HfsError::InvalidBTree("catalog key too short".into()));
    }

    let key_length = u16::from_be_bytes([data[0], data[1]]) as usize;
    let parent_id = u32::from_be_bytes([data[2], data[3], data[4], data[5]]);
    let name_length = u16::from_be_bytes([data[6], data[7]]) as usize;

    let name_start = 8;
    let name_end = name_start + name_length * 2;
    if name_end > data.len() {
        return Err(HfsError::InvalidBTree(
            format!("catalog key name extends beyond data: name_end={}, data_len={}", name_end, data.len()),
        ));
    }

    let node_name = unicode::utf16be_to_u16(&data[name_start..name_end]);

    // Record data starts after key_length + 2 bytes for the key_length field itself
    let record_offset = 2 + key_length;
    // Ensure even alignment
    let record_offset = if !record_offset.is_multiple_of(2) { record_offset + 1 } else { record_offset };

    Ok((
        CatalogKey {
            parent_id,
            node_name,
        },
        record_offset,
    ))
}

/// Validate a raw catalog `recordType` word against the four legal values,
/// returning the matching `Fault` when it is none of them.
pub fn validate_record_type(record_type: u16) -> std::result::Result<(), Fault> {
    match record_type {
        RECORD_TYPE_FOLDER | RECORD_TYPE_FILE | RECORD_TYPE_FOLDER_THREAD | RECORD_TYPE_FILE_THREAD => Ok(()),
        other => Err(Fault::CatalogRecordTypeInvalid(other)),
    }
}

/// Validate a catalog record's `parentID`, rejecting 0 (no record may claim
/// the null parent) per the reserved-CNID range.
pub fn validate_parent_id(parent_id: u32) -> std::result::Result<(), Fault> {
    if parent_id == 0 {
        Err(Fault::CatalogParentIdInvalid(parent_id))
    } else {
        Ok(())
    }
}

/// Validate a catalog key's `nodeName` the same way `read_hfs_unistr255`
/// validates any other on-disk Unicode string: reject unpaired surrogates
/// and embedded NULs. `parent_id` is carried along only to identify the
/// offending record in the reported fault.
pub fn validate_node_name(parent_id: u32, node_name: &[u16]) -> std::result::Result<(), Fault> {
    validate_unistr(node_name).map_err(|_| Fault::CatalogNameInvalid(parent_id))
}

/// Read the raw `recordType` word straight out of a record's data slice
/// (after the key), without fully parsing the record. Used by the checker
/// to validate record types that fail full parsing.
pub fn peek_record_type(data_after_key: &[u8]) -> Result<u16> {
    if data_after_key.len() < 2 {
        return Err(HfsError::InvalidBTree("catalog record too short".into()));
    }
    Ok(u16::from_be_bytes([data_after_key[0], data_after_key[1]]))
}

/// Parse a leaf record's key and raw `recordType` word without fully
/// decoding the payload. Used by the checker, which must recover from and
/// report unknown record types rather than bail out on a full parse.
pub fn catalog_key_and_type(record_data: &[u8]) -> Result<(CatalogKey, u16)> {
    let (key, record_offset) = parse_catalog_key(record_data)?;
    if record_offset + 2 > record_data.len() {
        return Err(HfsError::InvalidBTree("catalog record missing after key".into()));
    }
    let record_type = peek_record_type(&record_data[record_offset..])?;
    Ok((key, record_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unicode::string_to_utf16;

    fn key_bytes(parent: u32, name: &str, record_type: u16) -> Vec<u8> {
        let utf16 = string_to_utf16(name);
        let key_len = (6 + 2 + utf16.len() * 2) as u16;
        let mut buf = vec![0u8; 2 + key_len as usize];
        buf[0..2].copy_from_slice(&key_len.to_be_bytes());
        buf[2..6].copy_from_slice(&parent.to_be_bytes());
        buf[6..8].copy_from_slice(&(utf16.len() as u16).to_be_bytes());
        for (i, u) in utf16.iter().enumerate() {
            buf[8 + i * 2..10 + i * 2].copy_from_slice(&u.to_be_bytes());
        }
        let mut record_offset = 2 + key_len as usize;
        if !record_offset.is_multiple_of(2) {
            record_offset += 1;
            buf.push(0);
        }
        buf.resize(record_offset + 2, 0);
        buf[record_offset..record_offset + 2].copy_from_slice(&record_type.to_be_bytes());
        buf
    }

    #[test]
    fn parses_key_and_type_together() {
        let data = key_bytes(16, "Documents", RECORD_TYPE_FOLDER);
        let (key, record_type) = catalog_key_and_type(&data).unwrap();
        assert_eq!(key.parent_id, 16);
        assert_eq!(unicode::utf16_to_string(&key.node_name), "Documents");
        assert_eq!(record_type, RECORD_TYPE_FOLDER);
    }

    #[test]
    fn validates_record_types() {
        assert!(validate_record_type(RECORD_TYPE_FOLDER).is_ok());
        assert!(validate_record_type(RECORD_TYPE_FILE).is_ok());
        assert!(validate_record_type(RECORD_TYPE_FOLDER_THREAD).is_ok());
        assert!(validate_record_type(RECORD_TYPE_FILE_THREAD).is_ok());
        assert_eq!(validate_record_type(0x00FF), Err(Fault::CatalogRecordTypeInvalid(0x00FF)));
    }

    #[test]
    fn validates_parent_id() {
        assert!(validate_parent_id(CNID_ROOT_PARENT).is_ok());
        assert_eq!(validate_parent_id(0), Err(Fault::CatalogParentIdInvalid(0)));
    }

    #[test]
    fn rejects_truncated_key() {
        assert!(parse_catalog_key(&[0, 1]).is_err());
    }

    #[test]
    fn node_name_validation_accepts_plain_names() {
        let data = key_bytes(16, "Documents", RECORD_TYPE_FOLDER);
        let (key, _) = parse_catalog_key(&data).unwrap();
        assert!(validate_node_name(key.parent_id, &key.node_name).is_ok());
    }

    #[test]
    fn node_name_validation_rejects_unpaired_surrogate() {
        let name = vec![0xD800u16];
        assert_eq!(
            validate_node_name(16, &name),
            Err(Fault::CatalogNameInvalid(16))
        );
    }

    #[test]
    fn node_name_validation_rejects_embedded_nul() {
        let name = vec![b'a' as u16, 0, b'b' as u16];
        assert_eq!(
            validate_node_name(16, &name),
            Err(Fault::CatalogNameInvalid(16))
        );
    }
}
