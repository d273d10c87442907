//! Key comparators for the four B-tree instantiations the engine needs to
//! support: classic HFS catalog (MacRoman, case-folded), HFS+ catalog
//! (Unicode, case-folded per TN1150), HFSX catalog (Unicode, binary), and
//! Extents Overflow/Attributes (lexicographic byte order over the raw key).
//!
//! The teacher's reader built one closure per call site
//! (`make_catalog_comparator`); this collapses that into a value the
//! checker can hold onto and reuse across a whole leaf scan.

use std::cmp::Ordering;

use crate::btree::catalog::parse_catalog_key;
use crate::codec::read_u16_be;
use crate::error::Result;
use crate::unicode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCompare {
    CatalogHfs,
    CatalogHfsPlus,
    CatalogHfsX,
    Extents,
    Attributes,
}

impl KeyCompare {
    /// Compare the keys embedded in two raw B-tree record slices.
    pub fn compare(&self, a: &[u8], b: &[u8]) -> Result<Ordering> {
        match self {
            KeyCompare::CatalogHfs => compare_catalog_hfs(a, b),
            KeyCompare::CatalogHfsPlus => compare_catalog_hfs_plus(a, b, false),
            KeyCompare::CatalogHfsX => compare_catalog_hfs_plus(a, b, true),
            KeyCompare::Extents | KeyCompare::Attributes => compare_lexicographic(a, b),
        }
    }
}

/// Extents/Attributes keys: `{keyLength:2, key bytes...}`. No case-folding
/// or field-aware comparison is defined for them; the on-disk order is a
/// plain byte-lexicographic order over the key bytes following the length.
fn compare_lexicographic(a: &[u8], b: &[u8]) -> Result<Ordering> {
    let a_len = read_u16_be(a, 0)? as usize;
    let b_len = read_u16_be(b, 0)? as usize;
    let a_key = &a[2..2 + a_len.min(a.len().saturating_sub(2))];
    let b_key = &b[2..2 + b_len.min(b.len().saturating_sub(2))];
    Ok(a_key.cmp(b_key))
}

fn compare_catalog_hfs_plus(a: &[u8], b: &[u8], binary: bool) -> Result<Ordering> {
    let (ka, _) = parse_catalog_key(a)?;
    let (kb, _) = parse_catalog_key(b)?;
    match ka.parent_id.cmp(&kb.parent_id) {
        Ordering::Equal => {}
        ord => return Ok(ord),
    }
    Ok(if binary {
        unicode::compare_binary(&ka.node_name, &kb.node_name)
    } else {
        unicode::compare_case_insensitive(&ka.node_name, &kb.node_name)
    })
}

/// Classic HFS catalog key: `{keyLength:1, reserved:1, parentID:4, nodeName:
/// pascal string up to 31 MacRoman bytes}`. Comparison is parentID first,
/// then the name case-folded over the ASCII subrange (the extended
/// MacRoman glyphs sort by raw byte value, which is what the classic
/// Finder's relative-string routine falls back to outside the accented
/// ranges it special-cases).
fn compare_catalog_hfs(a: &[u8], b: &[u8]) -> Result<Ordering> {
    let (pa, na) = parse_catalog_key_hfs(a)?;
    let (pb, nb) = parse_catalog_key_hfs(b)?;
    match pa.cmp(&pb) {
        Ordering::Equal => {}
        ord => return Ok(ord),
    }
    let fa: Vec<u8> = na.iter().map(|&c| c.to_ascii_uppercase()).collect();
    let fb: Vec<u8> = nb.iter().map(|&c| c.to_ascii_uppercase()).collect();
    Ok(fa.cmp(&fb))
}

fn parse_catalog_key_hfs(data: &[u8]) -> Result<(u32, Vec<u8>)> {
    use crate::error::HfsError;
    if data.len() < 7 {
        return Err(HfsError::InvalidBTree("classic catalog key too short".into()));
    }
    let parent_id = u32::from_be_bytes([data[2], data[3], data[4], data[5]]);
    let name_len = data[6] as usize;
    let start = 7;
    let end = start + name_len;
    if end > data.len() {
        return Err(HfsError::InvalidBTree("classic catalog key name truncated".into()));
    }
    Ok((parent_id, data[start..end].to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hfs_plus_key(parent: u32, name: &str) -> Vec<u8> {
        let utf16 = unicode::string_to_utf16(name);
        let mut buf = vec![0u8; 8 + utf16.len() * 2];
        let key_len = (6 + 2 + utf16.len() * 2) as u16;
        buf[0..2].copy_from_slice(&key_len.to_be_bytes());
        buf[2..6].copy_from_slice(&parent.to_be_bytes());
        buf[6..8].copy_from_slice(&(utf16.len() as u16).to_be_bytes());
        for (i, u) in utf16.iter().enumerate() {
            buf[8 + i * 2..10 + i * 2].copy_from_slice(&u.to_be_bytes());
        }
        buf
    }

    #[test]
    fn catalog_hfs_plus_orders_by_parent_then_name() {
        let a = hfs_plus_key(10, "alpha");
        let b = hfs_plus_key(10, "beta");
        assert_eq!(KeyCompare::CatalogHfsPlus.compare(&a, &b).unwrap(), Ordering::Less);
        let c = hfs_plus_key(11, "aaa");
        assert_eq!(KeyCompare::CatalogHfsPlus.compare(&a, &c).unwrap(), Ordering::Less);
    }

    #[test]
    fn catalog_hfs_plus_case_insensitive_equal() {
        let a = hfs_plus_key(10, "README");
        let b = hfs_plus_key(10, "readme");
        assert_eq!(KeyCompare::CatalogHfsPlus.compare(&a, &b).unwrap(), Ordering::Equal);
    }

    #[test]
    fn catalog_hfsx_is_binary() {
        let a = hfs_plus_key(10, "README");
        let b = hfs_plus_key(10, "readme");
        assert_ne!(KeyCompare::CatalogHfsX.compare(&a, &b).unwrap(), Ordering::Equal);
    }

    #[test]
    fn extents_lexicographic() {
        let mut a = vec![0u8; 10];
        a[0..2].copy_from_slice(&8u16.to_be_bytes());
        a[2..10].copy_from_slice(&[0, 0, 0, 1, 0, 0, 0, 0]);
        let mut b = a.clone();
        b[2..10].copy_from_slice(&[0, 0, 0, 2, 0, 0, 0, 0]);
        assert_eq!(KeyCompare::Extents.compare(&a, &b).unwrap(), Ordering::Less);
    }
}
