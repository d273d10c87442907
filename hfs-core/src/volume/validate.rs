//! Structural validation of a decoded volume header/MDB against the
//! invariants fsck's first phase checks: dirty bit, date sanity, free-block
//! accounting, reserved-CNID floor, and primary/alternate agreement.

use crate::codec::mac_to_posix;
use crate::error::Fault;
use crate::volume::header::VolumeHeader;

/// Bit 8 of `attributes`/`drAtrb`: volume was not unmounted cleanly.
pub const ATTR_VOLUME_UNMOUNTED: u32 = 1 << 8;
/// Bit 13 of `attributes`: volume has an active HFS+ journal.
pub const ATTR_VOLUME_JOURNALED: u32 = 1 << 13;
/// The lowest CNID the catalog B-tree may legally hand out to a new record.
pub const RESERVED_CNID_FLOOR: u32 = 16;

/// Run the header-level checks the spec assigns to fsck phase 1. Returns
/// every fault found; it is the caller's job to decide which to repair.
pub fn check_header(header: &VolumeHeader) -> Vec<Fault> {
    let mut faults = Vec::new();

    if header.attributes & ATTR_VOLUME_UNMOUNTED == 0 {
        faults.push(Fault::DirtyBit);
    }

    if !is_plausible_mac_time(header.checked_date) {
        faults.push(Fault::CheckedDateInvalid);
    }

    if header.free_blocks as u64 > header.total_blocks as u64 {
        faults.push(Fault::FreeBlocksExceedsTotal {
            free: header.free_blocks as u64,
            total: header.total_blocks as u64,
        });
    }

    if header.next_catalog_id < RESERVED_CNID_FLOOR && header.next_catalog_id != 0 {
        faults.push(Fault::NextCatalogIdTooLow(header.next_catalog_id));
    }

    faults
}

/// A Mac time is "plausible" if it does not predate the epoch overflow
/// wraparound boundary in a way that makes it earlier than the format's
/// own introduction — in practice, any value is representable, so this
/// only rejects the reserved sentinel of all-ones, which several real
/// disk images have been observed to carry instead of a valid date.
fn is_plausible_mac_time(t: u32) -> bool {
    if t == u32::MAX {
        return false;
    }
    mac_to_posix(t) >= 0
}

/// Compare the primary and alternate volume header for structural
/// agreement on the fields that must always match.
pub fn compare_alternate(primary: &VolumeHeader, alternate: &VolumeHeader) -> Option<Fault> {
    let matches = primary.signature == alternate.signature
        && primary.version == alternate.version
        && primary.total_blocks == alternate.total_blocks
        && primary.block_size == alternate.block_size
        && primary.catalog_file.logical_size == alternate.catalog_file.logical_size
        && primary.extents_file.logical_size == alternate.extents_file.logical_size;
    if matches {
        None
    } else {
        Some(Fault::AlternateDiverged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::header::ForkData;

    fn base_header() -> VolumeHeader {
        VolumeHeader {
            signature: crate::volume::header::HFS_PLUS_SIGNATURE,
            version: crate::volume::header::HFS_PLUS_VERSION,
            attributes: ATTR_VOLUME_UNMOUNTED,
            last_mounted_version: 0,
            journal_info_block: 0,
            create_date: 100,
            modify_date: 100,
            backup_date: 0,
            checked_date: 100,
            file_count: 0,
            folder_count: 0,
            block_size: 4096,
            total_blocks: 1000,
            free_blocks: 500,
            next_allocation: 0,
            rsrc_clump_size: 4096,
            data_clump_size: 4096,
            next_catalog_id: 16,
            write_count: 0,
            encoding_bitmap: 0,
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
    fn clean_header_has_no_faults() {
        assert!(check_header(&base_header()).is_empty());
    }

    #[test]
    fn dirty_bit_detected() {
        let mut h = base_header();
        h.attributes = 0;
        assert!(check_header(&h).contains(&Fault::DirtyBit));
    }

    #[test]
    fn free_exceeding_total_detected() {
        let mut h = base_header();
        h.free_blocks = 2000;
        assert!(check_header(&h)
            .iter()
            .any(|f| matches!(f, Fault::FreeBlocksExceedsTotal { .. })));
    }

    #[test]
    fn low_next_catalog_id_detected() {
        let mut h = base_header();
        h.next_catalog_id = 5;
        assert!(check_header(&h).contains(&Fault::NextCatalogIdTooLow(5)));
    }

    #[test]
    fn alternate_matching_headers_agree() {
        let h = base_header();
        assert!(compare_alternate(&h, &h.clone()).is_none());
    }

    #[test]
    fn alternate_mismatched_total_blocks_flagged() {
        let h = base_header();
        let mut alt = h.clone();
        alt.total_blocks += 1;
        assert_eq!(compare_alternate(&h, &alt), Some(Fault::AlternateDiverged));
    }
}
