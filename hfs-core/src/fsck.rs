//! Checker/repair: the six-phase fsck pipeline, run against an already-open
//! device. Each phase collects faults; whether a fault is
//! applied or merely reported depends on `CheckOptions` and the caller's
//! `Ask` implementation, mirroring the interactive confirm-or-skip loop a
//! real `fsck.hfs+` runs at a terminal.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::bitmap::{count_mismatch, AllocationBitmap};
use crate::btree::{self, validate_leaf_order, BTreeHeaderRecord, KeyCompare};
use crate::codec::safe_mac_time_now;
use crate::config::CheckOptions;
use crate::error::{Fault, HfsError, Result};
use crate::journal::{self, JournalHeader, JournalInfoBlock, JOURNAL_NEED_INIT, JOURNAL_ON_OTHER_DEVICE};
use crate::volume::header::alternate_header_offset;
use crate::volume::validate::{check_header, compare_alternate, ATTR_VOLUME_JOURNALED, ATTR_VOLUME_UNMOUNTED};
use crate::volume::{MasterDirectoryBlock, VolumeHeader};

/// Interactive confirmation seam: the CLI implements this over a terminal
/// prompt, tests implement it as a fixed answer. Kept as a trait rather
/// than a plain closure so a stateful implementation (e.g. one that
/// records every question asked) is just as easy to write.
pub trait Ask {
    fn ask(&mut self, question: &str) -> bool;
}

/// Always answers "yes" — used for `-y`/`-a`/`-p`.
pub struct AlwaysYes;
impl Ask for AlwaysYes {
    fn ask(&mut self, _question: &str) -> bool {
        true
    }
}

/// Always answers "no" — used for `-n` (report only, never repair).
pub struct AlwaysNo;
impl Ask for AlwaysNo {
    fn ask(&mut self, _question: &str) -> bool {
        false
    }
}

/// One fault observed during a check, tagged with the phase that found it
/// and whether it was actually corrected.
#[derive(Debug, Clone)]
pub struct FaultReport {
    pub phase: &'static str,
    pub fault: Fault,
    pub corrected: bool,
}

/// The outcome of a full check run: every fault seen, and the
/// `(found, corrected)` tally the driver's exit-code mapping uses.
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub faults: Vec<FaultReport>,
    pub journal_replayed: u32,
}

impl CheckReport {
    pub fn found_count(&self) -> u64 {
        self.faults.len() as u64
    }

    pub fn corrected_count(&self) -> u64 {
        self.faults.iter().filter(|f| f.corrected).count() as u64
    }

    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }

    fn record(&mut self, phase: &'static str, fault: Fault, corrected: bool) {
        self.faults.push(FaultReport { phase, fault, corrected });
    }
}

/// Decide whether a repairable fault gets fixed: `auto_repair` and not
/// `read_only` short-circuits to yes-if-`assume_yes`, otherwise the
/// question is put to `ask`.
fn should_repair(options: &CheckOptions, ask: &mut dyn Ask, question: &str) -> bool {
    if options.read_only {
        return false;
    }
    if !options.auto_repair {
        return false;
    }
    if options.assume_yes {
        return true;
    }
    ask.ask(question)
}

/// Run the full fsck pipeline against an HFS+/HFSX volume.
pub fn check_hfs_plus<D: Read + Write + Seek>(
    device: &mut D,
    options: &CheckOptions,
    ask: &mut dyn Ask,
    now_posix: i64,
) -> Result<CheckReport> {
    let mut report = CheckReport::default();
    let volume_bytes = device_len(device)?;

    // Phase 1: volume header.
    let mut header = phase1_header(device, volume_bytes, options, ask, now_posix, &mut report)?;

    // Phase 2: journal replay, before anything else trusts the volume's
    // structures — a pending transaction can rewrite exactly the blocks
    // phases 3-6 are about to validate.
    if header.attributes & ATTR_VOLUME_JOURNALED != 0 {
        phase2_journal(device, &mut header, options, ask, &mut report)?;
    }

    // Phase 3: allocation bitmap.
    phase3_bitmap_hfs_plus(device, &mut header, options, ask, &mut report)?;

    // Phase 4: Extents Overflow B-tree.
    let extents_header = btree::read_btree_header(device, &header.extents_file, header.block_size)?;
    phase4_5_btree(
        device,
        &extents_header,
        KeyCompare::Extents,
        "extents",
        options,
        ask,
        &mut report,
    )?;

    // Phase 5: Catalog B-tree.
    let catalog_compare = if header.is_hfsx { KeyCompare::CatalogHfsX } else { KeyCompare::CatalogHfsPlus };
    let catalog_header = btree::read_btree_header(device, &header.catalog_file, header.block_size)?;
    phase4_5_btree(device, &catalog_header, catalog_compare, "catalog", options, ask, &mut report)?;
    phase5_catalog_records(device, &catalog_header, &mut header, options, ask, &mut report)?;

    // Phase 6: Attributes B-tree, if present.
    if header.attributes_file.logical_size > 0 {
        let attrs_header = btree::read_btree_header(device, &header.attributes_file, header.block_size)?;
        phase4_5_btree(device, &attrs_header, KeyCompare::Attributes, "attributes", options, ask, &mut report)?;
    }

    if !options.read_only && report.corrected_count() > 0 {
        header.write(device, volume_bytes)?;
        device.flush().ok();
    }

    Ok(report)
}

/// Run the fsck pipeline against a classic HFS volume. Scope matches the
/// core's classic-HFS support: header faults and bitmap accounting; the
/// catalog/extents B-trees use the same engine as HFS+ since the on-disk
/// node/header shape is identical, only the key family differs.
pub fn check_hfs<D: Read + Write + Seek>(
    device: &mut D,
    options: &CheckOptions,
    ask: &mut dyn Ask,
    now_posix: i64,
) -> Result<CheckReport> {
    let mut report = CheckReport::default();
    let volume_bytes = device_len(device)?;

    device.seek(SeekFrom::Start(0))?;
    let mut mdb = MasterDirectoryBlock::parse(device)?;

    if mdb.attributes & ATTR_VOLUME_UNMOUNTED as u16 == 0 {
        let corrected = maybe_repair(&mut report, "header", Fault::DirtyBit, options, ask, "mark volume as cleanly unmounted?");
        if corrected {
            mdb.attributes |= ATTR_VOLUME_UNMOUNTED as u16;
        }
    }
    if mdb.free_blocks > mdb.total_blocks {
        let fault = Fault::FreeBlocksExceedsTotal { free: mdb.free_blocks as u64, total: mdb.total_blocks as u64 };
        let corrected = maybe_repair(&mut report, "header", fault, options, ask, "correct free block count?");
        if corrected {
            mdb.free_blocks = 0;
        }
    }
    if mdb.next_catalog_id < 16 && mdb.next_catalog_id != 0 {
        let fault = Fault::NextCatalogIdTooLow(mdb.next_catalog_id);
        let corrected = maybe_repair(&mut report, "header", fault, options, ask, "raise nextCatalogID to 16?");
        if corrected {
            mdb.next_catalog_id = 16;
        }
    }

    let alt_offset = alternate_header_offset(volume_bytes);
    device.seek(SeekFrom::Start(alt_offset))?;
    let mut alt_buf = vec![0u8; crate::volume::mdb::MDB_SIZE];
    device.read_exact(&mut alt_buf)?;
    if let Ok(alt) = MasterDirectoryBlock::decode(&alt_buf) {
        if alt.total_blocks != mdb.total_blocks || alt.block_size != mdb.block_size {
            let corrected =
                maybe_repair(&mut report, "header", Fault::AlternateDiverged, options, ask, "restore alternate MDB from primary?");
            if corrected {
                mdb.write(device, volume_bytes)?;
            }
        }
    } else {
        let corrected =
            maybe_repair(&mut report, "header", Fault::AlternateDiverged, options, ask, "restore alternate MDB from primary?");
        if corrected {
            mdb.write(device, volume_bytes)?;
        }
    }

    let (now_mac, _) = safe_mac_time_now(now_posix);
    if !options.read_only && report.corrected_count() > 0 {
        // Record the check but do not fabricate a checkedDate field for
        // classic HFS the way HFS+ does — the MDB carries none.
        let _ = now_mac;
        mdb.write(device, volume_bytes)?;
    }

    Ok(report)
}

fn maybe_repair(
    report: &mut CheckReport,
    phase: &'static str,
    fault: Fault,
    options: &CheckOptions,
    ask: &mut dyn Ask,
    question: &str,
) -> bool {
    let corrected = should_repair(options, ask, question);
    report.record(phase, fault, corrected);
    corrected
}

fn device_len<D: Seek>(device: &mut D) -> Result<u64> {
    Ok(device.seek(SeekFrom::End(0))?)
}

fn phase1_header<D: Read + Write + Seek>(
    device: &mut D,
    volume_bytes: u64,
    options: &CheckOptions,
    ask: &mut dyn Ask,
    now_posix: i64,
    report: &mut CheckReport,
) -> Result<VolumeHeader> {
    let primary = VolumeHeader::parse(device);
    let alt_offset = alternate_header_offset(volume_bytes);

    let mut header = match primary {
        Ok(h) => h,
        Err(e @ (HfsError::InvalidSignature(_) | HfsError::UnsupportedVersion(_))) => {
            let alt = VolumeHeader::parse_at(device, alt_offset)?;
            let corrected = maybe_repair(
                report,
                "header",
                Fault::AlternateDiverged,
                options,
                ask,
                "primary volume header is unreadable; restore it from the alternate?",
            );
            if !corrected {
                return Err(e);
            }
            alt
        }
        Err(e) => return Err(e),
    };

    for fault in check_header(&header) {
        let (question, apply): (&str, fn(&mut VolumeHeader)) = match &fault {
            Fault::DirtyBit => ("mark volume as cleanly unmounted?", |h| h.attributes |= ATTR_VOLUME_UNMOUNTED),
            Fault::CheckedDateInvalid => ("set checkedDate to now?", |_| {}),
            Fault::FreeBlocksExceedsTotal { .. } => ("correct free block count?", |h| h.free_blocks = 0),
            Fault::NextCatalogIdTooLow(_) => ("raise nextCatalogID to 16?", |h| h.next_catalog_id = 16),
            _ => ("apply repair?", |_| {}),
        };
        let corrected = maybe_repair(report, "header", fault.clone(), options, ask, question);
        if corrected {
            apply(&mut header);
            if matches!(fault, Fault::CheckedDateInvalid) {
                let (now_mac, _) = safe_mac_time_now(now_posix);
                header.checked_date = now_mac;
            }
        }
    }

    match VolumeHeader::parse_at(device, alt_offset) {
        Ok(alt) => {
            if let Some(fault) = compare_alternate(&header, &alt) {
                let corrected =
                    maybe_repair(report, "header", fault, options, ask, "alternate volume header diverged; restore it from the primary?");
                // write() below re-synchronizes both copies unconditionally once
                // any correction has been applied this run, so nothing further
                // is needed here beyond recording the fault and intent.
                let _ = corrected;
            }
        }
        Err(_) => {
            // The alternate doesn't even decode (zeroed, truncated, garbage);
            // that's the divergence.
            maybe_repair(report, "header", Fault::AlternateDiverged, options, ask, "alternate volume header is unreadable; restore it from the primary?");
        }
    }

    Ok(header)
}

fn phase2_journal<D: Read + Write + Seek>(
    device: &mut D,
    header: &mut VolumeHeader,
    options: &CheckOptions,
    ask: &mut dyn Ask,
    report: &mut CheckReport,
) -> Result<()> {
    let jib_offset = header.journal_info_block as u64 * header.block_size as u64;
    let mut jib_buf = vec![0u8; 52];
    device.seek(SeekFrom::Start(jib_offset))?;
    device.read_exact(&mut jib_buf)?;
    let info = match JournalInfoBlock::decode(&jib_buf) {
        Ok(i) => i,
        Err(_) => {
            let corrected = maybe_repair(report, "journal", Fault::JournalDisabled, options, ask, "journal info block is unreadable; disable journaling?");
            if corrected {
                header.attributes &= !ATTR_VOLUME_JOURNALED;
            }
            return Ok(());
        }
    };

    if info.flags & JOURNAL_ON_OTHER_DEVICE != 0 {
        return Err(HfsError::JournalUnsupported("journal lives on another device".into()));
    }
    if info.flags & JOURNAL_NEED_INIT != 0 {
        // Nothing to replay; the journal is simply not usable yet.
        return Ok(());
    }

    let mut jh_buf = vec![0u8; journal::JOURNAL_HEADER_SIZE];
    // The journal header lives at `info.offset` from the start of the
    // volume, not relative to the info block.
    device.seek(SeekFrom::Start(info.offset))?;
    device.read_exact(&mut jh_buf)?;

    let mut jheader = match JournalHeader::decode(&jh_buf) {
        Ok(h) if h.magic == journal::JOURNAL_HEADER_MAGIC && h.endian == journal::JOURNAL_HEADER_ENDIAN => h,
        _ => {
            let corrected = maybe_repair(
                report,
                "journal",
                Fault::JournalDisabled,
                options,
                ask,
                "journal header is corrupt; disable journaling so the volume can mount without replay?",
            );
            if corrected {
                header.attributes &= !ATTR_VOLUME_JOURNALED;
                mark_needs_init(device, jib_offset, &info)?;
            }
            return Ok(());
        }
    };

    if header.attributes & ATTR_VOLUME_UNMOUNTED == 0 {
        // Payload writes (and the cursor commit) only happen when this run
        // is actually allowed to repair; a `-n` dry run walks the same
        // transactions purely to surface `JournalCorrupt`.
        let write_back = !options.read_only;
        match journal::replay(device, &info, &mut jheader, header.block_size, write_back) {
            Ok(n) => {
                report.journal_replayed = n;
                if n > 0 && write_back {
                    device.seek(SeekFrom::Start(info.offset))?;
                    device.write_all(&jheader.encode())?;
                    device.flush().ok();
                }
            }
            Err(_) => {
                let corrected = maybe_repair(
                    report,
                    "journal",
                    Fault::JournalDisabled,
                    options,
                    ask,
                    "journal replay failed a checksum check; disable journaling?",
                );
                if corrected {
                    header.attributes &= !ATTR_VOLUME_JOURNALED;
                    mark_needs_init(device, jib_offset, &info)?;
                }
            }
        }
    }

    Ok(())
}

fn mark_needs_init<D: Write + Seek>(device: &mut D, jib_offset: u64, info: &JournalInfoBlock) -> Result<()> {
    let mut patched = info.clone();
    patched.flags |= JOURNAL_NEED_INIT;
    device.seek(SeekFrom::Start(jib_offset))?;
    device.write_all(&patched.encode())?;
    Ok(())
}

fn phase3_bitmap_hfs_plus<D: Read + Write + Seek>(
    device: &mut D,
    header: &mut VolumeHeader,
    options: &CheckOptions,
    ask: &mut dyn Ask,
    report: &mut CheckReport,
) -> Result<()> {
    let bitmap = read_allocation_bitmap(device, header)?;

    if let Some((counted, expected)) = count_mismatch(&bitmap, header.total_blocks as u64, header.free_blocks as u64) {
        let fault = Fault::BitmapMismatch { counted, expected };
        let corrected = maybe_repair(report, "bitmap", fault, options, ask, "correct freeBlocks to match the allocation bitmap?");
        if corrected {
            header.free_blocks = (header.total_blocks as u64 - counted).min(header.total_blocks as u64) as u32;
        }
    }

    for (name, fork) in [
        ("allocation", &header.allocation_file),
        ("extents", &header.extents_file),
        ("catalog", &header.catalog_file),
        ("attributes", &header.attributes_file),
        ("startup", &header.startup_file),
    ] {
        for extent in fork.extents.iter().filter(|e| e.block_count > 0) {
            let end = extent.start_block as u64 + extent.block_count as u64;
            if end > header.total_blocks as u64 {
                report.record(
                    "bitmap",
                    Fault::SystemFileExtentOutOfRange {
                        file: name,
                        start: extent.start_block,
                        count: extent.block_count,
                        total: header.total_blocks,
                    },
                    false,
                );
            }
        }
    }

    Ok(())
}

fn read_allocation_bitmap<D: Read + Seek>(device: &mut D, header: &VolumeHeader) -> Result<AllocationBitmap> {
    let bytes = crate::bitmap::bitmap_byte_size(header.total_blocks) as u64;
    let mut buf = vec![0u8; bytes as usize];
    let offset = btree::compute_fork_offset(&header.allocation_file, header.block_size, 0)?;
    device.seek(SeekFrom::Start(offset))?;
    device.read_exact(&mut buf)?;
    Ok(AllocationBitmap::from_bytes(buf, header.total_blocks))
}

fn phase4_5_btree<D: Read + Write + Seek>(
    device: &mut D,
    btree_header: &BTreeHeaderRecord,
    compare: KeyCompare,
    label: &'static str,
    options: &CheckOptions,
    ask: &mut dyn Ask,
    report: &mut CheckReport,
) -> Result<()> {
    if btree_header.root_node == 0 && btree_header.total_nodes <= 1 {
        // Freshly-formatted, empty extents/attributes tree: nothing to walk.
        return Ok(());
    }

    for (field, value) in [
        ("rootNode", btree_header.root_node),
        ("firstLeafNode", btree_header.first_leaf_node),
        ("lastLeafNode", btree_header.last_leaf_node),
    ] {
        if value >= btree_header.total_nodes {
            let fault = Fault::BTreePointerOutOfRange { field, value, total: btree_header.total_nodes };
            maybe_repair(report, label, fault, options, ask, &format!("clamp B-tree {field} into range?"));
        }
    }

    let header_node = btree::read_node(device, btree_header, 0)?;
    if header_node.descriptor.num_records >= 3 {
        let map_bytes = header_node.record_data(2)?;
        let counted_used = btree::count_allocated_nodes(map_bytes, btree_header.total_nodes);
        let counted_free = btree_header.total_nodes.saturating_sub(counted_used);
        if counted_free != btree_header.free_nodes {
            let fault = Fault::BTreeFreeNodesMismatch { counted: counted_free, expected: btree_header.free_nodes };
            maybe_repair(report, label, fault, options, ask, "correct B-tree freeNodes to match the allocation map?");
        }
    }

    if btree_header.total_nodes > 0 {
        let measured = btree_header.fork.logical_size / btree_header.total_nodes as u64;
        if measured != btree_header.node_size as u64 {
            let fault = Fault::BTreeNodeSizeMismatch { declared: btree_header.node_size, measured: measured as u16 };
            maybe_repair(report, label, fault, options, ask, "recompute B-tree nodeSize from the fork's logical size?");
        }
    }

    if btree_header.root_node != 0 {
        let (_count, in_order, cyclic) = validate_leaf_order(device, btree_header, |a, b| compare.compare(a, b))?;
        if cyclic {
            report.record(label, Fault::BTreeCyclic, false);
        } else if !in_order {
            report.record(label, Fault::BTreeKeysOutOfOrder, false);
        }
    }

    Ok(())
}

fn phase5_catalog_records<D: Read + Seek>(
    device: &mut D,
    catalog_header: &BTreeHeaderRecord,
    header: &mut VolumeHeader,
    options: &CheckOptions,
    ask: &mut dyn Ask,
    report: &mut CheckReport,
) -> Result<()> {
    if catalog_header.root_node == 0 {
        return Ok(());
    }

    let mut file_count = 0u64;
    let mut folder_count = 0u64;
    let mut node_num = catalog_header.first_leaf_node;
    let mut steps = 0u32;

    while node_num != 0 {
        steps += 1;
        if steps > catalog_header.total_nodes.max(1) {
            break;
        }
        let node = btree::read_node(device, catalog_header, node_num)?;
        for i in 0..node.descriptor.num_records as usize {
            let data = node.record_data(i)?;
            if let Ok((key, record_type)) = btree::catalog_key_and_type(data) {
                if let Err(fault) = btree::validate_parent_id(key.parent_id) {
                    report.record("catalog", fault, false);
                }
                if let Err(fault) = btree::validate_node_name(key.parent_id, &key.node_name) {
                    report.record("catalog", fault, false);
                }
                match btree::validate_record_type(record_type) {
                    Ok(()) => match record_type {
                        btree::RECORD_TYPE_FOLDER => folder_count += 1,
                        btree::RECORD_TYPE_FILE => file_count += 1,
                        _ => {}
                    },
                    Err(fault) => report.record("catalog", fault, false),
                }
            }
        }
        node_num = node.descriptor.forward_link;
    }

    if file_count != header.file_count as u64 {
        let fault = Fault::RecordCountMismatch { kind: "file", counted: file_count, expected: header.file_count as u64 };
        let corrected = maybe_repair(report, "catalog", fault, options, ask, "correct fileCount to match the catalog?");
        if corrected {
            header.file_count = file_count as u32;
        }
    }
    if folder_count != header.folder_count as u64 {
        let fault = Fault::RecordCountMismatch { kind: "folder", counted: folder_count, expected: header.folder_count as u64 };
        let corrected = maybe_repair(report, "catalog", fault, options, ask, "correct folderCount to match the catalog?");
        if corrected {
            header.folder_count = folder_count as u32;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mkfs::{format_hfs, format_hfs_plus};
    use std::io::Cursor;

    fn formatted_hfs_plus(size: u64) -> Cursor<Vec<u8>> {
        let mut dev = Cursor::new(vec![0u8; size as usize]);
        let options = crate::config::FormatOptions { volume_name: "Test".into(), ..Default::default() };
        format_hfs_plus(&mut dev, size, 1_700_000_000, &options).unwrap();
        dev
    }

    #[test]
    fn freshly_formatted_volume_is_clean() {
        let mut dev = formatted_hfs_plus(64 * 1024 * 1024);
        let options = CheckOptions::default();
        let mut ask = AlwaysYes;
        let report = check_hfs_plus(&mut dev, &options, &mut ask, 1_700_000_100).unwrap();
        assert!(report.is_clean(), "unexpected faults: {:?}", report.faults);
    }

    #[test]
    fn dirty_bit_is_detected_and_repaired() {
        let mut dev = formatted_hfs_plus(64 * 1024 * 1024);
        let mut header = VolumeHeader::parse(&mut dev).unwrap();
        header.attributes &= !ATTR_VOLUME_UNMOUNTED;
        header.write(&mut dev, 64 * 1024 * 1024).unwrap();

        let options = CheckOptions::default();
        let mut ask = AlwaysYes;
        let report = check_hfs_plus(&mut dev, &options, &mut ask, 1_700_000_100).unwrap();
        assert!(report.faults.iter().any(|f| f.fault == Fault::DirtyBit && f.corrected));

        dev.set_position(0);
        let reparsed = VolumeHeader::parse(&mut dev).unwrap();
        assert_ne!(reparsed.attributes & ATTR_VOLUME_UNMOUNTED, 0);
    }

    #[test]
    fn read_only_mode_never_repairs() {
        let mut dev = formatted_hfs_plus(64 * 1024 * 1024);
        let mut header = VolumeHeader::parse(&mut dev).unwrap();
        header.attributes &= !ATTR_VOLUME_UNMOUNTED;
        header.write(&mut dev, 64 * 1024 * 1024).unwrap();

        let options = CheckOptions { read_only: true, ..Default::default() };
        let mut ask = AlwaysYes;
        let report = check_hfs_plus(&mut dev, &options, &mut ask, 1_700_000_100).unwrap();
        assert!(report.faults.iter().any(|f| f.fault == Fault::DirtyBit && !f.corrected));

        dev.set_position(0);
        let reparsed = VolumeHeader::parse(&mut dev).unwrap();
        assert_eq!(reparsed.attributes & ATTR_VOLUME_UNMOUNTED, 0);
    }

    #[test]
    fn divergent_alternate_is_repaired() {
        let size = 64 * 1024 * 1024u64;
        let mut dev = formatted_hfs_plus(size);
        let zeros = vec![0u8; 512];
        dev.set_position(alternate_header_offset(size));
        std::io::Write::write_all(&mut dev, &zeros).unwrap();

        let options = CheckOptions::default();
        let mut ask = AlwaysYes;
        let report = check_hfs_plus(&mut dev, &options, &mut ask, 1_700_000_100).unwrap();
        assert!(report.faults.iter().any(|f| f.fault == Fault::AlternateDiverged));

        dev.set_position(alternate_header_offset(size));
        let mut buf = [0u8; 2];
        std::io::Read::read_exact(&mut dev, &mut buf).unwrap();
        assert_eq!(u16::from_be_bytes(buf), crate::volume::HFS_PLUS_SIGNATURE);
    }

    #[test]
    fn classic_hfs_volume_checks_clean() {
        let size = 4u64 * 1024 * 1024;
        let mut dev = Cursor::new(vec![0u8; size as usize]);
        let options = crate::config::FormatOptions { volume_name: "Floppy".into(), use_hfs_plus: false, ..Default::default() };
        format_hfs(&mut dev, size, 1_700_000_000, &options).unwrap();

        let check_options = CheckOptions::default();
        let mut ask = AlwaysYes;
        let report = check_hfs(&mut dev, &check_options, &mut ask, 1_700_000_100).unwrap();
        assert!(report.faults.iter().all(|f| f.fault != Fault::DirtyBit));
    }
}
