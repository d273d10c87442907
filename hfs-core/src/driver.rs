//! Driver glue shared by the `mkfs`/`fsck`/`mount` entry points: program-name
//! dispatch, the partition-scanner seam, and the core-result-to-exit-code
//! mapping the CLI layer uses to pick `process::exit`'s argument.
//!
//! None of this talks to a terminal or parses flags — that's the CLI
//! layer's job. This module only answers "which filesystem does this
//! invocation mean" and "what process exit code does this result mean".

use crate::error::HfsError;
use crate::fsck::CheckReport;

/// Which on-disk format a program invocation is pinned to, derived from the
/// program's basename (or from an explicit `-t` flag overriding it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForcedFsType {
    Hfs,
    HfsPlus,
}

/// The three families of program this core backs, independent of which
/// specific basename (`mkfs.hfs+` vs `mkfs.hfsplus`) invoked it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramKind {
    Mkfs,
    Fsck,
    Mount,
}

/// The result of classifying `argv[0]`: which program family, and which
/// filesystem (if any) its name pins. A bare `fsck.hfs` pins `Hfs` but still
/// supports auto-delegation to the HFS+ personality on detecting a HFS+/HFSX
/// signature; the CLI layer implements that re-exec, this module only
/// reports what the name says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramName {
    pub kind: ProgramKind,
    pub forced: ForcedFsType,
}

/// Classify a program invocation by its basename (`argv[0]`'s final path
/// component, case-insensitive, trailing `.exe` ignored). Returns `None` for
/// a name this core doesn't recognize at all.
pub fn classify_program_name(argv0: &str) -> Option<ProgramName> {
    let base = argv0.rsplit(['/', '\\']).next().unwrap_or(argv0);
    let base = base.strip_suffix(".exe").unwrap_or(base).to_ascii_lowercase();

    let (kind, rest) = if let Some(r) = base.strip_prefix("mkfs.") {
        (ProgramKind::Mkfs, r)
    } else if let Some(r) = base.strip_prefix("fsck.") {
        (ProgramKind::Fsck, r)
    } else if let Some(r) = base.strip_prefix("mount.") {
        (ProgramKind::Mount, r)
    } else {
        return None;
    };

    let forced = match rest {
        "hfs" => ForcedFsType::Hfs,
        "hfs+" | "hfsplus" => ForcedFsType::HfsPlus,
        _ => return None,
    };

    Some(ProgramName { kind, forced })
}

/// External collaborator seam for partition-map probing: this core has no
/// partition-table parser of its own, and takes one on trust from whatever
/// the platform provides.
///
/// `scan` returns `-1` if the device is not partitioned (whole-device use is
/// fine), `0` if it is partitioned but the caller must still name which
/// partition, or `n > 0` for the number of partitions found.
pub trait PartitionScanner {
    fn scan(&mut self, device_path: &str) -> std::io::Result<i32>;
}

/// A scanner that always reports "not partitioned" — used when the CLI is
/// invoked with a partition number already given, or in tests that don't
/// care about partition maps.
pub struct NoPartitionScanner;
impl PartitionScanner for NoPartitionScanner {
    fn scan(&mut self, _device_path: &str) -> std::io::Result<i32> {
        Ok(-1)
    }
}

/// Resolve which partition (if any) an operation should target, given what
/// the scanner reports and what the user named on the command line.
/// `force` bypasses the "whole device on a partitioned medium" refusal.
pub fn resolve_partition_target(
    scan_result: i32,
    requested: Option<u32>,
    force: bool,
) -> crate::error::Result<Option<u32>> {
    match scan_result {
        n if n < 0 => Ok(requested),
        0 => match requested {
            Some(p) => Ok(Some(p)),
            None => Err(HfsError::AmbiguousPartition(0)),
        },
        n => match requested {
            Some(p) => Ok(Some(p)),
            None if n == 1 => Ok(Some(0)),
            None if force => Ok(None),
            None => Err(HfsError::AmbiguousPartition(n as u32)),
        },
    }
}

/// `mkfs.hfs*` exit codes, per the command-line surface's contract: 0
/// success; 1 general; 2 usage; 4 operational; 8 system.
pub fn mkfs_exit_code(result: &crate::error::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => match e {
            HfsError::Usage(_) | HfsError::AmbiguousPartition(_) => 2,
            HfsError::Io(_) | HfsError::IoTruncated { .. } => 8,
            HfsError::DeviceBusy | HfsError::DeviceOccupied | HfsError::PermissionDenied => 8,
            HfsError::Cancelled => 32,
            _ => 1,
        },
    }
}

/// `fsck.hfs*` exit codes: 0 clean; 1 repaired; 2 reboot-required (never
/// produced by this core, reserved by contract); 4 uncorrected; 8
/// operational; 16 usage; 32 cancelled; 128 library.
pub fn fsck_exit_code(result: &crate::error::Result<CheckReport>) -> i32 {
    match result {
        Ok(report) => {
            if report.is_clean() {
                0
            } else if report.corrected_count() == report.found_count() {
                1
            } else {
                4
            }
        }
        Err(e) => match e {
            HfsError::Usage(_) | HfsError::AmbiguousPartition(_) => 16,
            HfsError::Cancelled => 32,
            HfsError::Io(_) | HfsError::IoTruncated { .. } => 8,
            HfsError::DeviceBusy | HfsError::DeviceOccupied | HfsError::PermissionDenied => 8,
            HfsError::Malformed(_) | HfsError::Critical(_) | HfsError::InvalidSignature(_) => 8,
            _ => 128,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_mkfs_names() {
        assert_eq!(
            classify_program_name("mkfs.hfs"),
            Some(ProgramName { kind: ProgramKind::Mkfs, forced: ForcedFsType::Hfs })
        );
        assert_eq!(
            classify_program_name("/sbin/mkfs.hfsplus"),
            Some(ProgramName { kind: ProgramKind::Mkfs, forced: ForcedFsType::HfsPlus })
        );
        assert_eq!(
            classify_program_name("mkfs.hfs+"),
            Some(ProgramName { kind: ProgramKind::Mkfs, forced: ForcedFsType::HfsPlus })
        );
    }

    #[test]
    fn recognizes_fsck_and_mount_names() {
        assert_eq!(
            classify_program_name("fsck.hfs"),
            Some(ProgramName { kind: ProgramKind::Fsck, forced: ForcedFsType::Hfs })
        );
        assert_eq!(
            classify_program_name("MOUNT.HFS+.EXE"),
            Some(ProgramName { kind: ProgramKind::Mount, forced: ForcedFsType::HfsPlus })
        );
    }

    #[test]
    fn unrecognized_name_is_none() {
        assert_eq!(classify_program_name("ls"), None);
        assert_eq!(classify_program_name("mkfs.ext4"), None);
    }

    #[test]
    fn partition_resolution_matches_contract() {
        assert_eq!(resolve_partition_target(-1, None, false).unwrap(), None);
        assert!(resolve_partition_target(0, None, false).is_err());
        assert_eq!(resolve_partition_target(0, Some(1), false).unwrap(), Some(1));
        assert_eq!(resolve_partition_target(1, None, false).unwrap(), Some(0));
        assert!(resolve_partition_target(3, None, false).is_err());
        assert_eq!(resolve_partition_target(3, None, true).unwrap(), None);
    }

    #[test]
    fn mkfs_exit_codes() {
        assert_eq!(mkfs_exit_code(&Ok(())), 0);
        assert_eq!(mkfs_exit_code(&Err(HfsError::Usage("too small".into()))), 2);
        assert_eq!(mkfs_exit_code(&Err(HfsError::DeviceBusy)), 8);
        assert_eq!(mkfs_exit_code(&Err(HfsError::Cancelled)), 32);
    }

    #[test]
    fn fsck_exit_codes() {
        let clean = CheckReport::default();
        assert_eq!(fsck_exit_code(&Ok(clean)), 0);

        let mut repaired = CheckReport::default();
        repaired.faults.push(crate::fsck::FaultReport {
            phase: "header",
            fault: crate::error::Fault::DirtyBit,
            corrected: true,
        });
        assert_eq!(fsck_exit_code(&Ok(repaired)), 1);

        let mut uncorrected = CheckReport::default();
        uncorrected.faults.push(crate::fsck::FaultReport {
            phase: "header",
            fault: crate::error::Fault::DirtyBit,
            corrected: false,
        });
        assert_eq!(fsck_exit_code(&Ok(uncorrected)), 4);

        assert_eq!(fsck_exit_code(&Err(HfsError::Usage("bad flag".into()))), 16);
        assert_eq!(fsck_exit_code(&Err(HfsError::Cancelled)), 32);
    }
}
