use thiserror::Error;

/// A single structural fault found while decoding or checking a volume.
///
/// Repairable faults are first-class data rather than "errors that were
/// handled": a checker collects them and either applies the fix or reports
/// it, depending on the caller's repair policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Volume header / MDB dirty bit was set (unmounted uncleanly).
    DirtyBit,
    /// `checkedDate` lies outside the representable Mac time range.
    CheckedDateInvalid,
    /// `freeBlocks`/`drFreeBks` exceeds the volume's total block count.
    FreeBlocksExceedsTotal { free: u64, total: u64 },
    /// `nextCatalogID`/`drNxtCNID` is below the reserved range floor (16).
    NextCatalogIdTooLow(u32),
    /// The alternate volume structure does not mirror the primary.
    AlternateDiverged,
    /// Allocation bitmap set-bit count disagrees with `total - free`.
    BitmapMismatch { counted: u64, expected: u64 },
    /// A catalog/extents/attributes record count disagrees with the header.
    RecordCountMismatch { kind: &'static str, counted: u64, expected: u64 },
    /// B-tree header pointer (`rootNode`/`firstLeafNode`/`lastLeafNode`) is
    /// out of `[0, totalNodes)`.
    BTreePointerOutOfRange { field: &'static str, value: u32, total: u32 },
    /// B-tree header's `freeNodes` disagrees with the node allocation map.
    BTreeFreeNodesMismatch { counted: u32, expected: u32 },
    /// B-tree header's `nodeSize` disagrees with the measured fork block size.
    BTreeNodeSizeMismatch { declared: u16, measured: u16 },
    /// A node's `kind` byte is not one of the four legal values.
    BTreeNodeKindInvalid { node: u32, kind: u8 },
    /// Leaf keys were found out of strictly increasing order.
    BTreeKeysOutOfOrder,
    /// The leaf chain's forward links loop back on themselves.
    BTreeCyclic,
    /// A system file's extent runs outside `[0, totalBlocks)`.
    SystemFileExtentOutOfRange { file: &'static str, start: u32, count: u32, total: u32 },
    /// A catalog record's `recordType` is not folder/file/folder-thread/file-thread.
    CatalogRecordTypeInvalid(u16),
    /// A catalog record's `parentID` is not >= 1.
    CatalogParentIdInvalid(u32),
    /// A catalog key's `nodeName` contains an unpaired surrogate or an
    /// embedded NUL.
    CatalogNameInvalid(u32),
    /// The journal is corrupt and was (or would be) disabled.
    JournalDisabled,
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fault::DirtyBit => write!(f, "volume not unmounted cleanly"),
            Fault::CheckedDateInvalid => write!(f, "checkedDate out of valid range"),
            Fault::FreeBlocksExceedsTotal { free, total } => {
                write!(f, "free blocks {free} exceeds total blocks {total}")
            }
            Fault::NextCatalogIdTooLow(v) => {
                write!(f, "nextCatalogID {v} is below the reserved floor of 16")
            }
            Fault::AlternateDiverged => write!(f, "alternate volume structure diverged from primary"),
            Fault::BitmapMismatch { counted, expected } => write!(
                f,
                "allocation bitmap has {counted} blocks in use, header says {expected}"
            ),
            Fault::RecordCountMismatch { kind, counted, expected } => write!(
                f,
                "{kind} count mismatch: counted {counted}, header says {expected}"
            ),
            Fault::BTreePointerOutOfRange { field, value, total } => {
                write!(f, "B-tree {field} {value} is out of range [0, {total})")
            }
            Fault::BTreeFreeNodesMismatch { counted, expected } => write!(
                f,
                "B-tree freeNodes mismatch: map says {counted} free, header says {expected}"
            ),
            Fault::BTreeNodeSizeMismatch { declared, measured } => write!(
                f,
                "B-tree nodeSize {declared} disagrees with measured block size {measured}"
            ),
            Fault::BTreeNodeKindInvalid { node, kind } => {
                write!(f, "node {node} has invalid kind byte 0x{kind:02X}")
            }
            Fault::BTreeKeysOutOfOrder => write!(f, "keys out of order"),
            Fault::BTreeCyclic => write!(f, "leaf chain forward links form a cycle"),
            Fault::SystemFileExtentOutOfRange { file, start, count, total } => write!(
                f,
                "{file} extent [{start}, {}) lies outside [0, {total})",
                *start as u64 + *count as u64
            ),
            Fault::CatalogRecordTypeInvalid(t) => {
                write!(f, "unknown catalog record type 0x{t:04X}")
            }
            Fault::CatalogParentIdInvalid(id) => write!(f, "invalid parentID {id}"),
            Fault::CatalogNameInvalid(parent) => {
                write!(f, "catalog record under parentID {parent} has a malformed nodeName")
            }
            Fault::JournalDisabled => write!(f, "journal disabled due to corruption"),
        }
    }
}

/// The closed set of error kinds the core surfaces. Structural and I/O
/// errors propagate immediately from the engine to the driver; repairable
/// faults are collected by the checker instead of being raised here.
#[derive(Error, Debug)]
pub enum HfsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("short transfer: expected {expected} bytes, got {actual}")]
    IoTruncated { expected: usize, actual: usize },

    #[error("offset {offset} out of range for buffer of length {len}")]
    OutOfRange { offset: u64, len: u64 },

    #[error("malformed structure: {0}")]
    Malformed(String),

    #[error("invalid B-tree: {0}")]
    InvalidBTree(String),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("invalid signature: 0x{0:04X}")]
    InvalidSignature(u16),

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u16),

    #[error("critical fault: {0}")]
    Critical(String),

    #[error("repairable fault: {0}")]
    Repairable(Fault),

    #[error("journal corrupt: {0}")]
    JournalCorrupt(String),

    #[error("journal unsupported: {0}")]
    JournalUnsupported(String),

    #[error("device busy (mounted elsewhere)")]
    DeviceBusy,

    #[error("device already holds a recognizable filesystem")]
    DeviceOccupied,

    #[error("permission denied")]
    PermissionDenied,

    #[error("ambiguous partition: {0} partitions present, one must be named")]
    AmbiguousPartition(u32),

    #[error("usage error: {0}")]
    Usage(String),

    #[error("cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, HfsError>;
