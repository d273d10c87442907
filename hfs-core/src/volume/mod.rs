//! Volume-structure codec: the HFS+/HFSX volume header, the classic HFS
//! Master Directory Block, and the structural checks fsck's first phase
//! runs against whichever one a volume carries.

pub mod header;
pub mod mdb;
pub mod validate;

pub use header::{
    alternate_header_offset, ExtentDescriptor, ForkData, VolumeHeader, HFSX_SIGNATURE,
    HFS_PLUS_SIGNATURE, HFS_PLUS_VERSION, HFSX_VERSION, VOLUME_HEADER_OFFSET, VOLUME_HEADER_SIZE,
};
pub use mdb::{ClassicExtent, ClassicExtentRecord, MasterDirectoryBlock, HFS_SIGNATURE, MDB_OFFSET, MDB_SIZE};
pub use validate::{
    check_header, compare_alternate, ATTR_VOLUME_JOURNALED, ATTR_VOLUME_UNMOUNTED,
    RESERVED_CNID_FLOOR,
};
