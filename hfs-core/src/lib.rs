//! Codec, B-tree engine, journal replay, mkfs and fsck core for HFS and
//! HFS+/HFSX volumes.
//!
//! This crate is deliberately not a filesystem driver: it has no POSIX file
//! interface, no concurrent-writer support, and no write-behind caching. It
//! opens a device, decodes or synthesizes the on-disk volume, B-tree and
//! journal structures, and closes the device again. Reading file contents
//! out of a volume or copying data in is left to external collaborators;
//! this crate's surface stops at the structures a formatter writes and a
//! checker validates.

pub mod bitmap;
pub mod btree;
pub mod codec;
pub mod config;
pub mod device;
pub mod driver;
pub mod error;
pub mod fsck;
pub mod journal;
pub mod mkfs;
pub mod signature;
pub mod unicode;
pub mod volume;

pub use error::{Fault, HfsError, Result};
pub use volume::VolumeHeader;
