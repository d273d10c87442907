//! The B-tree engine shared by the Catalog, Extents Overflow, and Attributes
//! B-trees, for both the classic HFS and HFS+/HFSX on-disk formats.
//!
//! `engine` holds the format-agnostic node/header machinery (kept close to
//! the original read-only traversal, generalized with write-back and
//! repair). `keys` holds the per-tree-family key comparator. `catalog` and
//! `attributes` hold the record layouts the checker needs for each tree;
//! the Extents Overflow tree is walked and validated through the same
//! generic node/key-compare machinery without a dedicated record module.

mod attributes;
mod catalog;
mod engine;
mod keys;

pub use attributes::*;
pub use catalog::{
    catalog_key_and_type, peek_record_type, validate_node_name, validate_parent_id, validate_record_type, CatalogKey,
    CNID_ALLOCATION_FILE, CNID_ATTRIBUTES_FILE, CNID_BAD_BLOCKS_FILE, CNID_CATALOG_FILE,
    CNID_EXTENTS_FILE, CNID_ROOT_FOLDER, CNID_ROOT_PARENT, CNID_STARTUP_FILE, RECORD_TYPE_FILE,
    RECORD_TYPE_FILE_THREAD, RECORD_TYPE_FOLDER, RECORD_TYPE_FOLDER_THREAD,
};
pub use engine::*;
pub use keys::KeyCompare;
