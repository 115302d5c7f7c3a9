//! Concrete storage for Ticklist collections.
//! Each collection is one pretty-printed JSON array on local disk.

pub mod json_file_store;

pub use json_file_store::JsonFileStore;
