//! Core abstractions for Ticklist: the task and draft model, the collection
//! store contract, and view-time queries. No file-system access lives here.

pub mod input;
pub mod query;
pub mod storage;
pub mod tasks;
pub mod time;
