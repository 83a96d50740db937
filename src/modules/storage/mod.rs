//! Storage module for report attachments
//!
//! Uploads are staged in a shared folder until the report they belong to is
//! saved, then moved into a folder named after the report number.

mod local_storage;

pub use local_storage::{LocalStorage, StagedFile};
