//! CLI command implementations

pub mod backup;
pub mod list;

pub use backup::BackupArgs;
pub use list::ListArgs;
