//! Repository mirroring
//!
//! [`Orchestrator`] walks the repository list and hands each entry to the
//! [`Synchronizer`], which clones or force-syncs it under the
//! [`BackupLayout`].

mod descriptor;
mod layout;
mod orchestrator;
mod outcome;
pub mod probe;
mod sync;

pub use descriptor::{RepositoryDescriptor, RepositorySelection};
pub use layout::{normalize_lexically, BackupLayout};
pub use orchestrator::{Orchestrator, PlannedSync};
pub use outcome::{RepositoryReport, RunSummary, SyncOutcome};
pub use sync::{SyncPlan, Synchronizer, ORIGIN};
