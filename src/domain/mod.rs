//! Domain logic - pure parsing and comparison rules independent of running git

pub mod branch;
pub mod commit;
pub mod manifest;
pub mod tag;
pub mod version;

pub use branch::{Branch, BranchListing};
pub use commit::{CommitLog, CommitLogEntry};
pub use manifest::{MainVersion, VersionManifest};
pub use tag::ReleaseTag;
pub use version::VersionCheck;
