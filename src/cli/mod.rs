//! Workflow layer: the merge pipeline and branch restoration around it

pub mod orchestration;
pub mod restore;

pub use orchestration::{RunState, Workflow, WorkflowArgs, WorkflowResult};
pub use restore::{BranchRestorer, RestoreGuard};
