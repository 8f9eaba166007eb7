//! CLI command implementations

pub mod branches;
pub mod issues;

pub use branches::{BranchesArgs, RepoTypeArgs};
pub use issues::IssuesArgs;
