//! IAM access key lifecycle CLI.
//!
//! Creates, lists, enables/disables, deletes, and age-rotates the access keys
//! of the calling identity, and keeps the shared credentials file in step.
//!
//! ## Modules
//! - `cli`: Flag parsing and command handlers
//! - `core`: Rotation policy, credentials file, audit trail
//! - `models`: Data structures
//! - `util`: IAM SDK backend, prompts, filesystem helpers

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod util;
