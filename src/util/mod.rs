//! Utility modules for the IAM backend, prompts, and filesystem helpers.

pub mod aws_iam;
pub mod fs;
pub mod prompt;
