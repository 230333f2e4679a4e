//! Core logic: rotation policy, credentials file edits, audit trail.

pub mod audit_log;
pub mod credentials_file;
pub mod error;
pub mod file_lock;
pub mod key_service;
pub mod paths;
pub mod rotation;
pub mod settings;
