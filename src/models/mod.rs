//! Data structures.

pub mod access_key;
pub mod settings;
