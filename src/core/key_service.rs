//! Interface to the external key-management service.
//!
//! Every operation acts on the calling identity. Authentication is whatever
//! the environment of the backing client provides.

use crate::core::error::KeyError;
use crate::models::access_key::{AccessKey, KeyStatus, NewAccessKey};

pub trait KeyService {
    /// All keys of the calling identity.
    fn list_keys(&self) -> Result<Vec<AccessKey>, KeyError>;

    /// Create a new key pair.
    fn create_key(&self) -> Result<NewAccessKey, KeyError>;

    fn set_key_status(&self, key_id: &str, status: KeyStatus) -> Result<(), KeyError>;

    fn delete_key(&self, key_id: &str) -> Result<(), KeyError>;
}
