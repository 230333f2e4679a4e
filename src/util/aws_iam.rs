//! Key-management backend on the AWS IAM SDK.
//!
//! Credentials and profile come from the SDK's default provider chain. Calls
//! are driven to completion on a private current-thread runtime so the rest
//! of the tool stays synchronous.

use crate::core::error::KeyError;
use crate::core::key_service::KeyService;
use crate::models::access_key::{AccessKey, KeyStatus, NewAccessKey};
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_iam::error::DisplayErrorContext;
use aws_sdk_iam::primitives::DateTime as SmithyDateTime;
use aws_sdk_iam::types::{AccessKey as IamAccessKey, AccessKeyMetadata, StatusType};
use aws_sdk_iam::Client as IamClient;
use chrono::{DateTime, Utc};
use tokio::runtime::{Builder, Runtime};
use zeroize::Zeroizing;

/// IAM is a global service; any region resolves to the same endpoint.
const FALLBACK_REGION: &str = "us-east-1";

pub struct IamKeyService {
    runtime: Runtime,
    client: IamClient,
}

impl IamKeyService {
    /// Build a client from the environment (env vars, profile, SSO, IMDS).
    pub fn from_env() -> Result<Self, KeyError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| KeyError::Service(format!("start async runtime: {}", e)))?;
        let region = RegionProviderChain::default_provider().or_else(FALLBACK_REGION);
        let config = runtime.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .region(region)
                .load(),
        );
        Ok(Self {
            runtime,
            client: IamClient::new(&config),
        })
    }
}

fn service_error<E: std::error::Error + 'static>(operation: &str, err: E) -> KeyError {
    KeyError::Service(format!("iam {} failed: {}", operation, DisplayErrorContext(err)))
}

fn to_chrono(ts: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
}

fn key_status(status: &StatusType) -> KeyStatus {
    match status {
        StatusType::Active => KeyStatus::Active,
        _ => KeyStatus::Inactive,
    }
}

fn from_metadata(meta: &AccessKeyMetadata) -> Result<AccessKey, KeyError> {
    let id = meta
        .access_key_id()
        .ok_or_else(|| KeyError::Service("list-access-keys: key without id".into()))?;
    let status = meta
        .status()
        .map(key_status)
        .ok_or_else(|| KeyError::Service(format!("list-access-keys: key {} without status", id)))?;
    let created_at = meta.create_date().and_then(to_chrono).ok_or_else(|| {
        KeyError::Service(format!("list-access-keys: key {} without creation date", id))
    })?;
    Ok(AccessKey {
        id: id.to_string(),
        status,
        created_at,
    })
}

fn from_created(key: &IamAccessKey) -> NewAccessKey {
    NewAccessKey {
        id: key.access_key_id().to_string(),
        secret: Zeroizing::new(key.secret_access_key().to_string()),
    }
}

impl KeyService for IamKeyService {
    fn list_keys(&self) -> Result<Vec<AccessKey>, KeyError> {
        tracing::debug!("iam list-access-keys");
        let output = self
            .runtime
            .block_on(self.client.list_access_keys().send())
            .map_err(|e| service_error("list-access-keys", e))?;
        output.access_key_metadata().iter().map(from_metadata).collect()
    }

    fn create_key(&self) -> Result<NewAccessKey, KeyError> {
        tracing::debug!("iam create-access-key");
        let output = self
            .runtime
            .block_on(self.client.create_access_key().send())
            .map_err(|e| service_error("create-access-key", e))?;
        output
            .access_key()
            .map(from_created)
            .ok_or_else(|| KeyError::Service("create-access-key: response without key".into()))
    }

    fn set_key_status(&self, key_id: &str, status: KeyStatus) -> Result<(), KeyError> {
        tracing::debug!(key_id, %status, "iam update-access-key");
        let status = match status {
            KeyStatus::Active => StatusType::Active,
            KeyStatus::Inactive => StatusType::Inactive,
        };
        self.runtime
            .block_on(
                self.client
                    .update_access_key()
                    .access_key_id(key_id)
                    .status(status)
                    .send(),
            )
            .map_err(|e| service_error("update-access-key", e))?;
        Ok(())
    }

    fn delete_key(&self, key_id: &str) -> Result<(), KeyError> {
        tracing::debug!(key_id, "iam delete-access-key");
        self.runtime
            .block_on(self.client.delete_access_key().access_key_id(key_id).send())
            .map_err(|e| service_error("delete-access-key", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_metadata() {
        let meta = AccessKeyMetadata::builder()
            .user_name("ops")
            .access_key_id("AKIAOLD")
            .status(StatusType::Inactive)
            .create_date(SmithyDateTime::from_secs(1_672_628_645))
            .build();
        let key = from_metadata(&meta).unwrap();
        assert_eq!(key.id, "AKIAOLD");
        assert_eq!(key.status, KeyStatus::Inactive);
        assert_eq!(key.created_at.to_rfc3339(), "2023-01-02T03:04:05+00:00");
    }

    #[test]
    fn test_from_metadata_active() {
        let meta = AccessKeyMetadata::builder()
            .access_key_id("AKIANEW")
            .status(StatusType::Active)
            .create_date(SmithyDateTime::from_secs(1_717_200_000))
            .build();
        assert_eq!(from_metadata(&meta).unwrap().status, KeyStatus::Active);
    }

    #[test]
    fn test_from_metadata_missing_fields_is_service_error() {
        let no_id = AccessKeyMetadata::builder()
            .status(StatusType::Active)
            .create_date(SmithyDateTime::from_secs(0))
            .build();
        assert!(matches!(from_metadata(&no_id), Err(KeyError::Service(_))));

        let no_date = AccessKeyMetadata::builder()
            .access_key_id("AKIA1")
            .status(StatusType::Active)
            .build();
        assert!(matches!(from_metadata(&no_date), Err(KeyError::Service(_))));
    }

    #[test]
    fn test_from_created() {
        let key = IamAccessKey::builder()
            .user_name("ops")
            .access_key_id("AKIA2")
            .status(StatusType::Active)
            .secret_access_key("s3cr3t")
            .build()
            .unwrap();
        let new_key = from_created(&key);
        assert_eq!(new_key.id, "AKIA2");
        assert_eq!(new_key.secret.as_str(), "s3cr3t");
    }
}
