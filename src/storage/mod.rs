//! S3 bucket facade.
//!
//! A thin one-to-one proxy over the object-storage API: no logic beyond
//! binding the client and bucket name once and wrapping transport errors.
//! Presigned URLs default to a one-hour validity window.

use aws_sdk_s3::operation::get_object::GetObjectOutput;
use aws_sdk_s3::operation::head_object::HeadObjectOutput;
use aws_sdk_s3::presigning::{PresigningConfig, PresigningConfigError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default validity window for presigned URLs.
pub const DEFAULT_PRESIGN_EXPIRY: Duration = Duration::from_secs(3600);

/// Errors raised by the storage facade.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The underlying S3 call failed.
    #[error("failed to perform {operation} command")]
    Transport {
        operation: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The requested presigned-URL validity window was rejected.
    #[error("invalid presigned URL expiry")]
    InvalidExpiry(#[from] PresigningConfigError),
}

impl StorageError {
    fn transport(
        operation: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Transport {
            operation,
            source: source.into(),
        }
    }
}

/// An S3 client bound to a single bucket.
#[derive(Debug, Clone)]
pub struct Bucket {
    client: Client,
    name: String,
}

impl Bucket {
    pub fn new(client: Client, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fetches an object.
    pub async fn get(&self, key: &str) -> Result<GetObjectOutput, StorageError> {
        self.client
            .get_object()
            .bucket(&self.name)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::transport("get object", e))
    }

    /// Uploads an object.
    pub async fn upload(&self, key: &str, body: ByteStream) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.name)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::transport("put object", e))?;
        debug!("Object '{key}' uploaded to '{}'", self.name);
        Ok(())
    }

    /// Deletes an object.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.name)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::transport("delete object", e))?;
        Ok(())
    }

    /// Fetches an object's metadata without its body.
    pub async fn head(&self, key: &str) -> Result<HeadObjectOutput, StorageError> {
        self.client
            .head_object()
            .bucket(&self.name)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::transport("head object", e))
    }

    /// Issues a presigned GET URL for an object, valid for `expires_in`
    /// (default one hour).
    pub async fn presigned_get_url(
        &self,
        key: &str,
        expires_in: Option<Duration>,
    ) -> Result<String, StorageError> {
        let config = PresigningConfig::expires_in(expires_in.unwrap_or(DEFAULT_PRESIGN_EXPIRY))?;
        let presigned = self
            .client
            .get_object()
            .bucket(&self.name)
            .key(key)
            .presigned(config)
            .await
            .map_err(|e| StorageError::transport("presign get object", e))?;
        Ok(presigned.uri().to_string())
    }

    /// Issues a presigned PUT URL for uploading an object, valid for
    /// `expires_in` (default one hour).
    pub async fn presigned_upload_url(
        &self,
        key: &str,
        expires_in: Option<Duration>,
    ) -> Result<String, StorageError> {
        let config = PresigningConfig::expires_in(expires_in.unwrap_or(DEFAULT_PRESIGN_EXPIRY))?;
        let presigned = self
            .client
            .put_object()
            .bucket(&self.name)
            .key(key)
            .presigned(config)
            .await
            .map_err(|e| StorageError::transport("presign put object", e))?;
        Ok(presigned.uri().to_string())
    }
}
