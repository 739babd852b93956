//! Implements ObjectStore on an S3 bucket. Objects are public-read; the
//! published site is served straight from the bucket.

use crate::domain::DomainError;
use crate::ports::ObjectStore;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use tracing::{debug, info};

pub struct S3Store {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3Store {
    /// Credentials and region come from the standard AWS environment.
    pub async fn from_env(bucket: impl Into<String>, prefix: Option<String>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let bucket = bucket.into();
        info!(bucket = %bucket, "using S3 object store");
        Self {
            client: Client::new(&config),
            bucket,
            prefix: prefix.unwrap_or_default(),
        }
    }

    fn full_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", self.prefix.trim_end_matches('/'), key)
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3Store {
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), DomainError> {
        let key = self.full_key(key);
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| DomainError::Storage(format!("s3://{}/{}: {}", self.bucket, key, e)))?;
        debug!(bucket = %self.bucket, key = %key, bytes = size, "uploaded object");
        Ok(())
    }
}
