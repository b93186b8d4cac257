//! S3-compatible implementation of [`BucketApi`].

use async_trait::async_trait;
use rusoto_core::credential::StaticProvider;
use rusoto_core::request::HttpClient;
use rusoto_core::Region;
use rusoto_s3::{
    Delete, DeleteObjectsRequest, ListObjectsV2Request, ObjectIdentifier, PutObjectRequest,
    S3Client, S3,
};
use tracing::info;

use super::BucketApi;
use crate::error::{Error, Result};

/// A bucket on an S3-compatible store (custom endpoint, static credentials).
pub struct S3Bucket {
    client: S3Client,
    bucket: String,
}

impl S3Bucket {
    /// Build a client for the given endpoint and bucket.
    pub fn new(
        access_key: &str,
        secret_key: &str,
        endpoint: &str,
        region: &str,
        bucket: &str,
    ) -> Result<Self> {
        let credentials =
            StaticProvider::new_minimal(access_key.to_string(), secret_key.to_string());
        let region = Region::Custom {
            name: region.to_string(),
            endpoint: endpoint.to_string(),
        };
        let http_client = HttpClient::new()
            .map_err(|e| Error::storage("init", format!("failed to create HTTP client: {e}")))?;

        info!(endpoint, bucket, "object storage client initialized");

        Ok(Self {
            client: S3Client::new_with(http_client, credentials, region),
            bucket: bucket.to_string(),
        })
    }
}

#[async_trait]
impl BucketApi for S3Bucket {
    async fn put_object(&self, key: &str, body: Vec<u8>, acl: &str) -> Result<()> {
        self.client
            .put_object(PutObjectRequest {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                acl: Some(acl.to_string()),
                body: Some(body.into()),
                ..Default::default()
            })
            .await
            .map_err(|e| Error::storage("put", format!("{key}: {e}")))?;
        Ok(())
    }

    async fn list_keys(
        &self,
        prefix: &str,
        continuation: Option<String>,
    ) -> Result<(Vec<String>, Option<String>)> {
        let resp = self
            .client
            .list_objects_v2(ListObjectsV2Request {
                bucket: self.bucket.clone(),
                prefix: Some(prefix.to_string()),
                continuation_token: continuation,
                ..Default::default()
            })
            .await
            .map_err(|e| Error::storage("list", format!("{prefix}: {e}")))?;

        let keys = resp
            .contents
            .unwrap_or_default()
            .into_iter()
            .filter_map(|o| o.key)
            .collect();
        Ok((keys, resp.next_continuation_token))
    }

    async fn delete_keys(&self, keys: &[String]) -> Result<()> {
        let objects = keys
            .iter()
            .map(|k| ObjectIdentifier {
                key: k.clone(),
                version_id: None,
            })
            .collect();

        self.client
            .delete_objects(DeleteObjectsRequest {
                bucket: self.bucket.clone(),
                delete: Delete {
                    objects,
                    quiet: Some(true),
                },
                ..Default::default()
            })
            .await
            .map_err(|e| Error::storage("delete", e.to_string()))?;
        Ok(())
    }
}
