//! Prefix-scoped upload and delete of media artifacts on an object store.
//!
//! [`ObjectStorage`] orchestrates the transfer semantics; the [`BucketApi`]
//! trait isolates the wire protocol so tests can substitute a stub bucket.
//!
//! Failure asymmetry is deliberate: a file that still fails to upload after
//! all retries is logged and skipped (a partial upload is recoverable by
//! re-running the prepare), while a delete that fails is returned to the
//! caller (a partial delete would corrupt the next upload under the same
//! prefix).

pub mod retry;
mod s3;

pub use s3::S3Bucket;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::error::{Error, Result};
use retry::with_retries;

/// Maximum uploads in flight at once.
const UPLOAD_CONCURRENCY: usize = 4;
/// Canned ACL applied to every uploaded object.
const UPLOAD_ACL: &str = "public-read";
/// Batch size limit for multi-object deletes.
const DELETE_BATCH: usize = 1000;

/// Minimal bucket operations needed by the orchestration layer.
#[async_trait]
pub trait BucketApi: Send + Sync {
    /// Store one object under `key` with the given canned ACL.
    async fn put_object(&self, key: &str, body: Vec<u8>, acl: &str) -> Result<()>;
    /// One page of keys under `prefix`; the second element is the
    /// continuation token for the next page, if any.
    async fn list_keys(
        &self,
        prefix: &str,
        continuation: Option<String>,
    ) -> Result<(Vec<String>, Option<String>)>;
    /// Delete up to 1000 keys in one batch.
    async fn delete_keys(&self, keys: &[String]) -> Result<()>;
}

/// Prefix-scoped media file transfer on top of a [`BucketApi`].
#[derive(Clone)]
pub struct ObjectStorage {
    bucket: Arc<dyn BucketApi>,
}

impl ObjectStorage {
    pub fn new(bucket: Arc<dyn BucketApi>) -> Self {
        Self { bucket }
    }

    /// Replace everything under `prefix/` with the regular files found in
    /// `local_path` (walked depth-first, flattened to their basenames).
    ///
    /// Uploads run at most [`UPLOAD_CONCURRENCY`] at a time; each file gets
    /// three attempts and a final failure is logged and skipped without
    /// failing the batch.
    pub async fn upload_media_files(&self, prefix: &str, local_path: &Path) -> Result<()> {
        info!(prefix, "removing existing objects under prefix");
        self.delete_prefix(prefix).await?;

        let files = collect_files(local_path)?;
        info!(
            prefix,
            count = files.len(),
            path = %local_path.display(),
            "uploading media files"
        );

        let semaphore = Arc::new(Semaphore::new(UPLOAD_CONCURRENCY));
        let mut handles = Vec::with_capacity(files.len());
        for file in files {
            let bucket = Arc::clone(&self.bucket);
            let semaphore = Arc::clone(&semaphore);
            let prefix = prefix.to_string();
            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("upload semaphore closed");
                upload_one(bucket.as_ref(), &prefix, &file).await;
            }));
        }
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "upload task failed");
            }
        }

        info!(prefix, "upload finished");
        Ok(())
    }

    /// Delete every object under `prefix/`.
    pub async fn delete_media_files(&self, prefix: &str) -> Result<()> {
        info!(prefix, "removing objects under prefix");
        self.delete_prefix(prefix).await
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<()> {
        let mut continuation: Option<String> = None;
        loop {
            let (keys, next) = self.bucket.list_keys(prefix, continuation.clone()).await?;

            for chunk in keys.chunks(DELETE_BATCH) {
                if chunk.is_empty() {
                    continue;
                }
                with_retries("delete objects", || self.bucket.delete_keys(chunk))
                    .await
                    .map_err(|e| {
                        Error::storage(
                            "delete",
                            format!("failed after {} attempts: {e}", retry::MAX_ATTEMPTS),
                        )
                    })?;
            }

            match next {
                Some(token) => continuation = Some(token),
                None => break,
            }
        }
        Ok(())
    }
}

/// Upload a single file, retrying on failure. A file that cannot be read or
/// still fails after all attempts is logged and skipped.
async fn upload_one(bucket: &dyn BucketApi, prefix: &str, path: &Path) {
    let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
        warn!(path = %path.display(), "skipping file with unusable name");
        return;
    };
    let key = format!("{prefix}/{filename}");

    // Read once; the same bytes feed every attempt.
    let body = match std::fs::read(path) {
        Ok(body) => body,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read file, skipping");
            return;
        }
    };

    let result = with_retries("upload", || bucket.put_object(&key, body.clone(), UPLOAD_ACL)).await;
    if let Err(e) = result {
        warn!(
            key,
            error = %e,
            "failed to upload after {} attempts, skipping",
            retry::MAX_ATTEMPTS
        );
    }
}

/// Regular files under `root`, depth-first.
fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                stack.push(path);
            } else if file_type.is_file() {
                files.push(path);
            }
        }
    }
    Ok(files)
}
