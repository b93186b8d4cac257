//! Object storage semantics through the bucket seam: delete-then-upload,
//! bounded concurrency, per-file retry, delete failure propagation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use vodforge::error::{Error, Result};
use vodforge::storage::{BucketApi, ObjectStorage};

/// In-memory bucket with programmable per-key put failures.
#[derive(Default)]
struct StubBucket {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    /// Remaining failures per key; decremented on each failing put.
    put_failures: Mutex<HashMap<String, u32>>,
    /// Every delete_keys call fails when set.
    delete_always_fails: bool,
    /// List page size; 0 means everything in one page.
    page_size: usize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    put_delay: Duration,
}

impl StubBucket {
    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl BucketApi for StubBucket {
    async fn put_object(&self, key: &str, body: Vec<u8>, acl: &str) -> Result<()> {
        assert_eq!(acl, "public-read");

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if !self.put_delay.is_zero() {
            tokio::time::sleep(self.put_delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        {
            let mut failures = self.put_failures.lock();
            if let Some(remaining) = failures.get_mut(key) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(Error::storage("put", format!("{key}: injected failure")));
                }
            }
        }

        self.objects.lock().insert(key.to_string(), body);
        Ok(())
    }

    async fn list_keys(
        &self,
        prefix: &str,
        continuation: Option<String>,
    ) -> Result<(Vec<String>, Option<String>)> {
        let all: Vec<String> = {
            let mut keys: Vec<String> = self
                .objects
                .lock()
                .keys()
                .filter(|k| k.starts_with(prefix))
                .cloned()
                .collect();
            keys.sort();
            keys
        };

        if self.page_size == 0 {
            return Ok((all, None));
        }

        // Continuation token is the last key of the previous page, so pages
        // stay stable while earlier keys are deleted mid-walk.
        let page: Vec<String> = all
            .iter()
            .filter(|k| match continuation.as_deref() {
                Some(token) => k.as_str() > token,
                None => true,
            })
            .take(self.page_size)
            .cloned()
            .collect();
        let has_more = match page.last() {
            Some(last) => all.iter().any(|k| k.as_str() > last.as_str()),
            None => false,
        };
        let next = if has_more { page.last().cloned() } else { None };
        Ok((page, next))
    }

    async fn delete_keys(&self, keys: &[String]) -> Result<()> {
        if self.delete_always_fails {
            return Err(Error::storage("delete", "injected failure"));
        }
        let mut objects = self.objects.lock();
        for key in keys {
            objects.remove(key);
        }
        Ok(())
    }
}

fn artifact_dir(names: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in names {
        std::fs::write(dir.path().join(name), format!("data-{name}")).unwrap();
    }
    dir
}

#[tokio::test(start_paused = true)]
async fn flaky_puts_recover_and_every_file_lands() {
    let dir = artifact_dir(&["index.m3u8", "segment_000.ts", "audio_1.m3u8"]);
    let mut bucket = StubBucket::default();
    // Each key fails exactly twice, then succeeds on the third attempt.
    for name in ["index.m3u8", "segment_000.ts", "audio_1.m3u8"] {
        bucket
            .put_failures
            .lock()
            .insert(format!("42/{name}"), 2);
    }
    let bucket = Arc::new(bucket);
    let storage = ObjectStorage::new(bucket.clone());

    storage.upload_media_files("42", dir.path()).await.unwrap();

    assert_eq!(
        bucket.keys(),
        vec!["42/audio_1.m3u8", "42/index.m3u8", "42/segment_000.ts"]
    );
}

#[tokio::test]
async fn at_most_four_uploads_in_flight() {
    let names: Vec<String> = (0..12).map(|i| format!("segment_{i:03}.ts")).collect();
    let name_refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
    let dir = artifact_dir(&name_refs);

    let bucket = Arc::new(StubBucket {
        put_delay: Duration::from_millis(20),
        ..Default::default()
    });
    let storage = ObjectStorage::new(bucket.clone());

    storage.upload_media_files("42", dir.path()).await.unwrap();

    assert_eq!(bucket.keys().len(), 12);
    let max = bucket.max_in_flight.load(Ordering::SeqCst);
    assert!(max <= 4, "observed {max} concurrent uploads");
    assert!(max >= 2, "uploads never overlapped");
}

#[tokio::test(start_paused = true)]
async fn persistently_failing_file_is_skipped() {
    let dir = artifact_dir(&["index.m3u8", "audio_1.m3u8"]);
    let bucket = StubBucket::default();
    // More failures than attempts: this file never lands.
    bucket.put_failures.lock().insert("42/audio_1.m3u8".into(), 99);
    let bucket = Arc::new(bucket);
    let storage = ObjectStorage::new(bucket.clone());

    // The batch still succeeds.
    storage.upload_media_files("42", dir.path()).await.unwrap();

    assert_eq!(bucket.keys(), vec!["42/index.m3u8"]);
}

#[tokio::test]
async fn upload_replaces_previous_prefix_contents() {
    let dir = artifact_dir(&["index.m3u8"]);
    let bucket = Arc::new(StubBucket::default());
    bucket
        .objects
        .lock()
        .insert("42/stale.ts".into(), b"old".to_vec());
    bucket
        .objects
        .lock()
        .insert("43/other.ts".into(), b"keep".to_vec());
    let storage = ObjectStorage::new(bucket.clone());

    storage.upload_media_files("42", dir.path()).await.unwrap();

    // The stale object under the prefix is gone, other prefixes untouched.
    assert_eq!(bucket.keys(), vec!["42/index.m3u8", "43/other.ts"]);
}

#[tokio::test]
async fn delete_drains_paginated_listings() {
    let bucket = Arc::new(StubBucket {
        page_size: 2,
        ..Default::default()
    });
    for i in 0..7 {
        bucket
            .objects
            .lock()
            .insert(format!("42/segment_{i:03}.ts"), Vec::new());
    }
    let storage = ObjectStorage::new(bucket.clone());

    storage.delete_media_files("42").await.unwrap();
    assert!(bucket.keys().is_empty());
}

#[tokio::test(start_paused = true)]
async fn delete_failure_is_returned() {
    let bucket = Arc::new(StubBucket {
        delete_always_fails: true,
        ..Default::default()
    });
    bucket.objects.lock().insert("42/index.m3u8".into(), Vec::new());
    let storage = ObjectStorage::new(bucket.clone());

    let err = storage.delete_media_files("42").await.unwrap_err();
    match err {
        Error::Storage { operation, .. } => assert_eq!(operation, "delete"),
        other => panic!("expected storage error, got {other}"),
    }
}
