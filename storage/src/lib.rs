use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    Client,
    config::{Credentials, Region},
    presigning::PresigningConfig,
    primitives::ByteStream,
};
use chrono::NaiveDateTime;
use common::{
    env_config::S3Settings,
    error::{AppError, Res},
};
use uuid::Uuid;

/// Object store for generated images. Wraps an S3-compatible bucket and
/// hands out presigned GET URLs so the bucket itself can stay private.
#[derive(Clone)]
pub struct ObjectStore {
    client: Client,
    bucket: String,
    presign_ttl: Duration,
}

impl ObjectStore {
    /// Builds the S3 client from static credentials and a custom endpoint.
    /// Path-style addressing is the default, which most S3-compatible
    /// providers require.
    pub async fn connect(settings: &S3Settings) -> Self {
        let credentials = Credentials::new(
            settings.access_key.clone(),
            settings.secret_key.clone(),
            None,
            None,
            "s3-compatible",
        );

        let region = Region::new(settings.region.clone());
        let shared_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region.clone())
            .credentials_provider(credentials)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&shared_config)
            .endpoint_url(settings.endpoint.trim_end_matches('/').to_string())
            .force_path_style(settings.force_path_style)
            .region(region)
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: settings.bucket.clone(),
            presign_ttl: Duration::from_secs(settings.presign_ttl_secs),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Key layout: one prefix per user, random object names.
    pub fn object_key(user_id: Uuid, extension: &str) -> String {
        format!("images/{}/{}.{}", user_id, Uuid::new_v4(), extension)
    }

    pub async fn put_object(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Res<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("S3 upload failed for {}: {}", key, e)))?;
        Ok(())
    }

    /// Presigns a GET for the object and returns the URL together with its
    /// expiry timestamp, which the caller persists alongside the URL.
    pub async fn presign_get(&self, key: &str) -> Res<(String, NaiveDateTime)> {
        let presigning = PresigningConfig::expires_in(self.presign_ttl)
            .map_err(|e| AppError::Internal(format!("Invalid presign TTL: {}", e)))?;

        let expires_at = (chrono::Utc::now()
            + chrono::Duration::seconds(self.presign_ttl.as_secs() as i64))
        .naive_utc();

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| AppError::Internal(format!("S3 presign failed for {}: {}", key, e)))?;

        Ok((request.uri().to_string(), expires_at))
    }

    pub async fn delete_object(&self, key: &str) -> Res<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("S3 delete failed for {}: {}", key, e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_keys_are_namespaced_per_user() {
        let user_id = Uuid::new_v4();
        let key = ObjectStore::object_key(user_id, "png");
        assert!(key.starts_with(&format!("images/{}/", user_id)));
        assert!(key.ends_with(".png"));
    }

    #[test]
    fn object_keys_are_unique() {
        let user_id = Uuid::new_v4();
        assert_ne!(
            ObjectStore::object_key(user_id, "png"),
            ObjectStore::object_key(user_id, "png")
        );
    }
}
