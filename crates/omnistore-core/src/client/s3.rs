//! S3-compatible client implementation.
//!
//! Covers AWS S3 and S3-compatible services (MinIO, Ceph RGW, Aliyun OSS)
//! through a custom endpoint.

use std::collections::HashMap;

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketCannedAcl, BucketLocationConstraint, CreateBucketConfiguration, ObjectCannedAcl,
};
use bytes::Bytes;
use chrono::DateTime;
use tracing::{debug, info};

use super::{ClientError, ClientResult, ObjectClient, ObjectStat, ObjectSummary, PutOptions};
use crate::config::AccessPolicy;

/// S3 client configuration.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// AWS region
    pub region: Option<String>,
    /// Custom endpoint (for S3-compatible services like MinIO or Aliyun OSS)
    pub endpoint: Option<String>,
    /// Access key ID
    pub access_key_id: Option<String>,
    /// Secret access key
    pub secret_access_key: Option<String>,
    /// Use path-style requests (required for MinIO/Ceph RGW)
    pub force_path_style: bool,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            region: Some("us-east-1".to_string()),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            force_path_style: false,
        }
    }
}

/// S3-compatible client.
pub struct S3Client {
    client: aws_sdk_s3::Client,
    region: Option<String>,
}

impl S3Client {
    /// Create a new S3 client.
    ///
    /// Explicit credentials in the config take precedence; otherwise the
    /// ambient credential chain (environment, profile, instance metadata)
    /// is used.
    pub async fn connect(config: S3Config) -> Self {
        let base = aws_config::load_from_env().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&base);

        if let Some(region) = &config.region {
            builder = builder.region(aws_sdk_s3::config::Region::new(region.clone()));
        }

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        if let (Some(access_key), Some(secret_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            builder = builder.credentials_provider(aws_sdk_s3::config::Credentials::new(
                access_key, secret_key, None, None, "omnistore",
            ));
        }

        if config.force_path_style {
            builder = builder.force_path_style(true);
        }

        info!(
            "Created S3 client, region: {:?}, endpoint: {:?}",
            config.region, config.endpoint
        );

        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            region: config.region,
        }
    }

    /// Wrap an already-constructed SDK client.
    pub fn from_client(client: aws_sdk_s3::Client) -> Self {
        Self {
            client,
            region: None,
        }
    }

    fn rfc3339(ts: &aws_sdk_s3::primitives::DateTime) -> Option<String> {
        DateTime::from_timestamp(ts.secs(), ts.subsec_nanos()).map(|dt| dt.to_rfc3339())
    }

    fn unquote(etag: &str) -> String {
        etag.trim_matches('"').to_string()
    }
}

#[async_trait::async_trait]
impl ObjectClient for S3Client {
    async fn get_object(&self, container: &str, key: &str) -> ClientResult<Bytes> {
        debug!("S3 GET: {}/{}", container, key);

        match self
            .client
            .get_object()
            .bucket(container)
            .key(key)
            .send()
            .await
        {
            Ok(output) => {
                let data = output.body.collect().await.map_err(|e| {
                    ClientError::backend(format!("Failed to read S3 response body: {}", e))
                })?;
                Ok(data.into_bytes())
            }
            Err(err) => {
                if err
                    .as_service_error()
                    .is_some_and(|svc| svc.is_no_such_key())
                {
                    return Err(ClientError::NotFound);
                }
                Err(ClientError::backend(err))
            }
        }
    }

    async fn put_object(
        &self,
        container: &str,
        key: &str,
        content: Bytes,
        options: &PutOptions,
    ) -> ClientResult<()> {
        debug!("S3 PUT: {}/{} ({} bytes)", container, key, content.len());

        let mut req = self
            .client
            .put_object()
            .bucket(container)
            .key(key)
            .body(ByteStream::from(content));

        if let Some(content_type) = &options.content_type {
            req = req.content_type(content_type);
        }
        if let Some(access) = options.access {
            req = req.acl(match access {
                AccessPolicy::Private => ObjectCannedAcl::Private,
                AccessPolicy::Public => ObjectCannedAcl::PublicRead,
            });
        }
        for (name, value) in &options.metadata {
            req = req.metadata(name, value);
        }

        req.send().await.map_err(ClientError::backend)?;
        Ok(())
    }

    async fn delete_object(&self, container: &str, key: &str) -> ClientResult<()> {
        debug!("S3 DELETE: {}/{}", container, key);

        // S3 delete is idempotent: a missing key still returns 204, so
        // absence cannot be signaled from here.
        self.client
            .delete_object()
            .bucket(container)
            .key(key)
            .send()
            .await
            .map_err(ClientError::backend)?;
        Ok(())
    }

    async fn list_objects(
        &self,
        container: &str,
        prefix: &str,
        max_keys: Option<usize>,
    ) -> ClientResult<Vec<ObjectSummary>> {
        debug!("S3 LIST: {}/{}*", container, prefix);

        let mut summaries = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut req = self
                .client
                .list_objects_v2()
                .bucket(container)
                .prefix(prefix);

            if let Some(max) = max_keys {
                req = req.max_keys(max.min(i32::MAX as usize) as i32);
            }
            if let Some(token) = continuation_token {
                req = req.continuation_token(token);
            }

            let output = req.send().await.map_err(ClientError::backend)?;

            for object in output.contents() {
                let Some(key) = object.key() else { continue };
                summaries.push(ObjectSummary {
                    key: key.to_string(),
                    last_modified: object.last_modified().and_then(Self::rfc3339),
                    size: object.size().unwrap_or(0).max(0) as u64,
                    etag: object.e_tag().map(Self::unquote),
                    content_type: None,
                });
            }

            if let Some(max) = max_keys {
                if summaries.len() >= max {
                    summaries.truncate(max);
                    break;
                }
            }

            continuation_token = output.next_continuation_token().map(|t| t.to_string());
            if continuation_token.is_none() {
                break;
            }
        }

        Ok(summaries)
    }

    async fn stat_object(&self, container: &str, key: &str) -> ClientResult<ObjectStat> {
        debug!("S3 HEAD: {}/{}", container, key);

        match self
            .client
            .head_object()
            .bucket(container)
            .key(key)
            .send()
            .await
        {
            Ok(output) => Ok(ObjectStat {
                size: output.content_length().unwrap_or(0).max(0) as u64,
                last_modified: output.last_modified().and_then(Self::rfc3339),
                etag: output.e_tag().map(Self::unquote),
                content_type: output.content_type().map(str::to_string),
                metadata: output
                    .metadata()
                    .map(|m| {
                        m.iter()
                            .map(|(k, v)| (k.clone(), v.clone()))
                            .collect::<HashMap<_, _>>()
                    })
                    .unwrap_or_default(),
            }),
            Err(err) => {
                if err.as_service_error().is_some_and(|svc| svc.is_not_found()) {
                    return Err(ClientError::NotFound);
                }
                Err(ClientError::backend(err))
            }
        }
    }

    async fn object_exists(&self, container: &str, key: &str) -> ClientResult<bool> {
        debug!("S3 HEAD (exists): {}/{}", container, key);

        match self
            .client
            .head_object()
            .bucket(container)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                // HEAD carries no error body, so a non-404 response (403 on
                // a restricted bucket, for instance) is indistinguishable
                // from absence for this probe; only transport failures are
                // surfaced.
                if err.as_service_error().is_some() {
                    Ok(false)
                } else {
                    Err(ClientError::backend(err))
                }
            }
        }
    }

    async fn container_exists(&self, container: &str) -> ClientResult<bool> {
        debug!("S3 HEAD BUCKET: {}", container);

        match self.client.head_bucket().bucket(container).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                // The caller may lack permission for bucket probes; fold
                // response-level failures into "missing" so resolution falls
                // through to the idempotent creation branch.
                if err.as_service_error().is_some() {
                    Ok(false)
                } else {
                    Err(ClientError::backend(err))
                }
            }
        }
    }

    async fn create_container(&self, container: &str, access: AccessPolicy) -> ClientResult<bool> {
        debug!("S3 CREATE BUCKET: {}", container);

        let mut req = self.client.create_bucket().bucket(container);

        if let Some(region) = self.region.as_deref().filter(|r| *r != "us-east-1") {
            req = req.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }
        if access == AccessPolicy::Public {
            req = req.acl(BucketCannedAcl::PublicRead);
        }

        match req.send().await {
            Ok(_) => {
                info!("Created S3 bucket: {}", container);
                Ok(true)
            }
            Err(err) => {
                let already_owned = err.as_service_error().is_some_and(|svc| {
                    svc.is_bucket_already_owned_by_you() || svc.is_bucket_already_exists()
                });
                if already_owned {
                    Ok(true)
                } else {
                    Err(ClientError::backend(err))
                }
            }
        }
    }
}
