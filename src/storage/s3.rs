//! S3-compatible object store backed by `aws-sdk-s3`.

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Builder, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::DateTime as SdkDateTime;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::store::{
    ListPage, ListRequest, ObjectBody, ObjectMeta, ObjectStore, StoreError, StoreResult,
};
use crate::config::BucketConfig;

/// One configured bucket on an S3-compatible service.
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Build a client for `config` with static credentials.
    pub fn new(config: &BucketConfig) -> Self {
        debug!(
            bucket = %config.bucket_name,
            endpoint = config.endpoint_url.as_deref().unwrap_or("aws"),
            region = %config.region,
            "Creating S3 client"
        );

        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "s3nav-config",
        );

        let mut builder = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(config.path_style_access);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket_name.clone(),
        }
    }

    fn copy_source(&self, key: &str) -> String {
        // Slashes stay literal; everything else is percent-encoded.
        let encoded = urlencoding::encode(key).replace("%2F", "/");
        format!("{}/{}", self.bucket, encoded)
    }
}

fn to_chrono(value: Option<&SdkDateTime>) -> Option<DateTime<Utc>> {
    value.and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()))
}

fn backend_error<E, R>(err: SdkError<E, R>) -> StoreError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    StoreError::Backend(DisplayErrorContext(&err).to_string())
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list(&self, request: ListRequest) -> StoreResult<ListPage> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(&request.prefix)
            .set_delimiter(request.delimiter)
            .set_continuation_token(request.continuation_token)
            .max_keys(i32::try_from(request.max_keys).unwrap_or(i32::MAX))
            .send()
            .await
            .map_err(backend_error)?;

        let objects = output
            .contents()
            .iter()
            .filter_map(|object| {
                Some(ObjectMeta {
                    key: object.key()?.to_string(),
                    size: object.size().unwrap_or(0).max(0) as u64,
                    last_modified: to_chrono(object.last_modified()),
                    content_type: None,
                })
            })
            .collect();

        let common_prefixes = output
            .common_prefixes()
            .iter()
            .filter_map(|cp| cp.prefix().map(str::to_string))
            .collect();

        Ok(ListPage {
            objects,
            common_prefixes,
            next_token: output.next_continuation_token().map(str::to_string),
        })
    }

    async fn head(&self, key: &str) -> StoreResult<Option<ObjectMeta>> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => Ok(Some(ObjectMeta {
                key: key.to_string(),
                size: output.content_length().unwrap_or(0).max(0) as u64,
                last_modified: to_chrono(output.last_modified()),
                content_type: output.content_type().map(str::to_string),
            })),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => Ok(None),
            Err(err) => Err(backend_error(err)),
        }
    }

    async fn get(&self, key: &str) -> StoreResult<ObjectBody> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) if err.as_service_error().is_some_and(|e| e.is_no_such_key()) => {
                return Err(StoreError::NotFound(key.to_string()));
            }
            Err(err) => return Err(backend_error(err)),
        };

        let content_type = output.content_type().map(str::to_string);
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .into_bytes()
            .to_vec();

        Ok(ObjectBody {
            bytes,
            content_type,
        })
    }

    async fn copy(&self, source: &str, target: &str) -> StoreResult<()> {
        match self
            .client
            .copy_object()
            .copy_source(self.copy_source(source))
            .bucket(&self.bucket)
            .key(target)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if err.as_service_error().and_then(|e| e.code()) == Some("NoSuchKey") => {
                Err(StoreError::NotFound(source.to_string()))
            }
            Err(err) => Err(backend_error(err)),
        }
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    async fn delete_many(&self, keys: &[String]) -> StoreResult<Vec<String>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let identifiers = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .quiet(false)
            .build()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let output = self
            .client
            .delete_objects()
            .bucket(&self.bucket)
            .delete(delete)
            .send()
            .await
            .map_err(backend_error)?;

        for error in output.errors() {
            debug!(
                key = error.key().unwrap_or_default(),
                code = error.code().unwrap_or_default(),
                "Object not deleted"
            );
        }

        Ok(output
            .deleted()
            .iter()
            .filter_map(|deleted| deleted.key().map(str::to_string))
            .collect())
    }
}
