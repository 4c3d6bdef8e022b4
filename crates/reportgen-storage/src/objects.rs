use aws_sdk_s3::Client;
use aws_smithy_types::byte_stream::ByteStream;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::StorageError;

const JSON: &str = "application/json";

/// Fetch an object body. `StorageError::NotFound` when the key is absent.
pub async fn get_bytes(client: &Client, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
    let resp = client
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| match e.into_service_error() {
            err if err.is_no_such_key() => StorageError::NotFound {
                key: key.to_string(),
            },
            err => StorageError::GetObject(err.to_string()),
        })?;

    let data = resp
        .body
        .collect()
        .await
        .map_err(|e| StorageError::GetObject(e.to_string()))?;
    Ok(data.into_bytes().to_vec())
}

pub async fn put(
    client: &Client,
    bucket: &str,
    key: &str,
    body: ByteStream,
    content_type: Option<&str>,
) -> Result<(), StorageError> {
    client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(body)
        .set_content_type(content_type.map(str::to_string))
        .send()
        .await
        .map_err(|e| StorageError::PutObject(e.into_service_error().to_string()))?;
    Ok(())
}

/// Load and decode a JSON document. `Ok(None)` when the key is absent.
pub async fn load_json<T: DeserializeOwned>(
    client: &Client,
    bucket: &str,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match get_bytes(client, bucket, key).await {
        Ok(body) => Ok(Some(serde_json::from_slice(&body)?)),
        Err(StorageError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

pub async fn save_json<T: Serialize>(
    client: &Client,
    bucket: &str,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let body = serde_json::to_vec_pretty(value)?;
    put(client, bucket, key, ByteStream::from(body), Some(JSON)).await
}
