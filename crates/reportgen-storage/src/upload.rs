use aws_sdk_s3::Client;
use aws_smithy_types::byte_stream::ByteStream;

use reportgen_core::generator::BoxFuture;
use reportgen_core::models::report::FileInfo;

use crate::error::UploadError;
use crate::objects;

/// Ships report files to their destination.
pub trait Uploader: Send + Sync {
    /// Upload every file, stopping at the first failure.
    fn upload<'a>(&'a self, files: &'a [FileInfo]) -> BoxFuture<'a, Result<(), UploadError>>;
}

/// Uploads each file to `dest_bucket/dest_path` with a content type guessed
/// from the file extension.
#[derive(Clone)]
pub struct S3Uploader {
    client: Client,
}

impl S3Uploader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn upload_file(&self, file: &FileInfo) -> Result<(), UploadError> {
        let body = tokio::fs::read(&file.local_path)
            .await
            .map_err(|source| UploadError::OpenFile {
                path: file.local_path.display().to_string(),
                source,
            })?;

        let content_type = mime_guess::from_path(&file.local_path).first_raw();

        tracing::trace!(bucket = %file.dest_bucket, key = %file.dest_path, "uploading file");
        objects::put(
            &self.client,
            &file.dest_bucket,
            &file.dest_path,
            ByteStream::from(body),
            content_type,
        )
        .await
        .map_err(|source| UploadError::Put {
            bucket: file.dest_bucket.clone(),
            key: file.dest_path.clone(),
            source,
        })?;

        Ok(())
    }
}

impl Uploader for S3Uploader {
    fn upload<'a>(&'a self, files: &'a [FileInfo]) -> BoxFuture<'a, Result<(), UploadError>> {
        Box::pin(async move {
            for file in files {
                self.upload_file(file).await?;
            }
            Ok(())
        })
    }
}
