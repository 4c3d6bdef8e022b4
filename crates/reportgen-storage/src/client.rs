use aws_sdk_s3::Client;

/// Build an S3 client from a loaded SDK config.
///
/// `endpoint` overrides the regional endpoint (MinIO, LocalStack);
/// `force_path_style` is usually needed alongside it.
pub fn build_client(
    sdk_config: &aws_config::SdkConfig,
    endpoint: Option<&str>,
    force_path_style: bool,
) -> Client {
    let mut builder = aws_sdk_s3::config::Builder::from(sdk_config).force_path_style(force_path_style);
    if let Some(url) = endpoint {
        builder = builder.endpoint_url(url);
    }
    Client::from_conf(builder.build())
}
