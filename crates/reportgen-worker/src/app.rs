use std::sync::Arc;
use std::time::Duration;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use eyre::WrapErr;
use tokio_util::sync::CancellationToken;
use tracing::info;

use reportgen_engine::{
    GenerateUseCase, LifecycleUseCase, ReportProcessor, ReportTypeRegistry, TracingMetrics,
};
use reportgen_export::TemplateGenerator;
use reportgen_notify::SesNotifier;
use reportgen_queue::{ConsumerGroup, SqsQueue};
use reportgen_storage::{
    MemoryReportRepository, ReportRepository, S3ReportRepository, S3Uploader, client,
};

use crate::config::{StorageBackend, WorkerConfig};

pub async fn load_aws_config(config: &WorkerConfig) -> SdkConfig {
    let mut builder = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &config.aws.region {
        builder = builder.region(Region::new(region.clone()));
    }
    if let Some(profile) = &config.aws.profile {
        builder = builder.profile_name(profile);
    }
    builder.load().await
}

/// Wire the report pipeline from config.
pub fn build_processor(config: &WorkerConfig, sdk_config: &SdkConfig) -> eyre::Result<ReportProcessor> {
    let s3 = client::build_client(
        sdk_config,
        config.s3.endpoint.as_deref(),
        config.s3.force_path_style,
    );

    let repository: Arc<dyn ReportRepository> = match config.storage.backend {
        StorageBackend::S3 => Arc::new(S3ReportRepository::new(
            s3.clone(),
            config.storage.bucket.clone(),
            config.storage.prefix.clone(),
        )),
        StorageBackend::Memory => Arc::new(MemoryReportRepository::new()),
    };

    let heartbeat = Duration::from_secs(config.heartbeat_secs);
    let mut use_cases: Vec<Arc<dyn GenerateUseCase>> = Vec::new();
    for (report_type, generator_config) in &config.generators {
        let generator = TemplateGenerator::new(generator_config.clone())
            .wrap_err_with(|| format!("loading {report_type} templates"))?;
        use_cases.push(Arc::new(
            LifecycleUseCase::new(*report_type, Arc::new(generator), Arc::clone(&repository))
                .with_heartbeat(heartbeat),
        ));
    }
    let registry = ReportTypeRegistry::new(use_cases);
    info!(report_types = ?registry.report_types(), "report types registered");

    let ses = SesNotifier::client_for(&config.ses, sdk_config);
    let notifier = SesNotifier::new(config.ses.clone(), ses).wrap_err("configuring SES")?;

    Ok(ReportProcessor::new(
        Arc::new(registry),
        Arc::new(S3Uploader::new(s3)),
        Arc::new(notifier),
        Arc::new(TracingMetrics),
    ))
}

/// Run the consumer group until `cancel` fires and every worker has exited.
pub async fn run(config: WorkerConfig, cancel: CancellationToken) -> eyre::Result<()> {
    let sdk_config = load_aws_config(&config).await;
    let processor = build_processor(&config, &sdk_config)?;

    let queue = SqsQueue::connect(&sdk_config, &config.sqs)
        .await
        .wrap_err("connecting to SQS")?;

    ConsumerGroup::new(
        Arc::new(queue),
        Arc::new(processor),
        config.sqs.consumer_config(),
        config.sqs.number_of_processors,
    )
    .run(cancel)
    .await;

    Ok(())
}
