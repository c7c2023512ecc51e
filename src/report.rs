//! The report run: fetch → build → upload → notify

use crate::backends::{BackendFactory, Backends};
use crate::config::ReportConfig;
use crate::error::ReportResult;
use crate::pipeline::stages::{BuildStage, FetchStage, NotifyStage, UploadStage};
use crate::pipeline::{Pipeline, PipelineContext, PipelineResult};

/// Name the report pipeline runs under
pub const PIPELINE_NAME: &str = "mongodb-report";

/// Compose the four report stages over the given backends
pub fn build_pipeline(config: &ReportConfig, backends: Backends) -> Pipeline {
    Pipeline::builder(PIPELINE_NAME)
        .add_stage(FetchStage::new(backends.source, config.source.filter.clone()))
        .add_stage(BuildStage::new())
        .add_stage(UploadStage::new(
            backends.store,
            config.storage.bucket.clone(),
            config.storage.object_key.clone(),
        ))
        .add_stage(NotifyStage::new(
            backends.publisher,
            config.notification.topic_arn.clone(),
            config.notification.message_prefix.clone(),
        ))
        .build()
}

/// Run the report once against the live services
pub async fn run(config: &ReportConfig) -> ReportResult<PipelineResult> {
    let backends = BackendFactory::create(config).await;
    run_with(config, backends).await
}

/// Run the report once against the given backends
pub async fn run_with(config: &ReportConfig, backends: Backends) -> ReportResult<PipelineResult> {
    let pipeline = build_pipeline(config, backends);
    let mut context = PipelineContext::generate();
    pipeline.execute(&mut context).await
}
