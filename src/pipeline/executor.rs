use super::context::PipelineContext;
use super::core::{PipelineResult, PipelineStage, StageResult};
use crate::error::ReportResult;
use std::time::Instant;
use tracing::{error, info};

/// Pipeline executor that runs stages sequentially
///
/// # Example
/// ```ignore
/// use mongo_report::pipeline::{Pipeline, PipelineContext};
///
/// let pipeline = Pipeline::builder("my-pipeline")
///     .add_stage(Stage1::new())
///     .add_stage(Stage2::new())
///     .build();
///
/// let mut context = PipelineContext::generate();
/// let result = pipeline.execute(&mut context).await?;
/// ```
pub struct Pipeline {
    name: String,
    stages: Vec<Box<dyn PipelineStage>>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder(name: impl Into<String>) -> PipelineBuilder {
        PipelineBuilder::new(name)
    }

    /// Get the pipeline name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of stages
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Execute the pipeline
    ///
    /// Stages are executed sequentially. The first stage that fails stops the pipeline and
    /// its error is returned unchanged; no later stage runs and nothing is undone.
    pub async fn execute(&self, context: &mut PipelineContext) -> ReportResult<PipelineResult> {
        info!(
            target: "pipeline",
            "Starting pipeline '{}' with {} stages (run: {})",
            self.name,
            self.stages.len(),
            context.run_id()
        );

        let pipeline_start = Instant::now();
        let mut stage_results = Vec::with_capacity(self.stages.len());

        context.set_metadata("pipeline_name", &self.name);

        for (index, stage) in self.stages.iter().enumerate() {
            let stage_name = stage.name();

            info!(
                target: "pipeline",
                "Executing stage {}/{}: {} (run: {})",
                index + 1,
                self.stages.len(),
                stage_name,
                context.run_id()
            );

            let stage_start = Instant::now();

            if let Err(e) = stage.pre_execute(context) {
                error!(
                    target: "pipeline",
                    "Stage '{}' pre-execute failed: {} (run: {})",
                    stage_name,
                    e,
                    context.run_id()
                );
                return Err(e);
            }

            if let Err(e) = stage.execute(context).await {
                error!(
                    target: "pipeline",
                    "Stage '{}' failed after {:.2}s: {} (run: {})",
                    stage_name,
                    stage_start.elapsed().as_secs_f64(),
                    e,
                    context.run_id()
                );
                return Err(e);
            }

            let duration = stage_start.elapsed();
            info!(
                target: "pipeline",
                "Stage '{}' completed successfully in {:.2}s (run: {})",
                stage_name,
                duration.as_secs_f64(),
                context.run_id()
            );

            stage_results.push(StageResult::new(stage_name, duration));
        }

        let total_duration = pipeline_start.elapsed();
        info!(
            target: "pipeline",
            "Pipeline '{}' completed successfully in {:.2}s (run: {})",
            self.name,
            total_duration.as_secs_f64(),
            context.run_id()
        );

        Ok(PipelineResult {
            pipeline_name: self.name.clone(),
            run_id: context.run_id().to_string(),
            started_at: context.started_at(),
            stage_results,
            total_duration,
            report_url: context.report_url().map(str::to_string),
        })
    }
}

/// Builder for constructing pipelines
pub struct PipelineBuilder {
    name: String,
    stages: Vec<Box<dyn PipelineStage>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
        }
    }

    /// Add a stage to the pipeline
    pub fn add_stage<S: PipelineStage + 'static>(mut self, stage: S) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Add a boxed stage to the pipeline
    pub fn add_boxed_stage(mut self, stage: Box<dyn PipelineStage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline {
            name: self.name,
            stages: self.stages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;
    use async_trait::async_trait;

    // Test stage that succeeds
    struct SuccessStage {
        name: String,
    }

    impl SuccessStage {
        fn new(name: impl Into<String>) -> Self {
            Self { name: name.into() }
        }
    }

    #[async_trait]
    impl PipelineStage for SuccessStage {
        async fn execute(&self, context: &mut PipelineContext) -> ReportResult<()> {
            context.set_metadata(self.name.clone(), "executed");
            Ok(())
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    // Test stage that fails
    struct FailStage {
        name: String,
    }

    impl FailStage {
        fn new(name: impl Into<String>) -> Self {
            Self { name: name.into() }
        }
    }

    #[async_trait]
    impl PipelineStage for FailStage {
        async fn execute(&self, _context: &mut PipelineContext) -> ReportResult<()> {
            Err(ReportError::UploadFailed("connection refused".to_string()))
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    // Test stage whose precondition never holds
    struct RejectingStage;

    #[async_trait]
    impl PipelineStage for RejectingStage {
        async fn execute(&self, context: &mut PipelineContext) -> ReportResult<()> {
            context.set_metadata("rejecting", "executed");
            Ok(())
        }

        fn name(&self) -> &str {
            "rejecting"
        }

        fn pre_execute(&self, _context: &PipelineContext) -> ReportResult<()> {
            Err(ReportError::EmptyInput)
        }
    }

    #[tokio::test]
    async fn test_pipeline_success() {
        let pipeline = Pipeline::builder("test-pipeline")
            .add_stage(SuccessStage::new("stage1"))
            .add_stage(SuccessStage::new("stage2"))
            .build();

        let mut context = PipelineContext::new("run-123");
        let result = pipeline.execute(&mut context).await.unwrap();

        assert_eq!(result.stage_results.len(), 2);
        assert_eq!(result.executed_stages(), 2);
        assert_eq!(result.run_id, "run-123");
        assert!(result.report_url.is_none());
        assert_eq!(context.get_metadata("stage1"), Some("executed"));
        assert_eq!(context.get_metadata("stage2"), Some("executed"));
        assert_eq!(context.get_metadata("pipeline_name"), Some("test-pipeline"));
    }

    #[tokio::test]
    async fn test_pipeline_failure_returns_stage_error() {
        let pipeline = Pipeline::builder("test-pipeline")
            .add_stage(SuccessStage::new("stage1"))
            .add_stage(FailStage::new("stage2"))
            .add_stage(SuccessStage::new("stage3"))
            .build();

        let mut context = PipelineContext::new("run-123");
        let result = pipeline.execute(&mut context).await;

        assert!(matches!(result, Err(ReportError::UploadFailed(_))));
        assert_eq!(context.get_metadata("stage1"), Some("executed"));
        assert!(context.get_metadata("stage3").is_none()); // Stage 3 never executed
    }

    #[tokio::test]
    async fn test_pre_execute_failure_skips_execute() {
        let pipeline = Pipeline::builder("test-pipeline")
            .add_stage(RejectingStage)
            .add_stage(SuccessStage::new("stage2"))
            .build();

        let mut context = PipelineContext::new("run-123");
        let result = pipeline.execute(&mut context).await;

        assert!(matches!(result, Err(ReportError::EmptyInput)));
        assert!(context.get_metadata("rejecting").is_none());
        assert!(context.get_metadata("stage2").is_none());
    }

    #[test]
    fn test_builder_stage_order() {
        let pipeline = Pipeline::builder("ordered")
            .add_stage(SuccessStage::new("first"))
            .add_boxed_stage(Box::new(SuccessStage::new("second")))
            .build();

        assert_eq!(pipeline.name(), "ordered");
        assert_eq!(pipeline.stage_count(), 2);
        assert_eq!(pipeline.stage_names(), vec!["first", "second"]);
    }
}
