use crate::error::ReportResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::time::Duration;

use super::context::PipelineContext;

/// A single stage in a pipeline
///
/// Each stage takes its input from the pipeline context and leaves its output there
/// for the next stage. Stages are executed sequentially by the pipeline executor.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use mongo_report::error::ReportResult;
/// use mongo_report::pipeline::{PipelineContext, PipelineStage};
///
/// struct Announce;
///
/// #[async_trait]
/// impl PipelineStage for Announce {
///     async fn execute(&self, context: &mut PipelineContext) -> ReportResult<()> {
///         context.set_metadata("announced", "yes");
///         Ok(())
///     }
///
///     fn name(&self) -> &str {
///         "Announce"
///     }
/// }
/// ```
#[async_trait]
pub trait PipelineStage: Send + Sync {
    /// Execute this stage
    ///
    /// If the stage fails, the error stops the pipeline and is returned to the caller as is.
    async fn execute(&self, context: &mut PipelineContext) -> ReportResult<()>;

    /// Get stage name for logging and progress tracking
    fn name(&self) -> &str;

    /// Called before execute() - useful for validating preconditions
    fn pre_execute(&self, _context: &PipelineContext) -> ReportResult<()> {
        Ok(())
    }
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Result of a pipeline stage execution
#[derive(Debug, Clone, Serialize)]
pub struct StageResult {
    /// Stage name
    pub stage_name: String,

    /// Duration of execution
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

impl StageResult {
    pub fn new(stage_name: impl Into<String>, duration: Duration) -> Self {
        Self {
            stage_name: stage_name.into(),
            duration,
        }
    }
}

/// Result of a complete, successful pipeline execution
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    /// Pipeline name
    pub pipeline_name: String,

    /// Identifier of this run
    pub run_id: String,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Results from each stage, in execution order
    pub stage_results: Vec<StageResult>,

    /// Total duration
    #[serde(rename = "total_duration_ms", serialize_with = "as_millis")]
    pub total_duration: Duration,

    /// Download link of the published report, if a stage produced one
    pub report_url: Option<String>,
}

impl PipelineResult {
    /// Get the number of stages that were executed
    pub fn executed_stages(&self) -> usize {
        self.stage_results.len()
    }

    /// Look up the result of a stage by name
    pub fn stage(&self, name: &str) -> Option<&StageResult> {
        self.stage_results.iter().find(|r| r.stage_name == name)
    }

    /// Render the run summary as JSON
    pub fn to_json(&self) -> ReportResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> PipelineResult {
        PipelineResult {
            pipeline_name: "Test Pipeline".to_string(),
            run_id: "run-1".to_string(),
            started_at: Utc::now(),
            stage_results: vec![
                StageResult::new("Stage 1", Duration::from_millis(1500)),
                StageResult::new("Stage 2", Duration::from_secs(2)),
            ],
            total_duration: Duration::from_millis(3500),
            report_url: Some("https://reports.s3.amazonaws.com/data.xlsx".to_string()),
        }
    }

    #[test]
    fn test_stage_result() {
        let result = StageResult::new("Test Stage", Duration::from_secs(1));
        assert_eq!(result.stage_name, "Test Stage");
        assert_eq!(result.duration, Duration::from_secs(1));
    }

    #[test]
    fn test_pipeline_result_lookup() {
        let result = sample_result();
        assert_eq!(result.executed_stages(), 2);
        assert_eq!(
            result.stage("Stage 2").unwrap().duration,
            Duration::from_secs(2)
        );
        assert!(result.stage("Stage 3").is_none());
    }

    #[test]
    fn test_pipeline_result_json() {
        let json = sample_result().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["run_id"], "run-1");
        assert_eq!(value["total_duration_ms"], 3500);
        assert_eq!(value["stage_results"][0]["duration_ms"], 1500);
        assert_eq!(
            value["report_url"],
            "https://reports.s3.amazonaws.com/data.xlsx"
        );
    }
}
