//! Sequential stage pipeline
//!
//! A pipeline is an ordered list of stages sharing one [`PipelineContext`]. Each stage
//! takes what the previous stage left in the context and leaves its own output for the
//! next one. The first failure stops the run.
//!
//! # Example
//! ```
//! use async_trait::async_trait;
//! use mongo_report::error::ReportResult;
//! use mongo_report::pipeline::{Pipeline, PipelineContext, PipelineStage};
//!
//! struct Stamp;
//!
//! #[async_trait]
//! impl PipelineStage for Stamp {
//!     async fn execute(&self, context: &mut PipelineContext) -> ReportResult<()> {
//!         context.set_report_url("https://example.s3.amazonaws.com/data.xlsx");
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Stamp"
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let pipeline = Pipeline::builder("my-pipeline").add_stage(Stamp).build();
//!
//! let mut context = PipelineContext::new("run-123");
//! let result = pipeline.execute(&mut context).await.unwrap();
//! assert_eq!(result.executed_stages(), 1);
//! # }
//! ```

pub mod context;
pub mod core;
pub mod executor;
pub mod stages;

// Re-export main types
pub use context::PipelineContext;
pub use core::{PipelineResult, PipelineStage, StageResult};
pub use executor::{Pipeline, PipelineBuilder};
