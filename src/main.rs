use mongo_report::{logger, report, ReportConfig};
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = match ReportConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            logger::init(logger::LogLevel::default());
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logger::init(config.log_level);

    match report::run(&config).await {
        Ok(result) => {
            match result.to_json() {
                Ok(summary) => info!(target: "report", "Run summary: {}", summary),
                Err(e) => error!(target: "report", "Could not render run summary: {}", e),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(target: "report", kind = e.kind(), "Report run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
