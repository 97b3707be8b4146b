use crate::core::Pipeline;
use crate::utils::error::EtlError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Transform,
    LoadCsv,
    LoadDatabase,
    Report,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extract => "extract",
            Stage::Transform => "transform",
            Stage::LoadCsv => "load to csv",
            Stage::LoadDatabase => "load to database",
            Stage::Report => "run queries",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum StageStatus {
    Completed,
    Failed(EtlError),
    Skipped,
}

#[derive(Debug)]
pub struct StageReport {
    pub stage: Stage,
    pub status: StageStatus,
}

/// Outcome of every stage of one run, in execution order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub stages: Vec<StageReport>,
}

impl RunSummary {
    fn record(&mut self, stage: Stage, status: StageStatus) {
        self.stages.push(StageReport { stage, status });
    }

    fn skip(&mut self, stage: Stage, reason: &str) {
        tracing::error!("Skipping {}: {}", stage, reason);
        self.record(stage, StageStatus::Skipped);
    }

    pub fn status(&self, stage: Stage) -> Option<&StageStatus> {
        self.stages
            .iter()
            .find(|report| report.stage == stage)
            .map(|report| &report.status)
    }

    pub fn is_success(&self) -> bool {
        self.stages
            .iter()
            .all(|report| matches!(report.status, StageStatus::Completed))
    }

    pub fn first_failure(&self) -> Option<(Stage, &EtlError)> {
        self.stages.iter().find_map(|report| match &report.status {
            StageStatus::Failed(e) => Some((report.stage, e)),
            _ => None,
        })
    }
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs extract, transform, both loads and the reports in order. A stage
    /// runs only when the stages it reads from completed; the CSV and database
    /// loads do not depend on each other.
    pub async fn run(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        tracing::info!("ETL Pipeline Started");

        let extracted = match self.pipeline.extract().await {
            Ok(records) => {
                tracing::debug!("Extracted {} records", records.len());
                summary.record(Stage::Extract, StageStatus::Completed);
                Some(records)
            }
            Err(e) => {
                summary.record(Stage::Extract, StageStatus::Failed(e));
                None
            }
        };

        let transformed = match extracted {
            Some(records) => match self.pipeline.transform(records).await {
                Ok(final_records) => {
                    tracing::debug!("Transformed {} records", final_records.len());
                    summary.record(Stage::Transform, StageStatus::Completed);
                    Some(final_records)
                }
                Err(e) => {
                    summary.record(Stage::Transform, StageStatus::Failed(e));
                    None
                }
            },
            None => {
                summary.skip(Stage::Transform, "no extracted data");
                None
            }
        };

        let mut table_written = false;
        match &transformed {
            Some(final_records) => {
                let status = match self.pipeline.load_csv(final_records).await {
                    Ok(()) => StageStatus::Completed,
                    Err(e) => StageStatus::Failed(e),
                };
                summary.record(Stage::LoadCsv, status);

                let status = match self.pipeline.load_database(final_records).await {
                    Ok(()) => {
                        table_written = true;
                        StageStatus::Completed
                    }
                    Err(e) => StageStatus::Failed(e),
                };
                summary.record(Stage::LoadDatabase, status);
            }
            None => {
                summary.skip(Stage::LoadCsv, "no transformed data");
                summary.skip(Stage::LoadDatabase, "no transformed data");
            }
        }

        if table_written {
            let status = match self.pipeline.report().await {
                Ok(()) => StageStatus::Completed,
                Err(e) => StageStatus::Failed(e),
            };
            summary.record(Stage::Report, status);
        } else {
            summary.skip(Stage::Report, "database table was not written");
        }

        tracing::info!("ETL Pipeline Completed");
        summary
    }
}

/// Logs a run that died before or outside `EtlEngine::run` with the same
/// start and end lines a normal run writes.
pub fn abort_run(reason: impl fmt::Display) {
    tracing::info!("ETL Pipeline Started");
    tracing::error!("Exception : {}", reason);
    tracing::info!("ETL Pipeline Completed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BankRecord, FinalRecord};
    use crate::utils::error::Result;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedPipeline {
        fail: Vec<Stage>,
        calls: Mutex<Vec<Stage>>,
    }

    impl ScriptedPipeline {
        fn failing(stages: &[Stage]) -> Self {
            Self {
                fail: stages.to_vec(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn step(&self, stage: Stage) -> Result<()> {
            self.calls.lock().unwrap().push(stage);
            if self.fail.contains(&stage) {
                Err(EtlError::parse(format!("{} failed", stage)))
            } else {
                Ok(())
            }
        }

        fn calls(&self) -> Vec<Stage> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for ScriptedPipeline {
        async fn extract(&self) -> Result<Vec<BankRecord>> {
            self.step(Stage::Extract)?;
            Ok(vec![BankRecord {
                name: "Bank A".to_string(),
                mc_usd_billion: 100.0,
            }])
        }

        async fn transform(&self, records: Vec<BankRecord>) -> Result<Vec<FinalRecord>> {
            self.step(Stage::Transform)?;
            Ok(records
                .into_iter()
                .map(|r| FinalRecord {
                    name: r.name,
                    mc_usd_billion: r.mc_usd_billion,
                    mc_gbp_billion: 0.0,
                    mc_eur_billion: 0.0,
                    mc_inr_billion: 0.0,
                })
                .collect())
        }

        async fn load_csv(&self, _records: &[FinalRecord]) -> Result<()> {
            self.step(Stage::LoadCsv)
        }

        async fn load_database(&self, _records: &[FinalRecord]) -> Result<()> {
            self.step(Stage::LoadDatabase)
        }

        async fn report(&self) -> Result<()> {
            self.step(Stage::Report)
        }
    }

    #[tokio::test]
    async fn test_all_stages_run_in_order() {
        let engine = EtlEngine::new(ScriptedPipeline::default());
        let summary = engine.run().await;

        assert!(summary.is_success());
        assert_eq!(
            engine.pipeline.calls(),
            vec![
                Stage::Extract,
                Stage::Transform,
                Stage::LoadCsv,
                Stage::LoadDatabase,
                Stage::Report
            ]
        );
    }

    #[tokio::test]
    async fn test_extract_failure_skips_downstream() {
        let engine = EtlEngine::new(ScriptedPipeline::failing(&[Stage::Extract]));
        let summary = engine.run().await;

        assert!(!summary.is_success());
        assert_eq!(engine.pipeline.calls(), vec![Stage::Extract]);
        assert!(matches!(summary.status(Stage::Transform), Some(StageStatus::Skipped)));
        assert!(matches!(summary.status(Stage::Report), Some(StageStatus::Skipped)));
        assert_eq!(summary.first_failure().map(|(s, _)| s), Some(Stage::Extract));
        assert_eq!(summary.stages.len(), 5);
    }

    #[tokio::test]
    async fn test_csv_failure_does_not_block_database() {
        let engine = EtlEngine::new(ScriptedPipeline::failing(&[Stage::LoadCsv]));
        let summary = engine.run().await;

        assert!(matches!(summary.status(Stage::LoadCsv), Some(StageStatus::Failed(_))));
        assert!(matches!(summary.status(Stage::LoadDatabase), Some(StageStatus::Completed)));
        assert!(matches!(summary.status(Stage::Report), Some(StageStatus::Completed)));
    }

    #[tokio::test]
    async fn test_database_failure_skips_reports() {
        let engine = EtlEngine::new(ScriptedPipeline::failing(&[Stage::LoadDatabase]));
        let summary = engine.run().await;

        assert!(!engine.pipeline.calls().contains(&Stage::Report));
        assert!(matches!(summary.status(Stage::Report), Some(StageStatus::Skipped)));
        assert_eq!(summary.first_failure().map(|(s, _)| s), Some(Stage::LoadDatabase));
    }

    #[test]
    fn test_abort_run_logs_start_exception_and_end() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let log_path = temp_dir.path().join("code_log.txt");
        let dispatch = crate::utils::logger::build_cli_logger(&log_path, false).unwrap();

        tracing::dispatcher::with_default(&dispatch, || {
            abort_run(EtlError::parse("client setup failed").with_causes())
        });

        let log = std::fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with(" - INFO - ETL Pipeline Started"));
        assert!(lines[1].ends_with(" - ERROR - Exception : Parse error: client setup failed"));
        assert!(lines[2].ends_with(" - INFO - ETL Pipeline Completed"));
    }
}
