use anyhow::Context;
use banks_etl::core::{etl::abort_run, ConfigProvider};
use banks_etl::utils::error::ErrorSeverity;
use banks_etl::utils::{logger, validation::Validate};
use banks_etl::{BanksPipeline, CliConfig, EtlEngine, LocalStorage, RunSummary, TomlConfig};
use clap::Parser;
use tracing::instrument::WithSubscriber;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let exit_code = match cli.config.clone() {
        Some(path) => {
            let config = TomlConfig::from_file(&path)
                .with_context(|| format!("failed to load config file '{}'", path))?;
            run(config, cli.verbose, cli.strict).await?
        }
        None => {
            let (verbose, strict) = (cli.verbose, cli.strict);
            run(cli, verbose, strict).await?
        }
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

async fn run<C>(config: C, verbose: bool, strict: bool) -> anyhow::Result<i32>
where
    C: ConfigProvider + Validate + 'static,
{
    // 驗證配置
    if let Err(e) = config.validate() {
        eprintln!("❌ Configuration validation failed: {}", e);
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        return Ok(1);
    }

    // 初始化日誌
    let dispatch = logger::build_cli_logger(config.log_file(), verbose)
        .with_context(|| format!("failed to open log file '{}'", config.log_file()))?;
    let _guard = tracing::dispatcher::set_default(&dispatch);

    // 創建存儲和管道
    let pipeline = match BanksPipeline::new(LocalStorage::default(), config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            abort_run(e.with_causes());
            return Ok(if strict { 1 } else { 0 });
        }
    };
    let engine = EtlEngine::new(pipeline);

    // 在獨立任務中執行，panic 也只記錄不中斷
    let handle = tokio::spawn(async move { engine.run().await }.with_subscriber(dispatch.clone()));
    let summary = match handle.await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Exception : {}", e);
            tracing::info!("ETL Pipeline Completed");
            return Ok(if strict { 1 } else { 0 });
        }
    };

    Ok(exit_code(&summary, strict))
}

fn exit_code(summary: &RunSummary, strict: bool) -> i32 {
    let Some((stage, error)) = summary.first_failure() else {
        return 0;
    };

    tracing::debug!(
        "First failure in {}: {} (Category: {:?}, Severity: {:?})",
        stage,
        error,
        error.category(),
        error.severity()
    );
    eprintln!("❌ ETL stage '{}' failed: {}", stage, error);
    eprintln!("💡 建議: {}", error.recovery_suggestion());

    if !strict {
        return 0;
    }

    // 根據錯誤嚴重程度決定退出碼
    match error.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
