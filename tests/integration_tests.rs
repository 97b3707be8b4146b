use banks_etl::adapters::csv_file::decode_csv;
use banks_etl::config::toml_config::{
    ExtractConfig, LoadConfig, LoggingConfig, SourceConfig, TomlConfig, TransformConfig,
};
use banks_etl::utils::logger;
use banks_etl::{
    BanksPipeline, EtlEngine, EtlError, LocalStorage, SqliteStore, Stage, StageStatus,
};
use httpmock::prelude::*;
use std::path::Path;
use tempfile::TempDir;
use tracing::instrument::WithSubscriber;

const RATES: &str = "Currency,Rate\nEUR,0.93\nGBP,0.8\nINR,82.95\n";

fn ranking_page(count: usize) -> String {
    let rows: String = (1..=count)
        .map(|i| {
            format!(
                r#"<tr>
<td>{i}</td>
<td><span class="flagicon"><a href="/wiki/Country_{i}"><img alt="" src="flag.png"></a></span> <a href="/wiki/Bank_{i}" title="Bank {i}">Bank {i}</a></td>
<td>{},{:03}.25
</td>
</tr>"#,
                count + 1 - i,
                i
            )
        })
        .collect();
    format!(
        r#"<!DOCTYPE html><html><head><title>List of largest banks</title></head><body>
<h2>By market capitalization</h2>
<table class="wikitable sortable">
<tbody>
<tr><th>Rank</th><th>Bank name</th><th>Market cap<br>(US$ billion)</th></tr>
{}
</tbody>
</table>
<table class="wikitable"><tbody><tr><th>Rank</th></tr><tr><td>by assets</td></tr></tbody></table>
</body></html>"#,
        rows
    )
}

fn test_config(dir: &Path, url: String) -> TomlConfig {
    let path = |name: &str| dir.join(name).to_str().unwrap().to_string();
    TomlConfig {
        source: SourceConfig {
            url,
            timeout_seconds: 5,
        },
        extract: ExtractConfig::default(),
        transform: TransformConfig {
            exchange_rate_path: path("exchange_rate.csv"),
        },
        load: LoadConfig {
            csv_path: path("Largest_banks_data.csv"),
            csv_index_column: true,
            database_path: path("Banks.db"),
            table_name: "Largest_banks".to_string(),
        },
        logging: LoggingConfig {
            log_file: path("code_log.txt"),
        },
    }
}

#[tokio::test]
async fn test_end_to_end_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("exchange_rate.csv"), RATES).unwrap();

    let server = MockServer::start();
    let page_mock = server.mock(|when, then| {
        when.method(GET).path("/wiki/List_of_largest_banks");
        then.status(200)
            .header("Content-Type", "text/html; charset=UTF-8")
            .body(ranking_page(15));
    });

    let config = test_config(temp_dir.path(), server.url("/wiki/List_of_largest_banks"));
    let pipeline = BanksPipeline::new(LocalStorage::default(), config).unwrap();
    let engine = EtlEngine::new(pipeline);

    let summary = engine.run().await;

    page_mock.assert();
    assert!(summary.is_success(), "summary: {:?}", summary);

    // CSV output
    let csv_data = std::fs::read(temp_dir.path().join("Largest_banks_data.csv")).unwrap();
    let csv_text = String::from_utf8(csv_data.clone()).unwrap();
    assert!(csv_text.starts_with(
        ",Name,MC_USD_Billion,MC_GBP_Billion,MC_EUR_Billion,MC_INR_Billion\n"
    ));
    let from_csv = decode_csv(&csv_data).unwrap();
    assert_eq!(from_csv.len(), 10);
    assert_eq!(from_csv[0].name, "Bank 1");
    assert_eq!(from_csv[0].mc_usd_billion, 15001.25);
    assert_eq!(from_csv[0].mc_gbp_billion, 12001.0);
    assert_eq!(from_csv[9].name, "Bank 10");

    // Database output matches the CSV
    let store = SqliteStore::new(temp_dir.path().join("Banks.db"));
    let from_db = store.read_table("Largest_banks").unwrap();
    assert_eq!(from_db, from_csv);
}

#[tokio::test]
async fn test_rerun_replaces_outputs() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("exchange_rate.csv"), RATES).unwrap();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/banks");
        then.status(200).body(ranking_page(10));
    });

    for _ in 0..2 {
        let config = test_config(temp_dir.path(), server.url("/banks"));
        let engine = EtlEngine::new(BanksPipeline::new(LocalStorage::default(), config).unwrap());
        assert!(engine.run().await.is_success());
    }

    let store = SqliteStore::new(temp_dir.path().join("Banks.db"));
    assert_eq!(store.read_table("Largest_banks").unwrap().len(), 10);

    let csv_data = std::fs::read(temp_dir.path().join("Largest_banks_data.csv")).unwrap();
    assert_eq!(decode_csv(&csv_data).unwrap().len(), 10);
}

#[tokio::test]
async fn test_missing_eur_rate_stops_before_loading() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("exchange_rate.csv"),
        "Currency,Rate\nGBP,0.8\nINR,82.95\n",
    )
    .unwrap();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/banks");
        then.status(200).body(ranking_page(10));
    });

    let config = test_config(temp_dir.path(), server.url("/banks"));
    let engine = EtlEngine::new(BanksPipeline::new(LocalStorage::default(), config).unwrap());
    let summary = engine.run().await;

    assert!(!summary.is_success());
    match summary.status(Stage::Transform) {
        Some(StageStatus::Failed(EtlError::MissingRateError { currency })) => {
            assert_eq!(currency, "EUR")
        }
        other => panic!("unexpected transform status: {:?}", other),
    }
    assert!(matches!(summary.status(Stage::LoadCsv), Some(StageStatus::Skipped)));
    assert!(matches!(summary.status(Stage::LoadDatabase), Some(StageStatus::Skipped)));
    assert!(matches!(summary.status(Stage::Report), Some(StageStatus::Skipped)));
    assert!(!temp_dir.path().join("Largest_banks_data.csv").exists());
}

#[tokio::test]
async fn test_broken_page_is_logged_and_run_completes() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("exchange_rate.csv"), RATES).unwrap();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/banks");
        then.status(200)
            .body("<html><body><table><tbody><tr><th>Rank</th></tr><tr><td>1</td><td>no links</td><td>1</td></tr></tbody></table></body></html>");
    });

    let config = test_config(temp_dir.path(), server.url("/banks"));
    let log_path = temp_dir.path().join("code_log.txt");
    let dispatch = logger::build_cli_logger(&log_path, false).unwrap();

    let engine = EtlEngine::new(BanksPipeline::new(LocalStorage::default(), config).unwrap());
    let summary = engine.run().with_subscriber(dispatch).await;

    assert_eq!(summary.first_failure().map(|(stage, _)| stage), Some(Stage::Extract));

    let log = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert!(lines[0].ends_with(" - INFO - ETL Pipeline Started"));
    assert!(lines
        .iter()
        .any(|l| l.contains(" - ERROR - Failed To Extract Data : Parse error:")));
    assert!(lines.last().unwrap().ends_with(" - INFO - ETL Pipeline Completed"));
}

#[tokio::test]
async fn test_unreachable_source_is_network_failure() {
    let temp_dir = TempDir::new().unwrap();
    // Nothing listens on port 9 (discard) in the test environment.
    let config = test_config(temp_dir.path(), "http://127.0.0.1:9/banks".to_string());
    let log_path = temp_dir.path().join("code_log.txt");
    let dispatch = logger::build_cli_logger(&log_path, false).unwrap();
    let engine = EtlEngine::new(BanksPipeline::new(LocalStorage::default(), config).unwrap());

    let summary = engine.run().with_subscriber(dispatch).await;

    assert!(matches!(
        summary.status(Stage::Extract),
        Some(StageStatus::Failed(EtlError::NetworkError(_)))
    ));
    assert!(!temp_dir.path().join("Banks.db").exists());

    // The connect failure sits below reqwest's own message.
    let log = std::fs::read_to_string(&log_path).unwrap();
    let line = log
        .lines()
        .find(|l| l.contains(" - ERROR - Failed To Extract Data : HTTP request failed:"))
        .unwrap();
    assert!(line.contains("Connect"), "cause missing from: {}", line);
}
