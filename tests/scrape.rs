//! Integration tests for scraping a running exporter.
//!
//! These run without a relay database: the exporter is pointed at a port
//! that refuses connections, which exercises the failed-scrape path end to end.

mod common;

use common::TestExporter;
use common::exporter::{free_port, unreachable_db_vars};
use std::io::Write;

/// Config file that keeps failing scrapes short.
fn fast_timeout_config() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create config file");
    writeln!(file, "[collector]\nquery_timeout_secs = 1").expect("Failed to write config file");
    file
}

#[tokio::test]
async fn test_unreachable_database_fails_scrape_without_samples() {
    let config = fast_timeout_config();
    let exporter = TestExporter::spawn(free_port(), unreachable_db_vars(), Some(config.path()))
        .await
        .expect("Failed to spawn exporter");

    let response = reqwest::get(exporter.metrics_url())
        .await
        .expect("Failed to scrape");

    assert_eq!(
        response.status(),
        reqwest::StatusCode::INTERNAL_SERVER_ERROR
    );
    let body = response.text().await.expect("Failed to read body");
    // Only the error code reaches the client.
    assert!(
        matches!(
            body.as_str(),
            "scrape failed: timeout\n" | "scrape failed: database\n"
        ),
        "unexpected body: {body}"
    );
    assert!(!body.contains("events{"), "unexpected samples: {body}");
    assert!(
        !body.contains("admitted_users"),
        "unexpected samples: {body}"
    );
}

#[tokio::test]
async fn test_exporter_survives_failed_scrapes() {
    let config = fast_timeout_config();
    let exporter = TestExporter::spawn(free_port(), unreachable_db_vars(), Some(config.path()))
        .await
        .expect("Failed to spawn exporter");

    for _ in 0..3 {
        let response = reqwest::get(exporter.metrics_url())
            .await
            .expect("exporter stopped answering after a failed scrape");
        assert!(response.status().is_server_error());
    }
}
