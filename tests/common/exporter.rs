//! Test exporter management.
//!
//! Spawns nostream-exporter instances for integration testing.

#![allow(dead_code)]

use std::net::TcpListener;
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use std::time::Duration;
use tokio::time::sleep;

/// Path to the compiled exporter binary.
pub fn binary() -> &'static str {
    env!("CARGO_BIN_EXE_nostream-exporter")
}

/// Find a free local port.
pub fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .map(|addr| addr.port())
        .expect("no free port")
}

/// Exporter command with a clean environment and the given variables set.
pub fn command(vars: &[(&str, String)]) -> Command {
    let mut cmd = Command::new(binary());
    cmd.env_clear()
        .env("RUST_LOG", "warn")
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    for (key, value) in vars {
        cmd.env(key, value);
    }
    cmd
}

/// Database variables pointing at a local port where nothing listens.
pub fn unreachable_db_vars() -> Vec<(&'static str, String)> {
    vec![
        ("DB_HOST", "127.0.0.1".to_string()),
        ("DB_PORT", free_port().to_string()),
        ("DB_NAME", "nostr_ts_relay".to_string()),
        ("DB_USER", "nostr_ts_relay".to_string()),
        ("DB_PASSWORD", "nostr_ts_relay".to_string()),
    ]
}

/// Run the exporter to completion, killing it if it outlives `timeout`.
pub async fn run_to_exit(mut cmd: Command, timeout: Duration) -> anyhow::Result<Output> {
    let mut child = cmd.spawn()?;
    for _ in 0..(timeout.as_millis() / 50) {
        if child.try_wait()?.is_some() {
            return Ok(child.wait_with_output()?);
        }
        sleep(Duration::from_millis(50)).await;
    }
    child.kill()?;
    anyhow::bail!("exporter did not exit within {:?}", timeout)
}

/// A running exporter instance.
pub struct TestExporter {
    child: Child,
    port: u16,
}

impl TestExporter {
    /// Spawn an exporter serving on `port` with the given variables and optional config file.
    pub async fn spawn(
        port: u16,
        mut vars: Vec<(&'static str, String)>,
        config: Option<&Path>,
    ) -> anyhow::Result<Self> {
        vars.push(("METRICS_PORT", port.to_string()));
        vars.push(("METRICS_BIND", "127.0.0.1".to_string()));
        let mut cmd = command(&vars);
        if let Some(config) = config {
            cmd.arg(config);
        }
        let child = cmd.spawn()?;

        let exporter = Self { child, port };
        exporter.wait_until_ready().await?;
        Ok(exporter)
    }

    /// Wait until the exporter is accepting connections.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..50 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Exporter failed to start within 5 seconds")
    }

    /// URL of the scrape endpoint.
    pub fn metrics_url(&self) -> String {
        format!("http://127.0.0.1:{}/metrics", self.port)
    }
}

impl Drop for TestExporter {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
