//! Panel Orchestrator CLI
//!
//! Bulk-provisions web domains, database users and databases on a remote
//! control panel from a JSON migration list, in three sequential steps with
//! a job-queue convergence wait between each.
//!
//! Exit status: 0 on completion (including partial per-item failures),
//! 1 on fatal error (bad input, failed authentication).

mod config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use panel_orchestrator_client::{IspconfigClient, ProvisioningClient};
use panel_orchestrator_core::{
    parse_migration_list, DrainConfig, ProvisioningService, RunOptions, RunReport,
};

#[derive(Parser)]
#[command(
    name = "panel-orchestrator",
    version,
    about = "Bulk-provision web domains, database users and databases on a control panel"
)]
struct Cli {
    /// Migration list: JSON array of records with website_name, mysql_user,
    /// mysql_pass and mysql_base
    #[arg(long, default_value = "migration.json")]
    input: PathBuf,

    /// Panel client the resources are created for
    #[arg(long, default_value_t = 1)]
    client_id: i64,

    /// Server the resources are created on
    #[arg(long, default_value_t = 1)]
    server_id: i64,

    /// System user owning the sites (domain snapshot scope)
    #[arg(long, default_value_t = 1)]
    sys_userid: i64,

    /// System group owning the sites (domain snapshot scope)
    #[arg(long, default_value_t = 1)]
    sys_groupid: i64,

    /// Job-queue scope for convergence waits (0 = all servers)
    #[arg(long, default_value_t = 0)]
    queue_scope: i64,

    /// Delay after each creation attempt, in seconds
    #[arg(long, default_value_t = 1)]
    pace_secs: u64,

    /// Job-queue poll interval, in seconds
    #[arg(long, default_value_t = 2)]
    poll_secs: u64,

    /// Upper bound for each job-queue wait, in seconds
    #[arg(long, default_value_t = 300)]
    drain_timeout_secs: u64,

    /// Consecutive zero readings required before the queue counts as drained
    #[arg(long, default_value_t = 3)]
    stable_reads: u32,

    /// Wait after a failed job-queue poll, in seconds
    #[arg(long, default_value_t = 10)]
    transient_backoff_secs: u64,
}

impl Cli {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            client_id: self.client_id,
            server_id: self.server_id,
            sys_userid: self.sys_userid,
            sys_groupid: self.sys_groupid,
            queue_scope: self.queue_scope,
            pacing: Duration::from_secs(self.pace_secs),
            drain: DrainConfig {
                poll_interval: Duration::from_secs(self.poll_secs),
                timeout: Duration::from_secs(self.drain_timeout_secs),
                required_stable_readings: self.stable_reads,
                transient_backoff: Duration::from_secs(self.transient_backoff_secs),
            },
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; the variables may come from the environment
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Fatal error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    tracing::info!("Panel Orchestrator migration");

    let panel = config::panel_config_from_env()?;

    tracing::info!("Loading migration configuration from {}", cli.input.display());
    let raw = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("cannot read {}", cli.input.display()))?;
    let items = parse_migration_list(&raw)?;
    tracing::info!("Loaded {} migration items", items.len());

    tracing::info!("Connecting to {}", panel.endpoint);
    let session = IspconfigClient::new(panel)?
        .login()
        .await
        .context("authentication failed")?;
    let session = Arc::new(session);

    let client: Arc<dyn ProvisioningClient> = session.clone();
    let service = ProvisioningService::new(client, cli.run_options());
    let result = service.run(items).await;

    // Release the session on the success path and the fatal path alike
    if let Err(e) = session.logout().await {
        tracing::warn!("Logout failed: {e}");
    }

    let report = result?;
    print_report(&report);

    Ok(())
}

fn print_report(report: &RunReport) {
    println!();
    println!("Migration Complete");
    println!(
        "  Domains:   {}/{} successful",
        report.domains.stats.ok,
        report.domains.stats.total()
    );
    println!(
        "  Users:     {}/{} successful",
        report.users.stats.ok,
        report.users.stats.total()
    );
    println!(
        "  Databases: {}/{} successful",
        report.databases.stats.ok,
        report.databases.stats.total()
    );

    for (index, drain) in report.drains.iter().enumerate() {
        if !drain.converged() {
            println!(
                "  Warning: job queue wait {} timed out before draining",
                index + 1
            );
        }
    }

    let failures: Vec<_> = [&report.domains, &report.users, &report.databases]
        .into_iter()
        .flat_map(|stage| {
            stage
                .results
                .iter()
                .filter(|r| !r.outcome.is_ok())
                .map(move |r| (stage.stage, r))
        })
        .collect();

    if !failures.is_empty() {
        println!();
        println!("Failed items:");
        for (stage, result) in failures {
            println!("  [{stage}] {}", result.name);
        }
    }

    println!();
    println!("Done");
}
