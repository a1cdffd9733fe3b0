//! tgw-handler — runs one controller invocation.
//!
//! Reads a single JSON event, handles it against AWS, and prints the JSON
//! response on stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```text
//! tgw-handler --event attachment-created.json
//! WORKLOAD_ROUTE_TABLE_ID=tgw-rtb-0a1b tgw-handler < event.json
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde_json::Value;
use tracing::info;

use tgw_attachment::AttachmentReconciler;
use tgw_aws::{CloudFormationExports, Ec2ControlPlane, NetworkFirewallService};
use tgw_core::ControllerConfig;
use tgw_handler::{Dispatcher, Invocation, settings};

const DEFAULT_LOG_FILTER: &str = "info,tgw=debug";

#[derive(Parser)]
#[command(name = "tgw-handler", about = "Transit gateway inspection controller handler")]
struct Cli {
    /// Read the event from this file instead of stdin.
    #[arg(long)]
    event: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Route table for workload attachments.
    #[arg(long, env = "WORKLOAD_ROUTE_TABLE_ID")]
    workload_route_table: Option<String>,

    /// Route table for inspection attachments.
    #[arg(long, env = "INSPECTION_ROUTE_TABLE_ID")]
    inspection_route_table: Option<String>,

    /// Delay between polls ("2s", "500ms").
    #[arg(long, env = "POLL_INTERVAL")]
    poll_interval: Option<String>,

    /// Poll ceiling per wait loop.
    #[arg(long, env = "POLL_MAX_ATTEMPTS")]
    poll_max_attempts: Option<u32>,

    /// Wall-clock bound on one reconciliation.
    #[arg(long, env = "RECONCILE_DEADLINE")]
    deadline: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn overrides(&self) -> ControllerConfig {
        let mut config = ControllerConfig::default();
        config.route_tables.workload = self.workload_route_table.clone();
        config.route_tables.inspection = self.inspection_route_table.clone();
        config.polling.interval = self.poll_interval.clone();
        config.polling.max_attempts = self.poll_max_attempts;
        config.polling.deadline = self.deadline.clone();
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let raw = read_event(cli.event.as_deref())?;
    let event: Value = serde_json::from_str(&raw).context("event is not valid JSON")?;
    let invocation = Invocation::classify(event)?;
    info!(kind = invocation.kind(), "handling invocation");

    let sdk_config = tgw_aws::load_config().await;
    let ec2 = Arc::new(Ec2ControlPlane::from_conf(&sdk_config));
    let firewalls = Arc::new(NetworkFirewallService::from_conf(&sdk_config));

    let mut dispatcher = Dispatcher::new(firewalls, ec2.clone());

    if invocation.needs_route_tables() {
        let mut config = settings::load(cli.config.as_deref(), cli.overrides())?;
        if !config.has_route_tables() {
            let exports = CloudFormationExports::from_conf(&sdk_config)
                .list()
                .await
                .context("failed to list stack exports")?;
            config.fill_from_exports(&exports);
        }
        let reconciler = AttachmentReconciler::from_config(ec2, &config)?;
        info!(
            workload = %reconciler.route_tables().workload,
            inspection = %reconciler.route_tables().inspection,
            "route tables resolved"
        );
        dispatcher = dispatcher.with_reconciler(reconciler);
    }

    let response = dispatcher.dispatch(invocation).await?;
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_event(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read event from {}", path.display())),
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read event from stdin")?;
            Ok(raw)
        }
    }
}
