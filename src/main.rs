use chrono::Utc;
use clap::Parser;
use jira_worklog_extractor::report::{CsvReportWriter, ReportWriter, default_out_name};
use jira_worklog_extractor::{AppConfig, Args, Result, run_extraction};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(err) = run(args).await {
        error!(%err, "extraction failed");
        std::process::exit(err.exit_code());
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(args: Args) -> Result<()> {
    let mut config = AppConfig::load(args.config.as_deref())?;
    config.apply_cli(&args);
    config.validate()?;

    if !config.verify_ssl {
        warn!("SSL certificate verification is DISABLED");
    }

    let now = Utc::now();
    let rows = run_extraction(&config, now).await?;

    let out_path = config
        .out_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(default_out_name("jira-worklogs", now)));
    let paths = CsvReportWriter.write_reports(&rows, &out_path)?;

    info!(
        rows = rows.len(),
        full = %paths.full.display(),
        short = %paths.short.display(),
        "extraction complete"
    );
    Ok(())
}
