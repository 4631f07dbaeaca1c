use anyhow::Result;
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use lol_match_export::config::{Args, Config, mask_key};
use lol_match_export::pipeline::run_export;
use lol_match_export::riot_api::RiotClient;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = Args::parse();
    init_tracing(&args.log_level);

    let config = Config::from_args(args)?;
    debug!(api_key = %mask_key(&config.api.api_key), region = %config.api.region, "config loaded");
    info!(
        player = %config.player,
        attributes = config.schema.len(),
        "starting export"
    );

    let client = RiotClient::new(&config.api)?;
    let report = run_export(&client, &config)?;

    println!("Export complete");
    println!("Workbook: {}", report.output.display());
    println!("Match ids: {}", report.match_ids);
    println!(
        "Matches: {} exported, {} skipped",
        report.matches_exported, report.matches_skipped
    );
    println!("Rows: {}", report.rows);
    if report.matches_skipped > 0 {
        warn!(
            skipped = report.matches_skipped,
            "some matches could not be fetched; see the Skipped sheet"
        );
    }

    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
