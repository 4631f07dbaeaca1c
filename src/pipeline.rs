use std::path::PathBuf;

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use tracing::info;

use crate::config::{Config, PlayerId};
use crate::flatten::{FlattenProgress, FlattenReport, flatten_matches};
use crate::match_ids::collect_match_ids;
use crate::riot_api::{MatchApi, resolve_puuid};
use crate::schema::AttributeSchema;
use crate::xlsx_export::{RunSummary, write_workbook};

pub struct Export {
    pub puuid: String,
    pub match_ids: Vec<String>,
    pub report: FlattenReport,
}

pub struct ExportReport {
    pub output: PathBuf,
    pub match_ids: usize,
    pub matches_exported: usize,
    pub matches_skipped: usize,
    pub rows: usize,
}

/// Identity lookup, id collection and flattening. Only the first two can fail.
pub fn build_export<A: MatchApi + ?Sized>(
    api: &A,
    player: &PlayerId,
    schema: &AttributeSchema,
    max_matches: Option<usize>,
    on_progress: impl FnMut(FlattenProgress),
) -> Result<Export> {
    let puuid = resolve_puuid(api, &player.game_name, &player.tag_line)?;
    info!(%player, %puuid, "resolved player");

    let match_ids = collect_match_ids(api, &puuid, max_matches)?;
    let report = flatten_matches(api, &match_ids, schema, on_progress);

    Ok(Export {
        puuid,
        match_ids,
        report,
    })
}

pub fn run_export<A: MatchApi + ?Sized>(api: &A, config: &Config) -> Result<ExportReport> {
    let export = build_export(
        api,
        &config.player,
        &config.schema,
        config.max_matches,
        log_progress,
    )?;
    save_export(&export, config)
}

pub fn save_export(export: &Export, config: &Config) -> Result<ExportReport> {
    let report = &export.report;
    let summary = RunSummary {
        player: config.player.to_string(),
        puuid: export.puuid.clone(),
        region: config.api.region.to_string(),
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        match_ids: export.match_ids.len(),
        matches_exported: report.matches_exported,
    };
    write_workbook(&config.output, &report.table, &report.failures, &summary)?;

    Ok(ExportReport {
        output: config.output.clone(),
        match_ids: export.match_ids.len(),
        matches_exported: report.matches_exported,
        matches_skipped: report.failures.len(),
        rows: report.table.len(),
    })
}

fn log_progress(progress: FlattenProgress) {
    info!(
        "processed {}/{} matches ({} participants so far)",
        progress.processed, progress.total, progress.rows
    );
}
