use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::riot_api::{ApiError, MatchApi, MatchRecord, ParticipantRecord};
use crate::schema::{Attribute, AttributeSchema, AttributeSource, CHALLENGES_MARKER};
use crate::table::{CellValue, OutputRow, OutputTable};

pub const PROGRESS_EVERY: usize = 100;

#[derive(Debug)]
pub struct MatchFailure {
    pub match_id: String,
    pub error: ApiError,
}

pub struct FlattenProgress {
    pub processed: usize,
    pub total: usize,
    pub rows: usize,
}

#[derive(Debug)]
pub struct FlattenReport {
    pub table: OutputTable,
    pub matches_exported: usize,
    pub failures: Vec<MatchFailure>,
}

/// Fetches and flattens every match in order. A failed fetch is recorded and
/// skipped; it never stops the matches after it.
pub fn flatten_matches<A: MatchApi + ?Sized>(
    api: &A,
    match_ids: &[String],
    schema: &AttributeSchema,
    mut on_progress: impl FnMut(FlattenProgress),
) -> FlattenReport {
    let total = match_ids.len();
    let mut table = OutputTable::new(schema);
    let mut failures = Vec::new();
    let mut matches_exported = 0usize;

    info!(total, "processing matches");

    for (idx, match_id) in match_ids.iter().enumerate() {
        match api.match_record(match_id) {
            Ok(record) => {
                table.extend(flatten_match(match_id, &record, schema));
                matches_exported += 1;
            }
            Err(error) => {
                warn!(%match_id, status = ?error.status(), %error, "skipping match");
                failures.push(MatchFailure {
                    match_id: match_id.clone(),
                    error,
                });
            }
        }

        let processed = idx + 1;
        if processed % PROGRESS_EVERY == 0 || processed == total {
            on_progress(FlattenProgress {
                processed,
                total,
                rows: table.len(),
            });
        }
    }

    FlattenReport {
        table,
        matches_exported,
        failures,
    }
}

/// One row per participant, in the order the match lists them. Participant
/// counts other than ten are taken as-is.
pub fn flatten_match(
    match_id: &str,
    record: &MatchRecord,
    schema: &AttributeSchema,
) -> Vec<OutputRow> {
    record
        .info
        .participants
        .iter()
        .map(|participant| OutputRow {
            match_id: match_id.to_string(),
            values: schema
                .attributes()
                .iter()
                .map(|attr| resolve_attribute(attr, participant, &record.info.fields))
                .collect(),
        })
        .collect()
}

pub fn resolve_attribute(
    attr: &Attribute,
    participant: &ParticipantRecord,
    info: &Map<String, Value>,
) -> CellValue {
    let value = match attr.source {
        AttributeSource::Participant => participant.get(&attr.name),
        AttributeSource::Challenges => participant
            .get(CHALLENGES_MARKER)
            .and_then(Value::as_object)
            .and_then(|challenges| challenges.get(&attr.name)),
        AttributeSource::Match => info.get(&attr.name),
    };
    CellValue::from_json(value)
}
