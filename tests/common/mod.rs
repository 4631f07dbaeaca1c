#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;

use lol_match_export::riot_api::{ApiError, MatchApi, MatchRecord, parse_match_json};
use lol_match_export::table::{CellValue, OutputRow, OutputTable};

pub fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

/// In-memory stand-in for the Riot endpoints. Every match id without an
/// explicit record is served the `match_detail.json` fixture.
pub struct FakeApi {
    pub puuid: Option<String>,
    pub match_ids: Vec<String>,
    pub records: HashMap<String, String>,
    pub failing: HashSet<String>,
    pub fail_listing: bool,
    pub page_calls: RefCell<Vec<(usize, usize)>>,
    pub record_calls: RefCell<Vec<String>>,
    default_record: String,
}

impl FakeApi {
    pub fn new(puuid: &str, match_ids: Vec<String>) -> Self {
        Self {
            puuid: Some(puuid.to_string()),
            match_ids,
            records: HashMap::new(),
            failing: HashSet::new(),
            fail_listing: false,
            page_calls: RefCell::new(Vec::new()),
            record_calls: RefCell::new(Vec::new()),
            default_record: read_fixture("match_detail.json"),
        }
    }

    pub fn failing_on(mut self, match_id: &str) -> Self {
        self.failing.insert(match_id.to_string());
        self
    }
}

impl MatchApi for FakeApi {
    fn account_puuid(&self, _game_name: &str, _tag_line: &str) -> Result<String, ApiError> {
        self.puuid.clone().ok_or(ApiError::Status {
            status: 404,
            url: "account".to_string(),
            body: "Data not found".to_string(),
        })
    }

    fn match_ids_page(
        &self,
        _puuid: &str,
        start: usize,
        count: usize,
    ) -> Result<Vec<String>, ApiError> {
        self.page_calls.borrow_mut().push((start, count));
        if self.fail_listing {
            return Err(ApiError::Status {
                status: 401,
                url: "ids".to_string(),
                body: "Unauthorized".to_string(),
            });
        }
        Ok(self
            .match_ids
            .iter()
            .skip(start)
            .take(count)
            .cloned()
            .collect())
    }

    fn match_record(&self, match_id: &str) -> Result<MatchRecord, ApiError> {
        self.record_calls.borrow_mut().push(match_id.to_string());
        if self.failing.contains(match_id) {
            return Err(ApiError::Status {
                status: 503,
                url: format!("matches/{match_id}"),
                body: "Service Unavailable".to_string(),
            });
        }
        let raw = self
            .records
            .get(match_id)
            .unwrap_or(&self.default_record);
        parse_match_json(raw)
    }
}

pub fn ids(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{prefix}_{i}")).collect()
}

/// Looks a cell up by column name; `matchId` reads the row's match id.
pub fn cell(table: &OutputTable, row: &OutputRow, column: &str) -> Option<CellValue> {
    match table.columns().iter().position(|c| c == column)? {
        0 => Some(CellValue::Text(row.match_id.clone())),
        idx => row.values.get(idx - 1).cloned(),
    }
}
