use serde_json::Value;

use crate::schema::AttributeSchema;

/// One resolved field. Absent fields and JSON `null` are `Empty`, never a
/// zero or `false`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => CellValue::Empty,
            Some(Value::Bool(b)) => CellValue::Bool(*b),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(i) => CellValue::Int(i),
                None => n.as_f64().map(CellValue::Float).unwrap_or_default(),
            },
            Some(Value::String(s)) => CellValue::Text(s.clone()),
            // arrays and objects land in one cell as compact json
            Some(other) => CellValue::Text(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    pub match_id: String,
    /// One value per schema attribute, in schema order.
    pub values: Vec<CellValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputTable {
    columns: Vec<String>,
    rows: Vec<OutputRow>,
}

impl OutputTable {
    pub fn new(schema: &AttributeSchema) -> Self {
        Self {
            columns: schema.columns(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[OutputRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = OutputRow>) {
        self.rows.extend(rows);
    }
}
