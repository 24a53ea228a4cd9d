use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use super::error::EngineError;

/// Columns the structural contract of the input file names.
pub const EXPECTED_COLUMNS: [&str; 10] = [
    "name",
    "address",
    "city",
    "state",
    "latitude",
    "longitude",
    "stars",
    "review_count",
    "is_open",
    "attributes",
];

pub const STATE_COLUMN: &str = "state";
pub const STARS_COLUMN: &str = "stars";

// ---------------------------------------------------------------------------
// CellValue – a single cell of the loaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell; strings and booleans are not coerced.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if !v.is_nan() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether a non-missing cell displays as `text`.
    pub fn reads_as(&self, text: &str) -> bool {
        match self {
            CellValue::Null => false,
            CellValue::String(s) => s == text,
            other => other.to_string() == text,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Whether the cell is exactly numeric 0 or 1.
    pub fn is_binary(&self) -> bool {
        match self {
            CellValue::Integer(i) => *i == 0 || *i == 1,
            CellValue::Float(v) => *v == 0.0 || *v == 1.0,
            _ => false,
        }
    }

    /// Whether the cell marks membership (numeric 1).
    pub fn is_one(&self) -> bool {
        match self {
            CellValue::Integer(i) => *i == 1,
            CellValue::Float(v) => *v == 1.0,
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// TableId – identity of a loaded table
// ---------------------------------------------------------------------------

static NEXT_TABLE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a loaded table, used as a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(u64);

impl TableId {
    fn next() -> Self {
        TableId(NEXT_TABLE_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

// ---------------------------------------------------------------------------
// RestaurantTable – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table. Rows are aligned to `columns`; a row shorter than
/// the header reads as missing in the trailing columns.
#[derive(Debug, Clone)]
pub struct RestaurantTable {
    id: TableId,
    /// Where the table was loaded from, if anywhere.
    pub source: Option<PathBuf>,
    columns: Vec<String>,
    column_index: HashMap<String, usize>,
    rows: Vec<Vec<CellValue>>,
}

impl RestaurantTable {
    /// Build a table from column names and rows. Duplicate column names keep
    /// their first position for lookups.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut column_index = HashMap::with_capacity(columns.len());
        for (idx, name) in columns.iter().enumerate() {
            column_index.entry(name.clone()).or_insert(idx);
        }
        RestaurantTable {
            id: TableId::next(),
            source: None,
            columns,
            column_index,
            rows,
        }
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    /// Column names in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).copied()
    }

    /// Position of a column the caller cannot proceed without.
    pub fn require_column(&self, name: &str) -> Result<usize, EngineError> {
        self.column_position(name)
            .ok_or_else(|| EngineError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Cell at (row, column position); out-of-range reads as missing.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        static NULL: CellValue = CellValue::Null;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&NULL)
    }

    /// Iterate one column's cells in row order.
    pub fn column_values(&self, col: usize) -> impl Iterator<Item = &CellValue> + '_ {
        (0..self.rows.len()).map(move |row| self.cell(row, col))
    }

    /// Expected columns absent from this table.
    pub fn missing_expected_columns(&self) -> Vec<&'static str> {
        EXPECTED_COLUMNS
            .iter()
            .copied()
            .filter(|c| self.column_position(c).is_none())
            .collect()
    }

    /// Observed `stars` range, snapped outward to half-star steps.
    pub fn stars_bounds(&self) -> Option<(f64, f64)> {
        let col = self.column_position(STARS_COLUMN)?;
        let (min, max) = self
            .column_values(col)
            .filter_map(CellValue::as_f64)
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;
        Some(((min * 2.0).floor() / 2.0, (max * 2.0).ceil() / 2.0))
    }

    /// Sorted distinct values of the `state` column.
    pub fn states(&self) -> Vec<String> {
        let Some(col) = self.column_position(STATE_COLUMN) else {
            return Vec::new();
        };
        self.column_values(col)
            .filter(|v| !v.is_null())
            .map(|v| v.to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Typed view of a row.
    pub fn record(&self, row: usize) -> RestaurantRecord {
        let text = |name: &str| {
            self.column_position(name)
                .map(|c| self.cell(row, c))
                .filter(|v| !v.is_null())
                .map(|v| v.to_string())
                .unwrap_or_default()
        };
        let number = |name: &str| {
            self.column_position(name)
                .and_then(|c| self.cell(row, c).as_f64())
        };
        RestaurantRecord {
            name: text("name"),
            address: text("address"),
            city: text("city"),
            state: text(STATE_COLUMN),
            latitude: number("latitude"),
            longitude: number("longitude"),
            stars: number(STARS_COLUMN),
            review_count: number("review_count").map(|v| v as u64),
            is_open: number("is_open").map(|v| v == 1.0),
            categories: Vec::new(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// RestaurantRecord – typed view of one row
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantRecord {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub stars: Option<f64>,
    pub review_count: Option<u64>,
    pub is_open: Option<bool>,
    /// Category indicator columns set to 1 for this row.
    pub categories: Vec<String>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a table from string headers and rows of cells.
    pub(crate) fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> RestaurantTable {
        RestaurantTable::new(columns.iter().map(|c| c.to_string()).collect(), rows)
    }

    pub(crate) fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    #[test]
    fn binary_and_membership_checks_are_numeric_only() {
        assert!(CellValue::Integer(0).is_binary());
        assert!(CellValue::Float(1.0).is_binary());
        assert!(!CellValue::Integer(2).is_binary());
        assert!(!CellValue::Bool(true).is_binary());
        assert!(!s("1").is_binary());
        assert!(!CellValue::Null.is_binary());

        assert!(CellValue::Integer(1).is_one());
        assert!(CellValue::Float(1.0).is_one());
        assert!(!CellValue::Integer(0).is_one());
        assert!(!CellValue::Null.is_one());
    }

    #[test]
    fn reads_as_compares_display_text() {
        assert!(CellValue::Integer(12).reads_as("12"));
        assert!(s("NV").reads_as("NV"));
        assert!(!CellValue::Null.reads_as("<null>"));
        assert!(!CellValue::Integer(12).reads_as("12.0"));
    }

    #[test]
    fn tables_get_distinct_ids() {
        let a = table(&["x"], vec![]);
        let b = table(&["x"], vec![]);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn short_rows_read_as_missing() {
        let t = table(&["a", "b"], vec![vec![CellValue::Integer(1)]]);
        assert_eq!(t.cell(0, 1), &CellValue::Null);
        assert_eq!(t.cell(5, 0), &CellValue::Null);
    }

    #[test]
    fn stars_bounds_snap_to_half_steps() {
        let t = table(
            &["stars"],
            vec![
                vec![CellValue::Float(1.3)],
                vec![CellValue::Null],
                vec![CellValue::Float(4.6)],
            ],
        );
        assert_eq!(t.stars_bounds(), Some((1.0, 5.0)));

        let empty = table(&["stars"], vec![vec![CellValue::Null]]);
        assert_eq!(empty.stars_bounds(), None);
    }

    #[test]
    fn states_are_sorted_and_distinct() {
        let t = table(
            &["state"],
            vec![vec![s("NV")], vec![s("CA")], vec![CellValue::Null], vec![s("NV")]],
        );
        assert_eq!(t.states(), vec!["CA".to_string(), "NV".to_string()]);
    }

    #[test]
    fn record_view_reads_typed_fields() {
        let t = table(
            &["name", "state", "stars", "review_count", "is_open"],
            vec![vec![
                s("Taco Spot"),
                s("AZ"),
                CellValue::Float(4.5),
                CellValue::Integer(120),
                CellValue::Integer(1),
            ]],
        );
        let rec = t.record(0);
        assert_eq!(rec.name, "Taco Spot");
        assert_eq!(rec.state, "AZ");
        assert_eq!(rec.stars, Some(4.5));
        assert_eq!(rec.review_count, Some(120));
        assert_eq!(rec.is_open, Some(true));
        assert_eq!(rec.address, "");
        assert_eq!(rec.latitude, None);
    }

    #[test]
    fn missing_expected_columns_are_reported() {
        let t = table(&["name", "stars"], vec![]);
        let missing = t.missing_expected_columns();
        assert!(missing.contains(&"state"));
        assert!(!missing.contains(&"stars"));
        assert_eq!(missing.len(), 8);
    }
}
