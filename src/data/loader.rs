use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray, BooleanArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt8Type,
};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, RestaurantTable};

/// Cell texts read as missing, on top of the empty string.
const NA_TOKENS: [&str; 6] = ["NA", "N/A", "NaN", "nan", "null", "None"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a restaurant table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one restaurant per line (primary format)
/// * `.json`    – `[{ "name": ..., "stars": ..., "Pizza": 1, ... }, ...]`
/// * `.parquet` – one column per field, as written by Pandas or Polars
pub fn load_file(path: &Path) -> Result<RestaurantTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    if table.is_empty() {
        log::warn!("{} has no rows", path.display());
    }
    let missing = table.missing_expected_columns();
    if !missing.is_empty() {
        log::warn!(
            "{} is missing expected columns {missing:?}",
            path.display()
        );
    }
    log::info!(
        "Loaded {} restaurants with {} columns from {}",
        table.len(),
        table.columns().len(),
        path.display()
    );
    Ok(table.with_source(path))
}

// ---------------------------------------------------------------------------
// Load cache
// ---------------------------------------------------------------------------

/// Memoizes loaded tables keyed on the canonical file path.
#[derive(Debug, Default)]
pub struct DatasetCache {
    tables: HashMap<PathBuf, Arc<RestaurantTable>>,
}

impl DatasetCache {
    /// Return the cached table for `path`, loading it on first use.
    pub fn load(&mut self, path: &Path) -> Result<Arc<RestaurantTable>> {
        let key = cache_key(path)?;
        if let Some(table) = self.tables.get(&key) {
            log::debug!("Using cached table for {}", key.display());
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(load_file(path)?);
        self.tables.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Drop any cached table for `path` and load it again.
    pub fn reload(&mut self, path: &Path) -> Result<Arc<RestaurantTable>> {
        if let Ok(key) = cache_key(path) {
            self.tables.remove(&key);
        }
        self.load(path)
    }
}

fn cache_key(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .with_context(|| format!("resolving {}", path.display()))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one restaurant per record.
/// Every cell is typed independently (see [`guess_cell_type`]).
fn load_csv(path: &Path) -> Result<RestaurantTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(RestaurantTable::new(headers, rows))
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() || NA_TOKENS.contains(&s) {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "name": "Taco Spot", "state": "AZ", "stars": 4.5, "Mexican": 1 },
///   ...
/// ]
/// ```
///
/// Columns are ordered by first appearance; keys absent from a record read
/// as missing.
fn load_json(path: &Path) -> Result<RestaurantTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut keyed_rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut row = Vec::with_capacity(obj.len());
        for (key, val) in obj {
            let col = *positions.entry(key.clone()).or_insert_with(|| {
                columns.push(key.clone());
                columns.len() - 1
            });
            row.push((col, json_to_cell(val)));
        }
        keyed_rows.push(row);
    }

    let rows = keyed_rows
        .into_iter()
        .map(|keyed| {
            let mut row = vec![CellValue::Null; columns.len()];
            for (col, value) in keyed {
                row[col] = value;
            }
            row
        })
        .collect();

    Ok(RestaurantTable::new(columns, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per restaurant field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<RestaurantTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .enumerate()
                .map(|(col_idx, col)| {
                    extract_cell(col.as_ref(), row)
                        .with_context(|| format!("Row {row}: failed to read '{}'", columns[col_idx]))
                })
                .collect::<Result<Vec<_>>>()?;
            rows.push(cells);
        }
    }

    Ok(RestaurantTable::new(columns, rows))
}

// -- Parquet / Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &dyn Array, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(col.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => CellValue::Integer(col.as_primitive::<UInt16Type>().value(row) as i64),
        DataType::UInt32 => CellValue::Integer(col.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::Float32 => {
            float_cell(col.as_primitive::<Float32Type>().value(row) as f64)
        }
        DataType::Float64 => float_cell(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => {
            let arr = col
                .as_any()
                .downcast_ref::<BooleanArray>()
                .context("expected BooleanArray")?;
            CellValue::Bool(arr.value(row))
        }
        _ => CellValue::String(
            array_value_to_string(col, row).context("formatting arrow value")?,
        ),
    };
    Ok(value)
}

/// Pandas writes missing floats as NaN rather than null.
fn float_cell(v: f64) -> CellValue {
    if v.is_nan() {
        CellValue::Null
    } else {
        CellValue::Float(v)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc as StdArc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn cell_typing() {
        assert_eq!(guess_cell_type(""), CellValue::Null);
        assert_eq!(guess_cell_type("NaN"), CellValue::Null);
        assert_eq!(guess_cell_type(" 1 "), CellValue::Integer(1));
        assert_eq!(guess_cell_type("4.5"), CellValue::Float(4.5));
        assert_eq!(guess_cell_type("true"), CellValue::Bool(true));
        assert_eq!(
            guess_cell_type("Las Vegas"),
            CellValue::String("Las Vegas".into())
        );
    }

    #[test]
    fn csv_keeps_column_order_and_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "r.csv",
            "name,state,stars,Pizza,Bars\n\
             Slice,CA,4.0,1,\n\
             Pub,NV,3.5,0,1\n",
        );
        let table = load_file(&path).unwrap();
        assert_eq!(table.columns(), ["name", "state", "stars", "Pizza", "Bars"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 2), &CellValue::Float(4.0));
        assert_eq!(table.cell(0, 4), &CellValue::Null);
        assert_eq!(table.cell(1, 4), &CellValue::Integer(1));
        assert_eq!(table.source.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn json_unions_keys_in_first_seen_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "r.json",
            r#"[{"name":"A","stars":4.5,"Sushi":1},{"name":"B","Pizza":1,"stars":null}]"#,
        );
        let table = load_file(&path).unwrap();
        assert_eq!(table.columns(), ["name", "stars", "Sushi", "Pizza"]);
        assert_eq!(table.cell(0, 3), &CellValue::Null);
        assert_eq!(table.cell(1, 1), &CellValue::Null);
        assert_eq!(table.cell(1, 3), &CellValue::Integer(1));
    }

    #[test]
    fn parquet_columns_become_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.parquet");

        let schema = StdArc::new(Schema::new(vec![
            Field::new("name", DataType::Utf8, false),
            Field::new("stars", DataType::Float64, true),
            Field::new("Pizza", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                StdArc::new(StringArray::from(vec!["A", "B"])),
                StdArc::new(Float64Array::from(vec![Some(4.0), Some(f64::NAN)])),
                StdArc::new(Int64Array::from(vec![1, 0])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.columns(), ["name", "stars", "Pizza"]);
        assert_eq!(table.cell(0, 0), &CellValue::String("A".into()));
        assert_eq!(table.cell(1, 1), &CellValue::Null);
        assert_eq!(table.cell(0, 2), &CellValue::Integer(1));
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "r.xlsx", "");
        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported file extension"));
    }

    #[test]
    fn cache_reuses_until_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "r.csv", "name,stars\nA,4\n");
        let mut cache = DatasetCache::default();

        let first = cache.load(&path).unwrap();
        let second = cache.load(&path).unwrap();
        assert!(StdArc::ptr_eq(&first, &second));

        let third = cache.reload(&path).unwrap();
        assert!(!StdArc::ptr_eq(&first, &third));
        assert_ne!(first.id(), third.id());
    }
}
