use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::columns::{
    CONFIRMED, COUNTRY, DEATHS, DEATH_RATE, RECOVERED, RECOVERY_RATE, REGION, UNKNOWN_REGION,
};
use super::error::LoadError;
use super::model::{Table, Value};

/// Substrings that mark a column as the country identifier, in priority order.
const COUNTRY_HINTS: [&str; 3] = ["country", "location", "region"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a country table from a file and normalise it.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row + data rows (the usual input)
/// * `.json`    – `[{ "Country/Region": "...", "Confirmed": 1, ... }, ...]`
/// * `.parquet` – scalar columns, as written by `df.to_parquet()`
///
/// The returned table always has `country`, `region`, `recovery_rate` and
/// `death_rate` columns and no null cells. See [`normalize`].
pub fn load_file(path: &Path) -> Result<Table, LoadError> {
    if !path.is_file() {
        return Err(LoadError::SourceNotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };
    log::debug!(
        "read {} rows x {} columns from {}",
        raw.len(),
        raw.columns().len(),
        path.display()
    );

    let table = normalize(raw)?;
    log::info!(
        "Loaded {} rows with columns {:?} from {}",
        table.len(),
        table.columns(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Schema normalisation
// ---------------------------------------------------------------------------

/// Normalise a freshly read table:
///
/// 1. column names trimmed, lowercased, spaces → underscores
/// 2. duplicate names collapsed to the first occurrence
/// 3. country column located (see [`find_country_column`]) and renamed `country`
/// 4. `region` added with `"Unknown"` when absent
/// 5. `recovery_rate` / `death_rate` derived
/// 6. remaining nulls replaced with `0`
pub fn normalize(mut table: Table) -> Result<Table, LoadError> {
    table.map_column_names(normalize_column_name);
    table.drop_duplicate_columns();

    let country_idx = find_country_column(table.columns())
        .ok_or_else(|| LoadError::Schema("no country/location column found".to_string()))?;
    if table.columns()[country_idx] != COUNTRY {
        log::debug!("using column '{}' as country", table.columns()[country_idx]);
        table.rename_column(country_idx, COUNTRY);
    }

    if !table.has_column(REGION) {
        table.set_column_with(REGION, |_| Value::from(UNKNOWN_REGION));
    }

    set_rate_column(&mut table, RECOVERED, RECOVERY_RATE);
    set_rate_column(&mut table, DEATHS, DEATH_RATE);

    table.fill_nulls(&Value::Integer(0));
    Ok(table)
}

pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Pick the column that identifies the country.
///
/// Priority: an exact `country` column, then an exact `location` column, then
/// the first column (in column order) whose name contains `country`,
/// `location` or `region`.
pub fn find_country_column(columns: &[String]) -> Option<usize> {
    let exact = |name: &str| columns.iter().position(|c| c == name);
    exact(COUNTRY).or_else(|| exact("location")).or_else(|| {
        columns
            .iter()
            .position(|c| COUNTRY_HINTS.iter().any(|hint| c.contains(hint)))
    })
}

fn set_rate_column(table: &mut Table, numerator: &str, name: &str) {
    let operands = table
        .column_index(numerator)
        .zip(table.column_index(CONFIRMED));
    table.set_column_with(name, |row| match operands {
        Some((num, den)) => rate(row[num].as_f64(), row[den].as_f64()),
        None => Value::Float(0.0),
    });
}

/// `numerator / confirmed * 100`, two decimals. A zero denominator gives 0;
/// a non-numeric operand gives null, which the final fill turns into 0.
fn rate(numerator: Option<f64>, confirmed: Option<f64>) -> Value {
    match (numerator, confirmed) {
        (Some(_), Some(d)) if d == 0.0 => Value::Float(0.0),
        (Some(n), Some(d)) => Value::Float(round2(n / d * 100.0)),
        _ => Value::Null,
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one row per country.
/// Ragged rows are padded with nulls.
fn load_csv(path: &Path) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut table = Table::new(headers);
    for result in reader.records() {
        let record = result?;
        table.push_row(record.iter().map(guess_value_type).collect());
    }
    Ok(table)
}

/// Cell texts read as missing, matching the markers pandas' `read_csv` treats
/// as NaN by default.
const NA_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn guess_value_type(s: &str) -> Value {
    let t = s.trim();
    if t.is_empty() || NA_MARKERS.contains(&t) {
        return Value::Null;
    }
    if let Ok(i) = t.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = t.parse::<f64>() {
        return Value::Float(f);
    }
    if t == "true" || t == "false" {
        return Value::Bool(t == "true");
    }
    Value::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`).
/// Columns are the union of keys in order of first appearance.
fn load_json(path: &Path) -> Result<Table, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records = root.as_array().ok_or_else(|| LoadError::InvalidRecord {
        row: 0,
        reason: "expected a top-level JSON array".to_string(),
    })?;

    let mut objects = Vec::with_capacity(records.len());
    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or_else(|| LoadError::InvalidRecord {
            row: i,
            reason: "not a JSON object".to_string(),
        })?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let mut table = Table::new(columns.clone());
    for obj in objects {
        table.push_row(
            columns
                .iter()
                .map(|c| obj.get(c).map_or(Value::Null, json_to_value))
                .collect(),
        );
    }
    Ok(table)
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one scalar column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Table, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut table = Table::new(columns);
    for batch_result in reader {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            table.push_row(
                batch
                    .columns()
                    .iter()
                    .map(|col| extract_value(col, row))
                    .collect(),
            );
        }
    }
    Ok(table)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &ArrayRef, row: usize) -> Value {
    if col.is_null(row) {
        return Value::Null;
    }
    let extracted = match col.data_type() {
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|a| Value::String(a.value(row).to_string())),
        DataType::LargeUtf8 => col
            .as_string_opt::<i64>()
            .map(|a| Value::String(a.value(row).to_string())),
        DataType::Int8 => col
            .as_primitive_opt::<Int8Type>()
            .map(|a| Value::Integer(a.value(row).into())),
        DataType::Int16 => col
            .as_primitive_opt::<Int16Type>()
            .map(|a| Value::Integer(a.value(row).into())),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| Value::Integer(a.value(row).into())),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| Value::Integer(a.value(row))),
        DataType::UInt8 => col
            .as_primitive_opt::<UInt8Type>()
            .map(|a| Value::Integer(a.value(row).into())),
        DataType::UInt16 => col
            .as_primitive_opt::<UInt16Type>()
            .map(|a| Value::Integer(a.value(row).into())),
        DataType::UInt32 => col
            .as_primitive_opt::<UInt32Type>()
            .map(|a| Value::Integer(a.value(row).into())),
        DataType::UInt64 => col
            .as_primitive_opt::<UInt64Type>()
            .map(|a| Value::Float(a.value(row) as f64)),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| Value::Float(a.value(row).into())),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| Value::Float(a.value(row))),
        DataType::Boolean => col.as_boolean_opt().map(|a| Value::Bool(a.value(row))),
        _ => None,
    };
    extracted.unwrap_or_else(|| match array_value_to_string(col.as_ref(), row) {
        Ok(s) => Value::String(s),
        Err(_) => Value::Null,
    })
}
