//! DataFrame access for the Plotly builders
//!
//! Column lookups, conversion of Polars values into the JSON values Plotly
//! expects, and the numeric views the statistics need.

use crate::{DataFrame, Result, VueError};
use polars::prelude::*;
use serde_json::{json, Value};

/// Check that every bound column exists in the data
///
/// `bindings` pairs the parameter name with the column it references. All
/// missing columns are reported together.
pub fn check_columns(data: &DataFrame, bindings: &[(&'static str, &str)]) -> Result<()> {
    let available: Vec<String> = data
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let missing: Vec<String> = bindings
        .iter()
        .filter(|(_, column)| !available.iter().any(|c| c == column))
        .map(|(param, column)| {
            format!("Column '{}' referenced in '{}' does not exist.", column, param)
        })
        .collect();

    if missing.is_empty() {
        return Ok(());
    }
    Err(VueError::DataError(format!(
        "{}\nAvailable columns: {}",
        missing.join("\n"),
        available.join(", ")
    )))
}

fn series<'a>(data: &'a DataFrame, column: &str) -> Result<&'a Series> {
    data.column(column)
        .map(|c| c.as_materialized_series())
        .map_err(|e| VueError::DataError(format!("Failed to read column '{}': {}", column, e)))
}

/// Whether the column holds numbers (plotly treats these as continuous)
pub fn is_numeric(data: &DataFrame, column: &str) -> Result<bool> {
    use DataType::*;
    Ok(matches!(
        series(data, column)?.dtype(),
        Int8 | Int16 | Int32 | Int64 | UInt8 | UInt16 | UInt32 | UInt64 | Float32 | Float64
    ))
}

/// Every value of a column as JSON, in row order
pub fn column_values(data: &DataFrame, column: &str) -> Result<Vec<Value>> {
    let series = series(data, column)?;
    (0..series.len()).map(|idx| series_value_at(series, idx)).collect()
}

/// Numeric view of a column; missing values stay `None`
pub fn numeric_values(data: &DataFrame, column: &str, param: &str) -> Result<Vec<Option<f64>>> {
    if !is_numeric(data, column)? {
        return Err(VueError::DataError(format!(
            "Column '{}' referenced in '{}' must be numeric, got {}",
            column,
            param,
            series(data, column)?.dtype()
        )));
    }
    let cast = series(data, column)?
        .cast(&DataType::Float64)
        .map_err(|e| VueError::DataError(format!("Failed to cast '{}' to f64: {}", column, e)))?;
    let ca = cast
        .f64()
        .map_err(|e| VueError::DataError(format!("Failed to cast '{}' to f64: {}", column, e)))?;
    Ok(ca.into_iter().collect())
}

/// Get a single value from a series at a given index as JSON Value
fn series_value_at(series: &Series, idx: usize) -> Result<Value> {
    use DataType::*;

    let cast_err = |kind: &str, e: PolarsError| {
        VueError::DataError(format!(
            "Failed to read '{}' as {}: {}",
            series.name(),
            kind,
            e
        ))
    };

    match series.dtype() {
        Int8 => Ok(json!(series.i8().map_err(|e| cast_err("i8", e))?.get(idx))),
        Int16 => Ok(json!(series.i16().map_err(|e| cast_err("i16", e))?.get(idx))),
        Int32 => Ok(json!(series.i32().map_err(|e| cast_err("i32", e))?.get(idx))),
        Int64 => Ok(json!(series.i64().map_err(|e| cast_err("i64", e))?.get(idx))),
        UInt8 => Ok(json!(series.u8().map_err(|e| cast_err("u8", e))?.get(idx))),
        UInt16 => Ok(json!(series.u16().map_err(|e| cast_err("u16", e))?.get(idx))),
        UInt32 => Ok(json!(series.u32().map_err(|e| cast_err("u32", e))?.get(idx))),
        UInt64 => Ok(json!(series.u64().map_err(|e| cast_err("u64", e))?.get(idx))),
        Float32 => Ok(json!(series.f32().map_err(|e| cast_err("f32", e))?.get(idx))),
        Float64 => Ok(json!(series.f64().map_err(|e| cast_err("f64", e))?.get(idx))),
        Boolean => Ok(json!(series.bool().map_err(|e| cast_err("bool", e))?.get(idx))),
        String => Ok(json!(series.str().map_err(|e| cast_err("string", e))?.get(idx))),
        Date => {
            // Days since epoch -> "YYYY-MM-DD"
            let ca = series.date().map_err(|e| cast_err("date", e))?;
            match ca.phys.get(idx) {
                Some(days) => {
                    let date = chrono::NaiveDate::from_ymd_opt(1970, 1, 1)
                        .and_then(|epoch| epoch.checked_add_signed(chrono::Duration::days(days as i64)));
                    Ok(date
                        .map(|d| json!(d.format("%Y-%m-%d").to_string()))
                        .unwrap_or(Value::Null))
                }
                None => Ok(Value::Null),
            }
        }
        Datetime(time_unit, _) => {
            // Plotly parses "YYYY-MM-DD HH:MM:SS.ffffff" as a date axis value
            let ca = series.datetime().map_err(|e| cast_err("datetime", e))?;
            match ca.phys.get(idx) {
                Some(timestamp) => {
                    let micros = match time_unit {
                        TimeUnit::Microseconds => timestamp,
                        TimeUnit::Milliseconds => timestamp * 1_000,
                        TimeUnit::Nanoseconds => timestamp / 1_000,
                    };
                    let secs = micros.div_euclid(1_000_000);
                    let nsecs = (micros.rem_euclid(1_000_000) * 1000) as u32;
                    Ok(chrono::DateTime::<chrono::Utc>::from_timestamp(secs, nsecs)
                        .map(|dt| json!(dt.format("%Y-%m-%d %H:%M:%S%.6f").to_string()))
                        .unwrap_or(Value::Null))
                }
                None => Ok(Value::Null),
            }
        }
        Time => {
            let ca = series.time().map_err(|e| cast_err("time", e))?;
            match ca.phys.get(idx) {
                Some(nanos) => {
                    let hours = nanos / 3_600_000_000_000;
                    let minutes = (nanos % 3_600_000_000_000) / 60_000_000_000;
                    let seconds = (nanos % 60_000_000_000) / 1_000_000_000;
                    let millis = (nanos % 1_000_000_000) / 1_000_000;
                    Ok(json!(format!(
                        "{:02}:{:02}:{:02}.{:03}",
                        hours, minutes, seconds, millis
                    )))
                }
                None => Ok(Value::Null),
            }
        }
        _ => {
            // Fallback: convert to string
            let value = series.get(idx).map_err(|e| cast_err("value", e))?;
            Ok(match value {
                AnyValue::Null => Value::Null,
                AnyValue::String(s) => json!(s),
                AnyValue::StringOwned(s) => json!(s.as_str()),
                other => json!(other.to_string()),
            })
        }
    }
}

/// Text used to group rows and label traces by a value
pub fn group_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        df! {
            "a" => &[1i64, 2, 3],
            "b" => &[Some(0.5), None, Some(2.5)],
            "g" => &["x", "y", "x"],
            "flag" => &[true, false, true],
        }
        .unwrap()
    }

    #[test]
    fn test_missing_column_error() {
        let err = check_columns(&frame(), &[("x", "a"), ("color", "group")]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Column 'group' referenced in 'color' does not exist"));
        assert!(msg.contains("Available columns: a, b, g, flag"));
    }

    #[test]
    fn test_every_missing_column_is_reported() {
        let err = check_columns(
            &frame(),
            &[("x", "a"), ("y", "score"), ("color", "group"), ("hover_data", "b")],
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Column 'score' referenced in 'y' does not exist."));
        assert!(msg.contains("Column 'group' referenced in 'color' does not exist."));
        assert!(!msg.contains("'a'"));
        assert_eq!(msg.matches("Available columns").count(), 1);
    }

    #[test]
    fn test_column_values_keep_types() {
        let df = frame();
        assert_eq!(column_values(&df, "a").unwrap(), vec![json!(1), json!(2), json!(3)]);
        assert_eq!(column_values(&df, "b").unwrap(), vec![json!(0.5), Value::Null, json!(2.5)]);
        assert_eq!(column_values(&df, "g").unwrap(), vec![json!("x"), json!("y"), json!("x")]);
        assert_eq!(column_values(&df, "flag").unwrap()[1], json!(false));
    }

    #[test]
    fn test_numeric_values() {
        let df = frame();
        assert!(is_numeric(&df, "a").unwrap());
        assert!(!is_numeric(&df, "g").unwrap());
        assert_eq!(
            numeric_values(&df, "b", "y").unwrap(),
            vec![Some(0.5), None, Some(2.5)]
        );
        let err = numeric_values(&df, "g", "size").unwrap_err();
        assert!(err.to_string().contains("must be numeric"));
    }

    #[test]
    fn test_date_values_as_iso_strings() {
        let dates = Series::new("d".into(), &[0i32, 365])
            .cast(&DataType::Date)
            .unwrap();
        let df = DataFrame::new(vec![dates.into()]).unwrap();
        assert_eq!(
            column_values(&df, "d").unwrap(),
            vec![json!("1970-01-01"), json!("1971-01-01")]
        );
    }

    #[test]
    fn test_group_key() {
        assert_eq!(group_key(&json!("Up")), "Up");
        assert_eq!(group_key(&json!(3)), "3");
        assert_eq!(group_key(&Value::Null), "");
    }
}
