//! Raw parameter tables: loading from disk and conversion from CSV rows

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use super::RawParameterTable;
use crate::error::{ParameterError, Result};

/// Where a raw parameter table comes from
#[derive(Debug, Clone)]
pub enum ParameterSource {
    /// A `.json`, `.yaml` or `.yml` file
    Path(PathBuf),
    /// A table already in memory
    Inline(serde_json::Value),
}

impl From<PathBuf> for ParameterSource {
    fn from(path: PathBuf) -> Self {
        ParameterSource::Path(path)
    }
}

impl From<&Path> for ParameterSource {
    fn from(path: &Path) -> Self {
        ParameterSource::Path(path.to_path_buf())
    }
}

impl From<serde_json::Value> for ParameterSource {
    fn from(value: serde_json::Value) -> Self {
        ParameterSource::Inline(value)
    }
}

/// Load a raw parameter table.
///
/// Inline tables are returned unchanged. Files are parsed as YAML when the
/// extension is `yaml`/`yml` and as JSON otherwise.
pub fn load_parameters(source: impl Into<ParameterSource>) -> Result<serde_json::Value> {
    let path = match source.into() {
        ParameterSource::Inline(value) => return Ok(value),
        ParameterSource::Path(path) => path,
    };

    if !path.exists() {
        return Err(ParameterError::Io {
            path,
            message: "file does not exist".to_string(),
        });
    }
    let content = fs::read_to_string(&path).map_err(|e| ParameterError::Io {
        path: path.clone(),
        message: e.to_string(),
    })?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let value = if is_yaml {
        serde_saphyr::from_str::<serde_json::Value>(&content).map_err(|e| ParameterError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?
    } else {
        serde_json::from_str::<serde_json::Value>(&content).map_err(|e| ParameterError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?
    };
    debug!(path = %path.display(), yaml = is_yaml, "loaded parameter table");
    Ok(value)
}

/// Parse one CSV cell: integers and finite floats become numbers, empty
/// cells become null, everything else stays a string.
fn cell_value(cell: &str) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Value::from(n);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map_or_else(|| Value::String(cell.to_string()), Value::Number)
}

/// Turn CSV-like rows into a keyed table the catalog can consume.
///
/// The first row is the header; its first cell names the key column and is
/// dropped. Every other row maps its first cell to `{header: cell}` for the
/// cells it actually has, so short rows yield fewer fields. Numeric cells
/// are parsed so uncertainty columns deserialize as numbers.
#[must_use]
pub fn rows_to_table(rows: &[Vec<String>]) -> RawParameterTable {
    let Some((header, data)) = rows.split_first() else {
        return BTreeMap::new();
    };
    let columns = header.get(1..).unwrap_or_default();

    data.iter()
        .filter_map(|row| {
            let (key, cells) = row.split_first()?;
            let fields = columns
                .iter()
                .zip(cells)
                .map(|(column, cell)| (column.clone(), cell_value(cell)))
                .collect();
            Some((key.clone(), fields))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn rows(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("parameters.json");
        fs::write(&path, r#"{"param1": 1, "param2": "value"}"#).unwrap();

        let value = load_parameters(path.as_path()).unwrap();
        assert_eq!(value, json!({"param1": 1, "param2": "value"}));
    }

    #[test]
    fn test_load_yaml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("parameters.yaml");
        fs::write(&path, "mass:\n  amount: 1200\n  sizes: [Medium]\n").unwrap();

        let value = load_parameters(path.as_path()).unwrap();
        assert_eq!(value["mass"]["amount"], json!(1200));
        assert_eq!(value["mass"]["sizes"], json!(["Medium"]));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_parameters(PathBuf::from("nonexistent_file.json")).unwrap_err();
        assert!(err.to_string().contains("can't find this filepath"));
    }

    #[test]
    fn test_load_malformed_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_parameters(path.as_path()),
            Err(ParameterError::Parse { .. })
        ));
    }

    #[test]
    fn test_inline_table_passes_through() {
        let table = json!({"param1": 1, "param2": "value"});
        assert_eq!(load_parameters(table.clone()).unwrap(), table);
    }

    #[test]
    fn test_rows_to_table() {
        let table = rows_to_table(&rows(&[
            &["ID", "Name", "Age"],
            &["1", "John", "25"],
            &["2", "Jane", "30"],
        ]));
        assert_eq!(table.len(), 2);
        assert_eq!(table["1"]["Name"], json!("John"));
        assert_eq!(table["2"]["Age"], json!(30));
    }

    #[test]
    fn test_rows_to_table_short_rows() {
        let table = rows_to_table(&rows(&[
            &["ID", "Name", "Age"],
            &["1", "John"],
            &["2", "Jane", "30"],
        ]));
        assert_eq!(table["1"].len(), 1);
        assert!(!table["1"].contains_key("Age"));
        assert_eq!(table["2"].len(), 2);
    }

    #[test]
    fn test_rows_to_table_parses_numeric_cells() {
        let table = rows_to_table(&rows(&[
            &["key", "name", "uncertainty_type", "minimum", "maximum", "amount"],
            &["eff", "efficiency", "4", "0.2", "0.4", ""],
            &["label", "v1.2", "uniform", " 3 ", "nan", "1e400"],
        ]));
        assert_eq!(table["eff"]["uncertainty_type"], json!(4));
        assert_eq!(table["eff"]["minimum"], json!(0.2));
        assert_eq!(table["eff"]["amount"], Value::Null);
        assert_eq!(table["label"]["name"], json!("v1.2"));
        assert_eq!(table["label"]["uncertainty_type"], json!("uniform"));
        assert_eq!(table["label"]["minimum"], json!(3));
        // Non-finite floats have no JSON number form
        assert_eq!(table["label"]["maximum"], json!("nan"));
        assert_eq!(table["label"]["amount"], json!("1e400"));
    }

    #[test]
    fn test_rows_to_table_empty() {
        assert!(rows_to_table(&[]).is_empty());
    }
}
