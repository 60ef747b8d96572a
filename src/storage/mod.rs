// src/storage/mod.rs
use crate::extractors::models::ExtractionResult;
use crate::metrics::{canonical_keys, MetricsMap};
use crate::render::{context_html, metrics_html};
use crate::utils::error::StorageError;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// A loaded CSV: header row plus string records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Loads the first `num_rows` report rows from `csv_path` and the first
/// `num_rows` JSON table records from the JSON-lines file at `tables_path`.
pub fn load_findsum_data<P: AsRef<Path>, Q: AsRef<Path>>(
    csv_path: P,
    tables_path: Q,
    num_rows: usize,
) -> Result<(CsvTable, Vec<serde_json::Value>), StorageError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(csv_path.as_ref())?;

    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records().take(num_rows) {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    tracing::info!("Loaded {} CSV rows from {}", rows.len(), csv_path.as_ref().display());

    let file = fs::File::open(tables_path.as_ref())?;
    let mut records = Vec::new();
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        if records.len() >= num_rows {
            break;
        }
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value = serde_json::from_str(&line).map_err(|e| {
            StorageError::SerializationError(format!("line {}: {}", line_no + 1, e))
        })?;
        records.push(value);
    }
    tracing::info!("Loaded {} table records from {}", records.len(), tables_path.as_ref().display());

    Ok((CsvTable { headers, rows }, records))
}

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Writes `table` with one metrics column per canonical key seen in any row.
    ///
    /// Rows are aligned by index; the shorter side is padded with empty cells,
    /// as are metrics that were found but could not be parsed.
    pub fn save_metrics_csv(
        &self,
        table: &CsvTable,
        metrics: &[MetricsMap],
        file_name: &str,
    ) -> Result<PathBuf, StorageError> {
        let metric_columns: Vec<&'static str> = canonical_keys()
            .filter(|key| metrics.iter().any(|m| m.contains_key(key)))
            .collect();

        let file_path = self.base_dir.join(file_name);
        let mut writer = csv::Writer::from_path(&file_path)?;

        let header = table
            .headers
            .iter()
            .map(String::as_str)
            .chain(metric_columns.iter().copied());
        writer.write_record(header)?;

        let row_count = table.rows.len().max(metrics.len());
        for i in 0..row_count {
            let mut record: Vec<String> = table
                .rows
                .get(i)
                .cloned()
                .unwrap_or_default();
            record.resize(table.headers.len(), String::new());

            let row_metrics = metrics.get(i);
            record.extend(metric_columns.iter().map(|key| {
                row_metrics
                    .and_then(|m| m.get(key))
                    .map(|v| v.to_string())
                    .unwrap_or_default()
            }));
            writer.write_record(&record)?;
        }

        writer.flush().map_err(StorageError::IoError)?;
        tracing::info!("Metrics and data saved to {}", file_path.display());

        Ok(file_path)
    }

    /// Saves an extraction result as JSON, the two HTML fragments, and a metadata file.
    pub fn save_extraction(&self, result: &ExtractionResult, name: &str) -> Result<Vec<PathBuf>, StorageError> {
        let stem = sanitize_file_stem(name);

        let json = serde_json::to_string_pretty(result)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        let metadata = serde_json::json!({
            "name": name,
            "metric_count": result.metrics.len(),
            "context_sections": result.context.len(),
            "has_competitor": !result.competitor.is_empty(),
            "has_contradictions": !result.contradictions.is_empty(),
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });
        let metadata = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        let outputs = [
            (format!("{}.json", stem), json),
            (format!("{}_metrics.html", stem), metrics_html(&result.metrics)),
            (format!("{}_context.html", stem), context_html(&result.context)),
            (format!("{}_meta.json", stem), metadata),
        ];

        let mut paths = Vec::with_capacity(outputs.len());
        for (file_name, contents) in outputs {
            let path = self.base_dir.join(file_name);
            fs::write(&path, contents).map_err(StorageError::IoError)?;
            tracing::info!("Saved {}", path.display());
            paths.push(path);
        }

        Ok(paths)
    }
}

fn sanitize_file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "extraction".to_string()
    } else {
        stem
    }
}
