//! CSV readers for the two layouts the dataset is distributed in.
//!
//! - UCI `wdbc.data`: no header, `id,diagnosis,f1..f30` with `M`/`B` codes.
//! - Headered export: feature columns plus a `target` (or `diagnosis`) column
//!   holding `0`/`1` or `M`/`B`.
//!
//! Both carry exactly [`FEATURE_COUNT`] feature columns. Records are read
//! with the `csv` crate, so quoted fields may hold commas. The layout is
//! detected from the first non-blank record.

use std::fs;
use std::path::Path;

use csv::StringRecord;
use ndarray::Array2;

use crate::dataset::Dataset;
use crate::error::DatasetError;
use crate::schema::{normalize_feature_name, Diagnosis, FEATURE_COUNT, FEATURE_NAMES};

const UCI_COLUMNS: usize = FEATURE_COUNT + 2;
const TARGET_COLUMNS: [&str; 2] = ["target", "diagnosis"];

/// Read a dataset from disk.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Dataset, DatasetError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let dataset = parse_csv(&text)?;
    tracing::info!(
        path = %path.display(),
        samples = dataset.n_samples(),
        features = dataset.n_features(),
        "dataset loaded"
    );
    Ok(dataset)
}

/// Parse dataset text in either supported layout.
pub fn parse_csv(text: &str) -> Result<Dataset, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = reader
        .records()
        .map(|r| r.map_err(csv_error))
        .filter(|r| !matches!(r, Ok(record) if is_blank(record)));

    let first = records.next().ok_or(DatasetError::EmptyDataset)??;
    let first_no = line_of(&first);
    let first_fields: Vec<&str> = first.iter().collect();

    let layout = if looks_like_uci(&first_fields) {
        Layout::Uci
    } else if first_fields.iter().all(|f| f.parse::<f64>().is_ok()) {
        return Err(DatasetError::Parse {
            line: first_no,
            message: "headerless input must use the wdbc.data layout (id,diagnosis,30 features)"
                .into(),
        });
    } else {
        Layout::header(&first_fields, first_no)?
    };

    let mut rows = Rows::new(layout.n_features());
    if let Layout::Uci = layout {
        rows.push_uci(first_no, &first_fields)?;
    }
    for record in records {
        let record = record?;
        let line_no = line_of(&record);
        let fields: Vec<&str> = record.iter().collect();
        match &layout {
            Layout::Uci => rows.push_uci(line_no, &fields)?,
            Layout::Header { target, .. } => rows.push_headered(line_no, &fields, *target)?,
        }
    }

    let names = match layout {
        Layout::Uci => FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        Layout::Header { names, .. } => names,
    };
    rows.finish(names)
}

fn line_of(record: &StringRecord) -> usize {
    record.position().map_or(0, |p| p.line() as usize)
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(str::is_empty)
}

fn csv_error(err: csv::Error) -> DatasetError {
    DatasetError::Parse {
        line: err.position().map_or(0, |p| p.line() as usize),
        message: err.to_string(),
    }
}

fn looks_like_uci(fields: &[&str]) -> bool {
    fields.len() == UCI_COLUMNS && Diagnosis::from_code(fields[1]).is_some()
}

enum Layout {
    Uci,
    Header { names: Vec<String>, target: usize },
}

impl Layout {
    fn header(fields: &[&str], line: usize) -> Result<Self, DatasetError> {
        let target = fields
            .iter()
            .position(|f| TARGET_COLUMNS.contains(&normalize_feature_name(f).as_str()))
            .ok_or_else(|| DatasetError::Parse {
                line,
                message: "header has no `target` or `diagnosis` column".into(),
            })?;
        let names: Vec<String> = fields
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != target)
            .map(|(_, f)| f.to_string())
            .collect();
        if names.len() != FEATURE_COUNT {
            return Err(DatasetError::ShapeMismatch {
                line,
                expected: FEATURE_COUNT + 1,
                found: fields.len(),
            });
        }
        Ok(Layout::Header { names, target })
    }

    fn n_features(&self) -> usize {
        match self {
            Layout::Uci => FEATURE_COUNT,
            Layout::Header { names, .. } => names.len(),
        }
    }
}

struct Rows {
    n_features: usize,
    values: Vec<f64>,
    targets: Vec<usize>,
}

impl Rows {
    fn new(n_features: usize) -> Self {
        Self {
            n_features,
            values: Vec::new(),
            targets: Vec::new(),
        }
    }

    fn push_uci(&mut self, line: usize, fields: &[&str]) -> Result<(), DatasetError> {
        if fields.len() != UCI_COLUMNS {
            return Err(DatasetError::ShapeMismatch {
                line,
                expected: UCI_COLUMNS,
                found: fields.len(),
            });
        }
        let diagnosis =
            Diagnosis::from_code(fields[1]).ok_or_else(|| DatasetError::UnknownDiagnosis {
                line,
                value: fields[1].to_string(),
            })?;
        for field in &fields[2..] {
            self.values.push(parse_value(line, field)?);
        }
        self.targets.push(diagnosis.class_index());
        Ok(())
    }

    fn push_headered(
        &mut self,
        line: usize,
        fields: &[&str],
        target: usize,
    ) -> Result<(), DatasetError> {
        if fields.len() != self.n_features + 1 {
            return Err(DatasetError::ShapeMismatch {
                line,
                expected: self.n_features + 1,
                found: fields.len(),
            });
        }
        for (i, field) in fields.iter().enumerate() {
            if i == target {
                self.targets.push(parse_target(line, field)?);
            } else {
                self.values.push(parse_value(line, field)?);
            }
        }
        Ok(())
    }

    fn finish(self, names: Vec<String>) -> Result<Dataset, DatasetError> {
        if self.targets.is_empty() {
            return Err(DatasetError::EmptyDataset);
        }
        let features = Array2::from_shape_vec((self.targets.len(), self.n_features), self.values)
            .map_err(|e| DatasetError::Inconsistent(e.to_string()))?;
        Dataset::new(names, features, self.targets)
    }
}

fn parse_value(line: usize, field: &str) -> Result<f64, DatasetError> {
    let value: f64 = field.parse().map_err(|_| DatasetError::Parse {
        line,
        message: format!("{field:?} is not a number"),
    })?;
    if !value.is_finite() {
        return Err(DatasetError::Parse {
            line,
            message: format!("{field:?} is not finite"),
        });
    }
    Ok(value)
}

fn parse_target(line: usize, field: &str) -> Result<usize, DatasetError> {
    if let Some(d) = Diagnosis::from_code(field) {
        return Ok(d.class_index());
    }
    match field.parse::<f64>() {
        Ok(v) if v == 0.0 => Ok(Diagnosis::Malignant.class_index()),
        Ok(v) if v == 1.0 => Ok(Diagnosis::Benign.class_index()),
        _ => Err(DatasetError::UnknownDiagnosis {
            line,
            value: field.to_string(),
        }),
    }
}
