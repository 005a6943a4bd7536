//! Comma-separated dataset reader
//!
//! One sample per line: feature values followed by a class sentinel. The
//! sentinel `g` ("good" radar return) is class 1, anything else is class 0.

use super::Dataset;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Sentinel token of the positive class.
pub const POSITIVE_SENTINEL: &str = "g";

/// Parse one line into its feature values and label.
///
/// `line_number` is 1-based and only used for error messages. The feature count
/// is the token count minus one; the caller checks it against the model width.
pub fn parse_line(line: &str, line_number: usize) -> Result<(Vec<f32>, usize)> {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut tokens: Vec<&str> = line.split(',').collect();
    // split always yields at least one token
    let sentinel = tokens.pop().unwrap_or_default();
    let label = usize::from(sentinel == POSITIVE_SENTINEL);

    let features = tokens
        .iter()
        .map(|token| {
            token.trim().parse::<f32>().map_err(|err| {
                Error::parse(line_number, format!("invalid feature {token:?}: {err}"))
            })
        })
        .collect::<Result<Vec<f32>>>()?;

    Ok((features, label))
}

/// Read a whole dataset, requiring exactly `feature_count` features per line.
///
/// The first malformed line aborts the read.
pub fn read_dataset<R: BufRead>(reader: R, feature_count: usize) -> Result<Dataset> {
    let mut features = Vec::new();
    let mut labels = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        let (row, label) = parse_line(&line, line_number)?;
        if row.len() != feature_count {
            return Err(Error::FeatureCount {
                line: line_number,
                expected: feature_count,
                found: row.len(),
            });
        }
        features.extend_from_slice(&row);
        labels.push(label);
    }

    Dataset::new(features, labels, feature_count)
}

/// Open and read a dataset file.
pub fn load_dataset(path: impl AsRef<Path>, feature_count: usize) -> Result<Dataset> {
    let file = File::open(path)?;
    read_dataset(BufReader::new(file), feature_count)
}
