
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

use crate::data_types::accuracy_bucket::AccuracyBucket;

/// Filter value for the rows restricted to passing calls; these rows are excluded from aggregation
pub const PASS_FILTER: &str = "PASS";

/// One row of a per-sample benchmarking summary (hap.py `*.summary.csv` layout).
/// Only the named columns are read, any others are ignored.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct BenchmarkRow {
    /// Variant class label, e.g. INDEL or SNP
    #[serde(rename = "Type")]
    pub variant_type: String,
    /// Filter label, e.g. ALL or PASS
    #[serde(rename = "Filter")]
    pub filter: String,
    #[serde(rename = "TRUTH.TOTAL")]
    pub truth_total: u64,
    #[serde(rename = "TRUTH.TP")]
    pub true_positive: u64,
    #[serde(rename = "TRUTH.FN")]
    pub false_negative: u64,
    #[serde(rename = "QUERY.TOTAL")]
    pub query_total: u64,
    #[serde(rename = "QUERY.FP")]
    pub false_positive: u64,
    /// Recall as reported upstream, may be blank
    #[serde(rename = "METRIC.Recall")]
    pub recall: Option<f64>,
    /// Precision as reported upstream, may be blank
    #[serde(rename = "METRIC.Precision")]
    pub precision: Option<f64>
}

impl BenchmarkRow {
    /// True if this row is restricted to PASS calls
    pub fn is_pass_filtered(&self) -> bool {
        self.filter == PASS_FILTER
    }

    /// Converts the counts into an AccuracyBucket
    pub fn bucket(&self) -> AccuracyBucket {
        AccuracyBucket::new(
            self.truth_total, self.query_total,
            self.true_positive, self.false_positive, self.false_negative
        )
    }
}

/// Loads all rows from a comma-separated benchmarking summary with a header line.
/// # Arguments
/// * `filename` - the summary CSV
/// # Errors
/// * if the file does not open, or a required column is missing or malformed
pub fn load_benchmark_summary(filename: &Path) -> anyhow::Result<Vec<BenchmarkRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .trim(csv::Trim::All)
        .from_path(filename)
        .with_context(|| format!("Error while opening {filename:?}:"))?;

    csv_reader.deserialize()
        .map(|result| result.with_context(|| format!("Error while parsing {filename:?}:")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;
    use std::path::PathBuf;

    #[test]
    fn test_load_summary() {
        let filename = PathBuf::from("test_data/benchmark_summaries/S1_hg002.summary.csv");
        let rows = load_benchmark_summary(&filename).unwrap();
        assert_eq!(rows.len(), 4);

        let indel_all = &rows[0];
        assert_eq!(indel_all.variant_type, "INDEL");
        assert!(!indel_all.is_pass_filtered());
        assert_eq!(indel_all.bucket(), AccuracyBucket::new(6, 4, 4, 0, 2));
        assert_approx_eq!(indel_all.precision.unwrap(), 1.0);
        assert!(rows[1].is_pass_filtered());
    }
}
