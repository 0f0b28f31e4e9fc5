
use log::warn;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::accuracy_aggregator::{AccuracyAggregator, ClassSummary};
use crate::data_types::accuracy_bucket::{AggregationError, VariantClass};
use crate::util::numeric::format_optional_float;

/// The tables written, in order
pub const SUMMARY_CLASSES: [VariantClass; 3] = [VariantClass::Indel, VariantClass::Snp, VariantClass::All];

/// One row of a per-class precision/recall table
#[derive(Serialize)]
struct AccuracyRow<'a> {
    #[serde(rename = "Sample")]
    sample: &'a str,
    #[serde(rename = "Truth")]
    truth_total: u64,
    #[serde(rename = "Query")]
    query_total: u64,
    #[serde(rename = "TP")]
    true_positive: u64,
    #[serde(rename = "FP")]
    false_positive: u64,
    #[serde(rename = "FN")]
    false_negative: u64,
    /// Rounded precision, or NA
    #[serde(rename = "Precision")]
    precision: String,
    /// Rounded recall, or NA
    #[serde(rename = "Recall")]
    recall: String
}

impl<'a> AccuracyRow<'a> {
    fn new(sample: &'a str, variant_class: VariantClass, summary: &ClassSummary) -> Self {
        let bucket = summary.bucket();
        Self {
            sample,
            truth_total: bucket.truth_total,
            query_total: bucket.query_total,
            true_positive: bucket.true_positive,
            false_positive: bucket.false_positive,
            false_negative: bucket.false_negative,
            precision: format_optional_float(metric_or_warn(sample, variant_class, summary.precision())),
            recall: format_optional_float(metric_or_warn(sample, variant_class, summary.recall()))
        }
    }
}

/// Undefined metrics get reported and then written as NA
fn metric_or_warn(sample: &str, variant_class: VariantClass, metric: Result<f64, AggregationError>) -> Option<f64> {
    match metric {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Sample {sample} {variant_class}: {e}");
            None
        }
    }
}

/// The path of the table for one class, e.g. "{output_folder}/SNP.csv"
pub fn summary_filename(output_folder: &Path, variant_class: VariantClass) -> PathBuf {
    output_folder.join(format!("{}.csv", variant_class.as_ref()))
}

/// Writes the precision/recall table for a single class.
/// Samples without that class are left out.
/// # Arguments
/// * `filename` - the output path (tsv/csv)
/// * `aggregator` - all sample summaries
/// * `variant_class` - the class to write
pub fn write_class_summary(filename: &Path, aggregator: &AccuracyAggregator, variant_class: VariantClass) -> csv::Result<usize> {
    // modify the delimiter to "," if it ends with .csv
    let is_csv: bool = filename.extension().unwrap_or_default() == "csv";
    let delimiter: u8 = if is_csv { b',' } else { b'\t' };
    let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(filename)?;

    let mut rows_written = 0;
    for (sample, sample_accuracy) in aggregator.iter() {
        let Some(summary) = sample_accuracy.summary(variant_class) else {
            warn!("Sample {sample} has no {variant_class} summary, skipping it in {filename:?}");
            continue;
        };
        csv_writer.serialize(AccuracyRow::new(sample, variant_class, &summary))?;
        rows_written += 1;
    }

    // serialize only emits the header with the first row
    if rows_written == 0 {
        csv_writer.write_record(["Sample", "Truth", "Query", "TP", "FP", "FN", "Precision", "Recall"])?;
    }
    csv_writer.flush()?;
    Ok(rows_written)
}

/// Writes INDEL.csv, SNP.csv, and ALL.csv into the output folder
pub fn write_accuracy_summaries(output_folder: &Path, aggregator: &AccuracyAggregator) -> csv::Result<()> {
    for variant_class in SUMMARY_CLASSES {
        write_class_summary(&summary_filename(output_folder, variant_class), aggregator, variant_class)?;
    }
    Ok(())
}
