
use anyhow::Context;
use csv::StringRecord;
use log::{debug, warn};
use std::fs::File;
use std::path::Path;

use crate::cross_reference::{match_clinical_key, MatchConfig, MatchResult};
use crate::data_types::clinical_key::ClinicalKey;
use crate::parsing::clinical_report::ClinicalReport;
use crate::parsing::sample_index::SampleVariantIndex;
use crate::util::numeric::{format_optional, format_optional_float};

/// Result columns appended after the report columns
pub const RESULT_COLUMNS: [&str; 6] = [
    "Found", "Matched Genomic", "Position Coverage", "Variant Coverage", "Variant Frequency", "Index Key"
];

/// Tallies for a reconciliation run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileCounts {
    /// Rows with a matching record
    pub found: u64,
    /// Rows with a valid descriptor and known sample, but no matching record
    pub not_found: u64,
    /// Rows whose descriptor could not be decoded
    pub invalid_descriptor: u64,
    /// Rows for a sample with no VCF
    pub missing_sample: u64
}

impl ReconcileCounts {
    pub fn total(&self) -> u64 {
        self.found + self.not_found + self.invalid_descriptor + self.missing_sample
    }
}

/// Writes the report rows back out with the match columns appended
pub struct ReconciliationWriter {
    csv_writer: csv::Writer<File>
}

impl ReconciliationWriter {
    /// Creates the output and writes the header: every report column, then the labelled result columns
    /// # Arguments
    /// * `filename` - the output path (tsv/csv)
    /// * `report_headers` - the header row of the clinical report
    /// * `label` - prefix for the result columns, e.g. "MGC" gives "MGC Found"; empty for no prefix
    pub fn new(filename: &Path, report_headers: &StringRecord, label: &str) -> csv::Result<Self> {
        // modify the delimiter to "," if it ends with .csv
        let is_csv: bool = filename.extension().unwrap_or_default() == "csv";
        let delimiter: u8 = if is_csv { b',' } else { b'\t' };
        let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_path(filename)?;

        let mut header = report_headers.clone();
        for column in RESULT_COLUMNS.iter() {
            if label.is_empty() {
                header.push_field(column);
            } else {
                header.push_field(&format!("{label} {column}"));
            }
        }
        csv_writer.write_record(&header)?;
        Ok(Self { csv_writer })
    }

    /// Writes one report row followed by its result values.
    /// Non-matching rows get "N" and empty match columns; a match without usable depths gets NA for them.
    pub fn write_row(&mut self, record: &StringRecord, match_result: &MatchResult) -> csv::Result<()> {
        let mut row = record.clone();
        match match_result.variant() {
            Some(variant) => {
                row.push_field("Y");
                row.push_field(&variant.genomic_descriptor());
                row.push_field(&format_optional(variant.total_depth()));
                row.push_field(&format_optional(variant.alt_depth()));
                row.push_field(&format_optional_float(variant.real_allele_frequency()));
                row.push_field(match_result.sample_key().unwrap_or_default());
            },
            None => {
                row.push_field("N");
                for _ in 1..RESULT_COLUMNS.len() {
                    row.push_field("");
                }
            }
        }
        self.csv_writer.write_record(&row)
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.csv_writer.flush()
    }
}

/// Streams every row of a clinical report through the matcher and writes the annotated copy
/// # Arguments
/// * `report` - the opened clinical report
/// * `index` - the per-sample variants
/// * `match_config` - controls position matching
/// * `writer` - destination for the annotated rows
/// # Errors
/// * if the report cannot be read or the output cannot be written
pub fn reconcile_report(
    report: &mut ClinicalReport, index: &SampleVariantIndex, match_config: MatchConfig,
    writer: &mut ReconciliationWriter
) -> anyhow::Result<ReconcileCounts> {
    let mut counts = ReconcileCounts::default();
    for result in report.rows() {
        let row = result?;
        let match_result = match (ClinicalKey::parse(row.genomic()), index.get(row.sample())) {
            (Err(e), _) => {
                warn!("Row {}: {e}", row.row_number());
                counts.invalid_descriptor += 1;
                MatchResult::no_match()
            },
            (Ok(_), None) => {
                warn!("Row {}: no VCF loaded for sample {:?}", row.row_number(), row.sample());
                counts.missing_sample += 1;
                MatchResult::no_match()
            },
            (Ok(clinical_key), Some(sample_variants)) => {
                let match_result = match_clinical_key(&clinical_key, sample_variants, match_config);
                if match_result.is_match() {
                    counts.found += 1;
                } else {
                    debug!("Row {}: {clinical_key} not found in sample {:?}", row.row_number(), row.sample());
                    counts.not_found += 1;
                }
                match_result
            }
        };
        writer.write_row(row.record(), &match_result)
            .with_context(|| format!("Error while writing result for report row {}:", row.row_number()))?;
    }
    writer.flush()?;
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::compare::PositionMatch;
    use crate::cross_reference::MatchConfigBuilder;

    fn run_fixture(label: &str, position_match: PositionMatch, out_name: &str) -> (ReconcileCounts, Vec<StringRecord>) {
        let index = SampleVariantIndex::from_vcf_folder(Path::new("test_data/clinical_compare/vcfs")).unwrap();
        let mut report = ClinicalReport::from_path(Path::new("test_data/clinical_compare/report.csv")).unwrap();
        let out_folder = std::env::temp_dir().join(format!("varmatch_reconcile_{}", std::process::id()));
        std::fs::create_dir_all(&out_folder).unwrap();
        let out_filename = out_folder.join(out_name);

        let mut writer = ReconciliationWriter::new(&out_filename, report.headers(), label).unwrap();
        let match_config = MatchConfigBuilder::default()
            .position_match(position_match)
            .build().unwrap();
        let counts = reconcile_report(&mut report, &index, match_config, &mut writer).unwrap();
        drop(writer);

        let mut reader = csv::ReaderBuilder::new().has_headers(false).from_path(&out_filename).unwrap();
        let rows: Vec<StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        std::fs::remove_file(&out_filename).unwrap();
        (counts, rows)
    }

    #[test]
    fn test_reconcile_fixture() {
        let (counts, rows) = run_fixture("", PositionMatch::Substring, "plain.csv");
        assert_eq!(counts, ReconcileCounts { found: 3, not_found: 1, invalid_descriptor: 1, missing_sample: 1 });
        assert_eq!(counts.total(), 6);

        // header plus one row per report row, original columns first
        assert_eq!(rows.len(), 7);
        assert_eq!(&rows[0][0], "Sample");
        assert_eq!(&rows[0][3], "Found");
        assert_eq!(&rows[0][8], "Index Key");

        assert_eq!(
            rows[1].iter().collect::<Vec<&str>>(),
            vec!["S1", "chr7:g.140453136A>T", "BRAF V600E", "Y", "chr7:g.140453136A>T", "80", "30", "0.375", "140453136"]
        );
        // matched, but the record has no AD
        assert_eq!(
            rows[2].iter().collect::<Vec<&str>>(),
            vec!["S1", "chr17:g.7578406C>T", "TP53 R175H", "Y", "chr17:g.7578406C>T", "NA", "NA", "NA", "7578406"]
        );
        // substring mode finds 1002 for position 100
        assert_eq!(&rows[3][4], "chr1:g.1002G>C");
        assert_eq!(
            rows[6].iter().collect::<Vec<&str>>(),
            vec!["S9", "chr1:g.1000A>T", "unknown sample", "N", "", "", "", "", ""]
        );
    }

    #[test]
    fn test_reconcile_exact_labelled() {
        let (counts, rows) = run_fixture("MGC", PositionMatch::Exact, "labelled.csv");
        assert_eq!(counts.found, 2);
        assert_eq!(counts.not_found, 2);
        assert_eq!(&rows[0][3], "MGC Found");
        assert_eq!(&rows[0][5], "MGC Position Coverage");
        assert_eq!(&rows[3][3], "N");
    }
}
