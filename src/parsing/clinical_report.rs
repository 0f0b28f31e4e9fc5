
use anyhow::{anyhow, bail, Context};
use csv::StringRecord;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Column holding the sample identifier
pub const SAMPLE_COLUMN: &str = "Sample";
/// Column holding the `chrom:g.<pos><ref>><alt>` descriptor
pub const GENOMIC_COLUMN: &str = "Genomic";

/// Streaming reader for a comma-separated clinical report.
/// Every column is passed through untouched; only the sample and descriptor columns get interpreted.
pub struct ClinicalReport {
    /// Source path, for error messages
    filename: PathBuf,
    /// Underlying reader
    csv_reader: csv::Reader<File>,
    /// The header row
    headers: StringRecord,
    /// Index of the sample column
    sample_index: usize,
    /// Index of the descriptor column
    genomic_index: usize
}

impl ClinicalReport {
    /// Opens a report and resolves the sample and descriptor columns from its header
    /// # Arguments
    /// * `filename` - the report CSV
    /// # Errors
    /// * if the file does not open, or either required column is missing
    pub fn from_path(filename: &Path) -> anyhow::Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(true)
            .from_path(filename)
            .with_context(|| format!("Error while opening {filename:?}:"))?;
        let headers = csv_reader.headers()
            .with_context(|| format!("Error while reading header of {filename:?}:"))?
            .clone();

        let find = |name: &str| -> anyhow::Result<usize> {
            headers.iter().position(|h| h.trim() == name)
                .ok_or_else(|| anyhow!("{filename:?} is missing required column {name:?}"))
        };
        let sample_index = find(SAMPLE_COLUMN)?;
        let genomic_index = find(GENOMIC_COLUMN)?;

        Ok(Self {
            filename: filename.to_path_buf(),
            csv_reader,
            headers,
            sample_index,
            genomic_index
        })
    }

    /// The header row, as written
    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    /// Iterates over the report rows, checking each has the required columns
    pub fn rows(&mut self) -> impl Iterator<Item = anyhow::Result<ReportRow>> + '_ {
        let sample_index = self.sample_index;
        let genomic_index = self.genomic_index;
        let filename = &self.filename;
        self.csv_reader.records()
            .enumerate()
            .map(move |(i, result)| {
                // header is line 1
                let row_number = i + 2;
                let record = result.with_context(|| format!("Error while reading row {row_number} of {filename:?}:"))?;
                if record.get(sample_index).is_none() || record.get(genomic_index).is_none() {
                    bail!("Row {row_number} of {filename:?} is missing the sample or genomic column");
                }
                Ok(ReportRow { row_number, record, sample_index, genomic_index })
            })
    }
}

/// A single report row
#[derive(Clone, Debug)]
pub struct ReportRow {
    /// 1-based row number, counting the header
    row_number: usize,
    /// All of the original values
    record: StringRecord,
    sample_index: usize,
    genomic_index: usize
}

impl ReportRow {
    pub fn row_number(&self) -> usize {
        self.row_number
    }

    pub fn record(&self) -> &StringRecord {
        &self.record
    }

    pub fn sample(&self) -> &str {
        self.record.get(self.sample_index).unwrap_or_default().trim()
    }

    pub fn genomic(&self) -> &str {
        self.record.get(self.genomic_index).unwrap_or_default().trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_report() {
        let mut report = ClinicalReport::from_path(Path::new("test_data/clinical_compare/report.csv")).unwrap();
        assert_eq!(report.headers().get(0), Some("Sample"));
        let rows: Vec<ReportRow> = report.rows().collect::<anyhow::Result<_>>().unwrap();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].row_number(), 2);
        assert_eq!(rows[0].sample(), "S1");
        assert_eq!(rows[0].genomic(), "chr7:g.140453136A>T");
    }

    #[test]
    fn test_missing_column() {
        let error = ClinicalReport::from_path(Path::new("test_data/accuracy/clc_accuracy.tsv")).err().unwrap();
        assert!(error.to_string().contains("missing required column"));
    }
}
