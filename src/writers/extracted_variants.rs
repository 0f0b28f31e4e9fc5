
use serde::Serialize;
use std::fs::File;
use std::path::Path;

use crate::data_types::variant_record::VariantRecord;
use crate::parsing::sample_index::SampleVariantIndex;
use crate::util::numeric::{format_optional, format_optional_float};

/// One row of the flattened record table
#[derive(Serialize)]
struct ExtractedRow<'a> {
    #[serde(rename = "Sample")]
    sample: &'a str,
    #[serde(rename = "CHROM")]
    chromosome: &'a str,
    #[serde(rename = "POS")]
    position: u64,
    #[serde(rename = "REF")]
    reference: &'a str,
    #[serde(rename = "ALT")]
    alternate: &'a str,
    /// Total depth from AD, or NA
    #[serde(rename = "DP")]
    total_depth: String,
    /// AF as reported by the caller, or NA
    #[serde(rename = "Called AF")]
    called_allele_frequency: String,
    /// AF derived from AD, or NA
    #[serde(rename = "Real AF")]
    real_allele_frequency: String
}

impl<'a> ExtractedRow<'a> {
    fn new(sample: &'a str, record: &'a VariantRecord) -> Self {
        Self {
            sample,
            chromosome: record.chromosome(),
            position: record.position(),
            reference: record.reference(),
            alternate: record.alternate(),
            total_depth: format_optional(record.total_depth()),
            called_allele_frequency: format_optional(record.called_allele_frequency()),
            real_allele_frequency: format_optional_float(record.real_allele_frequency())
        }
    }
}

/// Writes every record of every sample, in index order
/// # Arguments
/// * `filename` - the output path (tsv/csv)
/// * `index` - the loaded samples
pub fn write_extracted_variants(filename: &Path, index: &SampleVariantIndex) -> csv::Result<usize> {
    // modify the delimiter to "," if it ends with .csv
    let is_csv: bool = filename.extension().unwrap_or_default() == "csv";
    let delimiter: u8 = if is_csv { b',' } else { b'\t' };
    let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(filename)?;

    let mut rows_written = 0;
    for (sample, sample_variants) in index.iter() {
        for (_key, record) in sample_variants.iter() {
            csv_writer.serialize(ExtractedRow::new(sample, record))?;
            rows_written += 1;
        }
    }
    csv_writer.flush()?;
    Ok(rows_written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_extracted() {
        let index = SampleVariantIndex::from_vcf_folder(Path::new("test_data/clinical_compare/vcfs")).unwrap();
        let out_folder = std::env::temp_dir().join(format!("varmatch_extract_{}", std::process::id()));
        std::fs::create_dir_all(&out_folder).unwrap();
        let out_filename = out_folder.join("parsed_vcf_results.csv");

        assert_eq!(write_extracted_variants(&out_filename, &index).unwrap(), 7);
        let text = std::fs::read_to_string(&out_filename).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "Sample,CHROM,POS,REF,ALT,DP,Called AF,Real AF");
        assert_eq!(lines[1], "S1,chr7,140453136,A,T,80,0.375,0.375");
        // no AD or AF in the FORMAT
        assert_eq!(lines[2], "S1,chr17,7578406,C,T,NA,NA,NA");

        std::fs::remove_dir_all(&out_folder).unwrap();
    }
}
