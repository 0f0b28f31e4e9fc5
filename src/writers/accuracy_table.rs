
use serde::Serialize;
use std::fs::File;
use std::path::Path;

use crate::parsing::accuracy_table::{AccuracyTable, AccuracyTableEntry};
use crate::util::numeric::{format_optional, format_optional_float, NOT_AVAILABLE};

/// One CLC call next to its VCF counterpart
#[derive(Serialize)]
struct AccuracyTableRow<'a> {
    #[serde(rename = "Sample")]
    sample: &'a str,
    #[serde(rename = "Gene (CLC)")]
    clc_gene: &'a str,
    #[serde(rename = "CLC Result")]
    clc_result: &'a str,
    #[serde(rename = "CLC Position Coverage")]
    clc_position_coverage: &'a str,
    #[serde(rename = "CLC Variant Coverage")]
    clc_variant_coverage: &'a str,
    #[serde(rename = "CLC VF")]
    clc_variant_frequency: &'a str,
    #[serde(rename = "Gene (VCF)")]
    vcf_gene: String,
    #[serde(rename = "cDNA Variant (VCF)")]
    vcf_cdna_variant: String,
    #[serde(rename = "VCF Position Coverage")]
    vcf_position_coverage: String,
    #[serde(rename = "VCF Variant Coverage")]
    vcf_variant_coverage: String,
    #[serde(rename = "VCF VF")]
    vcf_variant_frequency: String
}

impl<'a> AccuracyTableRow<'a> {
    fn new(sample: &'a str, entry: &'a AccuracyTableEntry) -> Self {
        let clc = &entry.clc_call;
        let vcf = entry.vcf_call.as_ref();
        Self {
            sample,
            clc_gene: &clc.gene,
            clc_result: &clc.result,
            clc_position_coverage: &clc.position_coverage,
            clc_variant_coverage: &clc.variant_coverage,
            clc_variant_frequency: &clc.variant_frequency,
            vcf_gene: vcf.map(|v| v.gene.clone()).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            vcf_cdna_variant: vcf.map(|v| v.cdna_variant.clone()).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            vcf_position_coverage: format_optional(vcf.and_then(|v| v.record.total_depth())),
            vcf_variant_coverage: format_optional(vcf.and_then(|v| v.record.alt_depth())),
            vcf_variant_frequency: format_optional_float(vcf.and_then(|v| v.record.real_allele_frequency()))
        }
    }
}

/// Writes the paired table, one row per CLC call in table order
/// # Arguments
/// * `filename` - the output path; tab-delimited unless it ends in ".csv"
/// * `table` - the CLC calls with any attached VCF calls
pub fn write_accuracy_table(filename: &Path, table: &AccuracyTable) -> csv::Result<usize> {
    let is_csv: bool = filename.extension().unwrap_or_default() == "csv";
    let delimiter: u8 = if is_csv { b',' } else { b'\t' };
    let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(filename)?;

    let mut rows_written = 0;
    for (sample, entry) in table.entries() {
        csv_writer.serialize(AccuracyTableRow::new(sample, entry))?;
        rows_written += 1;
    }
    csv_writer.flush()?;
    Ok(rows_written)
}
