
use anyhow::{anyhow, Context};
use indexmap::IndexMap;
use log::{debug, warn};
use std::path::Path;

use crate::data_types::variant_record::VariantRecord;
use crate::parsing::vcf_text::VcfTextReader;
use crate::util::file_io::{open_text_reader, sample_name_from_path};

/// INFO key holding the gene annotation
pub const INFO_GENE: &str = "CAVA_GENE";
/// INFO key holding the combined cDNA and protein change, e.g. "c.1633G>A_p.E545K"
pub const INFO_CSN: &str = "CAVA_CSN";
/// Separator between the cDNA and protein portions of the CSN annotation
const PROTEIN_SEPARATOR: &str = "_p.";

/// One reported call from the CLC accuracy table, values are kept as written
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClcCall {
    pub gene: String,
    /// The free-text result cell, e.g. "c.1633G>A, p.E545K"
    pub result: String,
    pub position_coverage: String,
    pub variant_coverage: String,
    pub variant_frequency: String
}

/// A VCF record with its gene and cDNA annotation
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotatedVariant {
    pub gene: String,
    /// cDNA portion of the CSN annotation
    pub cdna_variant: String,
    pub record: VariantRecord
}

/// A CLC call and, if one was found, the VCF call it corresponds to
#[derive(Clone, Debug, PartialEq)]
pub struct AccuracyTableEntry {
    pub clc_call: ClcCall,
    pub vcf_call: Option<AnnotatedVariant>
}

/// Extracts the cDNA portion of a CLC result cell: the text before the first ',' if present, otherwise before the first space.
pub fn cdna_key(result: &str) -> &str {
    let separator = if result.contains(',') { ',' } else { ' ' };
    result.split(separator).next().unwrap_or_default()
}

/// Pulls the gene and cDNA change out of a semicolon-delimited INFO value.
/// Returns None if either annotation is missing.
pub fn parse_annotation(info: &str) -> Option<(String, String)> {
    let mut gene = None;
    let mut csn = None;
    for item in info.split(';') {
        if let Some((key, value)) = item.split_once('=') {
            if key == INFO_GENE && gene.is_none() {
                gene = Some(value);
            } else if key == INFO_CSN && csn.is_none() {
                csn = Some(value);
            }
        }
    }

    let cdna = csn?.split(PROTEIN_SEPARATOR).next().unwrap_or_default();
    Some((gene?.to_string(), cdna.to_string()))
}

/// The CLC calls for every sample, with any matched VCF calls attached
#[derive(Clone, Debug, Default)]
pub struct AccuracyTable {
    /// Sample name to cDNA key to entry, in table order
    samples: IndexMap<String, IndexMap<String, AccuracyTableEntry>>
}

impl AccuracyTable {
    /// Loads the tab-delimited CLC table. The first line is a header and gets skipped.
    /// Columns: sample, gene, result, position coverage, variant coverage, variant frequency.
    /// # Arguments
    /// * `filename` - the table to load
    /// # Errors
    /// * if the file does not open, or a row has fewer than 6 columns
    pub fn from_tsv(filename: &Path) -> anyhow::Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .from_path(filename)
            .with_context(|| format!("Error while opening {filename:?}:"))?;

        let mut table = Self::default();
        for result in csv_reader.records() {
            let row = result.with_context(|| format!("Error while reading {filename:?}"))?;
            if row.iter().all(|v| v.trim().is_empty()) {
                continue;
            }
            let field = |i: usize| -> anyhow::Result<String> {
                row.get(i)
                    .map(|v| v.trim_end().to_string())
                    .ok_or_else(|| anyhow!("Missing column {} on row: {row:?}", i + 1))
            };

            let sample_name = field(0)?;
            let clc_call = ClcCall {
                gene: field(1)?,
                result: field(2)?,
                position_coverage: field(3)?,
                variant_coverage: field(4)?,
                variant_frequency: field(5)?
            };
            table.add_call(sample_name, clc_call);
        }
        Ok(table)
    }

    /// Adds a CLC call; a repeated cDNA key within a sample replaces the earlier call
    pub fn add_call(&mut self, sample_name: String, clc_call: ClcCall) {
        let key = cdna_key(&clc_call.result).to_string();
        let entry = AccuracyTableEntry { clc_call, vcf_call: None };
        self.samples.entry(sample_name).or_default().insert(key, entry);
    }

    /// Attaches a VCF call to every CLC call of the sample whose cDNA key is contained in the VCF cDNA change.
    /// Returns the number of CLC calls updated.
    pub fn apply_vcf_call(&mut self, sample_name: &str, variant: &AnnotatedVariant) -> usize {
        let Some(calls) = self.samples.get_mut(sample_name) else {
            return 0;
        };

        let mut updated = 0;
        for (key, entry) in calls.iter_mut() {
            if variant.cdna_variant.contains(key.as_str()) {
                entry.vcf_call = Some(variant.clone());
                updated += 1;
            }
        }
        updated
    }

    /// Reads an annotated VCF (header optional) and applies every record to the sample derived from the file name
    /// # Arguments
    /// * `filename` - the VCF to load
    /// # Errors
    /// * if the file does not open or a line is structurally invalid
    pub fn apply_vcf_file(&mut self, filename: &Path) -> anyhow::Result<usize> {
        let sample_name = sample_name_from_path(filename)?;
        if !self.samples.contains_key(&sample_name) {
            warn!("Sample {sample_name:?} from {filename:?} is not in the accuracy table, skipping");
            return Ok(0);
        }

        let reader = open_text_reader(filename)?;
        let mut updated = 0;
        for result in VcfTextReader::headerless(reader) {
            let vcf_line = result.with_context(|| format!("Error while parsing {filename:?}:"))?;
            let annotation = vcf_line.info.as_deref().and_then(parse_annotation);
            let Some((gene, cdna_variant)) = annotation else {
                debug!("Line {} of {filename:?} has no {INFO_GENE}/{INFO_CSN} annotation", vcf_line.line_number);
                continue;
            };
            let variant = AnnotatedVariant { gene, cdna_variant, record: vcf_line.record };
            updated += self.apply_vcf_call(&sample_name, &variant);
        }
        debug!("Updated {updated} calls for sample {sample_name:?} from {filename:?}");
        Ok(updated)
    }

    /// Iterates over (sample, entry) in table order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &AccuracyTableEntry)> {
        self.samples.iter()
            .flat_map(|(sample, calls)| calls.values().map(move |entry| (sample.as_str(), entry)))
    }

    /// Total number of CLC calls
    pub fn len(&self) -> usize {
        self.samples.values().map(|c| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_cdna_key() {
        assert_eq!(cdna_key("c.1633G>A, p.E545K"), "c.1633G>A");
        assert_eq!(cdna_key("c.35G>A p.G12D"), "c.35G>A");
        assert_eq!(cdna_key("c.35G>A"), "c.35G>A");
    }

    #[test]
    fn test_parse_annotation() {
        assert_eq!(
            parse_annotation("DP=100;CAVA_GENE=KRAS;CAVA_CSN=c.35G>A_p.G12D"),
            Some(("KRAS".to_string(), "c.35G>A".to_string()))
        );
        assert_eq!(
            parse_annotation("CAVA_CSN=c.35G>A;CAVA_GENE=KRAS"),
            Some(("KRAS".to_string(), "c.35G>A".to_string()))
        );
        assert_eq!(parse_annotation("DP=100;CAVA_GENE=KRAS"), None);
        assert_eq!(parse_annotation("."), None);
    }

    #[test]
    fn test_apply_vcf_call() {
        let mut table = AccuracyTable::default();
        table.add_call("S1".to_string(), ClcCall { gene: "KRAS".to_string(), result: "c.35G>A, p.G12D".to_string(), ..Default::default() });
        table.add_call("S1".to_string(), ClcCall { gene: "EGFR".to_string(), result: "c.2573T>G p.L858R".to_string(), ..Default::default() });

        let record = VariantRecord::new("chr12".to_string(), 25398284, "C".to_string(), "T")
            .with_allele_depth(Some("90,10"));
        let variant = AnnotatedVariant { gene: "KRAS".to_string(), cdna_variant: "c.35G>A".to_string(), record };
        assert_eq!(table.apply_vcf_call("S1", &variant), 1);
        assert_eq!(table.apply_vcf_call("S9", &variant), 0);

        let entries: Vec<(&str, &AccuracyTableEntry)> = table.entries().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].1.vcf_call.as_ref().unwrap().record.total_depth(), Some(100));
        assert!(entries[1].1.vcf_call.is_none());
    }

    #[test]
    fn test_load_and_apply() {
        let mut table = AccuracyTable::from_tsv(&PathBuf::from("test_data/accuracy/clc_accuracy.tsv")).unwrap();
        assert_eq!(table.len(), 3);
        let updated = table.apply_vcf_file(&PathBuf::from("test_data/accuracy/vcfs/S1_reported_variants.vcf")).unwrap();
        assert_eq!(updated, 1);
        let skipped = table.apply_vcf_file(&PathBuf::from("test_data/accuracy/vcfs/S7_reported_variants.vcf")).unwrap();
        assert_eq!(skipped, 0);

        let matched: Vec<&str> = table.entries()
            .filter(|(_s, e)| e.vcf_call.is_some())
            .map(|(_s, e)| e.clc_call.gene.as_str())
            .collect();
        assert_eq!(matched, vec!["PIK3CA"]);
    }
}
