
use indexmap::IndexMap;
use itertools::Itertools;
use log::info;
use std::fs::File;
use std::path::Path;

use crate::parsing::sample_index::SampleVariantIndex;

/// Header of the final column
pub const TOTAL_COLUMN: &str = "Total Count";

/// Which samples carry a variant at each `chrom:pos` location
#[derive(Clone, Debug, Default)]
pub struct PositionMatrix {
    /// Included samples, in first-seen order
    samples: Vec<String>,
    /// Location to (sample to ALT), both in first-seen order
    locations: IndexMap<String, IndexMap<String, String>>
}

impl PositionMatrix {
    /// Builds the matrix from every record in the index
    /// # Arguments
    /// * `index` - the loaded samples
    /// * `exclude_pattern` - samples whose name contains this are skipped; empty keeps every sample
    pub fn from_index(index: &SampleVariantIndex, exclude_pattern: &str) -> Self {
        let mut matrix = Self::default();
        let mut excluded = vec![];
        for (sample, sample_variants) in index.iter() {
            if !exclude_pattern.is_empty() && sample.contains(exclude_pattern) {
                excluded.push(sample);
                continue;
            }
            matrix.samples.push(sample.to_string());
            for (_key, record) in sample_variants.iter() {
                let location = format!("{}:{}", record.chromosome(), record.position());
                // a later ALT at the same location replaces the earlier one
                matrix.locations.entry(location).or_default()
                    .insert(sample.to_string(), record.alternate().to_string());
            }
        }
        if !excluded.is_empty() {
            info!("Excluded {} samples matching {exclude_pattern:?}: {}", excluded.len(), excluded.iter().join(", "));
        }
        matrix
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    /// Number of samples with a variant at the location
    pub fn count(&self, location: &str) -> usize {
        self.locations.get(location).map(|s| s.len()).unwrap_or_default()
    }

    /// Number of distinct locations
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Writes the matrix: an empty corner cell, one column per sample, then the total.
    /// Each cell holds the sample's ALT at that location, or is left empty.
    /// # Arguments
    /// * `filename` - the output path (tsv/csv)
    pub fn write(&self, filename: &Path) -> csv::Result<()> {
        // modify the delimiter to "," if it ends with .csv
        let is_csv: bool = filename.extension().unwrap_or_default() == "csv";
        let delimiter: u8 = if is_csv { b',' } else { b'\t' };
        let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_path(filename)?;

        let header = std::iter::once("")
            .chain(self.samples.iter().map(|s| s.as_str()))
            .chain(std::iter::once(TOTAL_COLUMN));
        csv_writer.write_record(header)?;

        for (location, sample_alts) in self.locations.iter() {
            let mut row = vec![location.clone()];
            row.extend(self.samples.iter().map(|s| sample_alts.get(s).cloned().unwrap_or_default()));
            row.push(sample_alts.len().to_string());
            csv_writer.write_record(&row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::variant_record::VariantRecord;
    use crate::parsing::sample_index::SampleVariants;

    fn build_index() -> SampleVariantIndex {
        let mut index = SampleVariantIndex::default();
        for (sample, records) in [
            ("S1", vec![(100, "T"), (200, "G")]),
            ("S1rep", vec![(100, "T"), (300, "C")]),
            ("S2", vec![(100, "C")]),
        ] {
            let mut sample_variants = SampleVariants::default();
            for (position, alt) in records {
                sample_variants.insert_record(VariantRecord::new("chr1".to_string(), position, "A".to_string(), alt));
            }
            let source = format!("{sample}.vcf");
            index.add_sample(sample.to_string(), Path::new(&source), sample_variants).unwrap();
        }
        index
    }

    #[test]
    fn test_exclusion() {
        let index = build_index();
        let matrix = PositionMatrix::from_index(&index, "rep");
        assert_eq!(matrix.samples(), &["S1".to_string(), "S2".to_string()]);
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix.count("chr1:100"), 2);
        assert_eq!(matrix.count("chr1:300"), 0);

        let everything = PositionMatrix::from_index(&index, "");
        assert_eq!(everything.samples().len(), 3);
        assert_eq!(everything.count("chr1:100"), 3);
    }

    #[test]
    fn test_write_matrix() {
        let matrix = PositionMatrix::from_index(&build_index(), "rep");
        let out_folder = std::env::temp_dir().join(format!("varmatch_positions_{}", std::process::id()));
        std::fs::create_dir_all(&out_folder).unwrap();
        let out_filename = out_folder.join("variant_positions.csv");

        matrix.write(&out_filename).unwrap();
        let text = std::fs::read_to_string(&out_filename).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![
            ",S1,S2,Total Count",
            "chr1:100,T,C,2",
            "chr1:200,G,,1"
        ]);

        std::fs::remove_dir_all(&out_folder).unwrap();
    }
}
