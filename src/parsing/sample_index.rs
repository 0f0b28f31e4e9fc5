
use anyhow::Context;
use indexmap::IndexMap;
use indicatif::ParallelProgressIterator;
use log::{debug, info};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::data_types::variant_record::VariantRecord;
use crate::parsing::vcf_text::VcfTextReader;
use crate::util::file_io::{list_input_files, open_text_reader, sample_name_from_path};
use crate::util::progress_bar::get_progress_style;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum IndexError {
    #[error("duplicate sample {sample:?} found in {first_file:?} and {second_file:?}")]
    DuplicateSample { sample: String, first_file: PathBuf, second_file: PathBuf },
}

/// All variant records for one sample, keyed by position.
/// The first record at a position keeps the bare position as its key; later records at the same
/// position get "{position}-{n}" with n counting up from 2.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleVariants {
    /// Position key to record, in insertion order
    records: IndexMap<String, VariantRecord>,
    /// Number of records seen per bare position
    position_counts: FxHashMap<String, usize>
}

impl SampleVariants {
    /// Adds a record and returns the key it was stored under
    /// # Arguments
    /// * `raw_position` - the POS string exactly as written in the VCF
    /// * `record` - the record to store
    pub fn insert(&mut self, raw_position: &str, record: VariantRecord) -> String {
        let count = self.position_counts.entry(raw_position.to_string()).or_default();
        let key = if self.records.contains_key(raw_position) {
            let key = format!("{raw_position}-{}", *count + 1);
            debug!("Multi-allelic site at {}:{raw_position}, stored as {key}", record.chromosome());
            key
        } else {
            raw_position.to_string()
        };
        *count += 1;

        let previous = self.records.insert(key.clone(), record);
        debug_assert!(previous.is_none(), "position keys must be unique");
        key
    }

    /// Adds a record using the string form of its own position as the bare key
    pub fn insert_record(&mut self, record: VariantRecord) -> String {
        let raw_position = record.position().to_string();
        self.insert(&raw_position, record)
    }

    /// Parses every data line of a VCF text stream into a new collection
    /// # Arguments
    /// * `reader` - the VCF text, must contain a `#CHROM` header
    /// # Errors
    /// * if the stream fails to read, or any line is structurally invalid
    pub fn from_reader<R: BufRead>(reader: R) -> anyhow::Result<Self> {
        let mut sample_variants = Self::default();
        let mut vcf_reader = VcfTextReader::new(reader);
        for result in vcf_reader.by_ref() {
            let vcf_line = result?;
            sample_variants.insert_record(vcf_line.record);
        }
        debug!("Parsed {} records with {} distinct FORMAT layouts", sample_variants.len(), vcf_reader.num_format_layouts());
        Ok(sample_variants)
    }

    /// Retrieves a record by position key
    pub fn get(&self, key: &str) -> Option<&VariantRecord> {
        self.records.get(key)
    }

    /// Iterates over (position key, record) in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariantRecord)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The position keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Collection of per-sample variants, loaded from one VCF per sample
#[derive(Clone, Debug, Default)]
pub struct SampleVariantIndex {
    /// Sample name to its variants, in load order
    samples: IndexMap<String, SampleVariants>,
    /// Sample name to the file it was loaded from
    sources: FxHashMap<String, PathBuf>
}

impl SampleVariantIndex {
    /// Loads every file in a folder as a single-sample VCF. Sample names are derived from the file names.
    /// Files are parsed in parallel, then added in file-name order.
    /// # Arguments
    /// * `folder` - folder containing the VCF files (.vcf or .vcf.gz)
    /// # Errors
    /// * if any file fails to parse
    /// * if two files map to the same sample name, see `IndexError::DuplicateSample`
    pub fn from_vcf_folder(folder: &Path) -> anyhow::Result<Self> {
        let filenames = list_input_files(folder)?;
        Self::from_vcf_files(&filenames)
    }

    /// Loads a list of single-sample VCF files. Sample names are derived from the file names.
    /// # Arguments
    /// * `filenames` - the VCF files to load, added in the provided order
    pub fn from_vcf_files(filenames: &[PathBuf]) -> anyhow::Result<Self> {
        info!("Loading {} VCF files...", filenames.len());
        let style = get_progress_style();
        let loaded: Vec<(String, PathBuf, SampleVariants)> = filenames.par_iter()
            .map(|filename| {
                let sample_name = sample_name_from_path(filename)?;
                let reader = open_text_reader(filename)?;
                let sample_variants = SampleVariants::from_reader(reader)
                    .with_context(|| format!("Error while parsing {filename:?}:"))?;
                Ok((sample_name, filename.clone(), sample_variants))
            })
            .progress_with_style(style)
            .collect::<anyhow::Result<_>>()?;

        // the duplicate check has to be sequential so it covers all files
        let mut index = Self::default();
        for (sample_name, filename, sample_variants) in loaded.into_iter() {
            info!("Loaded sample {sample_name:?} with {} variants from {filename:?}", sample_variants.len());
            index.add_sample(sample_name, &filename, sample_variants)?;
        }
        Ok(index)
    }

    /// Adds a sample's variants to the index
    /// # Arguments
    /// * `sample_name` - the unique sample identifier
    /// * `source` - the file the variants came from, used in error messages
    /// * `sample_variants` - all the variants for the sample
    /// # Errors
    /// * if the sample is already present
    pub fn add_sample(&mut self, sample_name: String, source: &Path, sample_variants: SampleVariants) -> Result<(), IndexError> {
        if let Some(first_file) = self.sources.get(&sample_name) {
            return Err(IndexError::DuplicateSample {
                sample: sample_name,
                first_file: first_file.clone(),
                second_file: source.to_path_buf()
            });
        }
        self.sources.insert(sample_name.clone(), source.to_path_buf());
        self.samples.insert(sample_name, sample_variants);
        Ok(())
    }

    /// Retrieves the variants for a sample
    pub fn get(&self, sample_name: &str) -> Option<&SampleVariants> {
        self.samples.get(sample_name)
    }

    /// Iterates over (sample, variants) in load order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SampleVariants)> {
        self.samples.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of loaded samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Total number of records over all samples
    pub fn num_records(&self) -> usize {
        self.samples.values().map(|s| s.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(position: u64, alt: &str) -> VariantRecord {
        VariantRecord::new("chr1".to_string(), position, "A".to_string(), alt)
    }

    #[test]
    fn test_multi_allelic_keys() {
        let mut variants = SampleVariants::default();
        assert_eq!(variants.insert("1000", record(1000, "T")), "1000");
        assert_eq!(variants.insert("1001", record(1001, "T")), "1001");
        assert_eq!(variants.insert("1000", record(1000, "G")), "1000-2");
        assert_eq!(variants.insert("1000", record(1000, "C")), "1000-3");

        let keys: Vec<&str> = variants.keys().collect();
        assert_eq!(keys, vec!["1000", "1001", "1000-2", "1000-3"]);

        // the bare key is always the first record at that position
        assert_eq!(variants.get("1000").unwrap().alternate(), "T");
        assert_eq!(variants.get("1000-2").unwrap().alternate(), "G");
        assert_eq!(variants.get("1000-3").unwrap().alternate(), "C");
    }

    #[test]
    fn test_from_reader() {
        let text = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS2\n\
            chr1\t1000\t.\tA\tT\t.\t.\t.\tGT:AD\t0/1:10,10\n\
            chr1\t1000\t.\tA\tAT\t.\t.\t.\tGT:AD\t0/1:15,5\n";
        let variants = SampleVariants::from_reader(text.as_bytes()).unwrap();
        let keys: Vec<&str> = variants.keys().collect();
        assert_eq!(keys, vec!["1000", "1000-2"]);
        assert_eq!(variants.get("1000-2").unwrap().alternate(), "AT");
    }

    #[test]
    fn test_reader_tracks_format_layouts() {
        let text = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\n\
            chr1\t10\t.\tA\tT\t.\t.\t.\tGT:AD\t0/1:6,4\n\
            chr1\t20\t.\tA\tT\t.\t.\t.\tAD:GT\t1,9:0/1\n\
            chr1\t30\t.\tA\tT\t.\t.\t.\tGT:AD\t0/1:5,5\n";
        let mut vcf_reader = VcfTextReader::new(text.as_bytes());
        assert_eq!(vcf_reader.by_ref().count(), 3);
        assert_eq!(vcf_reader.num_format_layouts(), 2);
    }

    #[test]
    fn test_duplicate_sample() {
        let mut index = SampleVariantIndex::default();
        index.add_sample("S1".to_string(), Path::new("a/S1_x.vcf"), SampleVariants::default()).unwrap();
        let error = index.add_sample("S1".to_string(), Path::new("a/S1_y.vcf"), SampleVariants::default()).unwrap_err();
        assert_eq!(error, IndexError::DuplicateSample {
            sample: "S1".to_string(),
            first_file: PathBuf::from("a/S1_x.vcf"),
            second_file: PathBuf::from("a/S1_y.vcf")
        });
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_from_folder() {
        let index = SampleVariantIndex::from_vcf_folder(Path::new("test_data/clinical_compare/vcfs")).unwrap();
        let samples: Vec<&str> = index.iter().map(|(s, _v)| s).collect();
        assert_eq!(samples, vec!["S1", "S2"]);

        let s1 = index.get("S1").unwrap();
        let keys: Vec<&str> = s1.keys().collect();
        assert_eq!(keys, vec!["140453136", "7578406", "1000", "1000-2", "1002"]);
        assert_eq!(index.get("S2").unwrap().len(), 2);
        assert_eq!(index.num_records(), 7);
    }

    #[test]
    fn test_duplicate_files() {
        let error = SampleVariantIndex::from_vcf_folder(Path::new("test_data/duplicate_samples")).unwrap_err();
        let index_error = error.downcast_ref::<IndexError>().unwrap();
        assert!(matches!(index_error, IndexError::DuplicateSample { sample, .. } if sample == "S1"));
    }
}
